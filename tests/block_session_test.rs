mod common;

use common::{lesson_api, temp_store_path};
use geniusfactory::{
    block::{BlockSession, FinishError, PageKind, PageView, QueueStep},
    qbank::{Answer, Correction, InputSurface},
    FileStore, KeyValueStore, MemoryStore, ProgressStore,
};
use serde_json::json;

#[test]
fn sequences_the_lesson() {
    let api = lesson_api();
    let store = MemoryStore::new();
    let session = BlockSession::open(&api, &store, "b1").unwrap();

    let kinds: Vec<PageKind> = session.pages().iter().map(|p| p.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            PageKind::Reading,
            PageKind::Video,
            PageKind::Question,
            PageKind::Question
        ]
    );
    assert_eq!(session.block().path.as_ref().map(|p| p.title.as_str()), Some("Fundamentos"));
    assert!(matches!(session.current_view(), PageView::Reading { .. }));
    assert_eq!(
        api.paths(),
        vec!["/mobile/v1/blocos/b1".to_string(), "/qbank/questoes/lote".to_string()]
    );
}

#[test]
fn full_lesson_run_unlocks_achievements() {
    let api = lesson_api();
    api.reply(
        "/mobile/v1/qbank/questoes/q1/corrigir/multipla-escolha",
        json!({"acertou": true}),
    );
    api.reply(
        "/mobile/v1/qbank/questoes/q2/corrigir/associacao-colunas",
        json!({"acertou": false, "explicacao": "1/4 é um quarto"}),
    );
    api.reply(
        "/mobile/v1/blocos/b1/concluir",
        json!({"conquistas": [
            {"id": 1, "titulo": "Primeiros passos", "categoria": "trilhas", "nivel": 1},
            {"id": 2, "titulo": "Certeiro", "categoria": "questoes", "nivel": 1}
        ]}),
    );
    let store = MemoryStore::new();
    let mut session = BlockSession::open(&api, &store, "b1").unwrap();

    // reading -> video
    assert!(session.next().unwrap());
    session.video_status(299.8, 300.0).unwrap();
    // video -> q1
    assert!(session.next().unwrap());

    // a question page is not completed by navigating away from it
    assert!(session.next().unwrap());
    assert!(session.previous().unwrap());
    assert_eq!(session.tracker().flags(), &[true, true, false, false]);

    let correction = session
        .answer_current(&Answer::SingleChoice {
            letter: Some("A".into()),
        })
        .unwrap();
    assert_eq!(
        correction,
        Correction::Objective {
            correct: true,
            explanation: None
        }
    );

    assert!(matches!(
        session.attempt_finish(),
        Err(FinishError::Incomplete { ref pending }) if pending == &vec![3]
    ));

    session.next().unwrap();
    let question = session.question("q2").unwrap().clone();
    let (surface, _) = session.player().open(&question).unwrap();
    let presented = match surface {
        InputSurface::Columns { column_b, .. } => {
            column_b.into_iter().rev().map(|item| item.id).collect::<Vec<_>>()
        }
        other => panic!("unexpected surface {:?}", other),
    };
    let mut answer = Answer::matching(presented);
    if let Answer::MatchingColumns { pairs, .. } = &mut answer {
        pairs.insert("1".into(), "y".into());
        pairs.insert("2".into(), "x".into());
    }
    session.answer_current(&answer).unwrap();

    let sent = api.calls.borrow().last().cloned().unwrap();
    assert_eq!(sent.1.unwrap()["_colunaB"], json!(["y", "x"]));

    assert!(session.can_finish());
    let mut outcome = session.attempt_finish().unwrap();
    assert!(!outcome.navigate_now());
    assert_eq!(
        outcome.unlocked.current().map(|a| a.title.as_str()),
        Some("Primeiros passos")
    );
    assert!(matches!(outcome.unlocked.advance(), QueueStep::Show(a) if a.title == "Certeiro"));
    assert_eq!(outcome.unlocked.advance(), QueueStep::Done);

    // the block starts over next time
    assert!(store.keys().iter().all(|k| !k.contains("bloco:b1")));
}

#[test]
fn finish_failure_leaves_block_resumable() {
    let api = lesson_api();
    api.reply(
        "/mobile/v1/qbank/questoes/q1/corrigir/multipla-escolha",
        json!({"acertou": true}),
    );
    api.fail("/mobile/v1/blocos/b1/concluir", 502);
    let store = MemoryStore::new();
    let progress = ProgressStore::new(&store);
    progress.mark_answered("b1", "q2");
    progress.save_flags("b1", &[true, true]);
    progress.save_position("b1", 2);

    let mut session = BlockSession::open(&api, &store, "b1").unwrap();
    session
        .answer_current(&Answer::SingleChoice {
            letter: Some("A".into()),
        })
        .unwrap();

    let err = session.attempt_finish().unwrap_err();
    assert_eq!(err.user_message(), geniusfactory::GENERIC_FAILURE);
    assert_eq!(progress.flags("b1"), Some(vec![true, true, true, true]));
    assert!(progress.is_answered("b1", "q2"));
}

#[test]
fn progress_survives_a_restart_on_disk() {
    let path = temp_store_path("resume");
    let api = lesson_api();

    {
        let store = FileStore::new(&path);
        let mut session = BlockSession::open(&api, &store, "b1").unwrap();
        session.next().unwrap();
        session.next().unwrap();
    }

    let store = FileStore::new(&path);
    let session = BlockSession::open(&api, &store, "b1").unwrap();
    assert_eq!(session.current_index(), 2);
    assert_eq!(session.tracker().flags(), &[true, true, false, false]);
    assert!(store
        .get("@geniusfactory:bloco:b1:pagina")
        .unwrap()
        .is_some());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn failed_answer_keeps_draft_for_next_launch() {
    let path = temp_store_path("draft");
    let api = lesson_api();
    api.fail("/mobile/v1/qbank/questoes/q1/corrigir/multipla-escolha", 500);
    let store = FileStore::new(&path);
    let mut session = BlockSession::open(&api, &store, "b1").unwrap();
    session.go_to(2).unwrap();

    let answer = Answer::SingleChoice {
        letter: Some("B".into()),
    };
    assert!(session.answer_current(&answer).is_err());
    assert!(!session.tracker().is_complete(2));

    let reopened = FileStore::new(&path);
    let progress = ProgressStore::new(&reopened);
    assert_eq!(progress.draft("q1"), Some(answer));

    let _ = std::fs::remove_file(&path);
}
