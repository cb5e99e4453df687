use std::{cell::RefCell, collections::HashMap, path::PathBuf};

use geniusfactory::{ApiError, Transport};
use serde_json::{json, Value};

/// Canned answers per path; every call is recorded. The crate's own mock
/// transport is only compiled for unit tests, so integration tests carry this one.
#[derive(Default)]
pub struct FakeApi {
    replies: RefCell<HashMap<String, Result<Value, u16>>>,
    pub calls: RefCell<Vec<(String, Option<Value>)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, path: &str, body: Value) {
        self.replies.borrow_mut().insert(path.to_string(), Ok(body));
    }

    pub fn fail(&self, path: &str, status: u16) {
        self.replies.borrow_mut().insert(path.to_string(), Err(status));
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(p, _)| p.clone()).collect()
    }

    fn answer(&self, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        self.calls
            .borrow_mut()
            .push((path.to_string(), body.cloned()));
        match self.replies.borrow().get(path) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(status)) => Err(ApiError::Server {
                status: *status,
                message: None,
            }),
            None => Err(ApiError::Server {
                status: 404,
                message: None,
            }),
        }
    }
}

impl Transport for FakeApi {
    fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.answer(path, None)
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.answer(path, Some(body))
    }
}

/// Reading, video and a two-question set.
pub fn lesson_api() -> FakeApi {
    let api = FakeApi::new();
    api.reply(
        "/mobile/v1/blocos/b1",
        json!({
            "id": "b1",
            "titulo": "Frações",
            "caminho": {"id": "c1", "titulo": "Fundamentos"},
            "atividades": [
                {"id": "a1", "titulo": "O que é uma fração", "tipo": "leitura", "ordem": 1,
                 "conteudo": "<p>Uma fração representa partes de um todo.</p>"},
                {"id": "a2", "titulo": "Aula", "tipo": "video", "ordem": 2,
                 "videoUrl": "https://cdn.example.com/fracoes.mp4"},
                {"id": "a3", "titulo": "Pratique", "tipo": "questoes", "ordem": 3,
                 "questaoIds": ["q1", "q2"]}
            ],
            "respostas": []
        }),
    );
    api.reply(
        "/qbank/questoes/lote",
        json!([
            {"id": "q1", "tipo": "multipla_escolha", "enunciado": "Quanto é 1/2 + 1/2?",
             "conteudo": {"alternativas": [{"letra": "A", "texto": "1"}, {"letra": "B", "texto": "2"}]}},
            {"id": "q2", "tipo": "associacao_colunas", "enunciado": "Associe",
             "conteudo": {
                "colunaA": [{"id": "1", "texto": "1/2"}, {"id": "2", "texto": "1/4"}],
                "colunaB": [{"id": "x", "texto": "metade"}, {"id": "y", "texto": "um quarto"}]
             }}
        ]),
    );
    api
}

pub fn temp_store_path(name: &str) -> PathBuf {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "geniusfactory_{}_{}_{}.json",
        name,
        std::process::id(),
        id
    ));
    let _ = std::fs::remove_file(&path);
    path
}
