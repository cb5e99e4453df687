use serde_json::json;
use thiserror::Error;

use super::tracker::CompletionTracker;
use crate::{
    achievements::{parse_achievements, Achievement},
    client::{ApiError, Transport},
    store::ProgressStore,
};

#[derive(Error, Debug)]
pub enum FinishError {
    #[error("Conclua todas as páginas antes de encerrar o bloco.")]
    Incomplete { pending: Vec<usize> },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FinishError {
    pub fn user_message(&self) -> String {
        match self {
            FinishError::Incomplete { .. } => self.to_string(),
            FinishError::Api(e) => e.user_message(),
        }
    }
}

/// Newly unlocked achievements, shown one at a time.
#[derive(Debug, Clone, Default)]
pub struct AchievementQueue {
    items: Vec<Achievement>,
    index: usize,
}

#[derive(Debug, PartialEq)]
pub enum QueueStep<'a> {
    Show(&'a Achievement),
    Done,
}

impl AchievementQueue {
    pub fn new(items: Vec<Achievement>) -> Self {
        Self { items, index: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn current(&self) -> Option<&Achievement> {
        self.items.get(self.index)
    }

    /// "Next" on the current modal. `Done` means close and move on.
    pub fn advance(&mut self) -> QueueStep<'_> {
        if self.index < self.items.len() {
            self.index += 1;
        }
        match self.items.get(self.index) {
            Some(achievement) => QueueStep::Show(achievement),
            None => QueueStep::Done,
        }
    }
}

#[derive(Debug)]
pub struct FinishOutcome {
    pub unlocked: AchievementQueue,
}

impl FinishOutcome {
    /// Nothing to celebrate, go straight to the next screen.
    pub fn navigate_now(&self) -> bool {
        self.unlocked.is_empty()
    }
}

pub fn complete_block(api: &dyn Transport, block_id: &str) -> Result<Vec<Achievement>, ApiError> {
    let body = api.post(&format!("/mobile/v1/blocos/{}/concluir", block_id), &json!({}))?;
    parse_achievements(body)
}

/// Finishes the block when every page is complete. On success the block's
/// saved progress is dropped; on failure it is left as is so the block can be
/// resumed.
pub(crate) fn attempt_finish(
    api: &dyn Transport,
    progress: &ProgressStore,
    tracker: &CompletionTracker,
    block_id: &str,
    question_ids: &[&str],
) -> Result<FinishOutcome, FinishError> {
    if !tracker.can_finish() {
        return Err(FinishError::Incomplete {
            pending: tracker.pending(),
        });
    }

    let unlocked = complete_block(api, block_id).map_err(|e| {
        log::warn!("could not complete block {}: {}", block_id, e);
        e
    })?;

    progress.clear_block(block_id, question_ids);
    log::info!(
        "block {} completed, {} achievement(s) unlocked",
        block_id,
        unlocked.len()
    );

    Ok(FinishOutcome {
        unlocked: AchievementQueue::new(unlocked),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{block::PageKind, store::MemoryStore, testing::MockTransport};

    fn achievement(id: &str) -> Achievement {
        serde_json::from_value(json!({"id": id, "titulo": id})).unwrap()
    }

    #[test]
    fn queue_walks_each_achievement_then_finishes() {
        let mut queue = AchievementQueue::new(vec![achievement("a"), achievement("b")]);
        assert_eq!(queue.current().map(|a| a.id.as_str()), Some("a"));
        assert!(matches!(queue.advance(), QueueStep::Show(a) if a.id == "b"));
        assert_eq!(queue.advance(), QueueStep::Done);
        assert_eq!(queue.advance(), QueueStep::Done);
        assert!(queue.current().is_none());
    }

    #[test]
    fn incomplete_block_is_refused_without_network() {
        let api = MockTransport::new();
        let memory = MemoryStore::new();
        let progress = ProgressStore::new(&memory);
        let tracker = CompletionTracker::restore(
            vec![PageKind::Reading, PageKind::Question],
            None,
            Some(vec![true, false]),
        );

        let err = attempt_finish(&api, &progress, &tracker, "b1", &[]).unwrap_err();

        assert!(matches!(err, FinishError::Incomplete { ref pending } if pending == &vec![1]));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn server_failure_keeps_saved_progress() {
        let api = MockTransport::new();
        api.fail("/mobile/v1/blocos/b1/concluir", 500, Some("Tente mais tarde"));
        let memory = MemoryStore::new();
        let progress = ProgressStore::new(&memory);
        progress.save_position("b1", 0);
        let tracker = CompletionTracker::restore(vec![PageKind::Reading], None, Some(vec![true]));

        let err = attempt_finish(&api, &progress, &tracker, "b1", &[]).unwrap_err();

        assert_eq!(err.user_message(), "Tente mais tarde");
        assert_eq!(progress.position("b1"), Some(0));
    }

    #[test]
    fn success_clears_progress_and_queues_unlocks() {
        let api = MockTransport::new();
        api.reply(
            "/mobile/v1/blocos/b1/concluir",
            json!({"conquistas": [{"id": 9, "titulo": "Primeiro bloco"}]}),
        );
        let memory = MemoryStore::new();
        let progress = ProgressStore::new(&memory);
        progress.save_position("b1", 0);
        let tracker = CompletionTracker::restore(vec![PageKind::Reading], None, Some(vec![true]));

        let outcome = attempt_finish(&api, &progress, &tracker, "b1", &[]).unwrap();

        assert!(!outcome.navigate_now());
        assert_eq!(outcome.unlocked.len(), 1);
        assert_eq!(progress.position("b1"), None);
    }
}
