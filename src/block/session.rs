use std::collections::HashMap;

use anyhow::Context;
use thiserror::Error;

use super::{
    activity::Block,
    fetch::get_block,
    gate::{self, FinishError, FinishOutcome},
    page::{sequence, Page},
    render::{render_page, PageView},
    tracker::{CompletionTracker, TrackerError, Transition},
};
use crate::{
    client::Transport,
    qbank::{get_questions, Answer, Correction, Question, QuestionPlayer, SubmitError},
    store::{KeyValueStore, ProgressStore},
};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Página não encontrada.")]
    PageNotFound,

    #[error("page {0} does not hold a question")]
    NotAQuestionPage(usize),

    #[error("question {0} was not loaded")]
    QuestionNotLoaded(String),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// One learner working through one block: pages, progress and answers.
///
/// Every tracker transition is written to the store as it happens.
pub struct BlockSession<'a> {
    api: &'a dyn Transport,
    store: &'a dyn KeyValueStore,
    progress: ProgressStore<'a>,
    block: Block,
    pages: Vec<Page>,
    tracker: CompletionTracker,
    questions: HashMap<String, Question>,
}

impl<'a> BlockSession<'a> {
    pub fn open(
        api: &'a dyn Transport,
        store: &'a dyn KeyValueStore,
        block_id: &str,
    ) -> anyhow::Result<Self> {
        let block = get_block(api, block_id)?;
        Self::from_block(api, store, block)
    }

    pub fn from_block(
        api: &'a dyn Transport,
        store: &'a dyn KeyValueStore,
        block: Block,
    ) -> anyhow::Result<Self> {
        let pages = sequence(&block.activities);
        if pages.is_empty() {
            return Err(SessionError::PageNotFound.into());
        }

        let progress = ProgressStore::new(store);
        let tracker = CompletionTracker::restore(
            pages.iter().map(|p| p.kind()).collect(),
            progress.position(&block.id),
            progress.flags(&block.id),
        );

        let question_ids = {
            let mut ids: Vec<&str> = Vec::new();
            for id in block.question_ids() {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            ids
        };
        let questions = if question_ids.is_empty() {
            HashMap::new()
        } else {
            get_questions(api, &question_ids)
                .context(format!("failed to load questions of block {}", block.id))?
                .into_iter()
                .map(|q| (q.id.clone(), q))
                .collect()
        };

        let answered: Vec<String> = question_ids
            .iter()
            .filter(|id| {
                progress.is_answered(&block.id, id)
                    || block.answered_questions.iter().any(|a| a == *id)
            })
            .map(|id| id.to_string())
            .collect();

        let mut session = Self {
            api,
            store,
            progress,
            block,
            pages,
            tracker,
            questions,
        };
        for id in answered {
            session.question_answered(&id);
        }

        log::debug!(
            "block {} opened on page {} of {}",
            session.block.id,
            session.tracker.current(),
            session.pages.len()
        );
        Ok(session)
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn tracker(&self) -> &CompletionTracker {
        &self.tracker
    }

    pub fn current_index(&self) -> usize {
        self.tracker.current()
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.get(question_id)
    }

    pub fn view(&self, index: usize) -> Option<PageView> {
        let page = self.pages.get(index)?;
        let activity = self.block.activities.get(page.activity_index)?;
        Some(render_page(page, activity))
    }

    pub fn current_view(&self) -> PageView {
        self.view(self.current_index())
            .unwrap_or_else(|| PageView::Placeholder {
                title: self.block.title.clone(),
                reason: SessionError::PageNotFound.to_string(),
            })
    }

    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        let transitions = self.tracker.navigate(index)?;
        self.persist(&transitions);
        Ok(())
    }

    /// Returns false when already on the last page.
    pub fn next(&mut self) -> Result<bool, SessionError> {
        let next = self.current_index() + 1;
        if next >= self.pages.len() {
            return Ok(false);
        }
        self.go_to(next)?;
        Ok(true)
    }

    /// Returns false when already on the first page.
    pub fn previous(&mut self) -> Result<bool, SessionError> {
        match self.current_index().checked_sub(1) {
            Some(previous) => {
                self.go_to(previous)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Playback report for the video on the current page.
    pub fn video_status(&mut self, position_secs: f64, duration_secs: f64) -> Result<(), SessionError> {
        let transitions =
            self.tracker
                .video_status(self.current_index(), position_secs, duration_secs)?;
        self.persist(&transitions);
        Ok(())
    }

    /// Completion signal for a question: records it and completes every page
    /// showing that question.
    pub fn question_answered(&mut self, question_id: &str) {
        if !self.progress.is_answered(&self.block.id, question_id) {
            self.progress.mark_answered(&self.block.id, question_id);
        }

        let indexes: Vec<usize> = self
            .pages
            .iter()
            .enumerate()
            .filter(|(_, page)| page.question_id() == Some(question_id))
            .map(|(i, _)| i)
            .collect();

        let mut transitions = Vec::new();
        for index in indexes {
            if let Ok(t) = self.tracker.mark_complete(index) {
                transitions.extend(t);
            }
        }
        self.persist(&transitions);
    }

    pub fn player(&self) -> QuestionPlayer<'a> {
        QuestionPlayer::new(self.api, self.store)
    }

    /// Sends the answer for the question on the current page; a corrected
    /// answer completes the page.
    pub fn answer_current(&mut self, answer: &Answer) -> Result<Correction, SessionError> {
        let index = self.current_index();
        let question_id = self.pages[index]
            .question_id()
            .ok_or(SessionError::NotAQuestionPage(index))?
            .to_string();

        let correction = {
            let question = self
                .questions
                .get(&question_id)
                .ok_or_else(|| SessionError::QuestionNotLoaded(question_id.clone()))?;
            self.player().submit(question, answer)?
        };

        self.question_answered(&question_id);
        Ok(correction)
    }

    pub fn can_finish(&self) -> bool {
        self.tracker.can_finish()
    }

    /// Leaving the last page through "finish" counts as moving forward, so a
    /// final reading or video page completes first.
    pub fn attempt_finish(&mut self) -> Result<FinishOutcome, FinishError> {
        let current = self.current_index();
        let on_last_page = current + 1 == self.pages.len();
        if on_last_page && self.pages[current].kind().completes_on_leave() {
            if let Ok(transitions) = self.tracker.mark_complete(current) {
                self.persist(&transitions);
            }
        }

        let question_ids = self.block.question_ids();
        gate::attempt_finish(
            self.api,
            &self.progress,
            &self.tracker,
            &self.block.id,
            &question_ids,
        )
    }

    fn persist(&self, transitions: &[Transition]) {
        let mut flags_changed = false;
        for transition in transitions {
            match transition {
                Transition::PositionChanged(index) => {
                    self.progress.save_position(&self.block.id, *index)
                }
                Transition::PageCompleted(_) => flags_changed = true,
            }
        }
        if flags_changed {
            self.progress.save_flags(&self.block.id, self.tracker.flags());
        }
    }
}
