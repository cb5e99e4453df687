use thiserror::Error;

use super::{
    answer::Answer,
    correction::Correction,
    question::{InputSurface, Question},
};
use crate::{
    client::{ApiError, Transport},
    store::{KeyValueStore, ProgressStore},
    GENERIC_FAILURE,
};

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Unsupported question type: {0}")]
    Unsupported(String),

    #[error("a '{answer}' answer cannot be sent for a '{question}' question")]
    KindMismatch {
        question: &'static str,
        answer: &'static str,
    },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("correction response carries neither 'nota' nor 'acertou'")]
    UnexpectedResponse,
}

impl SubmitError {
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Validation(message) => message.clone(),
            SubmitError::Api(e) => e.user_message(),
            SubmitError::Unsupported(_) | SubmitError::KindMismatch { .. } => self.to_string(),
            SubmitError::UnexpectedResponse => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Collects answers and sends them to the correction endpoint of their type.
///
/// In-progress input lives as a local draft until the server accepts it.
pub struct QuestionPlayer<'a> {
    api: &'a dyn Transport,
    progress: ProgressStore<'a>,
}

impl<'a> QuestionPlayer<'a> {
    pub fn new(api: &'a dyn Transport, store: &'a dyn KeyValueStore) -> Self {
        Self {
            api,
            progress: ProgressStore::new(store),
        }
    }

    /// Input surface for the question and the answer to start from: the saved
    /// draft when it fits the question, an empty one otherwise.
    pub fn open(&self, question: &Question) -> Result<(InputSurface, Answer), SubmitError> {
        let kind = question.kind()?;
        let surface = question.input_surface()?;
        let answer = self
            .draft(&question.id)
            .filter(|draft| draft.kind() == kind)
            .unwrap_or_else(|| Answer::blank_for(&surface));
        Ok((surface, answer))
    }

    pub fn draft(&self, question_id: &str) -> Option<Answer> {
        self.progress.draft(question_id)
    }

    pub fn save_draft(&self, question_id: &str, answer: &Answer) {
        self.progress.save_draft(question_id, answer);
    }

    pub fn submit(&self, question: &Question, answer: &Answer) -> Result<Correction, SubmitError> {
        let kind = question.kind()?;
        if answer.kind() != kind {
            return Err(SubmitError::KindMismatch {
                question: kind.tag(),
                answer: answer.kind().tag(),
            });
        }
        answer.validate()?;

        self.progress.save_draft(&question.id, answer);

        let response = self
            .api
            .post(&kind.correction_path(&question.id), &answer.body(&question.id))
            .map_err(|e| {
                log::warn!("correction of question {} failed: {}", question.id, e);
                e
            })?;
        let correction = Correction::from_response(&response)?;

        self.progress.clear_draft(&question.id);
        log::debug!("question {} corrected: {:?}", question.id, correction);
        Ok(correction)
    }
}
