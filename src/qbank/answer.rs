use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{
    player::SubmitError,
    question::{InputSurface, QuestionKind},
};

/// The learner's input for one question, shaped by question type.
///
/// Serialized form is what drafts are stored as; the request body sent for
/// correction comes from [`Answer::body`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    SingleChoice {
        letter: Option<String>,
    },
    TrueFalse {
        values: Vec<Option<bool>>,
    },
    MultiSelect {
        selected: Vec<String>,
    },
    ShortAnswer {
        text: String,
    },
    FreeText {
        text: String,
    },
    QuickBlock {
        answers: Vec<String>,
    },
    MatchingColumns {
        /// column A id -> column B id
        pairs: BTreeMap<String, String>,
        /// column B ids in the order they were shown
        column_b: Vec<String>,
    },
    FillBlanks {
        blanks: Vec<String>,
    },
    FillBlanksLabeled {
        blanks: BTreeMap<String, String>,
    },
    Table {
        cells: Vec<Vec<String>>,
    },
    ColorRegions {
        regions: BTreeMap<String, String>,
    },
}

impl Answer {
    pub fn kind(&self) -> QuestionKind {
        match self {
            Answer::SingleChoice { .. } => QuestionKind::SingleChoice,
            Answer::TrueFalse { .. } => QuestionKind::TrueFalse,
            Answer::MultiSelect { .. } => QuestionKind::MultiSelect,
            Answer::ShortAnswer { .. } => QuestionKind::ShortAnswer,
            Answer::FreeText { .. } => QuestionKind::FreeText,
            Answer::QuickBlock { .. } => QuestionKind::QuickBlock,
            Answer::MatchingColumns { .. } => QuestionKind::MatchingColumns,
            Answer::FillBlanks { .. } => QuestionKind::FillBlanks,
            Answer::FillBlanksLabeled { .. } => QuestionKind::FillBlanksLabeled,
            Answer::Table { .. } => QuestionKind::Table,
            Answer::ColorRegions { .. } => QuestionKind::ColorRegions,
        }
    }

    /// Empty answer for a freshly shown question. Matching questions start
    /// with column B in the order the surface lists it; use
    /// [`Answer::matching`] when the screen shuffles it.
    pub fn blank_for(surface: &InputSurface) -> Answer {
        match surface {
            InputSurface::Alternatives {
                multiple: false, ..
            } => Answer::SingleChoice { letter: None },
            InputSurface::Alternatives { multiple: true, .. } => {
                Answer::MultiSelect { selected: vec![] }
            }
            InputSurface::Statements(statements) => Answer::TrueFalse {
                values: vec![None; statements.len()],
            },
            InputSurface::TextBox { multiline: false } => Answer::ShortAnswer {
                text: String::new(),
            },
            InputSurface::TextBox { multiline: true } => Answer::FreeText {
                text: String::new(),
            },
            InputSurface::QuickBlock(prompts) => Answer::QuickBlock {
                answers: vec![String::new(); prompts.len()],
            },
            InputSurface::Columns { column_b, .. } => {
                Answer::matching(column_b.iter().map(|item| item.id.clone()).collect())
            }
            InputSurface::Blanks {
                labels,
                labeled: false,
                ..
            } => Answer::FillBlanks {
                blanks: vec![String::new(); labels.len()],
            },
            InputSurface::Blanks {
                labels,
                labeled: true,
                ..
            } => Answer::FillBlanksLabeled {
                blanks: labels
                    .iter()
                    .map(|label| (label.clone(), String::new()))
                    .collect(),
            },
            InputSurface::Table { rows, columns } => Answer::Table {
                cells: vec![vec![String::new(); columns.len()]; rows.len()],
            },
            InputSurface::Regions { .. } => Answer::ColorRegions {
                regions: BTreeMap::new(),
            },
        }
    }

    /// Matching answer for a column B shown in `column_b` order.
    pub fn matching(column_b: Vec<String>) -> Answer {
        Answer::MatchingColumns {
            pairs: BTreeMap::new(),
            column_b,
        }
    }

    /// Rejects input that cannot be sent for correction yet.
    pub fn validate(&self) -> Result<(), SubmitError> {
        let problem = match self {
            Answer::SingleChoice { letter } => letter
                .as_deref()
                .map_or(true, |l| l.trim().is_empty())
                .then_some("Selecione uma alternativa."),
            Answer::TrueFalse { values } => (values.is_empty() || values.iter().any(Option::is_none))
                .then_some("Marque verdadeiro ou falso em todas as afirmações."),
            Answer::MultiSelect { selected } => {
                selected.is_empty().then_some("Selecione ao menos uma alternativa.")
            }
            Answer::ShortAnswer { text } | Answer::FreeText { text } => {
                text.trim().is_empty().then_some("Escreva sua resposta.")
            }
            Answer::QuickBlock { answers } => answers
                .iter()
                .all(|a| a.trim().is_empty())
                .then_some("Responda ao menos um item."),
            Answer::MatchingColumns { pairs, .. } => {
                pairs.is_empty().then_some("Associe ao menos um item.")
            }
            Answer::FillBlanks { blanks } => (blanks.is_empty()
                || blanks.iter().any(|b| b.trim().is_empty()))
            .then_some("Preencha todas as lacunas."),
            Answer::FillBlanksLabeled { blanks } => (blanks.is_empty()
                || blanks.values().any(|b| b.trim().is_empty()))
            .then_some("Preencha todas as lacunas."),
            Answer::Table { cells } => cells
                .iter()
                .flatten()
                .all(|c| c.trim().is_empty())
                .then_some("Preencha a tabela."),
            Answer::ColorRegions { regions } => {
                regions.is_empty().then_some("Pinte ao menos uma região.")
            }
        };

        match problem {
            Some(message) => Err(SubmitError::Validation(message.to_string())),
            None => Ok(()),
        }
    }

    /// Request body for the correction endpoint of this answer's type.
    pub fn body(&self, question_id: &str) -> Value {
        let mut body = match self {
            Answer::SingleChoice { letter } => json!({ "letra": letter }),
            Answer::TrueFalse { values } => json!({
                "respostas": values.iter().map(|v| v.unwrap_or(false)).collect::<Vec<bool>>()
            }),
            Answer::MultiSelect { selected } => json!({ "alternativaIds": selected }),
            Answer::ShortAnswer { text } => json!({ "resposta": text }),
            Answer::FreeText { text } => json!({ "texto": text }),
            Answer::QuickBlock { answers } => json!({ "respostas": answers }),
            Answer::MatchingColumns { pairs, column_b } => json!({
                "associacoes": pairs,
                "_colunaB": column_b,
            }),
            Answer::FillBlanks { blanks } => json!({ "lacunas": blanks }),
            Answer::FillBlanksLabeled { blanks } => json!({ "lacunas": blanks }),
            Answer::Table { cells } => json!({ "celulas": cells }),
            Answer::ColorRegions { regions } => json!({ "regioes": regions }),
        };
        body["questaoId"] = json!(question_id);
        body
    }
}
