use std::{str::FromStr, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use super::player::SubmitError;
use crate::client::{ApiError, Transport};

/// Every question type the player knows how to collect and send for correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    SingleChoice,
    TrueFalse,
    MultiSelect,
    ShortAnswer,
    FreeText,
    QuickBlock,
    MatchingColumns,
    FillBlanks,
    FillBlanksLabeled,
    Table,
    ColorRegions,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 11] = [
        QuestionKind::SingleChoice,
        QuestionKind::TrueFalse,
        QuestionKind::MultiSelect,
        QuestionKind::ShortAnswer,
        QuestionKind::FreeText,
        QuestionKind::QuickBlock,
        QuestionKind::MatchingColumns,
        QuestionKind::FillBlanks,
        QuestionKind::FillBlanksLabeled,
        QuestionKind::Table,
        QuestionKind::ColorRegions,
    ];

    /// Type tag as sent by the server.
    pub fn tag(&self) -> &'static str {
        match self {
            QuestionKind::SingleChoice => "multipla_escolha",
            QuestionKind::TrueFalse => "verdadeiro_falso",
            QuestionKind::MultiSelect => "multipla_selecao",
            QuestionKind::ShortAnswer => "resposta_curta",
            QuestionKind::FreeText => "discursiva",
            QuestionKind::QuickBlock => "bloco_rapido",
            QuestionKind::MatchingColumns => "associacao_colunas",
            QuestionKind::FillBlanks => "lacunas",
            QuestionKind::FillBlanksLabeled => "lacunas_topo",
            QuestionKind::Table => "tabela",
            QuestionKind::ColorRegions => "colorir_regioes",
        }
    }

    /// Correction endpoint for one question of this kind.
    pub fn correction_path(&self, question_id: &str) -> String {
        format!(
            "/mobile/v1/qbank/questoes/{}/corrigir/{}",
            question_id,
            self.tag().replace('_', "-")
        )
    }
}

impl FromStr for QuestionKind {
    type Err = SubmitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| SubmitError::Unsupported(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,

    /// raw type tag; may name a type this client does not know
    #[serde(rename = "tipo")]
    pub kind_tag: String,

    #[serde(rename = "enunciado", default)]
    pub prompt: String,

    #[serde(rename = "midia", default)]
    pub media: Option<String>,

    /// type-specific structure, never carries the expected answer
    #[serde(rename = "conteudo", default)]
    pub content: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub id: String,
    pub letter: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnItem {
    pub id: String,
    pub text: String,
}

/// What the learner fills in, per question type.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSurface {
    Alternatives {
        alternatives: Vec<Alternative>,
        multiple: bool,
    },
    Statements(Vec<String>),
    TextBox {
        multiline: bool,
    },
    QuickBlock(Vec<String>),
    Columns {
        column_a: Vec<ColumnItem>,
        column_b: Vec<ColumnItem>,
    },
    Blanks {
        labels: Vec<String>,
        labeled: bool,
        word_bank: Vec<String>,
    },
    Table {
        rows: Vec<String>,
        columns: Vec<String>,
    },
    Regions {
        regions: Vec<String>,
        colors: Vec<String>,
    },
}

impl Question {
    pub fn kind(&self) -> Result<QuestionKind, SubmitError> {
        QuestionKind::from_str(&self.kind_tag)
    }

    /// Missing pieces of `conteudo` show up as empty lists.
    pub fn input_surface(&self) -> Result<InputSurface, SubmitError> {
        let c = &self.content;
        Ok(match self.kind()? {
            QuestionKind::SingleChoice => InputSurface::Alternatives {
                alternatives: alternatives(c),
                multiple: false,
            },
            QuestionKind::MultiSelect => InputSurface::Alternatives {
                alternatives: alternatives(c),
                multiple: true,
            },
            QuestionKind::TrueFalse => InputSurface::Statements(texts(c, "afirmacoes")),
            QuestionKind::ShortAnswer => InputSurface::TextBox { multiline: false },
            QuestionKind::FreeText => InputSurface::TextBox { multiline: true },
            QuestionKind::QuickBlock => InputSurface::QuickBlock(texts(c, "itens")),
            QuestionKind::MatchingColumns => InputSurface::Columns {
                column_a: column(c, "colunaA"),
                column_b: column(c, "colunaB"),
            },
            kind @ (QuestionKind::FillBlanks | QuestionKind::FillBlanksLabeled) => {
                InputSurface::Blanks {
                    labels: blank_labels(c.get("texto").and_then(|t| t.as_str()).unwrap_or("")),
                    labeled: kind == QuestionKind::FillBlanksLabeled,
                    word_bank: texts(c, "opcoes"),
                }
            }
            QuestionKind::Table => InputSurface::Table {
                rows: texts(c, "linhas"),
                columns: texts(c, "colunas"),
            },
            QuestionKind::ColorRegions => InputSurface::Regions {
                regions: texts(c, "regioes"),
                colors: texts(c, "cores"),
            },
        })
    }
}

pub fn get_questions(api: &dyn Transport, ids: &[&str]) -> Result<Vec<Question>, ApiError> {
    let body = api.post("/qbank/questoes/lote", &json!({ "questaoIds": ids }))?;
    let list = match body {
        Value::Object(mut map) if map.contains_key("questoes") => {
            map.remove("questoes").unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(list)?)
}

pub fn get_question(api: &dyn Transport, id: &str) -> Result<Question, ApiError> {
    let body = api.get(&format!("/mobile/v1/qbank/questoes/{}", id))?;
    Ok(serde_json::from_value(body)?)
}

pub(crate) fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "id must be a string or number, got {}",
            other
        ))),
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A list of plain strings, or of objects with `texto` (falling back to `id`).
fn texts(content: &Value, field: &str) -> Vec<String> {
    content
        .get(field)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    scalar(item)
                        .or_else(|| item.get("texto").and_then(scalar))
                        .or_else(|| item.get("id").and_then(scalar))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn alternatives(content: &Value) -> Vec<Alternative> {
    content
        .get("alternativas")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let letter = item.get("letra").and_then(scalar);
                    let id = item.get("id").and_then(scalar).or_else(|| letter.clone())?;
                    Some(Alternative {
                        id,
                        letter,
                        text: item.get("texto").and_then(scalar).unwrap_or_default(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn column(content: &Value, field: &str) -> Vec<ColumnItem> {
    content
        .get(field)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(ColumnItem {
                        id: item.get("id").and_then(scalar)?,
                        text: item.get("texto").and_then(scalar).unwrap_or_default(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Labels of the `{{label}}` markers in a fill-in-the-blanks text, in order.
fn blank_labels(text: &str) -> Vec<String> {
    static BLANK: OnceLock<Regex> = OnceLock::new();
    let blank = BLANK.get_or_init(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("valid regex"));

    blank
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}
