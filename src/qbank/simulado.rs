//! Mock exam lifecycle: eligibility, generation, taking and reviewing.
//!
//! Grading and question selection happen on the server; this module only
//! shapes requests and reads results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use super::{
    answer::Answer,
    player::SubmitError,
    question::{id_from_any, Question},
};
use crate::client::{ApiError, Transport};

const BASE: &str = "/mobile/v1/qbank/simulados";

#[derive(Error, Debug)]
pub enum SimuladoError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0}")]
    Distribution(String),

    #[error(transparent)]
    Answer(#[from] SubmitError),
}

impl SimuladoError {
    pub fn user_message(&self) -> String {
        match self {
            SimuladoError::Api(e) => e.user_message(),
            SimuladoError::Distribution(message) => message.clone(),
            SimuladoError::Answer(e) => e.user_message(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimuladoStatus {
    #[serde(rename = "nao_iniciado")]
    NotStarted,
    #[serde(rename = "em_andamento")]
    InProgress,
    #[serde(rename = "concluido")]
    Completed,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AvailabilityFilter {
    #[serde(rename = "banca", skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,

    #[serde(rename = "anos", skip_serializing_if = "Vec::is_empty")]
    pub years: Vec<u32>,

    #[serde(rename = "apenasNaoRespondidas")]
    pub unanswered_only: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubjectAvailability {
    #[serde(rename = "materiaId", deserialize_with = "id_from_any")]
    pub subject_id: String,

    #[serde(rename = "nome")]
    pub name: String,

    /// questions that can still be drawn for this subject
    #[serde(rename = "disponiveis")]
    pub available: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectQuota {
    #[serde(rename = "materiaId", deserialize_with = "id_from_any")]
    pub subject_id: String,

    #[serde(rename = "quantidade")]
    pub count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "tempoMinutos")]
    pub time_limit_minutes: u32,

    #[serde(rename = "distribuicao")]
    pub distribution: Vec<SubjectQuota>,

    #[serde(rename = "filtros")]
    pub filter: AvailabilityFilter,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Simulado {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,

    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "tempoMinutos", default)]
    pub time_limit_minutes: u32,

    #[serde(rename = "distribuicao", default)]
    pub distribution: Vec<SubjectQuota>,

    pub status: SimuladoStatus,

    #[serde(rename = "tempoRestante", default)]
    pub remaining_seconds: Option<u64>,

    #[serde(rename = "questoes", default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuestionOutcome {
    Correct,
    Incorrect,
    /// free-text answer still waiting for grading
    Pending,
    Graded(f64),
    Unanswered,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionResult {
    #[serde(rename = "questaoId", deserialize_with = "id_from_any")]
    pub question_id: String,

    #[serde(rename = "acertou", default)]
    pub correct: Option<bool>,

    #[serde(rename = "pendente", default)]
    pub pending: bool,

    #[serde(rename = "nota", default)]
    pub score: Option<f64>,
}

impl QuestionResult {
    pub fn outcome(&self) -> QuestionOutcome {
        if self.pending {
            return QuestionOutcome::Pending;
        }
        match (self.score, self.correct) {
            (Some(score), _) => QuestionOutcome::Graded(score),
            (None, Some(true)) => QuestionOutcome::Correct,
            (None, Some(false)) => QuestionOutcome::Incorrect,
            (None, None) => QuestionOutcome::Unanswered,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimuladoResult {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,

    pub status: SimuladoStatus,

    #[serde(rename = "nota", default)]
    pub score: Option<f64>,

    #[serde(rename = "questoes", default)]
    pub questions: Vec<QuestionResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSummary {
    pub correct: usize,
    pub incorrect: usize,
    pub pending: usize,
    pub graded: usize,
    pub unanswered: usize,
}

impl SimuladoResult {
    pub fn summary(&self) -> ResultSummary {
        let mut summary = ResultSummary::default();
        for question in &self.questions {
            match question.outcome() {
                QuestionOutcome::Correct => summary.correct += 1,
                QuestionOutcome::Incorrect => summary.incorrect += 1,
                QuestionOutcome::Pending => summary.pending += 1,
                QuestionOutcome::Graded(_) => summary.graded += 1,
                QuestionOutcome::Unanswered => summary.unanswered += 1,
            }
        }
        summary
    }

    pub fn has_pending(&self) -> bool {
        self.questions.iter().any(|q| q.pending)
    }
}

/// One question of a finished exam, with what the learner sent.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionReview {
    #[serde(rename = "questao")]
    pub question: Question,

    #[serde(rename = "resultado")]
    pub result: QuestionResult,

    #[serde(rename = "resposta", default)]
    pub given: Value,

    #[serde(rename = "comentario", default)]
    pub comment: Option<String>,
}

pub fn materias_disponiveis(
    api: &dyn Transport,
    filter: &AvailabilityFilter,
) -> Result<Vec<SubjectAvailability>, SimuladoError> {
    let body = api.post(
        &format!("{}/materias-disponiveis", BASE),
        &serde_json::to_value(filter).map_err(ApiError::from)?,
    )?;
    let list = match body {
        Value::Object(mut map) if map.contains_key("materias") => {
            map.remove("materias").unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(list).map_err(ApiError::from)?)
}

/// Checks a requested distribution against what is available.
pub fn validate_distribution(
    available: &[SubjectAvailability],
    distribution: &[SubjectQuota],
) -> Result<(), SimuladoError> {
    let by_subject: HashMap<&str, &SubjectAvailability> = available
        .iter()
        .map(|s| (s.subject_id.as_str(), s))
        .collect();

    let mut total: u64 = 0;
    for quota in distribution {
        let subject = by_subject.get(quota.subject_id.as_str()).ok_or_else(|| {
            SimuladoError::Distribution(format!(
                "Matéria {} não está disponível.",
                quota.subject_id
            ))
        })?;
        if quota.count > subject.available {
            return Err(SimuladoError::Distribution(format!(
                "{} tem apenas {} questões disponíveis.",
                subject.name, subject.available
            )));
        }
        total += u64::from(quota.count);
    }

    if total == 0 {
        return Err(SimuladoError::Distribution(
            "Escolha ao menos uma questão.".to_string(),
        ));
    }
    Ok(())
}

/// Validates the request locally, then asks the server to build the exam.
pub fn gerar(
    api: &dyn Transport,
    available: &[SubjectAvailability],
    request: &GenerateRequest,
) -> Result<Simulado, SimuladoError> {
    validate_distribution(available, &request.distribution)?;

    let body = api.post(
        &format!("{}/gerar", BASE),
        &serde_json::to_value(request).map_err(ApiError::from)?,
    )?;
    log::info!("generated simulado '{}'", request.name);
    Ok(serde_json::from_value(body).map_err(ApiError::from)?)
}

pub fn resumo(api: &dyn Transport, simulado_id: &str) -> Result<Simulado, SimuladoError> {
    let body = api.get(&format!("{}/{}", BASE, simulado_id))?;
    Ok(serde_json::from_value(body).map_err(ApiError::from)?)
}

/// Starts or resumes the exam.
pub fn iniciar(api: &dyn Transport, simulado_id: &str) -> Result<Simulado, SimuladoError> {
    let body = api.post(&format!("{}/{}/iniciar", BASE, simulado_id), &json!({}))?;
    Ok(serde_json::from_value(body).map_err(ApiError::from)?)
}

pub fn pausar(
    api: &dyn Transport,
    simulado_id: &str,
    remaining_seconds: u64,
) -> Result<(), SimuladoError> {
    api.post(
        &format!("{}/{}/pausar", BASE, simulado_id),
        &json!({ "tempoRestante": remaining_seconds }),
    )?;
    Ok(())
}

/// Sends one answer. Correction is deferred to the end of the exam.
pub fn responder(
    api: &dyn Transport,
    simulado_id: &str,
    question_id: &str,
    answer: &Answer,
) -> Result<(), SimuladoError> {
    answer.validate()?;
    let mut body = answer.body(question_id);
    body["tipo"] = json!(answer.kind().tag());

    api.post(&format!("{}/{}/responder", BASE, simulado_id), &body)?;
    Ok(())
}

/// Asks the server to grade free-text answers still pending.
pub fn avaliar_pendentes(
    api: &dyn Transport,
    simulado_id: &str,
) -> Result<SimuladoResult, SimuladoError> {
    let body = api.post(
        &format!("{}/{}/avaliar-pendentes", BASE, simulado_id),
        &json!({}),
    )?;
    Ok(serde_json::from_value(body).map_err(ApiError::from)?)
}

/// Creates a fresh attempt of the same exam.
pub fn refazer(api: &dyn Transport, simulado_id: &str) -> Result<Simulado, SimuladoError> {
    let body = api.post(&format!("{}/{}/refazer", BASE, simulado_id), &json!({}))?;
    Ok(serde_json::from_value(body).map_err(ApiError::from)?)
}

pub fn resultado(api: &dyn Transport, simulado_id: &str) -> Result<SimuladoResult, SimuladoError> {
    let body = api.get(&format!("{}/resultado/{}", BASE, simulado_id))?;
    Ok(serde_json::from_value(body).map_err(ApiError::from)?)
}

pub fn resultado_questao(
    api: &dyn Transport,
    simulado_id: &str,
    question_id: &str,
) -> Result<QuestionReview, SimuladoError> {
    let body = api.get(&format!("{}/{}/questoes/{}", BASE, simulado_id, question_id))?;
    Ok(serde_json::from_value(body).map_err(ApiError::from)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;

    fn available() -> Vec<SubjectAvailability> {
        serde_json::from_value(json!([
            {"materiaId": 1, "nome": "Português", "disponiveis": 10},
            {"materiaId": "2", "nome": "Matemática", "disponiveis": 3}
        ]))
        .unwrap()
    }

    fn quota(subject_id: &str, count: u32) -> SubjectQuota {
        SubjectQuota {
            subject_id: subject_id.to_string(),
            count,
        }
    }

    fn request(distribution: Vec<SubjectQuota>) -> GenerateRequest {
        GenerateRequest {
            name: "Revisão".to_string(),
            time_limit_minutes: 60,
            distribution,
            filter: AvailabilityFilter::default(),
        }
    }

    #[test]
    fn distribution_within_limits_passes() {
        assert!(validate_distribution(&available(), &[quota("1", 10), quota("2", 1)]).is_ok());
    }

    #[test]
    fn over_asking_unknown_or_empty_is_rejected() {
        let err = validate_distribution(&available(), &[quota("2", 4)]).unwrap_err();
        assert_eq!(err.user_message(), "Matemática tem apenas 3 questões disponíveis.");
        assert!(validate_distribution(&available(), &[quota("9", 1)]).is_err());
        assert!(validate_distribution(&available(), &[quota("1", 0)]).is_err());
    }

    #[test]
    fn huge_quotas_add_up_without_overflow() {
        let available: Vec<SubjectAvailability> = serde_json::from_value(json!([
            {"materiaId": 1, "nome": "Português", "disponiveis": u32::MAX},
            {"materiaId": 2, "nome": "Matemática", "disponiveis": u32::MAX}
        ]))
        .unwrap();

        let distribution = [quota("1", u32::MAX), quota("2", u32::MAX)];
        assert!(validate_distribution(&available, &distribution).is_ok());
    }

    #[test]
    fn invalid_request_is_not_sent() {
        let api = MockTransport::new();
        assert!(gerar(&api, &available(), &request(vec![quota("2", 5)])).is_err());
        assert!(api.calls().is_empty());
    }

    #[test]
    fn generate_posts_distribution() {
        let api = MockTransport::new();
        api.reply(
            "/mobile/v1/qbank/simulados/gerar",
            json!({"id": 5, "nome": "Revisão", "status": "nao_iniciado", "tempoMinutos": 60}),
        );

        let simulado = gerar(&api, &available(), &request(vec![quota("1", 2)])).unwrap();

        assert_eq!(simulado.id, "5");
        assert_eq!(simulado.status, SimuladoStatus::NotStarted);
        let body = api.calls()[0].body.clone().unwrap();
        assert_eq!(body["distribuicao"], json!([{"materiaId": "1", "quantidade": 2}]));
        assert_eq!(body["filtros"], json!({"apenasNaoRespondidas": false}));
    }

    #[test]
    fn answer_carries_type_tag() {
        let api = MockTransport::new();
        api.reply("/mobile/v1/qbank/simulados/5/responder", json!({}));

        responder(
            &api,
            "5",
            "q1",
            &Answer::SingleChoice {
                letter: Some("D".into()),
            },
        )
        .unwrap();

        assert_eq!(
            api.calls()[0].body,
            Some(json!({"questaoId": "q1", "letra": "D", "tipo": "multipla_escolha"}))
        );
    }

    #[test]
    fn result_summary_counts_outcomes() {
        let result: SimuladoResult = serde_json::from_value(json!({
            "id": "5",
            "status": "concluido",
            "questoes": [
                {"questaoId": "1", "acertou": true},
                {"questaoId": "2", "acertou": false},
                {"questaoId": "3", "pendente": true},
                {"questaoId": "4", "nota": 7.5},
                {"questaoId": "5"}
            ]
        }))
        .unwrap();

        assert_eq!(
            result.summary(),
            ResultSummary {
                correct: 1,
                incorrect: 1,
                pending: 1,
                graded: 1,
                unanswered: 1
            }
        );
        assert!(result.has_pending());
        assert_eq!(result.questions[3].outcome(), QuestionOutcome::Graded(7.5));
    }

    #[test]
    fn pause_sends_remaining_time() {
        let api = MockTransport::new();
        api.reply("/mobile/v1/qbank/simulados/5/pausar", json!({}));
        pausar(&api, "5", 1200).unwrap();
        assert_eq!(api.calls()[0].body, Some(json!({"tempoRestante": 1200})));
    }
}
