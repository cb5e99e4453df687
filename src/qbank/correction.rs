use serde_json::Value;

use super::player::SubmitError;

/// Server verdict on one answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Correction {
    Objective {
        correct: bool,
        explanation: Option<String>,
    },
    /// free-text answers graded on a 0 to 10 scale
    Graded {
        score: f64,
        justification: Option<String>,
        suggestion: Option<String>,
    },
}

impl Correction {
    /// Reads the verdict by the shape of the response, whatever type was asked.
    pub fn from_response(body: &Value) -> Result<Correction, SubmitError> {
        let text = |field: &str| {
            body.get(field)
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.to_string())
        };

        if let Some(score) = body.get("nota").and_then(|n| n.as_f64()) {
            return Ok(Correction::Graded {
                score: score.clamp(0.0, 10.0),
                justification: text("justificativa"),
                suggestion: text("sugestao"),
            });
        }

        if let Some(correct) = body.get("acertou").and_then(|a| a.as_bool()) {
            return Ok(Correction::Objective {
                correct,
                explanation: text("explicacao"),
            });
        }

        Err(SubmitError::UnexpectedResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objective_shape() {
        assert_eq!(
            Correction::from_response(&json!({"acertou": false})).unwrap(),
            Correction::Objective {
                correct: false,
                explanation: None
            }
        );
    }

    #[test]
    fn graded_shape_wins_and_is_clamped() {
        let body = json!({"nota": 11.5, "justificativa": "Ótimo", "sugestao": "", "acertou": true});
        assert_eq!(
            Correction::from_response(&body).unwrap(),
            Correction::Graded {
                score: 10.0,
                justification: Some("Ótimo".to_string()),
                suggestion: None,
            }
        );
    }

    #[test]
    fn unknown_shape_is_an_error() {
        assert!(matches!(
            Correction::from_response(&json!({"ok": true})),
            Err(SubmitError::UnexpectedResponse)
        ));
    }
}
