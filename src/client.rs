use serde_json::Value;
use thiserror::Error;

use crate::{config::Config, GENERIC_FAILURE};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] Box<ureq::Error>),

    #[error("Failed to read response body: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server returned an error: {status}")]
    Server { status: u16, message: Option<String> },

    #[error("Server rejected the request: {0}")]
    Business(String),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Text fit to show in an alert.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Business(message) => message.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Everything a service function needs from the network.
///
/// Paths are relative to the api root (`/mobile/v1/...`). Bodies wrapped as
/// `{"data": ...}` come back already unwrapped.
pub trait Transport {
    fn get(&self, path: &str) -> Result<Value, ApiError>;

    fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError>;
}

pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_url, config.token.clone())
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let request = self
            .agent
            .request(method, &format!("{}{}", self.base_url, path))
            .set("Accept", "application/json");

        match &self.token {
            Some(token) => request.set("Authorization", &format!("Bearer {}", token)),
            None => request,
        }
    }

    fn finish(
        &self,
        path: &str,
        result: Result<ureq::Response, ureq::Error>,
    ) -> Result<Value, ApiError> {
        let response = result.map_err(|e| match e {
            ureq::Error::Status(status, response) => {
                let message = read_body(response).ok().and_then(|b| error_message(&b));
                log::debug!("{} answered {}: {:?}", path, status, message);
                ApiError::Server { status, message }
            }
            other => ApiError::Http(Box::new(other)),
        })?;

        let body = read_body(response)?;
        if let Some(message) = error_message(&body) {
            return Err(ApiError::Business(message));
        }

        Ok(unwrap_data(body))
    }
}

impl Transport for ApiClient {
    fn get(&self, path: &str) -> Result<Value, ApiError> {
        log::debug!("GET {}", path);
        self.finish(path, self.request("GET", path).call())
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        log::debug!("POST {}", path);
        self.finish(path, self.request("POST", path).send_json(body))
    }
}

fn read_body(response: ureq::Response) -> Result<Value, ApiError> {
    let text = response.into_string()?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

/// Pulls the structured error text out of a response body, if there is one.
pub(crate) fn error_message(body: &Value) -> Option<String> {
    match body.get("error") {
        Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.clone()),
        Some(Value::Object(o)) => {
            if let Some(Value::String(s)) = o.get("message") {
                return Some(s.clone());
            }
        }
        _ => {}
    }

    if body.get("success") == Some(&Value::Bool(false)) {
        return body
            .get("message")
            .and_then(|m| m.as_str())
            .map(|m| m.to_string())
            .or_else(|| Some(GENERIC_FAILURE.to_string()));
    }

    None
}

pub(crate) fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
