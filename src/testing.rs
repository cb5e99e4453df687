use std::{cell::RefCell, collections::HashMap};

use serde_json::Value;

use crate::client::{ApiError, Transport};

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

enum Reply {
    Ok(Value),
    Fail(u16, Option<String>),
}

/// Answers from a canned table and remembers every call.
#[derive(Default)]
pub struct MockTransport {
    replies: RefCell<HashMap<String, Reply>>,
    calls: RefCell<Vec<Call>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, path: &str, body: Value) -> &Self {
        self.replies
            .borrow_mut()
            .insert(path.to_string(), Reply::Ok(body));
        self
    }

    pub fn fail(&self, path: &str, status: u16, message: Option<&str>) -> &Self {
        self.replies.borrow_mut().insert(
            path.to_string(),
            Reply::Fail(status, message.map(|m| m.to_string())),
        );
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn answer(&self, method: &'static str, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        self.calls.borrow_mut().push(Call {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });

        match self.replies.borrow().get(path) {
            Some(Reply::Ok(value)) => Ok(value.clone()),
            Some(Reply::Fail(status, message)) => Err(ApiError::Server {
                status: *status,
                message: message.clone(),
            }),
            None => Err(ApiError::Server {
                status: 404,
                message: None,
            }),
        }
    }
}

impl Transport for MockTransport {
    fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.answer("GET", path, None)
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.answer("POST", path, Some(body))
    }
}
