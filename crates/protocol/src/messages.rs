use std::fmt;
use std::str::FromStr;

use core_types::EmployeeRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::CodecError;

/// The four actions a client may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Update,
    Select,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert => "INSERT",
            Operation::Update => "UPDATE",
            Operation::Select => "SELECT",
            Operation::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(Operation::Insert),
            "UPDATE" => Ok(Operation::Update),
            "SELECT" => Ok(Operation::Select),
            "DELETE" => Ok(Operation::Delete),
            _ => Err(()),
        }
    }
}

/// A client request: `{"operation": "...", "data": {...}}`.
///
/// The operation stays as raw text and the payload as raw JSON at this layer.
/// An unknown tag is therefore not a decoding failure; it is answered by the
/// dispatcher, and the payload is only typed once the operation is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub operation: String,
    #[serde(default = "empty_object")]
    pub data: JsonValue,
}

impl Request {
    pub fn new(operation: Operation, data: &impl Serialize) -> Result<Self, CodecError> {
        let data =
            serde_json::to_value(data).map_err(|e| CodecError::Serialization(e.to_string()))?;
        Ok(Self {
            operation: operation.as_str().to_string(),
            data,
        })
    }

    /// The parsed operation tag, or `None` when it is not one of the four.
    pub fn operation(&self) -> Option<Operation> {
        self.operation.parse().ok()
    }
}

fn empty_object() -> JsonValue {
    JsonValue::Object(Default::default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// A server response. Which optional fields are set depends on the operation:
/// `id` after an insert, `rows_affected` after an update or deactivation,
/// `data` after a lookup, and `message` on errors (and as a human-readable
/// note on successful writes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<EmployeeRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<u64>,
}

impl Response {
    fn success() -> Self {
        Self {
            status: Status::Success,
            message: None,
            id: None,
            data: None,
            rows_affected: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.into()),
            ..Self::success()
        }
    }

    pub fn inserted(id: i64) -> Self {
        Self {
            message: Some("employee inserted".to_string()),
            id: Some(id),
            ..Self::success()
        }
    }

    pub fn updated(rows_affected: u64) -> Self {
        Self {
            message: Some("employee updated".to_string()),
            rows_affected: Some(rows_affected),
            ..Self::success()
        }
    }

    pub fn deactivated(rows_affected: u64) -> Self {
        Self {
            message: Some("employee deactivated".to_string()),
            rows_affected: Some(rows_affected),
            ..Self::success()
        }
    }

    pub fn records(records: Vec<EmployeeRecord>) -> Self {
        Self {
            data: Some(records),
            ..Self::success()
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
