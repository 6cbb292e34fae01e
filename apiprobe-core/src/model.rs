//! Entity records returned by the API under test, plus the response
//! envelope the client wraps them in.
//!
//! The entities mirror the wire shape of the mock API's five nested
//! resources. Field names on the wire are camelCase. Each entity carries a
//! shape guard, `from_value`, which narrows an untrusted
//! `serde_json::Value` to the typed record: present fields, correct
//! primitive types, extra fields tolerated. Business rules (emptiness,
//! formats, foreign keys) are layered on by [`crate::validator`].

use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

macro_rules! shape_guard {
    ($($entity:ty),+) => {
        $(
            impl $entity {
                /// Narrow an untrusted JSON value to this entity. Fails with a
                /// descriptive serde error on a missing or wrong-typed field.
                pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
                    serde_json::from_value(value.clone())
                }
            }
        )+
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i64,
    pub album_id: i64,
    pub title: String,
    pub url: String,
    pub thumbnail_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
}

shape_guard!(Post, Comment, Album, Photo, Todo);

/// Error body returned by the API for non-2xx statuses. The mock server
/// sends `{"error": ...}` bags; arbitrary extra keys are kept rather than
/// dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Either branch of the envelope. Exactly one is populated; the HTTP
/// status range decides which, so "both set" and "neither set" are
/// unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    Data(T),
    Error(ApiError),
}

/// The wrapper every client call returns: the classified payload plus
/// status, headers and wall-clock elapsed time, always populated.
#[derive(Debug, Clone)]
pub struct ApiResponse<T = serde_json::Value> {
    pub payload: Payload<T>,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub elapsed: Duration,
}

impl<T> ApiResponse<T> {
    pub fn data(&self) -> Option<&T> {
        match &self.payload {
            Payload::Data(data) => Some(data),
            Payload::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match &self.payload {
            Payload::Data(_) => None,
            Payload::Error(error) => Some(error),
        }
    }

    /// Whether the status fell in [200, 300) and the payload is therefore
    /// the `Data` branch.
    pub fn is_success(&self) -> bool {
        matches!(self.payload, Payload::Data(_))
    }
}
