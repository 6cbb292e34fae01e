//! Response validators: pure boolean predicates over untrusted JSON.
//!
//! Each entity validator composes the entity's shape guard with format
//! checks, an optional expected-foreign-key equality check and
//! non-empty-after-trim checks on human-readable text. All checks are
//! AND'd; the first failing check short-circuits, reports a [`Finding`]
//! to the injected diagnostics sink and returns `false`. Boolean
//! validators never throw.
//!
//! Two terminal checks sit apart from the predicates:
//! [`assert_envelope`] and [`assert_response_time`] are hard assertions
//! meant for the top of a test, aborting via an error rather than
//! returning `false`.

use http::StatusCode;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::*;

use crate::{
    check, check_eq,
    diag::{Diagnostics, Finding, TracingDiagnostics},
    model::{Album, ApiResponse, Comment, Photo, Post, Todo},
};

/// Default ceiling for [`assert_response_time`].
pub const DEFAULT_RESPONSE_TIME_CEILING: Duration = Duration::from_millis(2000);

// Deliberately permissive: anything of the form x@y.z with no whitespace.
// Full RFC 5322 matching buys nothing when probing fixture data.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex must compile"));

/// Canonical email format check.
pub fn email_format(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// A string is URL-valid only if it parses and its scheme is http or
/// https. Malformed strings and other schemes both fail.
pub fn url_format(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Stateless validator with an injected diagnostics sink.
#[derive(Clone)]
pub struct Validator {
    diag: Arc<dyn Diagnostics>,
}

impl Default for Validator {
    fn default() -> Self {
        Validator::new()
    }
}

impl Validator {
    /// Validator reporting through `tracing`.
    pub fn new() -> Validator {
        Validator::with_diagnostics(Arc::new(TracingDiagnostics))
    }

    pub fn with_diagnostics(diag: Arc<dyn Diagnostics>) -> Validator {
        Validator { diag }
    }

    fn fail(&self, message: String) -> bool {
        self.diag.report(Finding::failure(message));
        false
    }

    /// Validate a comment: shape, email format, optional `postId`
    /// consistency, non-empty name and body.
    pub fn comment(&self, value: &Value, expected_post_id: Option<i64>) -> bool {
        let comment = match Comment::from_value(value) {
            Ok(comment) => comment,
            Err(e) => return self.fail(format!("comment shape mismatch: {e}: {value}")),
        };
        if !email_format(&comment.email) {
            return self.fail(format!(
                "comment {} has a malformed email: {:?}",
                comment.id, comment.email
            ));
        }
        if let Some(expected) = expected_post_id {
            if comment.post_id != expected {
                return self.fail(format!(
                    "comment {} references post {}, expected {expected}",
                    comment.id, comment.post_id
                ));
            }
        }
        if comment.name.trim().is_empty() {
            return self.fail(format!("comment {} has an empty name", comment.id));
        }
        if comment.body.trim().is_empty() {
            return self.fail(format!("comment {} has an empty body", comment.id));
        }
        true
    }

    /// Validate a photo: shape, both URLs http/https, optional `albumId`
    /// consistency, non-empty title.
    pub fn photo(&self, value: &Value, expected_album_id: Option<i64>) -> bool {
        let photo = match Photo::from_value(value) {
            Ok(photo) => photo,
            Err(e) => return self.fail(format!("photo shape mismatch: {e}: {value}")),
        };
        if !url_format(&photo.url) {
            return self.fail(format!("photo {} has a malformed url: {:?}", photo.id, photo.url));
        }
        if !url_format(&photo.thumbnail_url) {
            return self.fail(format!(
                "photo {} has a malformed thumbnailUrl: {:?}",
                photo.id, photo.thumbnail_url
            ));
        }
        if let Some(expected) = expected_album_id {
            if photo.album_id != expected {
                return self.fail(format!(
                    "photo {} references album {}, expected {expected}",
                    photo.id, photo.album_id
                ));
            }
        }
        if photo.title.trim().is_empty() {
            return self.fail(format!("photo {} has an empty title", photo.id));
        }
        true
    }

    /// Validate an album: shape, optional `userId` consistency, non-empty
    /// title.
    pub fn album(&self, value: &Value, expected_user_id: Option<i64>) -> bool {
        let album = match Album::from_value(value) {
            Ok(album) => album,
            Err(e) => return self.fail(format!("album shape mismatch: {e}: {value}")),
        };
        if let Some(expected) = expected_user_id {
            if album.user_id != expected {
                return self.fail(format!(
                    "album {} references user {}, expected {expected}",
                    album.id, album.user_id
                ));
            }
        }
        if album.title.trim().is_empty() {
            return self.fail(format!("album {} has an empty title", album.id));
        }
        true
    }

    /// Validate a todo: shape (including the strictly-boolean
    /// `completed`), optional `userId` consistency, non-empty title.
    pub fn todo(&self, value: &Value, expected_user_id: Option<i64>) -> bool {
        let todo = match Todo::from_value(value) {
            Ok(todo) => todo,
            Err(e) => return self.fail(format!("todo shape mismatch: {e}: {value}")),
        };
        if let Some(expected) = expected_user_id {
            if todo.user_id != expected {
                return self.fail(format!(
                    "todo {} references user {}, expected {expected}",
                    todo.id, todo.user_id
                ));
            }
        }
        if todo.title.trim().is_empty() {
            return self.fail(format!("todo {} has an empty title", todo.id));
        }
        true
    }

    /// Validate a post: shape, optional `userId` consistency, non-empty
    /// title and body.
    pub fn post(&self, value: &Value, expected_user_id: Option<i64>) -> bool {
        let post = match Post::from_value(value) {
            Ok(post) => post,
            Err(e) => return self.fail(format!("post shape mismatch: {e}: {value}")),
        };
        if let Some(expected) = expected_user_id {
            if post.user_id != expected {
                return self.fail(format!(
                    "post {} references user {}, expected {expected}",
                    post.id, post.user_id
                ));
            }
        }
        if post.title.trim().is_empty() {
            return self.fail(format!("post {} has an empty title", post.id));
        }
        if post.body.trim().is_empty() {
            return self.fail(format!("post {} has an empty body", post.id));
        }
        true
    }

    /// Validate every element of a collection envelope with `item`.
    ///
    /// Fails if the envelope has no data or the data is not an array. An
    /// empty array is vacuously valid (warned, item predicate never
    /// invoked). Otherwise the predicate runs in order and the first
    /// failing index short-circuits the rest.
    pub fn collection<F>(&self, response: &ApiResponse, item: F) -> bool
    where
        F: Fn(&Value) -> bool,
    {
        let Some(data) = response.data() else {
            return self.fail(format!(
                "expected a collection but the {} response carries an error payload",
                response.status
            ));
        };
        let Some(items) = data.as_array() else {
            return self.fail(format!("expected a JSON array, got: {data}"));
        };
        if items.is_empty() {
            warn!("empty collection, vacuously valid");
            self.diag
                .report(Finding::success("empty collection, vacuously valid"));
            return true;
        }
        for (index, value) in items.iter().enumerate() {
            if !item(value) {
                return self.fail(format!("collection item at index {index} failed validation"));
            }
        }
        true
    }
}

/// Hard assertion that `elapsed` is within `ceiling`. Terminates the test
/// via an error instead of returning a boolean.
pub fn assert_response_time(elapsed: Duration, ceiling: Duration) -> eyre::Result<()> {
    check!(
        elapsed <= ceiling,
        "response took {elapsed:?}, ceiling is {ceiling:?}"
    );
    Ok(())
}

/// Hard assertion on the envelope, meant for the top of a test: status
/// must equal `expected_status`; for 200 the payload must be the data
/// branch, for any other expected code the error branch. Headers are
/// carried by construction and need no separate check.
pub fn assert_envelope<T>(response: &ApiResponse<T>, expected_status: StatusCode) -> eyre::Result<()> {
    check_eq!(expected_status, response.status);
    if expected_status == StatusCode::OK {
        check!(
            response.data().is_some(),
            "expected a data payload for status 200"
        );
        check!(
            response.error().is_none(),
            "expected no error payload for status 200"
        );
    } else {
        check!(
            response.error().is_some(),
            "expected an error payload for status {expected_status}"
        );
        check!(
            response.data().is_none(),
            "expected no data payload for status {expected_status}"
        );
    }
    Ok(())
}
