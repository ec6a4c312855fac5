//! Helpdesk Chat Composer Core
//!
//! Text logic behind the team-chat input of the helpdesk app:
//! - Tokenizing messages into plain text, `@` mentions and `#` ticket links
//! - Autocomplete suggestions while a trigger is being typed
//! - Splicing a picked suggestion back into the text
//! - Preparing the send payload and the mention notifications
//!
//! The UI talks to it through the JSON-in/JSON-out C functions below.

pub mod config;
pub mod cursor;
pub mod directory;
pub mod error;
pub mod insert;
pub mod mentions;
pub mod message;
pub mod notify;
pub mod suggest;

use config::ComposeConfig;
use directory::Directory;
use error::{ComposeError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::Once;
use suggest::Candidate;

static LOGGING: Once = Once::new();

/// Install the fmt subscriber, filtered by `DESKCHAT_LOG` (default `warn`).
/// Safe to call repeatedly; only the first call has an effect.
pub fn init_logging() {
    LOGGING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_env("DESKCHAT_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    });
}

#[derive(Deserialize)]
struct TokenizeRequest {
    content: String,
    #[serde(default)]
    directory: Directory,
}

#[derive(Deserialize)]
struct SuggestRequest {
    text: String,
    cursor: usize,
    #[serde(default)]
    directory: Directory,
}

#[derive(Deserialize)]
struct InsertRequest {
    text: String,
    cursor: usize,
    selected: Candidate,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrepareRequest {
    channel_id: String,
    content: String,
    #[serde(default)]
    directory: Directory,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotifyRequest {
    message: message::OutgoingMessage,
    message_id: String,
    sender: notify::Sender,
    #[serde(default)]
    channel_name: Option<String>,
    #[serde(default)]
    directory: Directory,
}

fn read_request<T: DeserializeOwned>(ptr: *const c_char) -> Result<T> {
    if ptr.is_null() {
        return Err(ComposeError::NullPointer);
    }
    let raw = unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| ComposeError::InvalidUtf8)?;
    serde_json::from_str(raw).map_err(ComposeError::InvalidRequest)
}

fn error_json(e: &ComposeError) -> String {
    json!({
        "error": {
            "type": e.kind(),
            "message": e.to_string()
        }
    })
    .to_string()
}

/// Decode, run, encode. Never unwinds across the boundary.
fn respond<T, R, F>(ptr: *const c_char, handler: F) -> *mut c_char
where
    T: DeserializeOwned,
    R: Serialize,
    F: FnOnce(T) -> Result<R>,
{
    init_logging();

    let body = match read_request::<T>(ptr).and_then(handler) {
        Ok(value) => serde_json::to_string(&value)
            .unwrap_or_else(|e| error_json(&ComposeError::InvalidRequest(e))),
        Err(e) => {
            tracing::warn!(error = %e, "composer request rejected");
            error_json(&e)
        }
    };

    // serde_json escapes control chars, so interior NULs cannot appear
    CString::new(body).map_or(std::ptr::null_mut(), CString::into_raw)
}

fn global_config() -> &'static ComposeConfig {
    &*config::GLOBAL
}

/// Tokenize a message for rendering.
///
/// Request: `{"content": str, "directory": {...}}`; response: token array.
#[no_mangle]
pub extern "C" fn deskchat_tokenize(request: *const c_char) -> *mut c_char {
    respond(request, |req: TokenizeRequest| {
        let directory = req.directory.normalized();
        Ok(mentions::tokenize(&req.content, &directory))
    })
}

/// Compute autocomplete suggestions for the current text and cursor.
#[no_mangle]
pub extern "C" fn deskchat_suggest(request: *const c_char) -> *mut c_char {
    respond(request, |req: SuggestRequest| {
        let directory = req.directory.normalized();
        Ok(suggest::suggest(
            &req.text,
            req.cursor,
            &directory,
            global_config(),
            &mut rand::thread_rng(),
        ))
    })
}

/// Insert the selected suggestion at the open trigger.
#[no_mangle]
pub extern "C" fn deskchat_insert(request: *const c_char) -> *mut c_char {
    respond(request, |req: InsertRequest| {
        Ok(insert::insert_suggestion(&req.text, req.cursor, &req.selected))
    })
}

/// Validate a message and resolve the ids to submit with it.
#[no_mangle]
pub extern "C" fn deskchat_prepare_message(request: *const c_char) -> *mut c_char {
    respond(request, |req: PrepareRequest| {
        let directory = req.directory.normalized();
        message::prepare_message(&req.channel_id, &req.content, &directory)
    })
}

/// Build the mention notifications for a message that has been stored.
#[no_mangle]
pub extern "C" fn deskchat_mention_notifications(request: *const c_char) -> *mut c_char {
    respond(request, |req: NotifyRequest| {
        let directory = req.directory.normalized();
        Ok(notify::mention_notifications(
            &req.message,
            &req.message_id,
            &req.sender,
            req.channel_name.as_deref(),
            &directory,
            global_config().preview_chars,
        ))
    })
}

/// Free a string returned by any `deskchat_*` function
///
/// Call this from the host after reading the string to prevent memory leaks
#[no_mangle]
pub extern "C" fn deskchat_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: extern "C" fn(*const c_char) -> *mut c_char, request: &str) -> serde_json::Value {
        let input = CString::new(request).unwrap();
        let result = f(input.as_ptr());
        assert!(!result.is_null());

        let c_str = unsafe { CStr::from_ptr(result) };
        let value = serde_json::from_str(c_str.to_str().unwrap()).unwrap();
        deskchat_free_string(result);
        value
    }

    #[test]
    fn test_null_request_reports_error() {
        let result = deskchat_tokenize(std::ptr::null());
        let c_str = unsafe { CStr::from_ptr(result) };
        let value: serde_json::Value = serde_json::from_str(c_str.to_str().unwrap()).unwrap();
        assert_eq!(value["error"]["type"], "null_pointer");
        deskchat_free_string(result);
    }

    #[test]
    fn test_malformed_json_reports_error() {
        let value = call(deskchat_suggest, "{\"text\": 1}");
        assert_eq!(value["error"]["type"], "invalid_request");
    }

    #[test]
    fn test_tokenize_roundtrip() {
        let value = call(
            deskchat_tokenize,
            r#"{"content": "hi @Bob", "directory": {"users": [{"id": "u9", "name": "Bob"}]}}"#,
        );
        assert_eq!(value[1]["kind"], "user_mention");
        assert_eq!(value[1]["user_id"], "u9");
        assert_eq!(value[1]["span"]["start"], 3);
    }

    #[test]
    fn test_inactive_users_are_not_resolved() {
        let value = call(
            deskchat_tokenize,
            r#"{"content": "@Bob", "directory": {"users": [{"id": "u9", "name": "Bob", "isActive": false}]}}"#,
        );
        assert_eq!(value[0]["kind"], "unresolved_mention");
    }
}
