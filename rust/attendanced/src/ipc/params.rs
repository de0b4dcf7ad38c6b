use crate::ipc::error::{err, ok, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::session::Session;

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

/// Like `get_required_str`, but a present-and-empty value is passed through
/// so the session can report it as a validation failure.
pub fn get_str_or_empty(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(v) => v
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a string", key))),
    }
}

pub fn get_optional_str(params: &serde_json::Value, key: &str) -> Result<Option<String>, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a string or null", key))),
    }
}

pub fn get_required_u16(params: &serde_json::Value, key: &str) -> Result<u16, HandlerErr> {
    let v = params
        .get(key)
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))?;
    let n = match v {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().trim_end_matches(['L', 'l']).parse::<u64>().ok(),
        _ => None,
    };
    n.and_then(|n| u16::try_from(n).ok())
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a positive integer", key)))
}

/// Runs `f` against the open session, or answers `no_workspace`.
pub fn with_session<F>(state: &mut AppState, req: &Request, f: F) -> serde_json::Value
where
    F: FnOnce(&mut Session, &serde_json::Value) -> Result<serde_json::Value, HandlerErr>,
{
    let Some(session) = state.session.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match f(session, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}
