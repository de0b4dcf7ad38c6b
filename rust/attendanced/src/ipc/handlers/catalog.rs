use crate::catalog::COLLEGES;
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::params::with_session;
use crate::ipc::types::{AppState, Request};
use crate::session::Session;
use serde_json::json;

fn handle_colleges(req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "colleges": COLLEGES }))
}

fn levels(session: &mut Session, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "levels": session.levels()? }))
}

fn courses(session: &mut Session, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "courses": session.courses()? }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        // The catalog is static and readable before any workspace is open.
        "catalog.colleges" => Some(handle_colleges(req)),
        "catalog.levels" => Some(with_session(state, req, levels)),
        "catalog.courses" => Some(with_session(state, req, courses)),
        _ => None,
    }
}
