use crate::ipc::error::HandlerErr;
use crate::ipc::params::{get_required_str, with_session};
use crate::ipc::types::{AppState, Request};
use crate::session::Session;
use serde_json::json;

fn attendance_open(session: &mut Session, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let sheet = session.attendance_sheet()?;
    Ok(serde_json::to_value(sheet)?)
}

fn attendance_toggle(session: &mut Session, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let marked = session.toggle_attendance(&student_id)?;
    Ok(json!({ "studentId": student_id, "marked": marked }))
}

fn attendance_commit(session: &mut Session, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let summary = session.commit_attendance()?;
    Ok(serde_json::to_value(summary)?)
}

fn attendance_ledger(session: &mut Session, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ledger = session.ledger()?;
    Ok(json!({ "ledger": ledger }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.open" => Some(with_session(state, req, attendance_open)),
        "attendance.toggle" => Some(with_session(state, req, attendance_toggle)),
        "attendance.commit" => Some(with_session(state, req, attendance_commit)),
        "attendance.ledger" => Some(with_session(state, req, attendance_ledger)),
        _ => None,
    }
}
