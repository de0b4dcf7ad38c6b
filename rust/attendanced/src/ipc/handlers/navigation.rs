use crate::ipc::error::HandlerErr;
use crate::ipc::handlers::auth::session_json;
use crate::ipc::params::{get_optional_str, get_required_str, get_required_u16, with_session};
use crate::ipc::types::{AppState, Request};
use crate::session::Session;

fn select_college(session: &mut Session, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let college_id = get_required_str(params, "collegeId")?;
    session.select_college(&college_id)?;
    Ok(session_json(session))
}

fn select_department(session: &mut Session, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let department_id = get_required_str(params, "departmentId")?;
    let sub_department = get_optional_str(params, "subDepartment")?;
    session.select_department(&department_id, sub_department.as_deref())?;
    Ok(session_json(session))
}

fn select_level(session: &mut Session, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let level = get_required_u16(params, "level")?;
    session.select_level(level)?;
    Ok(session_json(session))
}

fn select_course(session: &mut Session, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let course_id = get_required_str(params, "courseId")?;
    session.select_course(&course_id)?;
    Ok(session_json(session))
}

fn go_back(session: &mut Session, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    session.go_back();
    Ok(session_json(session))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "nav.selectCollege" => Some(with_session(state, req, select_college)),
        "nav.selectDepartment" => Some(with_session(state, req, select_department)),
        "nav.selectLevel" => Some(with_session(state, req, select_level)),
        "nav.selectCourse" => Some(with_session(state, req, select_course)),
        "nav.back" => Some(with_session(state, req, go_back)),
        _ => None,
    }
}
