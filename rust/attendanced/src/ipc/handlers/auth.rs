use crate::identity::Identity;
use crate::ipc::error::HandlerErr;
use crate::ipc::params::{get_str_or_empty, with_session};
use crate::ipc::types::{AppState, Request};
use crate::session::Session;
use serde_json::json;

fn identity_json(identity: &Identity) -> serde_json::Value {
    // The passphrase never leaves the store.
    json!({
        "username": identity.username,
        "fullName": identity.full_name,
    })
}

pub fn session_json(session: &Session) -> serde_json::Value {
    json!({
        "screen": session.screen(),
        "authenticated": session.is_authenticated(),
        "user": session.user().map(identity_json),
        "sessionId": session.session_id().map(|id| id.to_string()),
        "selections": session.nav().selections(),
    })
}

fn auth_register(session: &mut Session, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let full_name = get_str_or_empty(params, "fullName")?;
    let course_code = get_str_or_empty(params, "courseCode")?;
    let passphrase = get_str_or_empty(params, "passphrase")?;
    session.register(&full_name, &course_code, &passphrase)?;
    Ok(session_json(session))
}

fn auth_login(session: &mut Session, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let course_code = get_str_or_empty(params, "courseCode")?;
    let passphrase = get_str_or_empty(params, "passphrase")?;
    session.login(&course_code, &passphrase)?;
    Ok(session_json(session))
}

fn auth_logout(session: &mut Session, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let was_signed_in = session.logout();
    Ok(json!({ "loggedOut": was_signed_in, "screen": session.screen() }))
}

fn auth_toggle_mode(session: &mut Session, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let screen = session.toggle_auth_mode()?;
    Ok(json!({ "screen": screen }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.register" => Some(with_session(state, req, auth_register)),
        "auth.login" => Some(with_session(state, req, auth_login)),
        "auth.logout" => Some(with_session(state, req, auth_logout)),
        "auth.toggleMode" => Some(with_session(state, req, auth_toggle_mode)),
        // Activity itself is handled by the host loop re-arming the timer.
        "session.activity" | "session.state" => {
            Some(with_session(state, req, |session, _| Ok(session_json(session))))
        }
        _ => None,
    }
}
