use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::session::{Session, SessionOptions};
use crate::store;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;

/// Opens (or creates) the workspace store and starts a fresh session at the
/// login screen. Any previous session is dropped.
pub fn open_workspace(state: &mut AppState, path: &Path) -> anyhow::Result<()> {
    let kv = store::open_store(path)?;
    let options = SessionOptions {
        save_delay: state.config.save_delay,
        roster_seed: state.config.roster_seed,
    };
    state.session = Some(Session::new(Box::new(kv), options));
    state.workspace = Some(path.to_path_buf());
    info!(workspace = %path.display(), "workspace selected");
    Ok(())
}

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "authenticated": state.is_authenticated(),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match open_workspace(state, &path) {
        Ok(()) => ok(&req.id, json!({ "workspacePath": path.to_string_lossy() })),
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
