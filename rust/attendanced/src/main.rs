mod catalog;
mod config;
mod identity;
mod ipc;
mod ledger;
mod navigation;
mod roster;
mod session;
mod store;
mod timer;

use serde_json::json;
use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use tracing::warn;
use tracing_subscriber::EnvFilter;

enum Event {
    Line(String),
    Expired(u64),
    Closed,
}

fn emit(out: &mut impl Write, value: &serde_json::Value) {
    let _ = writeln!(out, "{}", value);
    let _ = out.flush();
}

fn main() -> anyhow::Result<()> {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = config::Config::load()?;
    let inactivity = config.inactivity_timeout;
    let mut state = ipc::AppState::new(config);
    if let Some(path) = state.config.workspace.clone() {
        ipc::open_workspace(&mut state, &path)?;
    }

    let (tx, rx) = mpsc::channel();
    let lines = tx.clone();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if lines.send(Event::Line(line)).is_err() {
                return;
            }
        }
        let _ = lines.send(Event::Closed);
    });

    let expiries = tx.clone();
    let timer = timer::InactivityTimer::start(move |token| {
        let _ = expiries.send(Event::Expired(token));
    })?;
    let mut stdout = io::stdout();

    while let Ok(event) = rx.recv() {
        match event {
            Event::Closed => break,
            Event::Expired(token) => {
                if !timer.is_current(token) {
                    continue;
                }
                let expired = state
                    .session
                    .as_mut()
                    .map(|s| s.expire())
                    .unwrap_or(false);
                if expired {
                    emit(
                        &mut stdout,
                        &json!({
                            "event": "session.expired",
                            "message": format!(
                                "Session expired after {} seconds of inactivity.",
                                inactivity.as_secs()
                            ),
                            "at": chrono::Utc::now().to_rfc3339(),
                        }),
                    );
                }
            }
            Event::Line(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let resp = match serde_json::from_str::<ipc::Request>(&line) {
                    Ok(req) => ipc::handle_request(&mut state, req),
                    Err(e) => {
                        // Can't reply without id.
                        warn!("dropping malformed request: {e}");
                        json!({
                            "ok": false,
                            "error": { "code": "bad_json", "message": e.to_string() }
                        })
                    }
                };
                emit(&mut stdout, &resp);

                // Any request from the host counts as lecturer activity.
                if state.is_authenticated() {
                    timer.arm(inactivity);
                } else {
                    timer.cancel();
                }
            }
        }
    }

    Ok(())
}
