use crate::session::SessionError;
use crate::store::{KvStore, IDENTITY_KEY};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// The single registered lecturer. `username` is the course code they lecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub username: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

pub fn normalize_course_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub fn load(store: &dyn KvStore) -> Option<Identity> {
    let raw = match store.load(IDENTITY_KEY) {
        Ok(v) => v?,
        Err(e) => {
            warn!("identity read failed, treating as unregistered: {e:#}");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(identity) => Some(identity),
        Err(e) => {
            warn!("identity record is corrupt, treating as unregistered: {e}");
            None
        }
    }
}

pub fn register(
    store: &mut dyn KvStore,
    full_name: &str,
    course_code: &str,
    passphrase: &str,
) -> Result<Identity, SessionError> {
    let mut missing = Vec::new();
    if full_name.trim().is_empty() {
        missing.push("fullName");
    }
    if course_code.trim().is_empty() {
        missing.push("courseCode");
    }
    if passphrase.is_empty() {
        missing.push("passphrase");
    }
    if !missing.is_empty() {
        return Err(SessionError::Validation {
            message: "Registration incomplete. Provide your full name, the course code you are lecturing, and a security key.".to_string(),
            missing,
        });
    }

    let identity = Identity {
        username: normalize_course_code(course_code),
        full_name: full_name.to_string(),
        password: Some(passphrase.to_string()),
    };
    let blob = serde_json::to_string(&identity).map_err(anyhow::Error::from)?;
    store.save(IDENTITY_KEY, &blob)?;
    info!(username = %identity.username, "lecturer registered");
    Ok(identity)
}

pub fn authenticate(
    store: &dyn KvStore,
    course_code: &str,
    passphrase: &str,
) -> Result<Identity, SessionError> {
    let Some(identity) = load(store) else {
        return Err(SessionError::NoIdentity);
    };
    let code_matches =
        normalize_course_code(&identity.username) == normalize_course_code(course_code);
    let pass_matches = identity.password.as_deref() == Some(passphrase);
    if code_matches && pass_matches {
        Ok(identity)
    } else {
        Err(SessionError::AuthFailed)
    }
}
