use crate::session::SessionError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        HandlerErr {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<SessionError> for HandlerErr {
    fn from(e: SessionError) -> Self {
        HandlerErr {
            code: e.code(),
            details: e.details(),
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for HandlerErr {
    fn from(e: serde_json::Error) -> Self {
        HandlerErr {
            code: "encode_failed",
            message: e.to_string(),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_keep_their_code_and_details() {
        let resp = HandlerErr::from(SessionError::Validation {
            message: "incomplete".to_string(),
            missing: vec!["fullName"],
        })
        .response("7");
        assert_eq!(resp["id"], "7");
        assert_eq!(resp["ok"], false);
        assert_eq!(resp["error"]["code"], "validation_failed");
        assert_eq!(resp["error"]["details"]["missing"], json!(["fullName"]));
    }

    #[test]
    fn serialization_failures_report_encode_failed() {
        let e = serde_json::from_str::<serde_json::Value>("{").expect_err("truncated");
        let resp = HandlerErr::from(e).response("8");
        assert_eq!(resp["error"]["code"], "encode_failed");
        assert!(resp["error"].get("details").is_none());
    }
}
