use serde::de::DeserializeOwned;
use serde_json::json;

use super::types::Request;

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

/// Required string param, or a ready `bad_params` response.
pub fn str_param(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    match req.params.get(key).and_then(|v| v.as_str()) {
        Some(v) => Ok(v.to_string()),
        None => Err(err(&req.id, "bad_params", format!("missing {key}"), None)),
    }
}

/// Required structured param decoded with serde.
pub fn obj_param<T: DeserializeOwned>(req: &Request, key: &str) -> Result<T, serde_json::Value> {
    let Some(v) = req.params.get(key) else {
        return Err(err(&req.id, "bad_params", format!("missing {key}"), None));
    };
    serde_json::from_value(v.clone()).map_err(|e| {
        err(
            &req.id,
            "bad_params",
            format!("invalid {key}: {e}"),
            Some(json!({ "param": key })),
        )
    })
}
