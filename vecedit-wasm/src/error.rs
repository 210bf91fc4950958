use crate::interop::to_js;
use js_sys::{Object, Reflect};
use serde::Serialize;
use serde_json::{json, Value};
use vecedit::EditError;
use wasm_bindgen::JsValue;

#[derive(Serialize)]
struct Failure<'a> {
    ok: bool,
    error: Detail<'a>,
}

#[derive(Serialize)]
struct Detail<'a> {
    code: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// `{ ok: true, value }`. `value` is attached as-is, so typed arrays survive.
pub fn ok(value: JsValue) -> JsValue {
    let envelope = Object::new();
    let _ = Reflect::set(&envelope, &"ok".into(), &JsValue::TRUE);
    let _ = Reflect::set(&envelope, &"value".into(), &value);
    envelope.into()
}

fn fail(code: &str, message: impl Into<String>, data: Option<Value>) -> JsValue {
    let body = Failure { ok: false, error: Detail { code, message: message.into(), data } };
    to_js(&body).unwrap_or(JsValue::NULL)
}

/// Envelope for the first non-finite `(name, value)` pair.
pub fn check_finite(params: &[(&str, f64)]) -> Option<JsValue> {
    params.iter().find(|(_, v)| !v.is_finite()).map(|(name, _)| {
        fail("non_finite", format!("parameter '{name}' must be finite"), Some(json!({ "param": name })))
    })
}

pub fn invalid_id(id: u32) -> JsValue {
    fail("invalid_id", "no node with this id", Some(json!({ "id": id })))
}

pub fn no_gesture() -> JsValue { fail("no_gesture", "no gesture in progress", None) }

pub fn json(message: impl Into<String>) -> JsValue { fail("json", message, None) }

/// Stable code for each core error.
pub fn from_edit(e: &EditError) -> JsValue {
    let (code, data) = match e {
        EditError::NodeNotFound(id) => ("invalid_id", Some(json!({ "id": id }))),
        EditError::DuplicateNode(id) => ("duplicate_id", Some(json!({ "id": id }))),
        EditError::UnknownHandle(h) => ("unknown_handle", Some(json!({ "handle": h }))),
        EditError::UnsupportedHandle { handle, kind } => {
            ("unsupported_handle", Some(json!({ "handle": handle, "kind": kind })))
        }
        EditError::KindMismatch { id, expected } => ("kind_mismatch", Some(json!({ "id": id, "expected": expected }))),
        EditError::Limit(_) => ("limit", None),
        EditError::Json(_) => ("json", None),
    };
    fail(code, e.to_string(), data)
}

pub fn wrap(r: vecedit::Result<JsValue>) -> JsValue {
    match r {
        Ok(v) => ok(v),
        Err(e) => from_edit(&e),
    }
}
