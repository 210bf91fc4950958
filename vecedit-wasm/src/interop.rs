use js_sys::Uint32Array;
use serde::de::DeserializeOwned;
use serde::Serialize;
use vecedit::NodeId;
use wasm_bindgen::JsValue;

/// Plain JS objects rather than `Map`s, so records read like parsed JSON.
pub fn to_js<T: Serialize + ?Sized>(v: &T) -> Result<JsValue, JsValue> {
    v.serialize(&serde_wasm_bindgen::Serializer::json_compatible()).map_err(JsValue::from)
}

pub fn from_js<T: DeserializeOwned>(v: JsValue) -> Result<T, String> {
    let json: serde_json::Value = serde_wasm_bindgen::from_value(v).map_err(|e| e.to_string())?;
    serde_json::from_value(json).map_err(|e| e.to_string())
}

/// Scene ids always fit in u32; see [`crate::js_id`].
pub fn ids_to_js(ids: &[NodeId]) -> Uint32Array {
    let raw: Vec<u32> = ids.iter().filter_map(|id| crate::js_id(*id).ok()).collect();
    Uint32Array::from(&raw[..])
}

pub fn ids_from_js(ids: &Uint32Array) -> Vec<NodeId> {
    ids.to_vec().into_iter().map(|id| NodeId(u64::from(id))).collect()
}
