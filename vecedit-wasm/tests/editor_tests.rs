use js_sys::{Reflect, Uint32Array};
use serde::Deserialize;
use vecedit_wasm::Editor;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn is_err(v: &JsValue, code: &str) -> bool {
    if let Ok(ok) =
        Reflect::get(v, &JsValue::from_str("ok")).and_then(|x| x.as_bool().ok_or(JsValue::NULL))
    {
        if ok {
            return false;
        }
        if let Ok(err) = Reflect::get(v, &JsValue::from_str("error")) {
            if let Ok(c) = Reflect::get(&err, &JsValue::from_str("code")) {
                return c.as_string().is_some_and(|s| s == code);
            }
        }
    }
    false
}

fn value(v: &JsValue) -> JsValue {
    assert_eq!(Reflect::get(v, &JsValue::from_str("ok")).unwrap().as_bool(), Some(true), "not ok");
    Reflect::get(v, &JsValue::from_str("value")).unwrap()
}

fn id_of(v: &JsValue) -> u32 {
    value(v).as_f64().unwrap() as u32
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Bbox {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

fn bbox(ed: &Editor, id: u32) -> Bbox {
    serde_wasm_bindgen::from_value(value(&ed.get_bbox_res(id, false))).unwrap()
}

#[wasm_bindgen_test]
fn create_query_and_undo() {
    let mut ed = Editor::new();
    let a = id_of(&ed.add_rect_res(10.0, 10.0, 100.0, 50.0));
    assert_eq!(bbox(&ed, a), Bbox { min_x: 10.0, min_y: 10.0, max_x: 110.0, max_y: 60.0 });
    assert_eq!(ed.pick(50.0, 30.0), Some(a));
    assert_eq!(ed.pick(500.0, 30.0), None);

    let ids = Uint32Array::from(&[a][..]);
    assert!(value(&ed.move_nodes_res(&ids, 5.0, -5.0)).as_bool().unwrap());
    assert_eq!(bbox(&ed, a).min_x, 15.0);
    assert!(ed.undo());
    assert_eq!(bbox(&ed, a).min_x, 10.0);
    assert!(ed.undo());
    assert_eq!(ed.node_count(), 0);
    assert!(ed.redo());
    assert_eq!(ed.node_count(), 1);
}

#[wasm_bindgen_test]
fn typed_errors_leave_state_alone() {
    let mut ed = Editor::new();
    let a = id_of(&ed.add_rect_res(0.0, 0.0, 10.0, 10.0));
    let before = js_sys::JSON::stringify(&ed.to_json()).unwrap();

    let nan = ed.add_rect_res(f64::NAN, 0.0, 1.0, 1.0);
    assert!(is_err(&nan, "non_finite"));
    let detail = Reflect::get(&nan, &JsValue::from_str("error")).unwrap();
    let data = Reflect::get(&detail, &JsValue::from_str("data")).unwrap();
    assert_eq!(Reflect::get(&data, &JsValue::from_str("param")).unwrap().as_string().as_deref(), Some("x"));
    assert!(is_err(&ed.rotate_res(999, 1.0), "invalid_id"));
    assert!(is_err(&ed.get_bbox_res(999, true), "invalid_id"));
    assert!(is_err(&ed.add_seg_res(a, 0, 1.0, 1.0), "kind_mismatch"));
    assert!(is_err(&ed.resize_to_res("se", 1.0, 1.0, false, false), "no_gesture"));
    ed.begin_gesture_res(a);
    assert!(is_err(&ed.resize_to_res("middle", 1.0, 1.0, false, false), "unknown_handle"));
    ed.cancel_gesture();
    assert!(is_err(&ed.update_attrs_res(a, JsValue::from_str("nope")), "json"));

    let after = js_sys::JSON::stringify(&ed.to_json()).unwrap();
    assert_eq!(before, after);
}

#[wasm_bindgen_test]
fn update_attrs_records_patch() {
    let mut ed = Editor::new();
    let a = id_of(&ed.add_rect_res(0.0, 0.0, 10.0, 10.0));
    let patch = js_sys::JSON::parse(r#"{"width": 40, "visible": false, "opacity": 0.5}"#).unwrap();
    assert!(value(&ed.update_attrs_res(a, patch)).as_bool().unwrap());
    assert_eq!(bbox(&ed, a).max_x, 40.0);
    // hidden nodes are not picked
    assert_eq!(ed.pick(5.0, 5.0), None);
    ed.undo();
    assert_eq!(ed.pick(5.0, 5.0), Some(a));
}

#[wasm_bindgen_test]
fn gesture_is_one_undo_step() {
    let mut ed = Editor::new();
    let a = id_of(&ed.add_rect_res(0.0, 0.0, 100.0, 50.0));
    value(&ed.begin_gesture_res(a));
    value(&ed.resize_to_res("se", 120.0, 60.0, false, false));
    value(&ed.resize_to_res("se", 150.0, 80.0, false, false));
    assert!(value(&ed.end_gesture_res("resize")).as_bool().unwrap());
    assert_eq!(bbox(&ed, a), Bbox { min_x: 0.0, min_y: 0.0, max_x: 150.0, max_y: 80.0 });

    ed.undo();
    assert_eq!(bbox(&ed, a), Bbox { min_x: 0.0, min_y: 0.0, max_x: 100.0, max_y: 50.0 });
    assert_eq!(ed.node_count(), 1);
}

#[wasm_bindgen_test]
fn path_drawing_with_hooks() {
    let mut ed = Editor::new();
    let p = id_of(&ed.add_path_res(1.0));
    value(&ed.begin_path_draw_res(p));
    value(&ed.add_seg_res(p, 0, 10.0, 10.0));
    value(&ed.add_seg_res(p, 0, 60.0, 10.0));
    value(&ed.drag_out_handle_res(p, 0, 1, 5.0, 5.0, false));
    assert!(ed.is_near_start_anchor(p, 0, 11.0, 11.0, 4.0));
    assert!(value(&ed.close_path_res(p, 0)).as_bool().unwrap());
    ed.end_path_draw();

    #[derive(Deserialize)]
    struct Seg {
        point: Pt,
        #[serde(rename = "in")]
        handle_in: Pt,
    }
    #[derive(Deserialize)]
    struct Pt {
        x: f64,
        y: f64,
    }
    let s: Seg = serde_wasm_bindgen::from_value(value(&ed.get_seg_res(p, 0, 1))).unwrap();
    assert!((s.point.x - 60.0).abs() < 1e-9 && (s.point.y - 10.0).abs() < 1e-9);
    assert_eq!((s.handle_in.x, s.handle_in.y), (-5.0, -5.0));

    // the draw undoes as one step and hands back its hook
    assert!(ed.undo());
    let effects = js_sys::JSON::stringify(&ed.take_effects()).unwrap();
    assert_eq!(effects, r#"[{"type":"exitPathEdit"}]"#);
    assert!(value(&ed.get_seg_res(p, 0, 0)).is_null());
}

#[wasm_bindgen_test]
fn json_round_trip_clears_history() {
    let mut ed = Editor::new();
    ed.add_rect_res(1.5, 2.5, 10.0, 10.0);
    ed.add_line_res(0.0, 0.0, 30.0, 40.0, 2.0);
    let doc = ed.to_json();

    let mut other = Editor::new();
    value(&other.from_json_res(doc.clone()));
    assert_eq!(other.node_count(), 2);
    assert!(!other.can_undo());
    assert_eq!(
        js_sys::JSON::stringify(&other.to_json()).unwrap(),
        js_sys::JSON::stringify(&doc).unwrap()
    );
    assert!(is_err(&other.from_json_res(JsValue::from_f64(3.0)), "json"));
    let wide = js_sys::JSON::parse(
        r#"{"version":1,"nodes":[{"id":4294967296,"type":"ellipse","name":"Ellipse 1","width":1,"height":1,"transform":[1,0,0,1,0,0]}]}"#,
    )
    .unwrap();
    assert!(is_err(&other.from_json_res(wide), "limit"));
    assert_eq!(other.node_count(), 2);
}
