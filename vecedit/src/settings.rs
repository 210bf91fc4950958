//! Editor-wide knobs, loadable from JSON. Missing keys fall back to defaults.

use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxSelect {
    /// Select nodes whose shape touches the box.
    #[default]
    Intersect,
    /// Select nodes whose bounds are inside the box (or enclose it).
    Contain,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub hit_padding: f64,
    pub box_select: BoxSelect,
    pub line_snap_step: f64,
    pub undo_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            hit_padding: 4.0,
            box_select: BoxSelect::Intersect,
            line_snap_step: std::f64::consts::FRAC_PI_4,
            undo_limit: 100,
        }
    }
}

impl Settings {
    pub fn from_json_str(s: &str) -> Result<Settings> {
        Ok(serde_json::from_str(s)?)
    }
}
