//! Control-handle resize for rectangles and zero-height lines.

use super::affine::Transform;
use super::shapes::{Point, TransformRect};
use super::tolerance::{snap_angle, EPS_LEN, EPS_POS};
use crate::error::{EditError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleKind {
    Nw,
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
}

impl HandleKind {
    pub const ALL: [HandleKind; 8] = [
        HandleKind::Nw, HandleKind::N, HandleKind::Ne, HandleKind::E,
        HandleKind::Se, HandleKind::S, HandleKind::Sw, HandleKind::W,
    ];

    /// Which local edges the handle drags: -1 the min side, +1 the max side, 0 neither.
    pub fn direction(self) -> (i8, i8) {
        match self {
            HandleKind::Nw => (-1, -1),
            HandleKind::N => (0, -1),
            HandleKind::Ne => (1, -1),
            HandleKind::E => (1, 0),
            HandleKind::Se => (1, 1),
            HandleKind::S => (0, 1),
            HandleKind::Sw => (-1, 1),
            HandleKind::W => (-1, 0),
        }
    }

    pub fn is_corner(self) -> bool {
        let (dx, dy) = self.direction();
        dx != 0 && dy != 0
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HandleKind::Nw => "nw",
            HandleKind::N => "n",
            HandleKind::Ne => "ne",
            HandleKind::E => "e",
            HandleKind::Se => "se",
            HandleKind::S => "s",
            HandleKind::Sw => "sw",
            HandleKind::W => "w",
        }
    }
}

impl FromStr for HandleKind {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self> {
        HandleKind::ALL
            .into_iter()
            .find(|h| h.as_str() == s)
            .ok_or_else(|| EditError::UnknownHandle(s.to_string()))
    }
}

#[inline]
fn sign(v: f64) -> f64 { if v < 0.0 { -1.0 } else { 1.0 } }

// Signed extent along one axis after dragging to local coordinate `p`.
fn drag_size(dir: i8, from_center: bool, len: f64, p: f64) -> f64 {
    match dir {
        1 if from_center => 2.0 * (p - len / 2.0),
        1 => p,
        -1 if from_center => 2.0 * (len / 2.0 - p),
        -1 => len - p,
        _ => len,
    }
}

// Where the original min side and max side land for a signed `size`.
fn place(dir: i8, from_center: bool, len: f64, size: f64) -> (f64, f64) {
    if from_center || dir == 0 {
        let c = len / 2.0;
        (c - size / 2.0, c + size / 2.0)
    } else if dir > 0 {
        (0.0, size)
    } else {
        (len - size, len)
    }
}

/// Resize a rectangle by dragging `handle` to scene point `pointer`.
///
/// Works in the original local frame. Dragging past the opposite side flips
/// the frame; the flip is folded into the returned transform so width and
/// height stay non-negative.
pub fn resize_rect(
    handle: HandleKind,
    pointer: Point,
    original: &TransformRect,
    keep_ratio: bool,
    from_center: bool,
) -> TransformRect {
    let (w, h) = (original.width, original.height);
    let p = original.transform.invert().apply(pointer);
    let (dx, dy) = handle.direction();

    let mut sw = drag_size(dx, from_center, w, p.x);
    let mut sh = drag_size(dy, from_center, h, p.y);

    if keep_ratio && w > EPS_LEN && h > EPS_LEN {
        if handle.is_corner() {
            let (rx, ry) = (sw / w, sh / h);
            let s = rx.abs().max(ry.abs());
            sw = w * s * sign(rx);
            sh = h * s * sign(ry);
        } else if dx != 0 {
            sh = h * (sw / w).abs();
        } else {
            sw = w * (sh / h).abs();
        }
    }

    let (x0, _) = place(dx, from_center, w, sw);
    let (y0, _) = place(dy, from_center, h, sh);
    let local = Transform::scale(sign(sw), sign(sh)).append(Transform::translation(x0, y0));

    TransformRect {
        width: sw.abs(),
        height: sh.abs(),
        transform: local.append(original.transform),
    }
}

/// Resize a zero-height line. Only horizontal-bearing handles move an
/// endpoint; `keep_polar` snaps the line direction to `snap_step`.
pub fn resize_line(
    handle: HandleKind,
    pointer: Point,
    original: &TransformRect,
    keep_polar: bool,
    from_center: bool,
    snap_step: f64,
) -> Result<TransformRect> {
    let start = original.transform.apply(Point::ZERO);
    let end = original.transform.apply(Point::new(original.width, 0.0));
    let moves_end = match handle.direction().0 {
        1 => true,
        -1 => false,
        _ => {
            return Err(EditError::UnsupportedHandle {
                handle: handle.as_str().to_string(),
                kind: "line".to_string(),
            })
        }
    };
    let fixed = if moves_end { start } else { end };
    let anchor = if from_center {
        Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0)
    } else {
        fixed
    };

    let mut v = pointer - anchor;
    if keep_polar {
        let len = v.length();
        let angle = snap_angle(v.y.atan2(v.x), snap_step);
        v = Point::new(angle.cos() * len, angle.sin() * len);
    }
    let moving = anchor + v;
    let other = if from_center { anchor - v } else { fixed };
    let (s, e) = if moves_end { (other, moving) } else { (moving, other) };

    let d = e - s;
    let len = d.length();
    let angle = if len > EPS_POS { d.y.atan2(d.x) } else { original.transform.rotation_angle() };
    Ok(TransformRect {
        width: len,
        height: 0.0,
        transform: Transform::rotation(angle).append(Transform::translation(s.x, s.y)),
    })
}
