//! 2D affine matrix `[a c tx; b d ty; 0 0 1]`.
//!
//! Composition reads left to right: `t.append(o)` applies `t` first and `o`
//! second, so a rotation appended to an existing transform acts on the
//! outside of it.

use super::shapes::Point;
use super::tolerance::{normalize_angle, EPS_DENOM};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 6]", into = "[f64; 6]")]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for Transform {
    fn default() -> Self { Self::IDENTITY }
}

impl From<[f64; 6]> for Transform {
    fn from(m: [f64; 6]) -> Self {
        Transform { a: m[0], b: m[1], c: m[2], d: m[3], tx: m[4], ty: m[5] }
    }
}

impl From<Transform> for [f64; 6] {
    fn from(t: Transform) -> Self { t.to_array() }
}

impl Transform {
    pub const IDENTITY: Transform = Transform { a: 1.0, b: 0.0, c: 0.0, d: 1.0, tx: 0.0, ty: 0.0 };

    pub fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Transform { a, b, c, d, tx, ty }
    }

    pub fn identity() -> Self { Self::IDENTITY }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Transform { tx, ty, ..Self::IDENTITY }
    }

    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Transform { a: cos, b: sin, c: -sin, d: cos, tx: 0.0, ty: 0.0 }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Transform { a: sx, d: sy, ..Self::IDENTITY }
    }

    /// Rotation by `angle` around `center`: translate(-center), rotate, translate(center).
    pub fn rotation_about(angle: f64, center: Point) -> Self {
        Transform::translation(-center.x, -center.y)
            .append(Transform::rotation(angle))
            .append(Transform::translation(center.x, center.y))
    }

    pub fn to_array(self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.tx, self.ty]
    }

    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        Point {
            x: self.a * p.x + self.c * p.y + self.tx,
            y: self.b * p.x + self.d * p.y + self.ty,
        }
    }

    /// Apply only the linear part; used for handle offsets, which are vectors.
    #[inline]
    pub fn apply_vector(&self, v: Point) -> Point {
        Point { x: self.a * v.x + self.c * v.y, y: self.b * v.x + self.d * v.y }
    }

    #[inline]
    pub fn determinant(&self) -> f64 { self.a * self.d - self.b * self.c }

    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det.abs() > EPS_DENOM
    }

    /// Inverse matrix. A singular transform yields non-finite components;
    /// callers never produce one through editor operations.
    pub fn invert(&self) -> Transform {
        let det = self.determinant();
        Transform {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            tx: (self.c * self.ty - self.d * self.tx) / det,
            ty: (self.b * self.tx - self.a * self.ty) / det,
        }
    }

    /// `self` first, then `other`.
    pub fn append(&self, other: Transform) -> Transform {
        let o = other;
        Transform {
            a: o.a * self.a + o.c * self.b,
            b: o.b * self.a + o.d * self.b,
            c: o.a * self.c + o.c * self.d,
            d: o.b * self.c + o.d * self.d,
            tx: o.a * self.tx + o.c * self.ty + o.tx,
            ty: o.b * self.tx + o.d * self.ty + o.ty,
        }
    }

    /// `other` first, then `self`.
    pub fn prepend(&self, other: Transform) -> Transform {
        other.append(*self)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Transform {
        Transform { tx: self.tx + dx, ty: self.ty + dy, ..*self }
    }

    /// Rotation angle in `[0, 2π)`. Exact for rotation with uniform scale;
    /// skewed or non-uniformly scaled matrices give the angle of the x basis vector.
    pub fn rotation_angle(&self) -> f64 {
        normalize_angle(self.b.atan2(self.a))
    }
}
