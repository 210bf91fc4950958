//! Points, rectangles, axis-aligned bounds and the queries tools run on them.

use super::affine::Transform;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self { Point { x, y } }

    pub fn length(&self) -> f64 { self.x.hypot(self.y) }

    pub fn distance(&self, o: Point) -> f64 { (self.x - o.x).hypot(self.y - o.y) }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, o: Point) -> Point { Point::new(self.x + o.x, self.y + o.y) }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, o: Point) -> Point { Point::new(self.x - o.x, self.y - o.y) }
}

impl std::ops::Neg for Point {
    type Output = Point;
    fn neg(self) -> Point { Point::new(-self.x, -self.y) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self { Rect { x, y, width, height } }
}

/// Axis-aligned bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Bounds { min_x, min_y, max_x, max_y }
    }

    pub fn width(&self) -> f64 { self.max_x - self.min_x }
    pub fn height(&self) -> f64 { self.max_y - self.min_y }

    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    pub fn union(&self, o: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(o.min_x),
            min_y: self.min_y.min(o.min_y),
            max_x: self.max_x.max(o.max_x),
            max_y: self.max_y.max(o.max_y),
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.min_x, self.min_y, self.width(), self.height())
    }

    pub fn from_quad(q: &[Point; 4]) -> Bounds {
        let mut b = Bounds::new(q[0].x, q[0].y, q[0].x, q[0].y);
        for p in &q[1..] {
            b.min_x = b.min_x.min(p.x);
            b.min_y = b.min_y.min(p.y);
            b.max_x = b.max_x.max(p.x);
            b.max_y = b.max_y.max(p.y);
        }
        b
    }

    /// Coordinate-wise min/max over `points`; `None` when empty.
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Option<Bounds> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut b = Bounds::new(first.x, first.y, first.x, first.y);
        for p in it {
            b.min_x = b.min_x.min(p.x);
            b.min_y = b.min_y.min(p.y);
            b.max_x = b.max_x.max(p.x);
            b.max_y = b.max_y.max(p.y);
        }
        Some(b)
    }
}

impl From<Rect> for Bounds {
    fn from(r: Rect) -> Self { Bounds::new(r.x, r.y, r.x + r.width, r.y + r.height) }
}

/// A local rectangle `[0,0,width,height]` placed into scene space by `transform`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformRect {
    pub width: f64,
    pub height: f64,
    pub transform: Transform,
}

/// Corners of `rect`, clockwise from top-left, optionally mapped by `transform`.
pub fn rect_to_vertices(rect: &Rect, transform: Option<&Transform>) -> [Point; 4] {
    let Rect { x, y, width, height } = *rect;
    let pts = [
        Point::new(x, y),
        Point::new(x + width, y),
        Point::new(x + width, y + height),
        Point::new(x, y + height),
    ];
    match transform {
        Some(t) => pts.map(|p| t.apply(p)),
        None => pts,
    }
}

/// Inverse-map `p` into the rect's local frame and test against the padded local rect.
pub fn is_point_in_rect(p: Point, rect: &TransformRect, padding: f64) -> bool {
    let local = rect.transform.invert().apply(p);
    local.x >= -padding
        && local.y >= -padding
        && local.x <= rect.width + padding
        && local.y <= rect.height + padding
}

pub fn is_box_intersect(a: &Bounds, b: &Bounds) -> bool {
    a.min_x <= b.max_x && a.max_x >= b.min_x && a.min_y <= b.max_y && a.max_y >= b.min_y
}

/// True when `outer` fully contains `inner`.
pub fn is_box_contain(outer: &Bounds, inner: &Bounds) -> bool {
    outer.min_x <= inner.min_x
        && outer.min_y <= inner.min_y
        && outer.max_x >= inner.max_x
        && outer.max_y >= inner.max_y
}

pub fn is_rect_intersect(a: &Rect, b: &Rect) -> bool {
    is_box_intersect(&Bounds::from(*a), &Bounds::from(*b))
}
