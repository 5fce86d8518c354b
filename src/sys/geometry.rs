//! geometry types shared by the layout engine and its hosts

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing positions in unit space.
pub const UNIT_EPSILON: f64 = 1e-9;

/// Tolerance applied before snapping a fractional edge to a pixel.
const SNAP_EPSILON: f64 = 1e-6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self { Self { width, height } }
}

/// A fractional rectangle. The engine works in unit space (the unit square
/// stands for the whole layout area) and only snaps to pixels at the end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self { Self { origin, size } }

    pub const fn unit() -> Self { Self::new(Point::new(0.0, 0.0), Size::new(1.0, 1.0)) }

    pub fn min(&self) -> Point { self.origin }

    pub fn max(&self) -> Point {
        Point::new(self.origin.x + self.size.width, self.origin.y + self.size.height)
    }

    /// Converts `point` into coordinates relative to this rectangle, where
    /// `(0, 0)` is the origin and `(1, 1)` the opposite corner.
    pub fn to_local(&self, point: Point) -> Point {
        let x = if self.size.width > 0.0 {
            (point.x - self.origin.x) / self.size.width
        } else {
            0.5
        };
        let y = if self.size.height > 0.0 {
            (point.y - self.origin.y) / self.size.height
        } else {
            0.5
        };
        Point::new(x, y)
    }
}

/// An integer rectangle in monitor coordinates, as handed to the OS.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            Point::new(self.x as f64, self.y as f64),
            Size::new(self.width as f64, self.height as f64),
        )
    }
}

fn snap(value: f64) -> i32 { (value + SNAP_EPSILON).floor() as i32 }

impl From<Rect> for Rectangle {
    /// Edges are floored independently so that siblings sharing an edge land
    /// on the same pixel and the rounding remainder goes to the later window.
    fn from(rect: Rect) -> Self {
        let min_x = snap(rect.min().x);
        let min_y = snap(rect.min().y);
        let max_x = snap(rect.max().x);
        let max_y = snap(rect.max().y);
        Rectangle::new(min_x, min_y, (max_x - min_x).max(0), (max_y - min_y).max(0))
    }
}

pub trait IsWithin {
    fn is_within(&self, how_much: f64, other: Self) -> bool;
}

impl IsWithin for Rect {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.origin.is_within(how_much, other.origin) && self.size.is_within(how_much, other.size)
    }
}

impl IsWithin for Point {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.x.is_within(how_much, other.x) && self.y.is_within(how_much, other.y)
    }
}

impl IsWithin for Size {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.width.is_within(how_much, other.width) && self.height.is_within(how_much, other.height)
    }
}

impl IsWithin for f64 {
    fn is_within(&self, how_much: f64, other: Self) -> bool { (self - other).abs() < how_much }
}

pub trait SameAs: IsWithin + Sized {
    fn same_as(&self, other: Self) -> bool { self.is_within(UNIT_EPSILON, other) }
}

impl SameAs for Rect {}
impl SameAs for Point {}
impl SameAs for Size {}
impl SameAs for f64 {}

pub trait RectExt {
    fn contains(&self, point: Point) -> bool;
    /// Length of the overlap of the two rectangles projected on the x axis.
    fn overlap_x(&self, other: &Self) -> f64;
    /// Length of the overlap of the two rectangles projected on the y axis.
    fn overlap_y(&self, other: &Self) -> f64;
}

impl RectExt for Rect {
    fn contains(&self, point: Point) -> bool {
        (self.min().x..=self.max().x).contains(&point.x)
            && (self.min().y..=self.max().y).contains(&point.y)
    }

    fn overlap_x(&self, other: &Self) -> f64 {
        (f64::min(self.max().x, other.max().x) - f64::max(self.min().x, other.min().x)).max(0.)
    }

    fn overlap_y(&self, other: &Self) -> f64 {
        (f64::min(self.max().y, other.max().y) - f64::max(self.min().y, other.min().y)).max(0.)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect { Rect::new(Point::new(x, y), Size::new(w, h)) }

    #[test]
    fn test_is_within_f64() {
        let a = 10.0;
        let b = 10.05;
        assert!(a.is_within(0.1, b));
        assert!(!a.is_within(0.01, b));
    }

    #[test]
    fn test_is_within_rect() {
        let a = rect(10.0, 20.0, 100.0, 200.0);
        let b = rect(10.05, 20.08, 100.03, 200.02);
        assert!(a.is_within(0.1, b));
        assert!(!a.is_within(0.01, b));
    }

    #[test]
    fn test_same_as_unit_rect() {
        let a = rect(0.0, 0.0, 1.0 / 3.0, 1.0);
        let b = rect(0.0, 0.0, 1.0 - 2.0 / 3.0, 1.0);
        assert!(a.same_as(b));
    }

    #[test]
    fn test_contains_point() {
        let r = rect(0.0, 0.0, 100.0, 100.0);
        assert!(r.contains(Point::new(50.0, 50.0)));
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(100.0, 100.0)));
        assert!(!r.contains(Point::new(101.0, 50.0)));
        assert!(!r.contains(Point::new(-1.0, 50.0)));
    }

    #[test]
    fn test_overlap() {
        let a = rect(0.0, 0.0, 0.5, 1.0);
        let b = rect(0.5, 0.25, 0.5, 0.5);
        assert_eq!(a.overlap_x(&b), 0.0);
        assert_eq!(a.overlap_y(&b), 0.5);
    }

    #[test]
    fn test_to_local() {
        let r = rect(0.5, 0.0, 0.5, 1.0);
        let local = r.to_local(Point::new(0.75, 0.8));
        assert!(local.x.same_as(0.5));
        assert!(local.y.same_as(0.8));
    }

    #[test]
    fn test_snap_to_rectangle_gives_remainder_to_last() {
        let thirds: Vec<Rectangle> = (0..3)
            .map(|i| {
                let start = 100.0 * i as f64 / 3.0;
                let end = 100.0 * (i + 1) as f64 / 3.0;
                Rectangle::from(rect(start, 0.0, end - start, 100.0))
            })
            .collect();
        assert_eq!(thirds[0], Rectangle::new(0, 0, 33, 100));
        assert_eq!(thirds[1], Rectangle::new(33, 0, 33, 100));
        assert_eq!(thirds[2], Rectangle::new(66, 0, 34, 100));
    }

    #[test]
    fn test_rectangle_round_trips_through_rect() {
        let r = Rectangle::new(50, 0, 50, 100);
        assert_eq!(Rectangle::from(r.to_rect()), r);
    }
}
