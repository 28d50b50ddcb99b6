use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer pixel coordinate on the device canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared euclidean distance, saturating at `i64::MAX`.
    pub fn dist2(self, other: Point) -> i64 {
        let dx = i128::from(self.x) - i128::from(other.x);
        let dy = i128::from(self.y) - i128::from(other.y);
        i64::try_from(dx * dx + dy * dy).unwrap_or(i64::MAX)
    }

    /// Manhattan distance.
    pub fn manhattan(self, other: Point) -> i64 {
        (i64::from(self.x) - i64::from(other.x)).abs() + (i64::from(self.y) - i64::from(other.y)).abs()
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Target drawing surface (device display resolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if the canvas has no drawable area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Ordered boundary points of one connected region of a line mask.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed area of the closed polygon (shoelace formula).
    ///
    /// Open or degenerate contours (fewer than 3 points) have zero area.
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let mut twice: i64 = 0;
        for (i, p) in self.points.iter().enumerate() {
            let q = self.points[(i + 1) % self.points.len()];
            twice += i64::from(p.x) * i64::from(q.y) - i64::from(q.x) * i64::from(p.y);
        }
        twice.abs() as f64 / 2.0
    }
}

/// Sparse drawing path: no two consecutive points are identical.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    /// Builds a polyline, collapsing runs of identical consecutive points.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        let mut out: Vec<Point> = Vec::new();
        for p in points {
            if out.last().is_none_or(|last| last.manhattan(p) > 0) {
                out.push(p);
            }
        }
        Self { points: out }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

/// A single touch command.
///
/// Primitives of a run must reach the device in generation order: the
/// order encodes the stroke sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Primitive {
    Tap {
        x: i32,
        y: i32,
    },
    Swipe {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        duration_ms: u32,
    },
}

impl Primitive {
    pub fn tap(p: Point) -> Self {
        Self::Tap { x: p.x, y: p.y }
    }

    pub fn swipe(from: Point, to: Point, duration_ms: u32) -> Self {
        Self::Swipe {
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
            duration_ms,
        }
    }

    pub fn is_tap(&self) -> bool {
        matches!(self, Self::Tap { .. })
    }

    /// Time the device spends executing this primitive.
    pub fn duration_ms(&self) -> u32 {
        match self {
            Self::Tap { .. } => 0,
            Self::Swipe { duration_ms, .. } => *duration_ms,
        }
    }

    /// End point of the gesture.
    pub fn end(&self) -> Point {
        match *self {
            Self::Tap { x, y } => Point::new(x, y),
            Self::Swipe { x2, y2, .. } => Point::new(x2, y2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dist2_is_symmetric() {
        let a = Point::new(3, -4);
        let b = Point::new(0, 0);
        assert_eq!(a.dist2(b), 25);
        assert_eq!(b.dist2(a), 25);
    }

    #[test]
    fn dist2_does_not_overflow() {
        let a = Point::new(i32::MIN, i32::MIN);
        let b = Point::new(0, 0);
        assert!(a.dist2(b) > 0);
        assert_eq!(Point::new(i32::MIN, i32::MIN).dist2(Point::new(i32::MAX, i32::MAX)), i64::MAX);
        assert_eq!(Point::new(-3, 0).dist2(Point::new(0, 4)), 25);
    }

    #[test]
    fn square_contour_area() {
        let c = Contour::new(vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ]);
        assert_eq!(c.area(), 100.0);
    }

    #[test]
    fn area_ignores_orientation() {
        let c = Contour::new(vec![
            Point::new(0, 0),
            Point::new(0, 10),
            Point::new(10, 10),
            Point::new(10, 0),
        ]);
        assert_eq!(c.area(), 100.0);
    }

    #[test]
    fn degenerate_contour_has_no_area() {
        let c = Contour::new(vec![Point::new(1, 1), Point::new(2, 2)]);
        assert_eq!(c.area(), 0.0);
    }

    #[test]
    fn polyline_collapses_consecutive_duplicates() {
        let line = Polyline::from_points([
            Point::new(1, 1),
            Point::new(1, 1),
            Point::new(2, 1),
            Point::new(2, 1),
            Point::new(1, 1),
        ]);
        assert_eq!(
            line.points(),
            &[Point::new(1, 1), Point::new(2, 1), Point::new(1, 1)]
        );
    }

    #[test]
    fn primitive_json_is_tagged() {
        let tap = Primitive::tap(Point::new(5, 6));
        let json = serde_json::to_string(&tap).unwrap();
        assert_eq!(json, r#"{"kind":"tap","x":5,"y":6}"#);

        let parsed: Primitive =
            serde_json::from_str(r#"{"kind":"swipe","x1":0,"y1":0,"x2":9,"y2":9,"duration_ms":18}"#)
                .unwrap();
        assert_eq!(parsed, Primitive::swipe(Point::new(0, 0), Point::new(9, 9), 18));
    }

    #[test]
    fn canvas_display() {
        assert_eq!(Canvas::new(1080, 2400).to_string(), "1080x2400");
        assert!(Canvas::new(0, 10).is_empty());
    }
}
