#![forbid(unsafe_code)]

//! Geometric primitives in pixel space.
//!
//! Coordinates are signed: a layout that overflows its container may place
//! children at positions left of or above the container origin.

use std::fmt;
use std::ops::{Add, Sub};

/// A point in pixel coordinates (origin at top-left, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// The origin `(0, 0)`.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Zero size.
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// True if either dimension is zero or negative.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, other: Size) -> Size {
        Size::new(self.width.min(other.width), self.height.min(other.height))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An axis-aligned rectangle: layout bounds, cell rectangles, child geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Create a rectangle from an upper-left point and a size.
    #[inline]
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Create a rectangle from its upper-left (inclusive) and lower-right
    /// (exclusive) corners. Inverted corners produce a zero-sized rectangle.
    pub fn from_corners(upper_left: Point, lower_right: Point) -> Self {
        Self::new(
            upper_left.x,
            upper_left.y,
            lower_right.x.saturating_sub(upper_left.x).max(0),
            lower_right.y.saturating_sub(upper_left.y).max(0),
        )
    }

    /// Left edge (inclusive). Alias for `self.x`.
    #[inline]
    pub const fn left(&self) -> i32 {
        self.x
    }

    /// Top edge (inclusive). Alias for `self.y`.
    #[inline]
    pub const fn top(&self) -> i32 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Upper-left corner.
    #[inline]
    pub const fn upper_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Lower-right corner (exclusive).
    #[inline]
    pub const fn lower_right(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    /// Width and height.
    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Area in square pixels (zero for degenerate rectangles).
    #[inline]
    pub const fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.right()
            && point.y >= self.y
            && point.y < self.bottom()
    }

    /// Move the rectangle by `offset`.
    #[inline]
    pub fn translate(&self, offset: Point) -> Rect {
        Rect::new(
            self.x.saturating_add(offset.x),
            self.y.saturating_add(offset.y),
            self.width,
            self.height,
        )
    }

    /// Express this rectangle relative to `origin`.
    #[inline]
    pub fn relative_to(&self, origin: Point) -> Rect {
        self.translate(Point::ORIGIN - origin)
    }

    /// The smallest rectangle that contains both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
    }

    /// Compute the intersection with another rectangle.
    ///
    /// Returns an empty rectangle if the rectangles don't overlap.
    #[inline]
    pub fn intersection(&self, other: &Rect) -> Rect {
        self.intersection_opt(other).unwrap_or_default()
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}; {}x{}]",
            self.x, self.y, self.width, self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Point, Rect, Size};

    #[test]
    fn rect_from_corners() {
        let r = Rect::from_corners(Point::new(10, 20), Point::new(110, 70));
        assert_eq!(r, Rect::new(10, 20, 100, 50));
        assert_eq!(r.upper_left(), Point::new(10, 20));
        assert_eq!(r.lower_right(), Point::new(110, 70));
    }

    #[test]
    fn rect_from_inverted_corners_is_empty() {
        let r = Rect::from_corners(Point::new(50, 50), Point::new(10, 10));
        assert_eq!(r.size(), Size::ZERO);
        assert!(r.is_empty());
    }

    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(2, 3, 4, 5);
        assert!(rect.contains(Point::new(2, 3)));
        assert!(rect.contains(Point::new(5, 7)));
        assert!(!rect.contains(Point::new(6, 3)));
        assert!(!rect.contains(Point::new(2, 8)));
    }

    #[test]
    fn rect_negative_origin() {
        let r = Rect::new(-10, -5, 20, 10);
        assert!(r.contains(Point::ORIGIN));
        assert_eq!(r.right(), 10);
        assert_eq!(r.bottom(), 5);
    }

    #[test]
    fn rect_union_disjoint() {
        let a = Rect::new(0, 0, 2, 2);
        let b = Rect::new(10, 10, 3, 3);
        assert_eq!(a.union(&b), Rect::new(0, 0, 13, 13));
    }

    #[test]
    fn rect_union_saturates_at_extremes() {
        let a = Rect::new(i32::MIN, 0, 1, 1);
        let b = Rect::new(i32::MAX - 1, 0, 1, 1);
        let u = a.union(&b);
        assert_eq!(u.x, i32::MIN);
        assert_eq!(u.width, i32::MAX);
        assert_eq!(u.height, 1);
    }

    #[test]
    fn rect_intersection_adjacent_no_overlap() {
        // Right edge is exclusive
        let a = Rect::new(0, 0, 5, 5);
        let b = Rect::new(5, 0, 5, 5);
        assert!(a.intersection(&b).is_empty());
        assert_eq!(a.intersection_opt(&b), None);
    }

    #[test]
    fn rect_intersection_overlaps() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(2, 2, 4, 4);
        assert_eq!(a.intersection(&b), Rect::new(2, 2, 2, 2));
    }

    #[test]
    fn rect_relative_to_round_trips() {
        let r = Rect::new(30, 40, 5, 6);
        let origin = Point::new(10, 15);
        let rel = r.relative_to(origin);
        assert_eq!(rel, Rect::new(20, 25, 5, 6));
        assert_eq!(rel.translate(origin), r);
    }

    #[test]
    fn rect_area_of_degenerate_is_zero() {
        assert_eq!(Rect::new(0, 0, -3, 4).area(), 0);
        assert_eq!(Rect::new(0, 0, 3, 4).area(), 12);
    }

    #[test]
    fn size_component_wise() {
        let a = Size::new(3, 9);
        let b = Size::new(5, 2);
        assert_eq!(a.max(b), Size::new(5, 9));
        assert_eq!(a.min(b), Size::new(3, 2));
    }

    #[test]
    fn point_arithmetic_saturates() {
        let p = Point::new(i32::MAX, 0) + Point::new(1, 1);
        assert_eq!(p, Point::new(i32::MAX, 1));
        assert_eq!(Point::new(5, 5) - Point::new(2, 7), Point::new(3, -2));
    }
}
