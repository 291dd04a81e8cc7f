//! Core types for spark-shadow.
//!
//! Identifiers, geometry and the layout values that travel between the
//! shadow tree, the layout engine and mounting. Everything here is plain
//! `Copy` data.

use std::ops::{Add, Sub};

// =============================================================================
// Identifiers
// =============================================================================

/// Numeric tag of a logical node, unique within its surface.
pub type Tag = i32;

/// Identifier of a surface (one independently committed tree).
pub type SurfaceId = i32;

// =============================================================================
// Geometry
// =============================================================================

/// A point in points (not pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width and height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Unbounded size, the default maximum of [`LayoutConstraints`].
    pub const INFINITE: Self = Self {
        width: f32::INFINITY,
        height: f32::INFINITY,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An origin and a size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    #[inline]
    pub fn min_x(&self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn min_y(&self) -> f32 {
        self.origin.y
    }

    #[inline]
    pub fn max_x(&self) -> f32 {
        self.origin.x + self.size.width
    }

    #[inline]
    pub fn max_y(&self) -> f32 {
        self.origin.y + self.size.height
    }

    /// Edges are inclusive: a point on the right or bottom edge is inside.
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.y >= self.min_y()
            && point.x <= self.max_x()
            && point.y <= self.max_y()
    }

    /// Smallest rect containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x1 = self.min_x().min(other.min_x());
        let y1 = self.min_y().min(other.min_y());
        let x2 = self.max_x().max(other.max_x());
        let y2 = self.max_y().max(other.max_y());
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Shrinks the rect by `insets`. Negative insets grow it.
    pub fn inset_by(&self, insets: &EdgeInsets) -> Rect {
        Rect::new(
            self.origin.x + insets.left,
            self.origin.y + insets.top,
            self.size.width - insets.left - insets.right,
            self.size.height - insets.top - insets.bottom,
        )
    }
}

/// Distances from each edge of a rect.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl EdgeInsets {
    pub const ZERO: Self = Self {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

impl Add for EdgeInsets {
    type Output = EdgeInsets;

    fn add(self, rhs: EdgeInsets) -> EdgeInsets {
        EdgeInsets::new(
            self.left + rhs.left,
            self.top + rhs.top,
            self.right + rhs.right,
            self.bottom + rhs.bottom,
        )
    }
}

// =============================================================================
// Layout Values
// =============================================================================

/// Resolved writing direction of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum LayoutDirection {
    #[default]
    Undefined = 0,
    LeftToRight = 1,
    RightToLeft = 2,
}

impl From<u8> for LayoutDirection {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::LeftToRight,
            2 => Self::RightToLeft,
            _ => Self::Undefined,
        }
    }
}

/// Whether a node takes part in layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DisplayType {
    None = 0,
    #[default]
    Flex = 1,
}

/// Output of layout for one node, as stored on its shadow node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    /// Frame relative to the parent's origin.
    pub frame: Rect,
    /// Border plus padding.
    pub content_insets: EdgeInsets,
    pub border_width: EdgeInsets,
    pub display_type: DisplayType,
    pub layout_direction: LayoutDirection,
    pub point_scale_factor: f32,
    /// How far descendants overflow the frame. Values are zero or negative.
    pub overflow_inset: EdgeInsets,
}

impl LayoutMetrics {
    /// Metrics of a node that was never laid out. The negative size keeps
    /// such nodes out of hit testing.
    pub const EMPTY: Self = Self {
        frame: Rect::new(0.0, 0.0, -1.0, -1.0),
        content_insets: EdgeInsets::ZERO,
        border_width: EdgeInsets::ZERO,
        display_type: DisplayType::Flex,
        layout_direction: LayoutDirection::Undefined,
        point_scale_factor: 1.0,
        overflow_inset: EdgeInsets::ZERO,
    };

    /// Frame of the content box, relative to this node's own origin.
    pub fn content_frame(&self) -> Rect {
        Rect::new(
            self.content_insets.left,
            self.content_insets.top,
            self.frame.size.width - self.content_insets.left - self.content_insets.right,
            self.frame.size.height - self.content_insets.top - self.content_insets.bottom,
        )
    }
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Size bounds and direction a layout pass runs under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConstraints {
    pub minimum_size: Size,
    pub maximum_size: Size,
    pub layout_direction: LayoutDirection,
}

impl LayoutConstraints {
    /// Exactly `size`: minimum and maximum are equal.
    pub const fn exact(size: Size) -> Self {
        Self {
            minimum_size: size,
            maximum_size: size,
            layout_direction: LayoutDirection::Undefined,
        }
    }

    /// Clamps `size` into the constraints.
    pub fn clamp(&self, size: Size) -> Size {
        Size::new(
            size.width
                .max(self.minimum_size.width)
                .min(self.maximum_size.width),
            size.height
                .max(self.minimum_size.height)
                .min(self.maximum_size.height),
        )
    }
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        Self {
            minimum_size: Size::ZERO,
            maximum_size: Size::INFINITE,
            layout_direction: LayoutDirection::Undefined,
        }
    }
}

/// Environment of a layout pass, fixed per surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutContext {
    /// Device pixels per point; frames are snapped to this grid.
    pub point_scale_factor: f32,
    /// Rewrite `left`/`right` style edges to `start`/`end` under RTL.
    pub swap_left_and_right_in_rtl: bool,
    pub font_size_multiplier: f32,
    pub viewport_offset: Point,
}

impl Default for LayoutContext {
    fn default() -> Self {
        Self {
            point_scale_factor: 1.0,
            swap_left_and_right_in_rtl: false,
            font_size_multiplier: 1.0,
            viewport_offset: Point::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_point_inclusive() {
        let rect = Rect::new(100.0, 100.0, 100.0, 100.0);
        assert!(rect.contains_point(Point::new(100.0, 100.0)));
        assert!(rect.contains_point(Point::new(200.0, 200.0)));
        assert!(rect.contains_point(Point::new(150.0, 120.0)));
        assert!(!rect.contains_point(Point::new(200.5, 150.0)));
        assert!(!rect.contains_point(Point::new(99.0, 150.0)));
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(-5.0, 5.0, 10.0, 20.0);
        assert_eq!(a.union(&b), Rect::new(-5.0, 0.0, 15.0, 25.0));
    }

    #[test]
    fn test_rect_inset_by_negative_grows() {
        let rect = Rect::new(10.0, 10.0, 10.0, 10.0);
        let grown = rect.inset_by(&EdgeInsets::new(-5.0, -5.0, -5.0, -5.0));
        assert_eq!(grown, Rect::new(5.0, 5.0, 20.0, 20.0));
    }

    #[test]
    fn test_empty_metrics_never_contain_points() {
        let metrics = LayoutMetrics::default();
        assert!(!metrics.frame.contains_point(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_constraints_clamp() {
        let constraints = LayoutConstraints {
            minimum_size: Size::new(10.0, 10.0),
            maximum_size: Size::new(100.0, f32::INFINITY),
            layout_direction: LayoutDirection::LeftToRight,
        };
        assert_eq!(
            constraints.clamp(Size::new(500.0, 2.0)),
            Size::new(100.0, 10.0)
        );
    }

    #[test]
    fn test_layout_direction_from_u8() {
        assert_eq!(LayoutDirection::from(2), LayoutDirection::RightToLeft);
        assert_eq!(LayoutDirection::from(9), LayoutDirection::Undefined);
    }
}
