//! Integer vectors and axis-aligned rectangles for grid geometry

use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Integer 2D vector used both for cell coordinates and adjacency axes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Vec2i {
    /// Horizontal component
    pub x: i32,
    /// Vertical component
    pub y: i32,
}

impl Vec2i {
    /// The zero vector
    pub const ZERO: Self = Self::new(0, 0);

    /// Create a vector from its components
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise absolute value
    pub const fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    /// Component-wise maximum
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl Add for Vec2i {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2i {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2i {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl fmt::Display for Vec2i {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangle given by its top-left position and size
///
/// The rectangle covers `position.x .. position.x + size.x` horizontally and
/// `position.y .. position.y + size.y` vertically (end-exclusive).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect2i {
    /// Top-left corner (inclusive)
    pub position: Vec2i,
    /// Width and height
    pub size: Vec2i,
}

impl Rect2i {
    /// Create a rectangle from position and size components
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            position: Vec2i::new(x, y),
            size: Vec2i::new(width, height),
        }
    }

    /// Create a rectangle at the origin with the given size
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Bottom-right corner (exclusive)
    pub fn end(&self) -> Vec2i {
        self.position + self.size
    }

    /// Number of cells covered, zero for degenerate rectangles
    pub const fn area(&self) -> usize {
        if self.has_area() {
            self.size.x as usize * self.size.y as usize
        } else {
            0
        }
    }

    /// Whether both dimensions are positive
    pub const fn has_area(&self) -> bool {
        self.size.x > 0 && self.size.y > 0
    }

    /// Test whether a point lies inside the rectangle
    pub const fn has_point(&self, point: Vec2i) -> bool {
        point.x >= self.position.x
            && point.y >= self.position.y
            && point.x < self.position.x + self.size.x
            && point.y < self.position.y + self.size.y
    }

    /// Whether the two rectangles share at least one cell
    pub const fn intersects(&self, other: &Self) -> bool {
        self.has_area()
            && other.has_area()
            && self.position.x < other.position.x + other.size.x
            && other.position.x < self.position.x + self.size.x
            && self.position.y < other.position.y + other.size.y
            && other.position.y < self.position.y + self.size.y
    }

    /// Overlapping region of two rectangles, or an empty rectangle
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        if !self.intersects(other) {
            return Self::default();
        }

        let position = self.position.max(other.position);
        let end_x = self.end().x.min(other.end().x);
        let end_y = self.end().y.min(other.end().y);

        Self {
            position,
            size: Vec2i::new(end_x - position.x, end_y - position.y),
        }
    }

    /// Grow the rectangle by `before` on the top-left and `after` on the bottom-right
    #[must_use]
    pub fn expanded(&self, before: Vec2i, after: Vec2i) -> Self {
        Self {
            position: self.position - before,
            size: self.size + before + after,
        }
    }

    /// Iterate every point in column-major order (outer x, inner y)
    pub fn points(&self) -> impl Iterator<Item = Vec2i> + use<> {
        let Self { position, size } = *self;
        (0..size.x.max(0)).flat_map(move |dx| {
            (0..size.y.max(0)).map(move |dy| Vec2i::new(position.x + dx, position.y + dy))
        })
    }
}

impl fmt::Display for Rect2i {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {} {}x{}]",
            self.position.x, self.position.y, self.size.x, self.size.y
        )
    }
}
