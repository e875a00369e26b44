use glam::Vec2;

/// Axis-aligned rectangle in world space. `location` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rectangle {
    pub location: Vec2,
    pub size: Vec2,
}

impl Rectangle {
    pub fn new(location: Vec2, size: Vec2) -> Self {
        Self { location, size }
    }

    pub fn from_points(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self { location: min, size: max - min }
    }

    pub fn centered_at(center: Vec2, size: Vec2) -> Self {
        Self { location: center - size / 2.0, size }
    }

    pub fn center(&self) -> Vec2 {
        self.location + self.size / 2.0
    }

    pub fn left(&self) -> f32 {
        self.location.x
    }

    pub fn top(&self) -> f32 {
        self.location.y
    }

    pub fn right(&self) -> f32 {
        self.location.x + self.size.x
    }

    pub fn bottom(&self) -> f32 {
        self.location.y + self.size.y
    }

    pub fn translate(&self, delta: Vec2) -> Self {
        Self { location: self.location + delta, size: self.size }
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left() && point.x <= self.right() && point.y >= self.top() && point.y <= self.bottom()
    }

    pub fn contains_rect(&self, other: &Rectangle) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    /// Closed-interval overlap test, so touching edges count as a collision.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }

    /// Smallest rectangle enclosing every input, grown by `padding` on each side.
    pub fn bounding<'a>(rects: impl IntoIterator<Item = &'a Rectangle>, padding: f32) -> Option<Self> {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        let mut any = false;
        for rect in rects {
            min = min.min(rect.location);
            max = max.max(rect.location + rect.size);
            any = true;
        }
        if !any {
            return None;
        }
        let pad = Vec2::splat(padding);
        Some(Self::from_points(min - pad, max + pad))
    }
}
