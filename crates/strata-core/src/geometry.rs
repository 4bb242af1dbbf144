use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    /// Per-axis interpolation: `self + (to - self) * t`.
    pub fn lerp(self, to: Vec2, t: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + (to.x - self.x) * t.x,
            y: self.y + (to.y - self.y) * t.y,
        }
    }

    pub fn scale(self, by: Vec2) -> Vec2 {
        Vec2::new(self.x * by.x, self.y * by.y)
    }

    pub fn min(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn max(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.max(other.x), self.y.max(other.y))
    }

    pub fn rotate(self, angle: f32) -> Vec2 {
        if angle == 0.0 {
            return self;
        }
        let (sin, cos) = angle.sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn approx_eq(self, other: Vec2, eps: f32) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        w: 0.0,
        h: 0.0,
    };

    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Builds a rect spanning `min..max`. Inverted corners produce negative
    /// extents, which callers treat as empty.
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            x: min.x,
            y: min.y,
            w: max.x - min.x,
            h: max.y - min.y,
        }
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn is_inverted(&self) -> bool {
        self.w < 0.0 || self.h < 0.0
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.is_inverted() || other.is_inverted())
            && self.x <= other.x + other.w
            && other.x <= self.x + self.w
            && self.y <= other.y + other.h
            && other.y <= self.y + self.h
    }

    pub fn translate(&self, by: Vec2) -> Rect {
        Rect::new(self.x + by.x, self.y + by.y, self.w, self.h)
    }

    /// Grows `self` to cover `other`. Inverted rects contribute nothing.
    pub fn expand(&mut self, other: &Rect) {
        if other.is_inverted() {
            return;
        }
        if self.is_inverted() {
            *self = *other;
            return;
        }
        *self = Rect::from_min_max(self.min().min(other.min()), self.max().max(other.max()));
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let mut out = *self;
        out.expand(other);
        out
    }

    pub fn approx_eq(&self, other: &Rect, eps: f32) -> bool {
        self.min().approx_eq(other.min(), eps) && self.size().approx_eq(other.size(), eps)
    }
}

/// 2x3 affine matrix. `x_axis` and `y_axis` are the images of the unit
/// vectors, `origin` the image of (0, 0).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Basis {
    pub x_axis: Vec2,
    pub y_axis: Vec2,
    pub origin: Vec2,
}

impl Default for Basis {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Basis {
    pub const IDENTITY: Basis = Basis {
        x_axis: Vec2::new(1.0, 0.0),
        y_axis: Vec2::new(0.0, 1.0),
        origin: Vec2::ZERO,
    };

    pub fn translation(by: Vec2) -> Self {
        Basis {
            origin: by,
            ..Self::IDENTITY
        }
    }

    pub fn scaling(by: Vec2) -> Self {
        Basis {
            x_axis: Vec2::new(by.x, 0.0),
            y_axis: Vec2::new(0.0, by.y),
            origin: Vec2::ZERO,
        }
    }

    pub fn rotation(angle: f32) -> Self {
        Basis {
            x_axis: Vec2::new(1.0, 0.0).rotate(angle),
            y_axis: Vec2::new(0.0, 1.0).rotate(angle),
            origin: Vec2::ZERO,
        }
    }

    /// Maps the unit square onto `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        Basis {
            x_axis: Vec2::new(rect.w, 0.0),
            y_axis: Vec2::new(0.0, rect.h),
            origin: rect.min(),
        }
    }

    pub fn transform_vector(&self, v: Vec2) -> Vec2 {
        self.x_axis * v.x + self.y_axis * v.y
    }

    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        self.origin + self.transform_vector(p)
    }

    /// `self * rhs`: applies `rhs` first, then `self`.
    pub fn mul(&self, rhs: &Basis) -> Basis {
        Basis {
            x_axis: self.transform_vector(rhs.x_axis),
            y_axis: self.transform_vector(rhs.y_axis),
            origin: self.transform_point(rhs.origin),
        }
    }

    pub fn determinant(&self) -> f32 {
        self.x_axis.x * self.y_axis.y - self.y_axis.x * self.x_axis.y
    }

    /// `None` when the basis is degenerate.
    pub fn inverse(&self) -> Option<Basis> {
        let det = self.determinant();
        if det.abs() <= f32::EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        let x_axis = Vec2::new(self.y_axis.y * inv, -self.x_axis.y * inv);
        let y_axis = Vec2::new(-self.y_axis.x * inv, self.x_axis.x * inv);
        let origin = -(x_axis * self.origin.x + y_axis * self.origin.y);
        Some(Basis {
            x_axis,
            y_axis,
            origin,
        })
    }

    /// Axis-aligned bounds of `rect` after transformation.
    pub fn aabb(&self, rect: Rect) -> Rect {
        let corners = [
            self.transform_point(rect.min()),
            self.transform_point(Vec2::new(rect.x + rect.w, rect.y)),
            self.transform_point(Vec2::new(rect.x, rect.y + rect.h)),
            self.transform_point(rect.max()),
        ];
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min = min.min(*c);
            max = max.max(*c);
        }
        Rect::from_min_max(min, max)
    }

    pub fn approx_eq(&self, other: &Basis, eps: f32) -> bool {
        self.x_axis.approx_eq(other.x_axis, eps)
            && self.y_axis.approx_eq(other.y_axis, eps)
            && self.origin.approx_eq(other.origin, eps)
    }
}
