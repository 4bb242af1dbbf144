use std::cell::Cell;

use crate::{Basis, DataError, DataNode, FromData, Rect, ToData, Vec2};

/// Local placement of an actor: position of the pivot point, size of the
/// oriented rect, scale and rotation around the pivot.
#[derive(Clone, Debug)]
pub struct Transform {
    position: Vec2,
    size: Vec2,
    scale: Vec2,
    angle: f32,
    pivot: Vec2,
    cache: Cell<Option<(Basis, Basis)>>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::ZERO,
            scale: Vec2::ONE,
            angle: 0.0,
            pivot: Vec2::splat(0.5),
            cache: Cell::new(None),
        }
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.size == other.size
            && self.scale == other.scale
            && self.angle == other.angle
            && self.pivot == other.pivot
    }
}

impl Transform {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            ..Default::default()
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn pivot(&self) -> Vec2 {
        self.pivot
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.cache.set(None);
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
        self.cache.set(None);
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
        self.cache.set(None);
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
        self.cache.set(None);
    }

    pub fn set_pivot(&mut self, pivot: Vec2) {
        self.pivot = pivot;
        self.cache.set(None);
    }

    /// Frame the children are placed in: translate, rotate, scale with the
    /// pivot at the origin.
    pub fn matrix(&self) -> Basis {
        self.cached().0
    }

    /// Maps the unit square onto the actor's oriented rect.
    pub fn basis(&self) -> Basis {
        self.cached().1
    }

    /// Unrotated rect of the actor in its parent's space.
    pub fn rect(&self) -> Rect {
        let size = self.size.scale(self.scale);
        let min = self.position - size.scale(self.pivot);
        Rect::new(min.x, min.y, size.x, size.y)
    }

    fn cached(&self) -> (Basis, Basis) {
        if let Some(c) = self.cache.get() {
            return c;
        }
        let matrix = Basis::translation(self.position)
            .mul(&Basis::rotation(self.angle))
            .mul(&Basis::scaling(self.scale));
        let rect = Basis::scaling(self.size).mul(&Basis::translation(-self.pivot));
        let computed = (matrix, matrix.mul(&rect));
        self.cache.set(Some(computed));
        computed
    }
}

impl ToData for Transform {
    fn to_data(&self, node: &mut DataNode) {
        node.write("position", &self.position)
            .write("size", &self.size)
            .write("scale", &self.scale)
            .write("angle", &self.angle)
            .write("pivot", &self.pivot);
    }
}

impl FromData for Transform {
    fn from_data(node: &DataNode) -> Result<Self, DataError> {
        let d = Transform::default();
        Ok(Transform {
            position: node.read_or("position", d.position),
            size: node.read_or("size", d.size),
            scale: node.read_or("scale", d.scale),
            angle: node.read_or("angle", d.angle),
            pivot: node.read_or("pivot", d.pivot),
            cache: Cell::new(None),
        })
    }
}
