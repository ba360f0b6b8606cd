//! Scene geometry.

use glam::Vec3;

/// A flat rectangle defined by a corner point and two side vectors.
///
/// The squared side lengths and inverse area are derived values; call
/// `update_dimensions` after mutating the sides (the project loader does
/// this after filling in the serialized fields).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rectangle {
    pub point: Vec3,
    pub side_a: Vec3,
    pub side_b: Vec3,
    pub normal: Vec3,
    a_len_squared: f32,
    b_len_squared: f32,
    inv_area: f32,
}

impl Rectangle {
    pub fn new(point: Vec3, side_a: Vec3, side_b: Vec3, normal: Vec3) -> Self {
        let mut rect = Self {
            point,
            side_a,
            side_b,
            normal,
            a_len_squared: 0.0,
            b_len_squared: 0.0,
            inv_area: 0.0,
        };
        rect.update_dimensions();
        rect
    }

    /// Recompute the derived side lengths and inverse area.
    pub fn update_dimensions(&mut self) {
        self.a_len_squared = self.side_a.length_squared();
        self.b_len_squared = self.side_b.length_squared();
        let area = self.side_a.length() * self.side_b.length();
        self.inv_area = if area > 0.0 { 1.0 / area } else { 0.0 };
    }

    pub fn inv_area(&self) -> f32 {
        self.inv_area
    }

    pub fn a_len_squared(&self) -> f32 {
        self.a_len_squared
    }

    pub fn b_len_squared(&self) -> f32 {
        self.b_len_squared
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Plane { point: Vec3, normal: Vec3 },
    Sphere { center: Vec3, radius: f32 },
    Rectangle(Rectangle),
}

impl Shape {
    /// Type tag as written in project files.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Shape::Plane { .. } => "plane",
            Shape::Sphere { .. } => "sphere",
            Shape::Rectangle(_) => "rectangle",
        }
    }
}

/// A geometry object: a shape bound to a material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub shape: Shape,
    pub cast_shadows: bool,
    /// Index into `World::materials`.
    pub material_id: usize,
}

impl Geometry {
    pub fn new(shape: Shape, material_id: usize) -> Self {
        Self { shape, cast_shadows: true, material_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_dimensions() {
        let rect = Rectangle::new(
            Vec3::ZERO,
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 4.0, 0.0),
            Vec3::Z,
        );
        assert_eq!(rect.a_len_squared(), 4.0);
        assert_eq!(rect.b_len_squared(), 16.0);
        assert!((rect.inv_area() - 1.0 / 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_rectangle_recompute() {
        let mut rect = Rectangle::new(Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z);
        rect.side_a = Vec3::new(3.0, 0.0, 0.0);
        rect.update_dimensions();
        assert_eq!(rect.a_len_squared(), 9.0);
        assert!((rect.inv_area() - 1.0 / 3.0).abs() < 1e-6);
    }
}
