//! Linear RGB color type.
//!
//! The frame buffer, material channels, and lights all store radiance as
//! linear `RgbColor` triples. Conversion to display bytes happens only at
//! the tonemap boundary in `ember_render`.

use std::ops::{Add, AddAssign, Div, Mul, Sub};

/// A linear RGB triple.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RgbColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor::new(0.0, 0.0, 0.0);
    pub const WHITE: RgbColor = RgbColor::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Raise every channel to the given power (gamma correction).
    pub fn powf(self, exp: f32) -> Self {
        Self::new(self.r.powf(exp), self.g.powf(exp), self.b.powf(exp))
    }

    /// Largest channel value.
    pub fn max_channel(self) -> f32 {
        self.r.max(self.g).max(self.b)
    }
}

impl Add for RgbColor {
    type Output = RgbColor;
    fn add(self, rhs: RgbColor) -> RgbColor {
        RgbColor::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for RgbColor {
    fn add_assign(&mut self, rhs: RgbColor) {
        *self = *self + rhs;
    }
}

impl Sub for RgbColor {
    type Output = RgbColor;
    fn sub(self, rhs: RgbColor) -> RgbColor {
        RgbColor::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

impl Mul for RgbColor {
    type Output = RgbColor;
    fn mul(self, rhs: RgbColor) -> RgbColor {
        RgbColor::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl Mul<f32> for RgbColor {
    type Output = RgbColor;
    fn mul(self, rhs: f32) -> RgbColor {
        RgbColor::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

impl Div for RgbColor {
    type Output = RgbColor;
    fn div(self, rhs: RgbColor) -> RgbColor {
        RgbColor::new(self.r / rhs.r, self.g / rhs.g, self.b / rhs.b)
    }
}

impl Div<f32> for RgbColor {
    type Output = RgbColor;
    fn div(self, rhs: f32) -> RgbColor {
        RgbColor::new(self.r / rhs, self.g / rhs, self.b / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a = RgbColor::new(0.25, 0.5, 1.0);
        let b = RgbColor::new(0.5, 0.5, 0.5);

        assert_eq!(a + b, RgbColor::new(0.75, 1.0, 1.5));
        assert_eq!(a * b, RgbColor::new(0.125, 0.25, 0.5));
        assert_eq!(a * 2.0, RgbColor::new(0.5, 1.0, 2.0));
        assert_eq!(a / 2.0, RgbColor::new(0.125, 0.25, 0.5));
    }

    #[test]
    fn test_powf() {
        let c = RgbColor::new(0.25, 1.0, 0.0).powf(0.5);
        assert!((c.r - 0.5).abs() < 1e-6);
        assert!((c.g - 1.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn test_max_channel() {
        assert_eq!(RgbColor::new(0.1, 0.9, 0.4).max_channel(), 0.9);
    }
}
