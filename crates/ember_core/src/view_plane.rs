//! The virtual image plane.

/// Resolution, pixel size, gamma, trace depth, and the antialiasing sampler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewPlane {
    pub width: u32,
    pub height: u32,
    /// World units per pixel.
    pub pixel_size: f32,
    pub gamma: f32,
    /// Maximum recursion depth for tracers.
    pub max_depth: u32,
    /// Index into `World::samplers`. A view plane with no sampler cannot
    /// be rendered.
    pub sampler_id: Option<usize>,
}

impl Default for ViewPlane {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            pixel_size: 1.0,
            gamma: 1.0,
            max_depth: 1,
            sampler_id: None,
        }
    }
}

impl ViewPlane {
    pub fn set_dimensions(&mut self, width: u32, height: u32) {
        assert!(width > 0 && height > 0, "view plane dimensions must be positive");
        self.width = width;
        self.height = height;
    }

    /// `1 / gamma`, the exponent applied by the tonemap.
    pub fn inv_gamma(&self) -> f32 {
        1.0 / self.gamma
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inv_gamma() {
        let mut vp = ViewPlane::default();
        vp.gamma = 2.0;
        assert_eq!(vp.inv_gamma(), 0.5);
    }
}
