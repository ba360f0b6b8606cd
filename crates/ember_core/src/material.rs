//! Material definitions.
//!
//! Materials reference samplers by index into `World::samplers`; the index
//! is the same one the project format writes out, so no translation happens
//! at the serialization boundary.

use crate::color::RgbColor;

/// A diffuse reflection channel (used for both ambient and diffuse terms).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lambertian {
    /// Reflectance coefficient.
    pub kd: f32,
    /// Reflectance color.
    pub cd: RgbColor,
    /// Index into `World::samplers`.
    pub sampler_id: usize,
}

/// A glossy specular channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Specular {
    pub ks: f32,
    pub cs: RgbColor,
    pub exp: f32,
    /// Index into `World::samplers`.
    pub sampler_id: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material {
    Matte {
        ambient: Lambertian,
        diffuse: Lambertian,
    },
    Phong {
        ambient: Lambertian,
        diffuse: Lambertian,
        specular: Specular,
    },
    Emissive {
        radiance_scale: f32,
        ce: RgbColor,
    },
}

impl Material {
    /// Type tag as written in project files.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Material::Matte { .. } => "matte",
            Material::Phong { .. } => "phong",
            Material::Emissive { .. } => "emissive",
        }
    }

    pub fn is_emissive(&self) -> bool {
        matches!(self, Material::Emissive { .. })
    }

    /// Sampler indices this material references, for validation.
    pub fn sampler_ids(&self) -> Vec<usize> {
        match self {
            Material::Matte { ambient, diffuse } => {
                vec![ambient.sampler_id, diffuse.sampler_id]
            }
            Material::Phong { ambient, diffuse, specular } => {
                vec![ambient.sampler_id, diffuse.sampler_id, specular.sampler_id]
            }
            Material::Emissive { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(sampler_id: usize) -> Lambertian {
        Lambertian { kd: 0.5, cd: RgbColor::WHITE, sampler_id }
    }

    #[test]
    fn test_sampler_ids() {
        let matte = Material::Matte { ambient: channel(0), diffuse: channel(1) };
        assert_eq!(matte.sampler_ids(), vec![0, 1]);

        let emissive = Material::Emissive { radiance_scale: 1.0, ce: RgbColor::WHITE };
        assert!(emissive.sampler_ids().is_empty());
        assert!(emissive.is_emissive());
        assert!(!matte.is_emissive());
    }
}
