//! Light definitions.
//!
//! Area lights borrow their emission geometry from `World::objects` and
//! environment lights borrow an emissive material from `World::materials`,
//! both by index; neither owns the referenced entity.

use glam::Vec3;

use crate::color::RgbColor;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Directional {
        cast_shadows: bool,
        radiance_scale: f32,
        color: RgbColor,
        direction: Vec3,
    },
    Point {
        cast_shadows: bool,
        radiance_scale: f32,
        color: RgbColor,
        location: Vec3,
    },
    Ambient {
        cast_shadows: bool,
        radiance_scale: f32,
        color: RgbColor,
    },
    AmbientOccluder {
        cast_shadows: bool,
        radiance_scale: f32,
        color: RgbColor,
        min_amount: RgbColor,
        /// Index into `World::samplers`.
        sampler_id: usize,
    },
    Area {
        cast_shadows: bool,
        /// Index into `World::objects`.
        object_id: usize,
    },
    Environment {
        cast_shadows: bool,
        /// Index into `World::materials`; must resolve to an emissive material.
        material_id: usize,
    },
}

impl Light {
    /// Type tag as written in project files.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Light::Directional { .. } => "directional",
            Light::Point { .. } => "point",
            Light::Ambient { .. } => "ambient",
            Light::AmbientOccluder { .. } => "ambient_occluder",
            Light::Area { .. } => "area",
            Light::Environment { .. } => "environment",
        }
    }

    pub fn cast_shadows(&self) -> bool {
        match *self {
            Light::Directional { cast_shadows, .. }
            | Light::Point { cast_shadows, .. }
            | Light::Ambient { cast_shadows, .. }
            | Light::AmbientOccluder { cast_shadows, .. }
            | Light::Area { cast_shadows, .. }
            | Light::Environment { cast_shadows, .. } => cast_shadows,
        }
    }
}
