//! Ember core - scene graph and project persistence.
//!
//! This crate provides:
//!
//! - **Scene graph types**: `World` and the samplers, materials, geometries,
//!   and lights it owns, cross referenced by collection index
//! - **Project persistence**: the versioned Lua-table project format
//!
//! # Example
//!
//! ```ignore
//! use ember_core::project;
//!
//! let world = project::load("scene.lua")?;
//! println!(
//!     "Loaded {} geometries, {} lights",
//!     world.objects().len(),
//!     world.lights().len(),
//! );
//! ```

pub mod color;
pub mod demo;
pub mod geometry;
pub mod light;
pub mod material;
pub mod project;
pub mod sampler;
pub mod view_plane;
pub mod world;

// Re-export commonly used types
pub use color::RgbColor;
pub use geometry::{Geometry, Rectangle, Shape};
pub use light::Light;
pub use material::{Lambertian, Material, Specular};
pub use sampler::{SampleState, Sampler, SamplerKind};
pub use view_plane::ViewPlane;
pub use world::{World, WorldError};
