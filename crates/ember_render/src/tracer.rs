//! The tracer contract and the built-in diagnostic tracers.
//!
//! Real integrators (ray cast, Whitted, path trace, ...) live outside this
//! crate and implement `TileTracer`; the scheduler only needs the contract:
//! synchronous, confined to the given tile (enforced by `TileWriter`), and
//! safe to call concurrently for non-overlapping tiles.

use std::str::FromStr;
use std::sync::Arc;

use ember_core::{RgbColor, World};

use crate::frame::TileWriter;

/// A per-tile pixel integrator.
pub trait TileTracer: Send + Sync {
    /// Render the writer's tile for one sample pass.
    ///
    /// When `accumulate` is set, the tracer must combine its result with
    /// whatever the pixel already holds from passes `0..sample_pass`; the
    /// usual policy is the running average implemented by [`blend_sample`].
    fn render_tile(
        &self,
        world: &World,
        writer: &mut TileWriter<'_>,
        sample_pass: u32,
        accumulate: bool,
    );
}

/// Fold one pass's value into a pixel as a running average over passes.
pub fn blend_sample(previous: RgbColor, sample_pass: u32, value: RgbColor, accumulate: bool) -> RgbColor {
    if accumulate && sample_pass > 0 {
        let n = sample_pass as f32;
        (previous * n + value) / (n + 1.0)
    } else {
        value
    }
}

/// Tags for the tracers this crate can construct itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracerKind {
    /// Fill with the scene background color.
    Flat,
    /// Screen-space UV ramp; handy for checking tile coverage and export
    /// orientation.
    Gradient,
}

impl TracerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TracerKind::Flat => "flat",
            TracerKind::Gradient => "gradient",
        }
    }
}

impl FromStr for TracerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(TracerKind::Flat),
            "gradient" => Ok(TracerKind::Gradient),
            other => Err(format!("unknown tracer \"{other}\"")),
        }
    }
}

/// Construct a tracer by tag.
pub fn create_tracer(kind: TracerKind) -> Arc<dyn TileTracer> {
    match kind {
        TracerKind::Flat => Arc::new(FlatTracer),
        TracerKind::Gradient => Arc::new(GradientTracer),
    }
}

struct FlatTracer;

impl TileTracer for FlatTracer {
    fn render_tile(
        &self,
        world: &World,
        writer: &mut TileWriter<'_>,
        sample_pass: u32,
        accumulate: bool,
    ) {
        let tile = writer.tile();
        for y in tile.y..tile.y + tile.height {
            for x in tile.x..tile.x + tile.width {
                let previous = writer.get(x, y);
                let value = blend_sample(previous, sample_pass, world.background, accumulate);
                writer.set(x, y, value);
            }
        }
    }
}

struct GradientTracer;

impl TileTracer for GradientTracer {
    fn render_tile(
        &self,
        world: &World,
        writer: &mut TileWriter<'_>,
        sample_pass: u32,
        accumulate: bool,
    ) {
        let width = world.view_plane.width.max(1) as f32;
        let height = world.view_plane.height.max(1) as f32;
        let tile = writer.tile();
        for y in tile.y..tile.y + tile.height {
            for x in tile.x..tile.x + tile.width {
                let value = RgbColor::new(x as f32 / width, y as f32 / height, 0.25);
                let previous = writer.get(x, y);
                writer.set(x, y, blend_sample(previous, sample_pass, value, accumulate));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_sample_running_average() {
        let first = blend_sample(RgbColor::BLACK, 0, RgbColor::WHITE, true);
        assert_eq!(first, RgbColor::WHITE);

        // Second pass averages the two values.
        let second = blend_sample(first, 1, RgbColor::BLACK, true);
        assert_eq!(second, RgbColor::new(0.5, 0.5, 0.5));

        // Without accumulation the new value replaces the old one.
        let replaced = blend_sample(first, 1, RgbColor::BLACK, false);
        assert_eq!(replaced, RgbColor::BLACK);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("flat".parse::<TracerKind>().unwrap(), TracerKind::Flat);
        assert_eq!("gradient".parse::<TracerKind>().unwrap(), TracerKind::Gradient);
        assert!("whitted".parse::<TracerKind>().is_err());
    }
}
