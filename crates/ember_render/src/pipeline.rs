//! The top-level render session.
//!
//! `RenderPipeline` ties a scene to a frame buffer and a worker pool:
//! start and stop renders, poll progress and elapsed time, preview the
//! frame as display bytes, and export it. The scene and the frame are
//! shared with the workers through `Arc`, so every mutating operation is
//! gated on no render being in flight.

use std::cell::Cell;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use ember_core::{RgbColor, SampleState, Sampler, World, WorldError};

use crate::export::{self, ExportError};
use crate::frame::FrameBuffer;
use crate::scheduler::{SchedulerConfig, TileScheduler};
use crate::tonemap::tonemap;
use crate::tracer::{create_tracer, TracerKind};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("a render is in flight")]
    RenderInFlight,

    #[error("scene error: {0}")]
    Scene(#[from] WorldError),

    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

/// Knobs for the next render; changes take effect at `start`.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub num_threads: u32,
    pub tile_size: u32,
    pub tracer: TracerKind,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            num_threads: default_num_threads(),
            tile_size: 16,
            tracer: TracerKind::Flat,
        }
    }
}

/// All cores but one, leaving one for the caller's own loop.
pub fn default_num_threads() -> u32 {
    let cores = std::thread::available_parallelism().map_or(1, |n| n.get() as u32);
    cores.saturating_sub(1).max(1)
}

pub struct RenderPipeline {
    world: Arc<World>,
    frame: Arc<FrameBuffer>,
    options: RenderOptions,
    scheduler: Option<TileScheduler>,
    start_time: Option<Instant>,
    /// Latched elapsed render seconds; only advances while workers run.
    elapsed: Cell<f32>,
}

impl RenderPipeline {
    pub fn new(world: World) -> Self {
        let width = world.view_plane.width;
        let height = world.view_plane.height;
        Self {
            world: Arc::new(world),
            frame: Arc::new(FrameBuffer::new(width, height)),
            options: RenderOptions::default(),
            scheduler: None,
            start_time: None,
            elapsed: Cell::new(0.0),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the scene; fails while a render is in flight.
    pub fn world_mut(&mut self) -> Result<&mut World, PipelineError> {
        self.reap();
        if self.scheduler.is_some() {
            return Err(PipelineError::RenderInFlight);
        }
        Arc::get_mut(&mut self.world).ok_or(PipelineError::RenderInFlight)
    }

    /// Swap in a new scene wholesale, e.g. one returned by a project load.
    ///
    /// The frame buffer is matched to the new view plane at the next
    /// `start`.
    pub fn replace_world(&mut self, world: World) -> Result<(), PipelineError> {
        self.reap();
        if self.scheduler.is_some() {
            return Err(PipelineError::RenderInFlight);
        }
        self.world = Arc::new(world);
        Ok(())
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut RenderOptions {
        &mut self.options
    }

    /// Match the frame buffer and view plane to a new resolution.
    ///
    /// The buffer is only reallocated when the pixel count actually
    /// changes; a pure aspect change (say 200x100 to 100x200) reuses the
    /// allocation and keeps its stale contents until the next reset or
    /// render.
    pub fn resize_frame(&mut self, width: u32, height: u32) -> Result<(), PipelineError> {
        self.world_mut()?.view_plane.set_dimensions(width, height);

        let pixels = width as usize * height as usize;
        if pixels != self.frame.num_pixels() {
            self.frame = Arc::new(FrameBuffer::new(width, height));
            log::debug!("Frame buffer reallocated at {width}x{height}");
        }
        Ok(())
    }

    /// Zero the frame buffer. Never implicit; `start` accumulates over
    /// whatever the buffer holds unless the caller resets first.
    pub fn reset_frame(&mut self) -> Result<(), PipelineError> {
        self.reap();
        let frame = Arc::get_mut(&mut self.frame).ok_or(PipelineError::RenderInFlight)?;
        frame.reset();
        Ok(())
    }

    /// Validate the scene and launch the worker pool.
    pub fn start(&mut self) -> Result<(), PipelineError> {
        self.reap();
        if self.scheduler.is_some() {
            return Err(PipelineError::RenderInFlight);
        }

        self.world.validate()?;
        let sampler = self
            .world
            .view_plane_sampler()
            .ok_or(WorldError::MissingViewPlaneSampler)?;
        let max_samples = sampler.num_samples();

        if self.frame.width() != self.world.view_plane.width
            || self.frame.height() != self.world.view_plane.height
        {
            self.frame = Arc::new(FrameBuffer::new(
                self.world.view_plane.width,
                self.world.view_plane.height,
            ));
        }

        let config = SchedulerConfig {
            num_threads: self.options.num_threads,
            tile_size: self.options.tile_size,
            max_samples,
        };
        log::info!(
            "Rendering {}x{} with {} thread(s), {} sample(s), tracer \"{}\"",
            self.frame.width(),
            self.frame.height(),
            config.num_threads,
            config.max_samples,
            self.options.tracer.as_str()
        );

        self.elapsed.set(0.0);
        self.start_time = Some(Instant::now());
        self.scheduler = Some(TileScheduler::start(
            config,
            Arc::clone(&self.world),
            Arc::clone(&self.frame),
            create_tracer(self.options.tracer),
        ));
        Ok(())
    }

    /// Stop the render after the workers' current tiles and join them.
    pub fn stop(&mut self) {
        if let Some(mut scheduler) = self.scheduler.take() {
            self.tracing_time();
            scheduler.stop();
            log::info!("Rendering stopped after {:.2}s", self.elapsed.get());
        }
    }

    /// Block until the current render runs to completion.
    pub fn join(&mut self) {
        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.join();
            if let Some(start) = self.start_time {
                self.elapsed.set(start.elapsed().as_secs_f32());
            }
            log::info!("Rendering finished in {:.2}s", self.elapsed.get());
        }
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.as_ref().is_some_and(TileScheduler::is_running)
    }

    /// Mean worker progress in `[0, 1]`; `0.0` before the first start.
    pub fn progress(&self) -> f32 {
        self.scheduler.as_ref().map_or(0.0, TileScheduler::progress)
    }

    /// Seconds the current (or last) render has been tracing.
    ///
    /// Advances while workers run and latches at its final value once they
    /// stop.
    pub fn tracing_time(&self) -> f32 {
        if self.is_running() {
            if let Some(start) = self.start_time {
                self.elapsed.set(start.elapsed().as_secs_f32());
            }
        }
        self.elapsed.get()
    }

    /// Fill `out` with display bytes, three per pixel, frame row order.
    ///
    /// Safe to call while a render is in flight; pixels mid-accumulation
    /// show their current running average.
    pub fn copy_tonemapped(&self, out: &mut [u8]) {
        let width = self.frame.width();
        let height = self.frame.height();
        assert_eq!(out.len(), width as usize * height as usize * 3, "output buffer size mismatch");

        let inv_gamma = self.world.view_plane.inv_gamma();
        for y in 0..height {
            for x in 0..width {
                let offset = (y as usize * width as usize + x as usize) * 3;
                out[offset..offset + 3].copy_from_slice(&tonemap(self.frame.get(x, y), inv_gamma));
            }
        }
    }

    pub fn save_pbm(&self, path: impl AsRef<Path>, binary: bool) -> Result<(), PipelineError> {
        export::write_pbm(path, &self.frame, self.world.view_plane.inv_gamma(), binary)?;
        Ok(())
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), PipelineError> {
        export::write_png(path, &self.frame, self.world.view_plane.inv_gamma())?;
        Ok(())
    }

    /// Plot a sampler's point set into the frame for visual inspection.
    ///
    /// Points land in the largest centered square of the frame, drawn
    /// white; for a non-square frame the square's sides are marked in
    /// magenta.
    pub fn show_sampler(&mut self, sampler: &Sampler) -> Result<(), PipelineError> {
        self.reap();
        let width = self.world.view_plane.width;
        let height = self.world.view_plane.height;
        let frame = Arc::get_mut(&mut self.frame).ok_or(PipelineError::RenderInFlight)?;

        let min_dim = width.min(height);
        let half_diff = (width.max(height) - min_dim) / 2;
        let landscape = width > min_dim;

        if width != height {
            let magenta = RgbColor::new(1.0, 0.0, 1.0);
            for i in 0..min_dim {
                if landscape {
                    frame.set(half_diff, i, magenta);
                    frame.set(half_diff + min_dim - 1, i, magenta);
                } else {
                    frame.set(i, half_diff, magenta);
                    frame.set(i, half_diff + min_dim - 1, magenta);
                }
            }
        }

        let mut state = SampleState::default();
        for _ in 0..sampler.num_samples() {
            let point = sampler.sample_unit_square(&mut state);
            let x = (point.x * min_dim as f32) as u32;
            let y = (point.y * min_dim as f32) as u32;
            let (x, y) = if landscape { (half_diff + x, y) } else { (x, half_diff + y) };
            frame.set(x.min(width - 1), y.min(height - 1), RgbColor::WHITE);
        }
        Ok(())
    }

    /// Drop the scheduler once its workers have finished, releasing the
    /// shared references to the world and the frame.
    fn reap(&mut self) {
        if self.scheduler.as_ref().is_some_and(|s| !s.is_running()) {
            if let Some(mut scheduler) = self.scheduler.take() {
                scheduler.join();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::SamplerKind;

    fn test_world() -> World {
        let mut world = World::new();
        let sampler = world.add_sampler(Sampler::new(SamplerKind::Regular, 4));
        world.view_plane.sampler_id = Some(sampler);
        world.view_plane.set_dimensions(40, 30);
        world.background = RgbColor::new(0.1, 0.2, 0.3);
        world
    }

    fn finished_pipeline() -> RenderPipeline {
        let mut pipeline = RenderPipeline::new(test_world());
        pipeline.options_mut().num_threads = 2;
        pipeline.start().unwrap();
        pipeline.join();
        pipeline
    }

    #[test]
    fn test_render_to_completion() {
        let pipeline = finished_pipeline();
        assert!(!pipeline.is_running());
        assert_eq!(pipeline.frame().get(0, 0), RgbColor::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_world_mut_allowed_after_join() {
        let mut pipeline = finished_pipeline();
        pipeline.world_mut().unwrap().background = RgbColor::WHITE;
        assert_eq!(pipeline.world().background, RgbColor::WHITE);
    }

    #[test]
    fn test_replace_world_resizes_on_next_start() {
        let mut pipeline = finished_pipeline();

        let mut world = test_world();
        world.view_plane.set_dimensions(16, 16);
        world.background = RgbColor::WHITE;
        pipeline.replace_world(world).unwrap();

        pipeline.start().unwrap();
        pipeline.join();
        assert_eq!(pipeline.frame().width(), 16);
        assert_eq!(pipeline.frame().get(8, 8), RgbColor::WHITE);
    }

    #[test]
    fn test_start_rejects_invalid_scene() {
        let mut world = test_world();
        world.view_plane.sampler_id = None;
        let mut pipeline = RenderPipeline::new(world);
        assert!(matches!(
            pipeline.start(),
            Err(PipelineError::Scene(WorldError::MissingViewPlaneSampler))
        ));
    }

    #[test]
    fn test_resize_reallocates_only_on_pixel_count_change() {
        let mut pipeline = RenderPipeline::new(test_world());
        pipeline.frame();

        // Same pixel count, swapped aspect: allocation is reused.
        pipeline.resize_frame(30, 40).unwrap();
        assert_eq!(pipeline.frame().width(), 40);
        assert_eq!(pipeline.world().view_plane.width, 30);

        pipeline.resize_frame(10, 10).unwrap();
        assert_eq!(pipeline.frame().width(), 10);
        assert_eq!(pipeline.frame().num_pixels(), 100);
    }

    #[test]
    fn test_reset_frame_is_explicit() {
        let mut pipeline = finished_pipeline();
        assert_ne!(pipeline.frame().get(5, 5), RgbColor::BLACK);
        pipeline.reset_frame().unwrap();
        assert_eq!(pipeline.frame().get(5, 5), RgbColor::BLACK);
    }

    #[test]
    fn test_copy_tonemapped_size_and_content() {
        let pipeline = finished_pipeline();
        let mut bytes = vec![0u8; 40 * 30 * 3];
        pipeline.copy_tonemapped(&mut bytes);
        // Background (0.1, 0.2, 0.3) maps to nonzero display bytes.
        assert!(bytes[0] > 0);
        assert!(bytes[2] > bytes[0]);
    }

    #[test]
    fn test_tracing_time_latches() {
        let mut pipeline = finished_pipeline();
        let after_join = pipeline.tracing_time();
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert_eq!(pipeline.tracing_time(), after_join);
        pipeline.stop();
        assert_eq!(pipeline.tracing_time(), after_join);
    }

    #[test]
    fn test_show_sampler_plots_points() {
        let mut pipeline = RenderPipeline::new(test_world());
        let sampler = Sampler::new(SamplerKind::MultiJittered, 16);
        pipeline.show_sampler(&sampler).unwrap();

        let frame = pipeline.frame();
        let mut white = 0;
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                if frame.get(x, y) == RgbColor::WHITE {
                    white += 1;
                }
            }
        }
        // Distinct points may collide on a small frame, but some must land.
        assert!(white > 0);
        // Landscape frame: magenta markers on the centered square's sides.
        assert_eq!(pipeline.frame().get(5, 0), RgbColor::new(1.0, 0.0, 1.0));
    }
}
