//! The render worker pool.
//!
//! One OS thread per worker, each driving its own `TileWalk`. The
//! partition is decided entirely by `(thread_id, num_threads)`, so the
//! workers share no queue and never contend: the only shared state is the
//! frame buffer (written through disjoint `TileWriter`s), a stop flag, and
//! one progress word per worker.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use ember_core::World;

use crate::frame::{FrameBuffer, TileWriter};
use crate::tile::{TileWalk, WalkStep};
use crate::tracer::TileTracer;

#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub num_threads: u32,
    pub tile_size: u32,
    /// Number of progressive sample passes requested by the caller.
    pub max_samples: u32,
}

/// A render in flight (or finished) over a fixed worker pool.
///
/// Dropping the scheduler stops and joins the workers.
pub struct TileScheduler {
    stop: Arc<AtomicBool>,
    progress: Arc<[AtomicU32]>,
    workers: Vec<JoinHandle<()>>,
}

impl TileScheduler {
    /// Spawn the workers and start rendering immediately.
    ///
    /// The frame buffer must match the world's view plane resolution, and
    /// the caller is responsible for having reset it if a fresh
    /// accumulation is wanted.
    pub fn start(
        config: SchedulerConfig,
        world: Arc<World>,
        frame: Arc<FrameBuffer>,
        tracer: Arc<dyn TileTracer>,
    ) -> Self {
        assert!(config.num_threads >= 1, "need at least one worker");
        assert!(config.tile_size >= 1, "tile size must be positive");
        assert!(config.max_samples >= 1, "need at least one sample pass");
        assert_eq!(frame.width(), world.view_plane.width, "frame width mismatch");
        assert_eq!(frame.height(), world.view_plane.height, "frame height mismatch");

        let stop = Arc::new(AtomicBool::new(false));
        let progress: Arc<[AtomicU32]> = (0..config.num_threads)
            .map(|_| AtomicU32::new(0))
            .collect();

        log::debug!(
            "Starting {} worker(s), tile size {}, {} sample pass(es)",
            config.num_threads,
            config.tile_size,
            config.max_samples
        );

        let workers = (0..config.num_threads)
            .map(|id| {
                let stop = Arc::clone(&stop);
                let progress = Arc::clone(&progress);
                let world = Arc::clone(&world);
                let frame = Arc::clone(&frame);
                let tracer = Arc::clone(&tracer);
                std::thread::spawn(move || {
                    worker_loop(id, config, &stop, &progress, &world, &frame, &*tracer)
                })
            })
            .collect();

        Self { stop, progress, workers }
    }

    /// Mean progress across workers, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        let sum: f32 = self
            .progress
            .iter()
            .map(|p| f32::from_bits(p.load(Ordering::Relaxed)))
            .sum();
        sum / self.progress.len() as f32
    }

    /// One worker's last-published progress; `0.0` for an out-of-range id.
    pub fn worker_progress(&self, thread_id: u32) -> f32 {
        self.progress
            .get(thread_id as usize)
            .map_or(0.0, |p| f32::from_bits(p.load(Ordering::Relaxed)))
    }

    /// True while any worker is still running.
    pub fn is_running(&self) -> bool {
        self.workers.iter().any(|w| !w.is_finished())
    }

    /// Ask the workers to stop after their current tile, then join them.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.join();
    }

    /// Wait for the workers to run their schedule to completion.
    pub fn join(&mut self) {
        for worker in self.workers.drain(..) {
            // A worker only panics on a tracer bug; propagate it.
            if let Err(payload) = worker.join() {
                std::panic::resume_unwind(payload);
            }
        }
    }
}

impl Drop for TileScheduler {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.stop();
        }
    }
}

fn worker_loop(
    id: u32,
    config: SchedulerConfig,
    stop: &AtomicBool,
    progress: &[AtomicU32],
    world: &World,
    frame: &FrameBuffer,
    tracer: &dyn TileTracer,
) {
    let mut walk = TileWalk::new(
        id,
        config.num_threads,
        frame.width(),
        frame.height(),
        config.tile_size,
        config.max_samples,
    );

    loop {
        if stop.load(Ordering::Relaxed) {
            log::debug!("Worker {id} stopped at {:.1}%", walk.progress() * 100.0);
            break;
        }
        match walk.step() {
            WalkStep::Tile { tile, sample } => {
                if !tile.is_empty() {
                    let mut writer = TileWriter::new(frame, tile);
                    tracer.render_tile(world, &mut writer, sample, true);
                }
                progress[id as usize].store(walk.progress().to_bits(), Ordering::Relaxed);
            }
            WalkStep::Finished => {
                progress[id as usize].store(1.0f32.to_bits(), Ordering::Relaxed);
                log::debug!("Worker {id} finished");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracer::{create_tracer, TracerKind};
    use ember_core::{RgbColor, Sampler, SamplerKind};

    fn test_world(width: u32, height: u32) -> Arc<World> {
        let mut world = World::new();
        let sampler = world.add_sampler(Sampler::new(SamplerKind::Regular, 1));
        world.view_plane.sampler_id = Some(sampler);
        world.view_plane.set_dimensions(width, height);
        world.background = RgbColor::new(0.2, 0.4, 0.6);
        Arc::new(world)
    }

    #[test]
    fn test_full_render_covers_every_pixel() {
        let world = test_world(50, 38);
        let frame = Arc::new(FrameBuffer::new(50, 38));
        let config = SchedulerConfig { num_threads: 3, tile_size: 16, max_samples: 1 };
        let mut scheduler = TileScheduler::start(
            config,
            Arc::clone(&world),
            Arc::clone(&frame),
            create_tracer(TracerKind::Flat),
        );
        scheduler.join();

        assert_eq!(scheduler.progress(), 1.0);
        assert_eq!(scheduler.worker_progress(0), 1.0);
        assert_eq!(scheduler.worker_progress(99), 0.0);
        assert!(!scheduler.is_running());
        for y in 0..38 {
            for x in 0..50 {
                assert_eq!(frame.get(x, y), world.background, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_accumulation_is_stable_across_passes() {
        // Averaging identical passes must not drift the value.
        let world = test_world(20, 20);
        let frame = Arc::new(FrameBuffer::new(20, 20));
        let config = SchedulerConfig { num_threads: 2, tile_size: 8, max_samples: 4 };
        let mut scheduler = TileScheduler::start(
            config,
            Arc::clone(&world),
            Arc::clone(&frame),
            create_tracer(TracerKind::Flat),
        );
        scheduler.join();

        let pixel = frame.get(10, 10);
        assert!((pixel.r - 0.2).abs() < 1e-4);
        assert!((pixel.g - 0.4).abs() < 1e-4);
        assert!((pixel.b - 0.6).abs() < 1e-4);
    }

    #[test]
    fn test_stop_terminates_promptly() {
        let world = test_world(64, 64);
        let frame = Arc::new(FrameBuffer::new(64, 64));
        let config = SchedulerConfig { num_threads: 2, tile_size: 4, max_samples: 100_000 };
        let mut scheduler = TileScheduler::start(
            config,
            world,
            frame,
            create_tracer(TracerKind::Gradient),
        );
        scheduler.stop();
        assert!(!scheduler.is_running());
        assert!(scheduler.progress() < 1.0);
    }

    #[test]
    #[should_panic(expected = "frame width mismatch")]
    fn test_rejects_mismatched_frame() {
        let world = test_world(32, 32);
        let frame = Arc::new(FrameBuffer::new(16, 16));
        let config = SchedulerConfig { num_threads: 1, tile_size: 16, max_samples: 1 };
        TileScheduler::start(config, world, frame, create_tracer(TracerKind::Flat));
    }
}
