//! Ember render - progressive tile-based CPU rendering.
//!
//! This crate provides:
//!
//! - **Scheduling**: a static strided tile partition (`TileWalk`) driven by
//!   a fixed worker pool (`TileScheduler`)
//! - **The frame buffer**: lock-free shared pixel storage with tile-confined
//!   writers
//! - **Output**: the tonemap operator and PPM/PNG exporters
//! - **`RenderPipeline`**: the session object tying scene, frame, workers,
//!   and exports together
//!
//! # Example
//!
//! ```ignore
//! use ember_render::RenderPipeline;
//!
//! let mut pipeline = RenderPipeline::new(world);
//! pipeline.start()?;
//! while pipeline.is_running() {
//!     println!("{:.1}%", pipeline.progress() * 100.0);
//! }
//! pipeline.save_png("render.png")?;
//! ```

pub mod export;
pub mod frame;
pub mod pipeline;
pub mod scheduler;
pub mod tile;
pub mod tonemap;
pub mod tracer;

// Re-export commonly used types
pub use export::ExportError;
pub use frame::{FrameBuffer, TileWriter};
pub use pipeline::{default_num_threads, PipelineError, RenderOptions, RenderPipeline};
pub use scheduler::{SchedulerConfig, TileScheduler};
pub use tile::{Tile, TileWalk, WalkStep};
pub use tonemap::tonemap;
pub use tracer::{create_tracer, TileTracer, TracerKind};
