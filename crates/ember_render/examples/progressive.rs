//! Progressive render example.
//!
//! Renders the demo Cornell box with the gradient tracer, printing
//! progress while the workers refine the frame, then saves a PNG.

use std::thread::sleep;
use std::time::Duration;

use ember_core::demo;
use ember_render::{RenderPipeline, TracerKind};

fn main() {
    env_logger::init();

    let world = demo::cornell_box();
    println!(
        "Demo scene: {} geometries, {} lights, {}x{}",
        world.objects().len(),
        world.lights().len(),
        world.view_plane.width,
        world.view_plane.height,
    );

    let mut pipeline = RenderPipeline::new(world);
    pipeline.options_mut().tracer = TracerKind::Gradient;

    pipeline.start().expect("scene should validate");
    while pipeline.is_running() {
        println!(
            "{:5.1}% ({:.2}s)",
            pipeline.progress() * 100.0,
            pipeline.tracing_time()
        );
        sleep(Duration::from_millis(100));
    }
    pipeline.join();
    println!("Done in {:.2}s", pipeline.tracing_time());

    let filename = "progressive.png";
    pipeline.save_png(filename).expect("failed to save image");
    println!("Saved to {filename}");
}
