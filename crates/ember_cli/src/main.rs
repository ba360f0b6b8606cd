//! Command line renderer.
//!
//! Loads a project file (or the built-in demo scene), renders it with the
//! progressive tile scheduler while reporting progress, and writes the
//! result as PNG or PPM.

use std::path::PathBuf;
use std::thread::sleep;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use ember_core::{demo, project};
use ember_render::{RenderPipeline, TracerKind};

#[derive(Parser, Debug)]
#[command(name = "ember", version, about = "Progressive tile-based CPU renderer")]
struct Args {
    /// Project file to render; the built-in demo scene when omitted
    scene: Option<PathBuf>,

    /// Worker thread count (all cores but one when omitted)
    #[arg(long)]
    threads: Option<u32>,

    /// Square tile edge in pixels
    #[arg(long, default_value_t = 16)]
    tile_size: u32,

    /// Tracer to run
    #[arg(long, default_value = "flat")]
    tracer: TracerKind,

    /// Output image path (.png, .ppm, or .pbm)
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    /// Write pixmap output as ASCII P3 instead of binary P6
    #[arg(long)]
    ascii: bool,

    /// Plot this sampler's point set instead of rendering the scene
    #[arg(long, value_name = "INDEX")]
    show_sampler: Option<usize>,

    /// Save the scene back to this project file and exit
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let world = match &args.scene {
        Some(path) => project::load(path)
            .with_context(|| format!("failed to load project \"{}\"", path.display()))?,
        None => {
            log::info!("No project file given, using the demo scene");
            demo::cornell_box()
        }
    };

    if let Some(path) = &args.save {
        project::save(path, &world)
            .with_context(|| format!("failed to save project \"{}\"", path.display()))?;
        log::info!("Saved project to \"{}\"", path.display());
        return Ok(());
    }

    let mut pipeline = RenderPipeline::new(world);
    let options = pipeline.options_mut();
    if let Some(threads) = args.threads {
        options.num_threads = threads.max(1);
    }
    options.tile_size = args.tile_size;
    options.tracer = args.tracer;

    if let Some(index) = args.show_sampler {
        let sampler = pipeline
            .world()
            .sampler(index)
            .cloned()
            .with_context(|| format!("no sampler at index {index}"))?;
        log::info!(
            "Plotting sampler {index} ({}, {} samples)",
            sampler.kind().as_str(),
            sampler.num_samples()
        );
        pipeline.show_sampler(&sampler)?;
        return export(&pipeline, &args);
    }

    pipeline.start()?;
    while pipeline.is_running() {
        log::info!(
            "{:5.1}% ({:.1}s)",
            pipeline.progress() * 100.0,
            pipeline.tracing_time()
        );
        sleep(Duration::from_millis(500));
    }
    pipeline.join();
    log::info!("Render finished in {:.2}s", pipeline.tracing_time());

    export(&pipeline, &args)
}

fn export(pipeline: &RenderPipeline, args: &Args) -> anyhow::Result<()> {
    let extension = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match extension.as_str() {
        "png" => pipeline.save_png(&args.output)?,
        "ppm" | "pbm" => pipeline.save_pbm(&args.output, !args.ascii)?,
        other => anyhow::bail!("unsupported output format \"{other}\" (use .png, .ppm, or .pbm)"),
    }
    Ok(())
}
