//! Giftcard Gestures - headless scene runner
//!
//! Drives a scene from a recorded landmark capture (JSON lines) or from the
//! scripted grab/hold/release demo, and prints the events it produces.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use giftcard_gestures::core::error::Result;
use giftcard_gestures::core::{load_scene_config, load_scene_preset, Seconds, Tick};
use giftcard_gestures::landmarks::{LandmarkSource, RecordedSource, ScriptedSource};
use giftcard_gestures::scene::{Scene, SceneEvent, TracingListener};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Run a gift-card scene headless and report its events
#[derive(Parser, Debug)]
#[command(name = "giftcard_gestures")]
#[command(about = "Run a gesture-driven scene headless and report its events")]
struct Args {
    /// Scene preset (data/scenes/<name>.toml, else built in)
    #[arg(long, default_value = "photo_tree")]
    preset: String,

    /// Scene TOML file; overrides --preset
    #[arg(long)]
    config: Option<PathBuf>,

    /// Landmark capture, one JSON frame per line. Without it the scripted
    /// grab/hold/release demo runs.
    #[arg(long)]
    recording: Option<PathBuf>,

    /// Ticks to run (defaults to the length of the input)
    #[arg(long)]
    ticks: Option<u64>,

    /// Ticks per second of simulated wall-clock time
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Random seed for reproducible particle seeding
    #[arg(long)]
    seed: Option<u64>,

    /// Demo cycles when no recording is given
    #[arg(long, default_value_t = 2)]
    cycles: usize,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Serialize)]
struct TimedEvent {
    tick: Tick,
    time: Seconds,
    #[serde(flatten)]
    event: SceneEvent,
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    scene: String,
    ticks: u64,
    duration: Seconds,
    locks: usize,
    releases: usize,
    completions: usize,
    strikes: usize,
    final_ambient_angle: f32,
    events: Vec<TimedEvent>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "giftcard_gestures=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_scene_config(path)?,
        None => load_scene_preset(&args.preset)?,
    };
    if args.seed.is_some() {
        config.transition.seed = args.seed;
    }
    let fps = if args.fps > 0.0 { args.fps } else { 60.0 };

    let (mut source, input_ticks): (Box<dyn LandmarkSource>, u64) = match &args.recording {
        Some(path) => {
            let recording = RecordedSource::from_path(path)?;
            tracing::info!("Replaying {} frames from {}", recording.len(), path.display());
            let len = recording.len() as u64;
            (Box::new(recording), len)
        }
        None => {
            let demo = ScriptedSource::grab_release_demo(args.cycles);
            let len = (demo.duration() * fps).ceil() as u64;
            (Box::new(demo), len)
        }
    };
    let ticks = args.ticks.unwrap_or(input_ticks);

    let mut scene = Scene::from_config(config)?;
    scene.add_listener(Box::new(TracingListener));
    tracing::info!("Running '{}' for {} ticks at {} fps", scene.config().name, ticks, fps);

    let mut events = Vec::new();
    let mut last_angle = 0.0;
    for tick in 0..ticks {
        let now = tick as f64 / fps;
        let landmarks = source.poll(now);
        let frame = scene.tick(&landmarks, now);
        last_angle = frame.ambient_angle;
        for event in frame.events {
            if args.format == Format::Text {
                println!("[{:>8.3}s] {:?}", now, event);
            }
            events.push(TimedEvent {
                tick,
                time: now,
                event,
            });
        }
    }

    let count = |pred: fn(&SceneEvent) -> bool| events.iter().filter(|e| pred(&e.event)).count();
    let summary = RunSummary {
        scene: scene.config().name.clone(),
        ticks,
        duration: ticks as f64 / fps,
        locks: count(|e| matches!(e, SceneEvent::Locked { .. })),
        releases: count(|e| matches!(e, SceneEvent::Released { .. })),
        completions: count(|e| matches!(e, SceneEvent::TransitionCompleted { .. })),
        strikes: count(|e| matches!(e, SceneEvent::StrikeTriggered { .. })),
        final_ambient_angle: last_angle,
        events: Vec::new(),
    };

    match args.format {
        Format::Json => {
            let summary = RunSummary { events, ..summary };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Format::Text => {
            println!(
                "{}: {} ticks, {} locks, {} releases, {} completions, {} strikes",
                summary.scene,
                summary.ticks,
                summary.locks,
                summary.releases,
                summary.completions,
                summary.strikes
            );
        }
    }
    Ok(())
}
