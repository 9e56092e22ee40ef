//! kotoba3d - Talking-Character Blending Engine
//!
//! Headless runner: loads a model manifest, replays a message script,
//! and ticks the engine at a fixed frame rate.

use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kotoba3d::{
    AvatarEngine, Config, EngineEvent, FrameInput, Message, MessageQueue, ModelRig,
};

/// kotoba3d - drive a talking 3D character from a message script
#[derive(Parser, Debug)]
#[command(name = "kotoba3d", version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model manifest (JSON) describing meshes, nodes, and clips
    #[arg(short, long)]
    model: PathBuf,

    /// Message script (JSON array of messages) to replay
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Frames per second for the update loop
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Pace the loop in real time instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Disable audible playback
    #[arg(long)]
    no_audio: bool,

    /// List the model's morph channels and clips, then exit
    #[arg(long)]
    list_channels: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    info!("Starting {} v{}", kotoba3d::NAME, kotoba3d::VERSION);

    let mut config = if let Some(ref path) = args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };
    if args.no_audio {
        config.audio.enabled = false;
    }
    config.validate()?;

    let rig = ModelRig::from_manifest_file(&args.model)?;

    if args.list_channels {
        list_channels(&rig);
        return Ok(());
    }

    let mut queue = MessageQueue::new();
    if let Some(ref path) = args.script {
        let contents = std::fs::read_to_string(path)?;
        let messages: Vec<Message> = serde_json::from_str(&contents)?;
        info!("Loaded {} messages from {}", messages.len(), path.display());
        for message in messages {
            queue.push(message);
        }
    }

    run(rig, config, queue, args.fps.max(1), args.realtime)
}

fn list_channels(rig: &ModelRig) {
    println!("Morph channels:\n");
    for mesh in &rig.meshes {
        println!("  {} ({} targets)", mesh.name, mesh.morph_targets.len());
        for name in &mesh.morph_targets {
            println!("    {}", name);
        }
    }
    println!("\nClips:\n");
    for clip in &rig.clips {
        println!("  {} ({:.2}s, {} tracks)", clip.name, clip.duration, clip.tracks.len());
    }
}

fn run(
    mut rig: ModelRig,
    config: Config,
    mut queue: MessageQueue,
    fps: u32,
    realtime: bool,
) -> anyhow::Result<()> {
    let mut engine = AvatarEngine::new(&rig, config);
    let dt = 1.0 / fps as f32;
    let frame_period = std::time::Duration::from_secs_f32(dt);

    let mut active = false;
    let mut elapsed = 0.0f32;
    // Once the queue drains, keep ticking briefly so fades settle.
    let mut settle = fps;

    loop {
        if !active {
            match queue.next() {
                Some(message) => {
                    info!("Playing: {}", message.text);
                    engine.set_message(Some(&message))?;
                    active = true;
                }
                None if settle == 0 => break,
                None => settle -= 1,
            }
        }

        let mut frame = FrameInput::tick(dt);
        // Scripted stand-in for the timer collaborator: a short blink
        // every few seconds.
        frame.blink = elapsed % 3.2 < 0.15;

        for event in engine.update(&frame) {
            match event {
                EngineEvent::MessagePlayed => {
                    info!("Message played, {} remaining", queue.len());
                    active = false;
                }
            }
        }
        engine.sync_rig(&mut rig);

        elapsed += dt;
        if realtime {
            std::thread::sleep(frame_period);
        }
    }

    info!("Script finished after {:.1}s of playback", elapsed);
    Ok(())
}
