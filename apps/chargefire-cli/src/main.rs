use std::path::PathBuf;

use anyhow::{Context, bail};
use chargefire_charge::ChargeMode;
use chargefire_common::{AnchorId, DeviceId, Transform};
use chargefire_controller::{ChargeController, ControllerConfig, SessionEvent};
use chargefire_input::{Action, DeviceDescriptor, DeviceEvent};
use chargefire_sim::SimRuntime;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Projectiles spawned by the simulated factory use this authored size.
const SIM_PROJECTILE_SIZE: f32 = 0.25;

#[derive(Parser)]
#[command(name = "chargefire-cli", about = "CLI tool for chargefire charge sessions")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the default controller configuration as YAML
    Config,
    /// Run one charge session against the simulated runtime
    Run {
        /// YAML or JSON controller config
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the configured charge mode (stepped or linear)
        #[arg(short, long)]
        mode: Option<String>,
        /// Seconds per frame
        #[arg(long, default_value = "0.011111111")]
        frame_dt: f32,
        /// Device names to connect before charging
        #[arg(short, long = "device", default_value = "Logitech Stylus Pro")]
        devices: Vec<String>,
        /// Physics frames to simulate after fire
        #[arg(long, default_value = "30")]
        settle_frames: u32,
        /// Print samples as JSON lines
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("chargefire-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("charge: {}", chargefire_charge::crate_info());
            println!("input: {}", chargefire_input::crate_info());
            println!("runtime: {}", chargefire_runtime::crate_info());
            println!("controller: {}", chargefire_controller::crate_info());
            println!("sim: {}", chargefire_sim::crate_info());
        }
        Commands::Config => {
            print!("{}", ControllerConfig::default().to_yaml_string()?);
        }
        Commands::Run {
            config,
            mode,
            frame_dt,
            devices,
            settle_frames,
            json,
        } => {
            let mut config = match config {
                Some(path) => ControllerConfig::load(&path)
                    .with_context(|| format!("loading config from {}", path.display()))?,
                None => ControllerConfig::default(),
            };
            if let Some(mode) = mode {
                config.mode = mode.parse::<ChargeMode>()?;
            }
            if !(frame_dt.is_finite() && frame_dt > 0.0) {
                bail!("frame-dt must be a positive number of seconds, got {frame_dt}");
            }
            run_session(config, frame_dt, &devices, settle_frames, json)?;
        }
    }

    Ok(())
}

fn run_session(
    config: ControllerConfig,
    frame_dt: f32,
    devices: &[String],
    settle_frames: u32,
    json: bool,
) -> anyhow::Result<()> {
    let rt = SimRuntime::new();
    let tip_anchor = AnchorId(1);
    let mut controller = ChargeController::new(config)
        .with_haptics(rt.haptics())
        .with_audio(rt.audio())
        .with_projectiles(rt.projectile_factory(SIM_PROJECTILE_SIZE))
        .with_tip(rt.tip(tip_anchor, Transform::from_position(glam::Vec3::new(0.0, 1.2, 0.0))));

    for (i, name) in devices.iter().enumerate() {
        let change = controller.on_device_event(&DeviceEvent::Connected(DeviceDescriptor::new(
            DeviceId(i as u64 + 1),
            name.as_str(),
        )));
        tracing::info!(device = %name, ?change, "device connected");
    }

    let session = controller
        .handle_action(Action::StartCharge)?
        .context("start did not open a session")?;
    println!(
        "Charging: session={session}, mode={}, stylus={}",
        controller.mode(),
        controller
            .stylus()
            .current()
            .map_or("none", |h| h.name.as_str())
    );

    // Generous upper bound: longest stepped or linear charge at this frame rate.
    let profile = *controller.profile();
    let stepped_total = profile.initial_duration * (profile.step_count as f32 + 1.0);
    let longest = stepped_total.max(profile.linear_charge_time);
    let max_frames = (longest / frame_dt).ceil() as u64 * 2 + 16;

    let mut fired = None;
    let mut frame = 0u64;
    while controller.is_charging() {
        if frame >= max_frames {
            bail!("session did not finish within {max_frames} frames");
        }
        for event in controller.advance(frame_dt) {
            if json {
                println!("{}", serde_json::to_string(&event)?);
            }
            match event {
                SessionEvent::Sample(s) if !json => println!(
                    "frame {frame:>5}  sample {:>3}  amp={:.3}  dur={:.3}  progress={:.3}{}",
                    s.index,
                    s.amplitude,
                    s.duration,
                    s.progress,
                    if s.is_final { "  final" } else { "" }
                ),
                SessionEvent::Finished { fire, .. } => fired = fire,
                SessionEvent::Sample(_) => {}
            }
        }
        frame += 1;
    }

    let Some(report) = fired else {
        println!("Session finished without firing");
        return Ok(());
    };
    for _ in 0..settle_frames {
        rt.step(frame_dt);
    }

    let scene = rt.scene();
    let projectile = scene
        .get(report.projectile)
        .context("fired projectile missing from scene")?;
    let velocity = projectile.body.map(|b| b.velocity).unwrap_or_default();
    let out = rt.output();
    println!(
        "Fired after {frame} frames: direction={:?}, force={}",
        report.direction, report.magnitude
    );
    println!(
        "After {settle_frames} frames: position={:?}, velocity={:?}",
        projectile.transform.position, velocity
    );
    println!(
        "Feedback: pulses={}, audio plays={}",
        out.pulses.len(),
        out.audio.plays
    );
    Ok(())
}
