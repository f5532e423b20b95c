//! ewwm-gestures - headless harness for the gesture matcher and sequence gate.
//!
//! Replays a scripted hand session (fist held, then opened) through a
//! `GestureMatcher` and a `SequenceValidator` wired "fist, then open hand",
//! logging every transition as an IPC-style event.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use ewwm_gestures::sexp::format_event;
use ewwm_gestures::{
    Fingertip, GestureMatch, GestureMatcher, HandFrame, MatcherConfig, Point3, PoseSample,
    SequenceConfig, SequenceValidator,
};

#[derive(Parser, Debug)]
#[command(name = "ewwm-gestures", about = "EXWM-VR gesture matcher harness")]
struct Cli {
    /// Matcher config plist, e.g. "(:threshold 0.03 :required-delay 0.1)"
    #[arg(long)]
    matcher_config: Option<String>,

    /// Sequence config plist, e.g. "(:intention-delay 0.3 :mode :wait-until-timeout)"
    #[arg(long)]
    sequence_config: Option<String>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 180)]
    ticks: u32,

    /// Seconds per tick
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Tick at which the fist opens into an open hand
    #[arg(long, default_value_t = 60)]
    open_at: u32,

    /// Interrupt the running sequence at this tick
    #[arg(long)]
    interrupt_at: Option<u32>,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

/// Hand-local fingertips of a relaxed open hand (meters).
fn open_hand() -> Vec<Point3> {
    vec![
        [-0.09, 0.05, 0.02],
        [-0.03, 0.11, 0.0],
        [0.0, 0.12, 0.0],
        [0.03, 0.11, 0.0],
        [0.06, 0.09, 0.0],
    ]
}

/// Hand-local fingertips of a closed fist (meters).
fn fist() -> Vec<Point3> {
    vec![
        [-0.02, 0.03, 0.03],
        [-0.02, 0.04, 0.04],
        [0.0, 0.04, 0.04],
        [0.02, 0.04, 0.04],
        [0.04, 0.03, 0.03],
    ]
}

/// World-space fingertips for `local` with the hand drifting sideways,
/// so matching has to go through the hand-frame transform.
fn world_sample(frame: &HandFrame, local: &[Point3]) -> Vec<Point3> {
    local.iter().map(|p| frame.transform_point(p)).collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("ewwm-gestures {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ewwm_gestures=info".into()),
        )
        .init();

    info!("ewwm-gestures v{} starting", env!("CARGO_PKG_VERSION"));

    let matcher_config = match &cli.matcher_config {
        Some(raw) => MatcherConfig::from_sexp(raw).context("parsing --matcher-config")?,
        None => MatcherConfig {
            threshold: 0.03,
            required_delay_s: 0.1,
            tracked_points: Fingertip::ALL.len(),
        },
    };
    let sequence_config = match &cli.sequence_config {
        Some(raw) => SequenceConfig::from_sexp(raw).context("parsing --sequence-config")?,
        None => SequenceConfig {
            intention_checking_delay_s: 0.3,
            validation_timeout_s: 1.5,
            mode: ewwm_gestures::SeqMode::WaitUntilTimeout,
            ..SequenceConfig::default()
        },
    };
    info!("matcher config: {}", matcher_config.to_sexp());
    info!("sequence config: {}", sequence_config.to_sexp());

    let mut matcher = GestureMatcher::new(matcher_config)?;
    let log_recognized = |found: &GestureMatch| {
        let name = format!("\"{}\"", found.name);
        let distance = format!("{:.4}", found.distance);
        info!(
            "{}",
            format_event(
                "gesture-recognized",
                &[("name", name.as_str()), ("distance", distance.as_str())],
            )
        );
    };
    let fist_id = matcher.add_template_with_callback("fist", &fist(), log_recognized)?;
    let open_id = matcher.add_template_with_callback("open", &open_hand(), log_recognized)?;
    matcher.on_nothing_detected(|| info!("{}", format_event("gesture-none", &[])));

    let fist_held = Arc::new(AtomicBool::new(false));
    let open_held = Arc::new(AtomicBool::new(false));
    let mut sequence = SequenceValidator::builder(sequence_config)
        .primary(Arc::clone(&fist_held))
        .secondary(Arc::clone(&open_held))
        .build()?;

    let mut frame = HandFrame::new([0.0, 1.2, -0.4], [0.0, 0.0, 0.0, 1.0]);
    for tick in 0..cli.ticks {
        frame.position[0] += 0.002;
        let local = if tick < cli.open_at { fist() } else { open_hand() };
        let pose = PoseSample::from_world(&frame, &world_sample(&frame, &local));

        let result = match matcher.recognize(pose.as_slice(), cli.dt) {
            Ok(result) => result,
            Err(e) => {
                warn!("tick {}: {}", tick, e);
                continue;
            }
        };
        let active = result.as_ref().map(|m| m.id);
        fist_held.store(active == Some(fist_id), Ordering::SeqCst);
        open_held.store(active == Some(open_id), Ordering::SeqCst);

        let mut events = sequence.tick(cli.dt);
        if cli.interrupt_at == Some(tick) {
            events.extend(sequence.interrupt());
        }
        let tick_str = tick.to_string();
        for event in events {
            let name = format!("sequence-{}", event.as_str());
            info!("{}", format_event(&name, &[("tick", tick_str.as_str())]));
        }
    }

    info!("matcher status: {}", matcher.status_sexp());
    info!("sequence status: {}", sequence.status_sexp());
    Ok(())
}
