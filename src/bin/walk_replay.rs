// SPDX-License-Identifier: MIT

//! Replay a recorded walk against a running Walk Tracker API.
//!
//! Usage: `walk_replay [FILE|-] [--dog ID] [--speed FACTOR]`
//!
//! Reads one JSON location fix per line (from stdin when no file is given)
//! and feeds them to a live tracker, paced by the fixes' own timestamps
//! divided by `--speed`. `--speed 0` replays as fast as possible.
//! Ctrl-C ends the walk early.

use anyhow::{bail, Context};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use walk_tracker::config::ClientConfig;
use walk_tracker::models::LocationFix;
use walk_tracker::time_utils::format_clock;
use walk_tracker::tracker::location::DEFAULT_FEED_CAPACITY;
use walk_tracker::tracker::{subscription, HttpWalkBackend, LocationSender, WalkTracker};

/// How long to wait for the tracker to consume the last queued fix.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

struct Args {
    input: Option<String>,
    dog_id: Option<String>,
    speed: f64,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        input: None,
        dog_id: std::env::var("WALK_DOG_ID").ok().filter(|d| !d.is_empty()),
        speed: 1.0,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--dog" => args.dog_id = Some(iter.next().context("--dog needs a value")?),
            "--speed" => {
                let raw = iter.next().context("--speed needs a value")?;
                args.speed = raw
                    .parse()
                    .with_context(|| format!("invalid --speed: {}", raw))?;
                if args.speed.is_nan() || args.speed < 0.0 {
                    bail!("--speed must not be negative");
                }
            }
            "-" => args.input = None,
            other if other.starts_with("--") => bail!("unknown option: {}", other),
            other => args.input = Some(other.to_string()),
        }
    }

    Ok(args)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args = parse_args()?;
    let config = ClientConfig::from_env()?;

    let reader: Box<dyn AsyncRead + Unpin + Send> = match &args.input {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open {}", path))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };

    let backend = HttpWalkBackend::new(config.api_url.clone(), config.session_token.clone());
    let mut tracker = WalkTracker::new(backend, config.tracker.clone());

    let (sender, feed) = subscription(DEFAULT_FEED_CAPACITY);
    let walk_id = tracker.start(args.dog_id.as_deref(), feed).await?;
    tracing::info!(walk_id = %walk_id, api_url = %config.api_url, "Replaying walk");

    let replay = replay_fixes(BufReader::new(reader), sender, args.speed);
    tokio::pin!(replay);

    tokio::select! {
        result = &mut replay => {
            match result {
                Ok(Some(last)) => wait_for_fix(&tracker, last).await,
                Ok(None) => tracing::warn!("No fixes in input"),
                Err(e) => tracing::error!(error = %e, "Replay stopped early"),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, ending walk");
        }
    }

    let summary = tracker.end().await?;
    tracing::info!(
        walk_id = %summary.walk_id,
        duration = %format_clock(summary.duration_s),
        distance_m = summary.distance_m,
        saved = summary.saved,
        "Walk ended"
    );
    if let Some(warning) = summary.warning() {
        tracing::warn!(walk_id = %summary.walk_id, "{}", warning);
    }

    Ok(())
}

/// Send every fix in `reader` to the tracker. Returns the last fix sent.
async fn replay_fixes<R>(
    reader: BufReader<R>,
    sender: LocationSender,
    speed: f64,
) -> anyhow::Result<Option<LocationFix>>
where
    R: AsyncRead + Unpin,
{
    let mut lines = reader.lines();
    let mut last: Option<LocationFix> = None;
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fix: LocationFix = match serde_json::from_str(line) {
            Ok(fix) => fix,
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "Skipping unparseable fix");
                continue;
            }
        };

        if let Some(prev) = last {
            if let Some(delay) = replay_delay(&prev, &fix, speed) {
                tokio::time::sleep(delay).await;
            }
        }

        sender.send_fix(fix).await?;
        last = Some(fix);
    }

    Ok(last)
}

/// Real-time gap between two recorded fixes, scaled by `speed`.
fn replay_delay(prev: &LocationFix, next: &LocationFix, speed: f64) -> Option<Duration> {
    if speed <= 0.0 {
        return None;
    }
    let gap = (next.ts - prev.ts).to_std().ok()?;
    Some(gap.div_f64(speed))
}

/// Wait until the tracker has consumed `last`, so ending the walk does not
/// discard fixes still queued in the feed.
async fn wait_for_fix<B: walk_tracker::tracker::WalkBackend>(
    tracker: &WalkTracker<B>,
    last: LocationFix,
) {
    let drained = tokio::time::timeout(DRAIN_TIMEOUT, async {
        while tracker.snapshot().and_then(|s| s.last_fix) != Some(last) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;

    if drained.is_err() {
        tracing::warn!("Timed out waiting for the tracker to consume queued fixes");
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,walk_tracker=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
