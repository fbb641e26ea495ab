/*
 *  main.rs
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Daemon shell: configuration, logging, engine and feed startup, the
 *  stdin control harness and graceful shutdown
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use env_logger::Env;
use glanceface::config;
use glanceface::engine::{FrameSink, NullSink, PlatformSignal, PngSink, RenderEngine};
use glanceface::face::FaceRenderer;
use glanceface::feed::FeedPoller;
use glanceface::palette::Palette;
use log::{info, warn};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

const DEFAULT_FACE_SIZE: u32 = 400;
const DEFAULT_FEED_POLL_SECS: u64 = 60;

/// Waits for SIGINT, SIGTERM, or SIGHUP and returns for graceful shutdown.
#[cfg(unix)]
async fn signal_handler() -> Result<(), Box<dyn std::error::Error>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

/// Map one control line from the development harness to a platform signal.
/// Lines: tap | ambient on|off [lowbit] | visible on|off | resize W H |
/// tz | refresh
fn parse_signal(line: &str) -> Option<PlatformSignal> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "tap" => Some(PlatformSignal::Tap),
        "ambient" => {
            let on = matches!(parts.next()?, "on" | "true" | "1");
            let low_bit = matches!(parts.next(), Some("lowbit"));
            Some(PlatformSignal::Ambient { on, low_bit })
        }
        "visible" => {
            let on = matches!(parts.next()?, "on" | "true" | "1");
            Some(PlatformSignal::Visible(on))
        }
        "resize" => {
            let width = parts.next()?.parse().ok()?;
            let height = parts.next()?.parse().ok()?;
            Some(PlatformSignal::Resize { width, height })
        }
        "tz" => Some(PlatformSignal::TimezoneChanged),
        "refresh" => Some(PlatformSignal::FeedRefresh),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::load()?;

    let default_level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();

    info!("GlanceFace - the next meeting at a glance");
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let display = cfg.display.clone().unwrap_or_default();
    let width = display.width.unwrap_or(DEFAULT_FACE_SIZE);
    let height = display.height.unwrap_or(DEFAULT_FACE_SIZE);

    let sink: Box<dyn FrameSink> = match display.output {
        Some(path) => {
            info!("writing frames to {}", path.display());
            Box::new(PngSink::new(path))
        }
        None => {
            info!("no output path configured, frames are composed but not written");
            Box::new(NullSink)
        }
    };

    let face = FaceRenderer::new(width, height, Palette::default())?;
    let mut engine = RenderEngine::new(face, sink);

    let (signal_tx, signal_rx) = mpsc::channel::<PlatformSignal>(16);
    let (feed_tx, feed_rx) = mpsc::channel(4);

    // Feed poller, when a payload path is configured.
    let feed_cfg = cfg.feed.clone().unwrap_or_default();
    let poller = match feed_cfg.payload_path {
        Some(path) => {
            let interval =
                Duration::from_secs(feed_cfg.poll_secs.unwrap_or(DEFAULT_FEED_POLL_SECS));
            let (poller, subscription, refresh) = FeedPoller::start(path, interval, feed_tx);
            engine = engine.with_feed(subscription, refresh);
            Some(poller)
        }
        None => {
            warn!("no feed payload path configured, countdown will show the placeholder");
            None
        }
    };

    // Development harness: stdin lines become platform signals. Dropping
    // the sender on EOF/quit closes the engine's control queue.
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.eq_ignore_ascii_case("quit") {
                break;
            }
            match parse_signal(line) {
                Some(signal) => {
                    if signal_tx.send(signal).await.is_err() {
                        break;
                    }
                }
                None => warn!("unrecognized control line: {}", line),
            }
        }
    });

    tokio::select! {
        _ = engine.run(signal_rx, feed_rx) => {
            info!("Closed Application Loop.");
        }
        _ = signal_handler() => {
            // The signal_handler function logs the received signal.
        }
    }

    info!("Main application exiting. Stopping feed poller.");
    if let Some(poller) = poller {
        poller.stop().await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_signal_covers_the_harness_grammar() {
        assert_eq!(parse_signal("tap"), Some(PlatformSignal::Tap));
        assert_eq!(
            parse_signal("ambient on lowbit"),
            Some(PlatformSignal::Ambient { on: true, low_bit: true })
        );
        assert_eq!(
            parse_signal("ambient off"),
            Some(PlatformSignal::Ambient { on: false, low_bit: false })
        );
        assert_eq!(parse_signal("visible off"), Some(PlatformSignal::Visible(false)));
        assert_eq!(
            parse_signal("resize 320 320"),
            Some(PlatformSignal::Resize { width: 320, height: 320 })
        );
        assert_eq!(parse_signal("tz"), Some(PlatformSignal::TimezoneChanged));
        assert_eq!(parse_signal("refresh"), Some(PlatformSignal::FeedRefresh));
    }

    #[test]
    fn parse_signal_rejects_noise() {
        assert_eq!(parse_signal(""), None);
        assert_eq!(parse_signal("dance"), None);
        assert_eq!(parse_signal("resize wide tall"), None);
        assert_eq!(parse_signal("ambient"), None);
    }
}
