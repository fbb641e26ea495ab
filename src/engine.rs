/*
 *  engine.rs
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Render/mode controller: the {clock, countdown} x {interactive, ambient}
 *  state machine, the phase-aligned tick and the event-boundary wake-up
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

use crate::face::{
    DisplayMode, FaceRenderer, FrameState, FEED_FAILED_MESSAGE, NO_EVENTS_MESSAGE,
};
use crate::sched::{tick_delay_ms, Alarm};
use crate::timeline::{Event, EventTimeline};
use chrono::{Local, Timelike};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::time::Duration;
use tiny_skia::Pixmap;
use tokio::sync::{mpsc, watch};

/// Update rate in milliseconds for interactive mode. We redraw once a second.
pub const INTERACTIVE_UPDATE_RATE_MS: u64 = 1000;

/// Discrete inputs from the host platform, delivered over the engine's
/// control queue. Foreign threads never touch engine state directly; they
/// push one of these instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformSignal {
    /// Completed tap gesture; flips the display mode.
    Tap,
    /// Ambient state change; `low_bit` gates the smoothing degradation.
    Ambient { on: bool, low_bit: bool },
    Visible(bool),
    Resize { width: u32, height: u32 },
    /// Recompute request; the wall clock reads differently now.
    TimezoneChanged,
    /// Ask the calendar collaborator for a fresh batch.
    FeedRefresh,
}

/// Outcome of one feed poll, queued to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedUpdate {
    Events(Vec<Event>),
    /// Receipt failure: logged upstream, existing timeline kept.
    Failed,
}

/// Wherever finished frames go. Failures are logged and the next tick
/// simply tries again; the sink can never take the engine down.
pub trait FrameSink: Send {
    fn push_frame(&mut self, frame: &Pixmap) -> anyhow::Result<()>;
}

/// Writes the latest frame to a PNG path, mostly for inspection.
pub struct PngSink {
    path: PathBuf,
}

impl PngSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl FrameSink for PngSink {
    fn push_frame(&mut self, frame: &Pixmap) -> anyhow::Result<()> {
        frame.save_png(&self.path)?;
        Ok(())
    }
}

/// Swallows frames; the engine still runs its full composition.
pub struct NullSink;

impl FrameSink for NullSink {
    fn push_frame(&mut self, _frame: &Pixmap) -> anyhow::Result<()> {
        Ok(())
    }
}

/// The render engine. Owns all drawing state and the timeline; runs as a
/// single task, consuming the control and feed queues.
pub struct RenderEngine {
    face: FaceRenderer,
    timeline: EventTimeline,
    mode: DisplayMode,
    ambient: bool,
    visible: bool,
    feed_ok: bool,
    current: Option<Event>,
    tick: Alarm,
    boundary: Alarm,
    sink: Box<dyn FrameSink>,
    /// Feed subscription, registered/released in step with visibility.
    feed_subscription: Option<watch::Sender<bool>>,
    feed_refresh: Option<mpsc::Sender<()>>,
    frames: u64,
}

impl RenderEngine {
    pub fn new(face: FaceRenderer, sink: Box<dyn FrameSink>) -> Self {
        Self {
            face,
            timeline: EventTimeline::new(),
            mode: DisplayMode::Clock,
            ambient: false,
            visible: true,
            feed_ok: true,
            current: None,
            tick: Alarm::new(),
            boundary: Alarm::new(),
            sink,
            feed_subscription: None,
            feed_refresh: None,
            frames: 0,
        }
    }

    /// Wire the feed poller's activity subscription and refresh knob.
    pub fn with_feed(
        mut self,
        subscription: watch::Sender<bool>,
        refresh: mpsc::Sender<()>,
    ) -> Self {
        self.feed_subscription = Some(subscription);
        self.feed_refresh = Some(refresh);
        self
    }

    /// Main loop. Returns when both input queues are closed.
    pub async fn run(
        mut self,
        mut signals: mpsc::Receiver<PlatformSignal>,
        mut feed: mpsc::Receiver<FeedUpdate>,
    ) {
        self.set_feed_subscription(self.visible);
        self.update_timer();
        self.redraw();

        // The control queue closing ends the engine; the feed closing only
        // disables its branch.
        let mut feed_open = true;
        loop {
            tokio::select! {
                _ = Alarm::wait(self.tick.deadline()), if self.tick.is_armed() => {
                    self.tick.clear_fired();
                    self.redraw();
                    self.update_timer();
                }
                _ = Alarm::wait(self.boundary.deadline()), if self.boundary.is_armed() => {
                    self.boundary.clear_fired();
                    debug!("event boundary wake-up");
                    self.refresh_current_event(now_ms());
                    self.redraw();
                }
                signal = signals.recv() => match signal {
                    Some(signal) => self.handle_signal(signal),
                    None => break,
                },
                update = feed.recv(), if feed_open => match update {
                    Some(update) => self.handle_feed(update),
                    None => feed_open = false,
                },
            }
        }

        // Deterministic teardown: nothing fires after the loop exits.
        self.tick.cancel();
        self.boundary.cancel();
        self.set_feed_subscription(false);
        info!("render engine stopped after {} frame(s)", self.frames);
    }

    fn handle_signal(&mut self, signal: PlatformSignal) {
        match signal {
            PlatformSignal::Tap => {
                self.mode = self.mode.toggled();
                info!("display mode toggled: {:?}", self.mode);
                self.redraw();
            }
            PlatformSignal::Ambient { on, low_bit } => {
                if self.ambient != on {
                    self.ambient = on;
                    if low_bit {
                        self.face.set_ambient(on);
                    }
                    info!("ambient mode: {} (low_bit: {})", on, low_bit);
                    self.redraw();
                }
                // Timer gating depends on visibility and ambient together.
                self.update_timer();
            }
            PlatformSignal::Visible(visible) => {
                if self.visible != visible {
                    self.visible = visible;
                    self.set_feed_subscription(visible);
                    if visible {
                        self.request_feed_refresh();
                    }
                    debug!("visibility: {}", visible);
                }
                self.update_timer();
            }
            PlatformSignal::Resize { width, height } => {
                match self.face.resize(width, height) {
                    Ok(()) => self.redraw(),
                    // Keep the last-known-good geometry on degenerate bounds.
                    Err(e) => warn!("resize to {}x{} refused: {}", width, height, e),
                }
            }
            PlatformSignal::TimezoneChanged => {
                debug!("timezone changed, recomputing");
                self.refresh_current_event(now_ms());
                self.redraw();
            }
            PlatformSignal::FeedRefresh => self.request_feed_refresh(),
        }
    }

    fn handle_feed(&mut self, update: FeedUpdate) {
        match update {
            FeedUpdate::Events(batch) => {
                info!("feed delivered {} event(s)", batch.len());
                self.feed_ok = true;
                self.timeline.replace(batch);
                self.refresh_current_event(now_ms());
                self.redraw();
            }
            FeedUpdate::Failed => {
                // Previously shown event stays until a valid batch arrives.
                self.feed_ok = false;
                self.redraw();
            }
        }
    }

    /// Re-query the timeline and re-arm the boundary alarm to fire exactly
    /// at the current event's start.
    fn refresh_current_event(&mut self, now_ms: i64) {
        let next = self.timeline.upcoming_event(now_ms).cloned();
        let changed = next != self.current;
        if changed {
            self.current = next;
        }
        match self.current.as_ref() {
            // Arm on a new event, or re-arm for the remainder when the
            // alarm fired a moment ahead of the wall clock.
            Some(event) if changed || !self.boundary.is_armed() => {
                let delay = (event.start_ms - now_ms).max(0) as u64;
                self.boundary.arm_in(Duration::from_millis(delay));
                info!("next event '{}' starts in {} ms", event.title, delay);
            }
            None if changed => {
                self.boundary.cancel();
                debug!("no upcoming event");
            }
            _ => {}
        }
    }

    /// Starts the tick if it should be running and isn't, or stops it if it
    /// shouldn't be. Always cancel-then-arm, so duplicates cannot stack.
    fn update_timer(&mut self) {
        if self.should_tick() {
            let delay = tick_delay_ms(now_ms() as u64, INTERACTIVE_UPDATE_RATE_MS);
            self.tick.arm_in(Duration::from_millis(delay));
        } else {
            self.tick.cancel();
        }
    }

    /// The tick only runs while we're visible and in interactive mode.
    fn should_tick(&self) -> bool {
        self.visible && !self.ambient
    }

    fn redraw(&mut self) {
        let now = Local::now();
        let frame = FrameState {
            now_ms: now.timestamp_millis(),
            hour: now.hour(),
            minute: now.minute(),
            mode: self.mode,
            event: self.current.as_ref(),
            notice: if self.feed_ok {
                NO_EVENTS_MESSAGE
            } else {
                FEED_FAILED_MESSAGE
            },
        };
        match self.face.render(&frame) {
            Ok(pixmap) => {
                if let Err(e) = self.sink.push_frame(pixmap) {
                    error!("frame sink failed: {}", e);
                }
            }
            Err(e) => error!("frame composition failed: {}", e),
        }
        self.frames += 1;
    }

    fn set_feed_subscription(&self, active: bool) {
        if let Some(subscription) = self.feed_subscription.as_ref() {
            let _ = subscription.send(active);
        }
    }

    fn request_feed_refresh(&self) {
        if let Some(refresh) = self.feed_refresh.as_ref() {
            let _ = refresh.try_send(());
        }
    }
}

fn now_ms() -> i64 {
    Local::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Palette;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSink(Arc<AtomicUsize>);

    impl FrameSink for CountingSink {
        fn push_frame(&mut self, _frame: &Pixmap) -> anyhow::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn engine_with_counter() -> (RenderEngine, Arc<AtomicUsize>) {
        let face = FaceRenderer::new(400, 400, Palette::default()).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let engine = RenderEngine::new(face, Box::new(CountingSink(counter.clone())));
        (engine, counter)
    }

    #[tokio::test]
    async fn tap_toggles_mode_and_redraws() {
        let (mut engine, frames) = engine_with_counter();
        assert_eq!(engine.mode, DisplayMode::Clock);
        engine.handle_signal(PlatformSignal::Tap);
        assert_eq!(engine.mode, DisplayMode::EventCountdown);
        engine.handle_signal(PlatformSignal::Tap);
        assert_eq!(engine.mode, DisplayMode::Clock);
        assert_eq!(frames.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn ambient_cancels_the_tick() {
        let (mut engine, _) = engine_with_counter();
        engine.update_timer();
        assert!(engine.tick.is_armed());

        engine.handle_signal(PlatformSignal::Ambient { on: true, low_bit: true });
        assert!(!engine.tick.is_armed());

        engine.handle_signal(PlatformSignal::Ambient { on: false, low_bit: true });
        assert!(engine.tick.is_armed());
    }

    #[tokio::test]
    async fn hidden_face_stops_ticking() {
        let (mut engine, _) = engine_with_counter();
        engine.update_timer();
        assert!(engine.tick.is_armed());

        engine.handle_signal(PlatformSignal::Visible(false));
        assert!(!engine.tick.is_armed());

        engine.handle_signal(PlatformSignal::Visible(true));
        assert!(engine.tick.is_armed());
    }

    #[tokio::test]
    async fn feed_batch_arms_boundary_for_next_event() {
        let (mut engine, _) = engine_with_counter();
        let soon = now_ms() + 90_000;
        engine.handle_feed(FeedUpdate::Events(vec![
            Event::new(1, soon, "standup", "work"),
            Event::new(2, soon + 600_000, "retro", "work"),
        ]));
        assert!(engine.boundary.is_armed());
        assert_eq!(engine.current.as_ref().map(|e| e.id), Some(1));
    }

    #[tokio::test]
    async fn feed_failure_keeps_current_event() {
        let (mut engine, _) = engine_with_counter();
        let soon = now_ms() + 90_000;
        engine.handle_feed(FeedUpdate::Events(vec![Event::new(1, soon, "standup", "work")]));
        assert!(engine.feed_ok);

        engine.handle_feed(FeedUpdate::Failed);
        assert!(!engine.feed_ok);
        assert_eq!(engine.current.as_ref().map(|e| e.id), Some(1));
        assert!(engine.boundary.is_armed());
    }

    #[tokio::test]
    async fn expired_batch_clears_event_and_boundary() {
        let (mut engine, _) = engine_with_counter();
        let soon = now_ms() + 90_000;
        engine.handle_feed(FeedUpdate::Events(vec![Event::new(1, soon, "standup", "work")]));
        assert!(engine.boundary.is_armed());

        engine.handle_feed(FeedUpdate::Events(vec![Event::new(9, now_ms() - 1_000, "gone", "work")]));
        assert!(engine.current.is_none());
        assert!(!engine.boundary.is_armed());
    }

    #[tokio::test]
    async fn degenerate_resize_is_refused() {
        let (mut engine, frames) = engine_with_counter();
        engine.handle_signal(PlatformSignal::Resize { width: 0, height: 0 });
        // No redraw on a refused resize.
        assert_eq!(frames.load(Ordering::SeqCst), 0);

        engine.handle_signal(PlatformSignal::Resize { width: 320, height: 320 });
        assert_eq!(frames.load(Ordering::SeqCst), 1);
    }
}
