/*
 *  tests/face_compose.rs
 *
 *  Integration tests for full-frame face composition
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 */

use glanceface::face::{DisplayMode, FaceRenderer, FrameState, NO_EVENTS_MESSAGE};
use glanceface::palette::Palette;
use glanceface::timeline::Event;
use tiny_skia::Pixmap;

fn frame<'a>(
    mode: DisplayMode,
    minute: u32,
    event: Option<&'a Event>,
) -> FrameState<'a> {
    FrameState {
        now_ms: 0,
        hour: 9,
        minute,
        mode,
        event,
        notice: NO_EVENTS_MESSAGE,
    }
}

fn non_background(pixmap: &Pixmap) -> usize {
    // The background fill is the single most common pixel value; anything
    // else was painted by a drawer.
    let mut counts = std::collections::HashMap::new();
    for p in pixmap.pixels() {
        *counts.entry((p.red(), p.green(), p.blue(), p.alpha())).or_insert(0usize) += 1;
    }
    let background = counts.values().copied().max().unwrap_or(0);
    (pixmap.width() * pixmap.height()) as usize - background
}

#[test]
fn clock_mode_composes_ring_and_readout() {
    let mut face = FaceRenderer::new(400, 400, Palette::default()).unwrap();
    let out = face.render(&frame(DisplayMode::Clock, 15, None)).unwrap();
    assert_eq!(out.width(), 400);
    assert!(non_background(out) > 1000, "ring and digits should be visible");
}

#[test]
fn event_mode_with_event_shows_text_and_indicator() {
    let mut face = FaceRenderer::new(400, 400, Palette::default()).unwrap();
    let event = Event::new(1, 25 * 60_000, "weekly planning", "work");

    let with_event = face
        .render(&frame(DisplayMode::EventCountdown, 15, Some(&event)))
        .unwrap();
    let painted_with = non_background(with_event);

    let mut face2 = FaceRenderer::new(400, 400, Palette::default()).unwrap();
    let without = face2
        .render(&frame(DisplayMode::EventCountdown, 15, None))
        .unwrap();
    let painted_without = non_background(without);

    assert!(painted_with > 0);
    assert!(painted_without > 0, "placeholder must still render");
    assert_ne!(painted_with, painted_without);
}

#[test]
fn every_minute_of_the_hour_renders() {
    let mut face = FaceRenderer::new(400, 400, Palette::default()).unwrap();
    for minute in 0..60 {
        let out = face.render(&frame(DisplayMode::Clock, minute, None)).unwrap();
        assert!(non_background(out) > 0, "minute {minute} rendered nothing");
    }
}

#[test]
fn ambient_changes_the_raster() {
    let mut face = FaceRenderer::new(400, 400, Palette::default()).unwrap();
    let interactive = face
        .render(&frame(DisplayMode::Clock, 10, None))
        .unwrap()
        .data()
        .to_vec();

    face.set_ambient(true);
    let ambient = face
        .render(&frame(DisplayMode::Clock, 10, None))
        .unwrap()
        .data()
        .to_vec();

    assert_ne!(interactive, ambient, "smoothing off must alter edge pixels");
}

#[test]
fn resize_then_render_stays_consistent() {
    let mut face = FaceRenderer::new(400, 400, Palette::default()).unwrap();
    face.resize(320, 320).unwrap();
    let out = face.render(&frame(DisplayMode::Clock, 0, None)).unwrap();
    assert_eq!((out.width(), out.height()), (320, 320));

    // Degenerate resize keeps the previous surface size.
    assert!(face.resize(0, 10).is_err());
    let out = face.render(&frame(DisplayMode::Clock, 1, None)).unwrap();
    assert_eq!((out.width(), out.height()), (320, 320));
}
