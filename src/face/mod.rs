/*
 *  face/mod.rs
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Face subsystem: layout constants, the per-frame composition
 *  orchestrator, and the drawer modules
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

pub mod event_text;
pub mod geometry;
pub mod hour;
pub mod indicator;
pub mod placeholder;
pub mod ring;
pub mod surfaces;

use crate::palette::Palette;
use crate::timeline::Event;
use event_text::EventTextRenderer;
use geometry::FaceGeometry;
use hour::HourRenderer;
use indicator::IndicatorRenderer;
use log::debug;
use placeholder::PlaceholderRenderer;
use ring::RingRenderer;
use surfaces::RenderSurfaces;
use thiserror::Error;
use tiny_skia::{FilterQuality, Pixmap};

// Face layout, fixed units like the outer shell's dimension resources.
pub const FACE_PADDING: f32 = 20.0;
pub const OUTER_STROKE: f32 = 10.0;
pub const INNER_STROKE: f32 = 6.0;
pub const OVALS_GAP: f32 = 12.0;
/// Gap width between ring dashes.
pub const PIECES_GAP: f32 = 8.0;

pub const NO_EVENTS_MESSAGE: &str = "no upcoming events";
pub const FEED_FAILED_MESSAGE: &str = "calendar unavailable";

/// Unified error type for face composition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FaceError {
    #[error("degenerate face bounds {width}x{height}")]
    DegenerateBounds { width: u32, height: u32 },

    #[error("pixmap allocation failed for {width}x{height}")]
    Allocation { width: u32, height: u32 },

    #[error("invalid rectangle or path geometry")]
    BadRect,
}

/// What the face is currently showing; orthogonal to ambient state.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DisplayMode {
    /// Rounded hour readout in the center
    Clock,
    /// Next-event text block in the center
    EventCountdown,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Clock => DisplayMode::EventCountdown,
            DisplayMode::EventCountdown => DisplayMode::Clock,
        }
    }
}

/// Everything one frame needs, sampled by the engine at tick time.
#[derive(Debug)]
pub struct FrameState<'a> {
    pub now_ms: i64,
    pub hour: u32,
    pub minute: u32,
    pub mode: DisplayMode,
    pub event: Option<&'a Event>,
    /// Placeholder caption when there is no event to show.
    pub notice: &'a str,
}

/// Owns every drawer and the surfaces, and runs the per-frame composition
/// in a fixed order: center readout, outer ring, indicator, final blit.
/// Lives entirely on the render task; nothing here is shared.
pub struct FaceRenderer {
    palette: Palette,
    geometry: FaceGeometry,
    surfaces: RenderSurfaces,
    ring: RingRenderer,
    indicator: IndicatorRenderer,
    hour: HourRenderer,
    event_text: EventTextRenderer,
    placeholder: PlaceholderRenderer,
    ambient: bool,
}

impl FaceRenderer {
    pub fn new(width: u32, height: u32, palette: Palette) -> Result<Self, FaceError> {
        let geometry = FaceGeometry::measure(width, height)?;
        let surfaces = RenderSurfaces::new(&geometry)?;
        let ring = RingRenderer::new(&palette, &geometry);
        let indicator = IndicatorRenderer::new(&palette, &geometry);
        let hour = HourRenderer::new()?;
        let mut event_text = EventTextRenderer::new(&palette)?;
        event_text.measure(geometry.inner_radius());

        Ok(Self {
            palette,
            geometry,
            surfaces,
            ring,
            indicator,
            hour,
            event_text,
            placeholder: PlaceholderRenderer::new(),
            ambient: false,
        })
    }

    /// Full geometry recompute plus the one-time surface reallocation.
    /// Degenerate bounds are refused and the last-known-good layout kept;
    /// the caller decides whether that is worth more than a warning.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), FaceError> {
        let geometry = FaceGeometry::measure(width, height)?;
        self.surfaces.ensure(&geometry)?;
        self.ring.measure(&geometry);
        self.indicator.measure(&geometry);
        self.event_text.measure(geometry.inner_radius());
        self.geometry = geometry;
        debug!("face resized to {}x{}", width, height);
        Ok(())
    }

    /// Low-bit ambient: drop smoothing and bitmap filtering on every drawer.
    pub fn set_ambient(&mut self, ambient_on: bool) {
        self.ambient = ambient_on;
        self.ring.set_ambient(ambient_on);
        self.indicator.set_ambient(ambient_on);
        self.hour.set_ambient(ambient_on);
        self.event_text.set_ambient(ambient_on);
        self.placeholder.set_ambient(ambient_on);
    }

    pub fn geometry(&self) -> &FaceGeometry {
        &self.geometry
    }

    /// Compose one frame and return the finished primary surface.
    pub fn render(&mut self, frame: &FrameState<'_>) -> Result<&Pixmap, FaceError> {
        let (cx, cy) = self.geometry.display_center();
        self.surfaces.primary_mut().fill(self.palette.background);

        match frame.mode {
            DisplayMode::Clock => {
                self.hour.draw(
                    self.surfaces.primary_mut(),
                    &self.palette,
                    frame.hour,
                    frame.minute,
                    cx,
                    cy,
                )?;
            }
            DisplayMode::EventCountdown => match frame.event {
                Some(event) => {
                    self.event_text.draw(
                        self.surfaces.primary_mut(),
                        &self.palette,
                        event,
                        frame.now_ms,
                        cx,
                        cy,
                    )?;
                }
                None => {
                    self.placeholder.draw(
                        self.surfaces.primary_mut(),
                        &self.palette,
                        frame.notice,
                        self.geometry.bounds_w,
                        cx,
                        cy,
                    )?;
                }
            },
        }

        self.ring.draw(&mut self.surfaces, &self.geometry, frame.minute)?;
        match frame.event {
            Some(event) => {
                self.indicator
                    .draw(&mut self.surfaces, &self.geometry, event.minute_of_hour())?;
            }
            None => {
                self.indicator
                    .clear_indication(&mut self.surfaces, &self.geometry)?;
            }
        }

        let quality = if self.ambient {
            FilterQuality::Nearest
        } else {
            FilterQuality::Bilinear
        };
        self.surfaces
            .composite_face(self.geometry.origin_x, self.geometry.origin_y, quality);

        Ok(self.surfaces.primary())
    }
}
