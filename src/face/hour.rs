/*
 *  face/hour.rs
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Hour readout: the rounded current hour as a single colored digit pair
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

use super::surfaces::{blit_scaled, line_height, text_width, TextCanvas};
use super::FaceError;
use crate::palette::Palette;
use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use tiny_skia::{Color, FilterQuality, Pixmap};

/// Probe string covering every digit the readout can emit; its measured
/// bounds are taken once at construction and reused for centering.
const DIGIT_PROBE: &str = "1234567890";

/// Raster scale applied to the mono glyphs for the oversized readout.
const HOUR_SCALE: f32 = 4.0;

pub struct HourRenderer {
    canvas: TextCanvas,
    digit_width: u32,
    digit_height: u32,
    quality: FilterQuality,
}

impl HourRenderer {
    pub fn new() -> Result<Self, FaceError> {
        // Bounds probed once; the mono font makes every digit the same cell.
        let probe_width = text_width(&FONT_10X20, DIGIT_PROBE.len());
        let digit_width = probe_width / DIGIT_PROBE.len() as u32;
        let digit_height = line_height(&FONT_10X20);
        // Two digits is the widest the readout gets ("10".."23").
        let canvas = TextCanvas::new(digit_width * 2, digit_height)?;
        Ok(Self {
            canvas,
            digit_width,
            digit_height,
            quality: FilterQuality::Bilinear,
        })
    }

    pub fn set_ambient(&mut self, ambient_on: bool) {
        self.quality = if ambient_on {
            FilterQuality::Nearest
        } else {
            FilterQuality::Bilinear
        };
    }

    /// Hour shown on the face: rounded up from minute 30, wrapping midnight.
    pub fn display_hour(hour: u32, minute: u32) -> u32 {
        if minute >= 30 {
            (hour + 1) % 24
        } else {
            hour
        }
    }

    /// Render the readout centered on `(cx, cy)` of the display surface.
    pub fn draw(
        &mut self,
        primary: &mut Pixmap,
        palette: &Palette,
        hour: u32,
        minute: u32,
        cx: f32,
        cy: f32,
    ) -> Result<(), FaceError> {
        let digits = format!("{}", Self::display_hour(hour, minute));
        let style = MonoTextStyle::new(&FONT_10X20, rgb888(palette.hour_color(minute)));

        self.canvas.clear_transparent();
        Text::with_baseline(&digits, Point::zero(), style, Baseline::Top)
            .draw(&mut self.canvas)
            .ok();

        let glyph_width = self.digit_width * digits.len() as u32;
        blit_scaled(
            primary,
            self.canvas.pixmap(),
            cx - glyph_width as f32 * HOUR_SCALE / 2.0,
            cy - self.digit_height as f32 * HOUR_SCALE / 2.0,
            HOUR_SCALE,
            self.quality,
        );
        Ok(())
    }
}

/// Palette colors are float RGBA; the text pipeline wants 8-bit RGB.
pub fn rgb888(c: Color) -> Rgb888 {
    Rgb888::new(
        (c.red() * 255.0 + 0.5) as u8,
        (c.green() * 255.0 + 0.5) as u8,
        (c.blue() * 255.0 + 0.5) as u8,
    )
}
