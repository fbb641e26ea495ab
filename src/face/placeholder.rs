/*
 *  face/placeholder.rs
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Centered message block shown when there is no event to count down to
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

use super::surfaces::{blit_scaled, line_height, TextCanvas};
use super::{FaceError, INNER_STROKE, OUTER_STROKE, OVALS_GAP};
use crate::face::hour::rgb888;
use crate::palette::Palette;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_text::alignment::HorizontalAlignment;
use embedded_text::style::{HeightMode, TextBoxStyleBuilder, VerticalOverdraw};
use embedded_text::TextBox;
use tiny_skia::{FilterQuality, Pixmap};

const PLACEHOLDER_SCALE: f32 = 2.0;
const MAX_ROWS: u32 = 4;

/// Wrapped, centered message inside the face. Laid out again only when the
/// message or the face width changes.
pub struct PlaceholderRenderer {
    canvas: Option<TextCanvas>,
    message: String,
    layout_width: u32,
    quality: FilterQuality,
}

impl PlaceholderRenderer {
    pub fn new() -> Self {
        Self {
            canvas: None,
            message: String::new(),
            layout_width: 0,
            quality: FilterQuality::Bilinear,
        }
    }

    pub fn set_ambient(&mut self, ambient_on: bool) {
        self.quality = if ambient_on {
            FilterQuality::Nearest
        } else {
            FilterQuality::Bilinear
        };
    }

    /// Widest square that fits inside the circle left between the rings.
    fn layout_width(bounds_width: f32) -> u32 {
        let band = 2.0 * INNER_STROKE + 2.0 * OUTER_STROKE + 2.0 * OVALS_GAP;
        (((bounds_width - band) / std::f32::consts::SQRT_2) / PLACEHOLDER_SCALE).max(1.0) as u32
    }

    pub fn draw(
        &mut self,
        primary: &mut Pixmap,
        palette: &Palette,
        message: &str,
        bounds_width: f32,
        cx: f32,
        cy: f32,
    ) -> Result<(), FaceError> {
        let width = Self::layout_width(bounds_width);
        if self.canvas.is_none() || self.message != message || self.layout_width != width {
            self.relayout(palette, message, width)?;
        }
        if let Some(canvas) = self.canvas.as_ref() {
            blit_scaled(
                primary,
                canvas.pixmap(),
                cx - canvas.width() as f32 * PLACEHOLDER_SCALE / 2.0,
                cy - canvas.height() as f32 * PLACEHOLDER_SCALE / 2.0,
                PLACEHOLDER_SCALE,
                self.quality,
            );
        }
        Ok(())
    }

    fn relayout(
        &mut self,
        palette: &Palette,
        message: &str,
        width: u32,
    ) -> Result<(), FaceError> {
        let height = line_height(&FONT_6X10) * MAX_ROWS;
        let mut canvas = TextCanvas::new(width, height)?;
        let character_style = MonoTextStyle::new(&FONT_6X10, rgb888(palette.white));
        let textbox_style = TextBoxStyleBuilder::new()
            .alignment(HorizontalAlignment::Center)
            .height_mode(HeightMode::Exact(VerticalOverdraw::Hidden))
            .build();
        TextBox::with_textbox_style(
            message,
            Rectangle::new(Point::zero(), Size::new(width, height)),
            character_style,
            textbox_style,
        )
        .draw(&mut canvas)
        .ok();

        self.canvas = Some(canvas);
        self.message = message.to_string();
        self.layout_width = width;
        Ok(())
    }
}

impl Default for PlaceholderRenderer {
    fn default() -> Self {
        Self::new()
    }
}
