/*
 *  face/event_text.rs
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Event text block: title, calendar name, caption and countdown, all
 *  constrained to fit inside the circular face
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
use crate::face::hour::rgb888;
use crate::palette::Palette;
use crate::timeline::Event;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_9X15};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use tiny_skia::{FilterQuality, Pixmap};

const MAX_TITLE_LINES: usize = 2;
const ELLIPSIS: &str = "...";

const TITLE_FONT: MonoFont<'static> = FONT_9X15;
const CALENDAR_FONT: MonoFont<'static> = FONT_6X10;
const CAPTION_FONT: MonoFont<'static> = FONT_6X10;
const MINUTES_FONT: MonoFont<'static> = FONT_9X15;

const TITLE_SCALE: f32 = 2.0;
const CALENDAR_SCALE: f32 = 2.0;
const MINUTES_SCALE: f32 = 2.0;

const STARTS_IN: &str = "starts in";
const LESS_THAN_MINUTE: &str = "less than a minute";

const START_IN_MINUTES_PADDING: f32 = 6.0;
const CALENDAR_NAME_PADDING: f32 = 8.0;

/// Title and calendar rasters cached per (event, geometry); countdown and
/// caption are cheap and drawn every frame.
struct TextBlockCache {
    event_id: i64,
    title: String,
    calendar_name: String,
    title_canvas: TextCanvas,
    title_width: u32,
    calendar_canvas: TextCanvas,
    calendar_width: u32,
}

pub struct EventTextRenderer {
    caption_canvas: TextCanvas,
    minutes_canvas: TextCanvas,
    cache: Option<TextBlockCache>,
    /// Column budgets from the latest measure() pass.
    title_cols: usize,
    calendar_cols: usize,
    quality: FilterQuality,
}

impl EventTextRenderer {
    pub fn new(palette: &Palette) -> Result<Self, FaceError> {
        // The caption never changes; rasterize it up front.
        let mut caption_canvas = TextCanvas::new(
            text_width(&CAPTION_FONT, STARTS_IN.len()),
            line_height(&CAPTION_FONT),
        )?;
        let style = MonoTextStyle::new(&CAPTION_FONT, rgb888(palette.gray_font));
        Text::with_baseline(STARTS_IN, Point::zero(), style, Baseline::Top)
            .draw(&mut caption_canvas)
            .ok();

        let minutes_canvas = TextCanvas::new(
            text_width(&MINUTES_FONT, LESS_THAN_MINUTE.len()),
            line_height(&MINUTES_FONT),
        )?;

        Ok(Self {
            caption_canvas,
            minutes_canvas,
            cache: None,
            title_cols: 0,
            calendar_cols: 0,
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

    /// Recompute the chord-constrained column budgets for a new inner-ring
    /// radius, and drop the raster cache.
    pub fn measure(&mut self, radius: f32) {
        let title_block_h = (MAX_TITLE_LINES as f32) * line_height(&TITLE_FONT) as f32 * TITLE_SCALE;
        // Chord of the inner circle at the title block's height above center.
        let title_px = 2.0 * (radius * radius - title_block_h * title_block_h).max(0.0).sqrt();
        let title_char = TITLE_FONT.character_size.width as f32 * TITLE_SCALE;
        self.title_cols = (title_px / title_char).floor() as usize;

        // The calendar line hangs below the visible face; its half-width
        // grows with the offset.
        let cal_line_h = line_height(&CALENDAR_FONT) as f32 * CALENDAR_SCALE;
        let top = calendar_name_offset() + cal_line_h;
        let cal_px = (radius * radius + top * top).sqrt();
        let cal_char = CALENDAR_FONT.character_size.width as f32 * CALENDAR_SCALE;
        self.calendar_cols = (cal_px / cal_char).floor() as usize;

        self.cache = None;
    }

    pub fn title_cols(&self) -> usize {
        self.title_cols
    }

    pub fn calendar_cols(&self) -> usize {
        self.calendar_cols
    }

    /// Render the full block centered on `(cx, cy)` of the display surface.
    pub fn draw(
        &mut self,
        primary: &mut Pixmap,
        palette: &Palette,
        event: &Event,
        now_ms: i64,
        cx: f32,
        cy: f32,
    ) -> Result<(), FaceError> {
        self.ensure_cache(palette, event)?;
        let cache = self.cache.as_ref().ok_or(FaceError::BadRect)?;

        // Title block sits flush above center, bottom-aligned.
        let title_h = cache.title_canvas.height() as f32 * TITLE_SCALE;
        blit_scaled(
            primary,
            cache.title_canvas.pixmap(),
            cx - cache.title_width as f32 * TITLE_SCALE / 2.0,
            cy - title_h,
            TITLE_SCALE,
            self.quality,
        );

        // Caption directly under center.
        let caption_w = self.caption_canvas.width() as f32;
        blit_scaled(
            primary,
            self.caption_canvas.pixmap(),
            cx - caption_w / 2.0,
            cy,
            1.0,
            self.quality,
        );

        // Countdown line, re-rendered each frame.
        let phrase = minutes_phrase(event.minutes_to(now_ms));
        let style = MonoTextStyle::new(&MINUTES_FONT, rgb888(palette.white));
        self.minutes_canvas.clear_transparent();
        Text::with_baseline(&phrase, Point::zero(), style, Baseline::Top)
            .draw(&mut self.minutes_canvas)
            .ok();
        let phrase_w = text_width(&MINUTES_FONT, phrase.len()) as f32 * MINUTES_SCALE;
        let caption_h = line_height(&CAPTION_FONT) as f32;
        blit_scaled(
            primary,
            self.minutes_canvas.pixmap(),
            cx - phrase_w / 2.0,
            cy + caption_h + START_IN_MINUTES_PADDING,
            MINUTES_SCALE,
            self.quality,
        );

        // Calendar line below the countdown.
        blit_scaled(
            primary,
            cache.calendar_canvas.pixmap(),
            cx - cache.calendar_width as f32 * CALENDAR_SCALE / 2.0,
            cy + calendar_name_offset(),
            CALENDAR_SCALE,
            self.quality,
        );

        Ok(())
    }

    /// Rebuild the cached rasters when the event identity changed; reuse
    /// them untouched otherwise.
    fn ensure_cache(&mut self, palette: &Palette, event: &Event) -> Result<(), FaceError> {
        if let Some(cache) = self.cache.as_ref() {
            if cache.event_id == event.id
                && cache.title == event.title
                && cache.calendar_name == event.calendar_name
            {
                return Ok(());
            }
        }

        let lines = wrap_ellipsize(&event.title, self.title_cols, MAX_TITLE_LINES);
        let line_h = line_height(&TITLE_FONT);
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let canvas_w = text_width(&TITLE_FONT, widest.max(1));
        let canvas_h = line_h * MAX_TITLE_LINES as u32;
        let mut title_canvas = TextCanvas::new(canvas_w, canvas_h)?;
        let title_style = MonoTextStyle::new(&TITLE_FONT, rgb888(palette.white));
        // Bottom-aligned within the fixed two-line block.
        let first_row = MAX_TITLE_LINES - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let lw = text_width(&TITLE_FONT, line.chars().count());
            let x = ((canvas_w - lw) / 2) as i32;
            let y = ((first_row + i) as u32 * line_h) as i32;
            Text::with_baseline(line, Point::new(x, y), title_style, Baseline::Top)
                .draw(&mut title_canvas)
                .ok();
        }

        let calendar = ellipsize(&event.calendar_name, self.calendar_cols);
        let calendar_width = text_width(&CALENDAR_FONT, calendar.chars().count()).max(1);
        let mut calendar_canvas =
            TextCanvas::new(calendar_width, line_height(&CALENDAR_FONT))?;
        let cal_style = MonoTextStyle::new(&CALENDAR_FONT, rgb888(palette.white));
        Text::with_baseline(&calendar, Point::zero(), cal_style, Baseline::Top)
            .draw(&mut calendar_canvas)
            .ok();

        self.cache = Some(TextBlockCache {
            event_id: event.id,
            title: event.title.clone(),
            calendar_name: event.calendar_name.clone(),
            title_canvas,
            title_width: canvas_w,
            calendar_canvas,
            calendar_width,
        });
        Ok(())
    }
}

/// Vertical offset of the calendar line's top edge below face center.
fn calendar_name_offset() -> f32 {
    line_height(&CAPTION_FONT) as f32
        + START_IN_MINUTES_PADDING
        + line_height(&MINUTES_FONT) as f32 * MINUTES_SCALE
        + CALENDAR_NAME_PADDING
}

/// Countdown phrase. Zero or negative whole minutes fall back to the fixed
/// "almost there" wording.
pub fn minutes_phrase(minutes: i64) -> String {
    if minutes > 1 {
        format!("{minutes} minutes")
    } else if minutes == 1 {
        "1 minute".to_string()
    } else {
        LESS_THAN_MINUTE.to_string()
    }
}

/// Greedy word wrap into at most `max_lines` lines of `cols` characters;
/// overflow is cut on the last line with a trailing ellipsis.
pub fn wrap_ellipsize(text: &str, cols: usize, max_lines: usize) -> Vec<String> {
    if cols == 0 || max_lines == 0 {
        return Vec::new();
    }
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: String = word.to_string();
        // Hard-split words longer than a full line.
        while word.chars().count() > cols {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(cols).collect();
            let tail: String = word.chars().skip(cols).collect();
            lines.push(head);
            word = tail;
        }
        if word.is_empty() {
            continue;
        }
        if current.is_empty() {
            current = word;
        } else if current.chars().count() + 1 + word.chars().count() <= cols {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = ellipsize_line(last, cols);
        }
    }
    lines
}

/// Single-line ellipsis cut.
pub fn ellipsize(text: &str, cols: usize) -> String {
    if text.chars().count() <= cols {
        text.to_string()
    } else {
        ellipsize_line(text, cols)
    }
}

fn ellipsize_line(text: &str, cols: usize) -> String {
    if cols <= ELLIPSIS.len() {
        return ELLIPSIS.chars().take(cols).collect();
    }
    if text.chars().count() + ELLIPSIS.len() <= cols {
        return format!("{text}{ELLIPSIS}");
    }
    let kept: String = text.chars().take(cols - ELLIPSIS.len()).collect();
    format!("{}{}", kept.trim_end(), ELLIPSIS)
}
