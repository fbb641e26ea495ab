/*
 *  palette.rs
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fixed face color palette and the outer-ring gradient stops
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

use tiny_skia::Color;

/// Gradient stop positions around the outer ring. The duplicated positions
/// produce hard seams; they are tuned so both seams land inside dash gaps
/// once the ring rotation is applied.
pub const RING_GRADIENT_POSITIONS: [f32; 5] = [0.0, 0.495, 0.495, 0.995, 0.995];

/// Face color palette. One instance per engine, shared by every drawer.
#[derive(Debug, Clone)]
pub struct Palette {
    pub background: Color,
    pub soft_blue: Color,
    pub green_blue: Color,
    pub blush: Color,
    pub lipstick: Color,
    pub white: Color,
    pub neutral: Color,
    pub gray_font: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::from_rgba8(0x18, 0x1d, 0x25, 0xff),
            soft_blue: Color::from_rgba8(0x6f, 0x9f, 0xf2, 0xff),
            green_blue: Color::from_rgba8(0x00, 0xc4, 0xa1, 0xff),
            blush: Color::from_rgba8(0xf2, 0xa3, 0x9b, 0xff),
            lipstick: Color::from_rgba8(0xe0, 0x3a, 0x64, 0xff),
            white: Color::from_rgba8(0xff, 0xff, 0xff, 0xff),
            // Semi-transparent wash laid over already-painted ring pixels to
            // mark elapsed minutes.
            neutral: Color::from_rgba8(0x10, 0x14, 0x1a, 0xa8),
            gray_font: Color::from_rgba8(0x9a, 0xa3, 0xad, 0xff),
        }
    }
}

impl Palette {
    /// Colors matched to [`RING_GRADIENT_POSITIONS`], first and last stop
    /// identical so the wrap-around at 12 o'clock is seamless.
    pub fn ring_gradient(&self) -> [Color; 5] {
        [
            self.green_blue,
            self.soft_blue,
            self.blush,
            self.lipstick,
            self.green_blue,
        ]
    }

    /// The hour readout echoes the rounding boundary: the displayed hour is
    /// rounded up from minute 30, and the digit color flips with it.
    pub fn hour_color(&self, minute: u32) -> Color {
        if minute < 30 {
            self.green_blue
        } else {
            self.lipstick
        }
    }
}
