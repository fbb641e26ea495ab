/*
 *  face/surfaces.rs
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Raster surfaces: display pixmap, reusable offscreen face buffers, and
 *  the mono-font text canvas bridged onto them
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

use super::{FaceError, geometry::FaceGeometry};
use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use log::debug;
use tiny_skia::{BlendMode, ColorU8, FilterQuality, Pixmap, PixmapPaint, Transform};

/// The frame surfaces. The primary pixmap is display sized; the face and
/// scratch pixmaps cover the ring region and are allocated exactly once per
/// size - a resize is the only thing that replaces them.
pub struct RenderSurfaces {
    primary: Pixmap,
    face: Pixmap,
    scratch: Pixmap,
    display_size: (u32, u32),
    face_size: (u32, u32),
}

impl RenderSurfaces {
    pub fn new(geometry: &FaceGeometry) -> Result<Self, FaceError> {
        let display_size = (geometry.bounds_w as u32, geometry.bounds_h as u32);
        let face_size = (geometry.face_w.round() as u32, geometry.face_h.round() as u32);
        Ok(Self {
            primary: alloc(display_size)?,
            face: alloc(face_size)?,
            scratch: alloc(face_size)?,
            display_size,
            face_size,
        })
    }

    /// Reallocate for a new geometry only when the sizes actually changed.
    /// Returns true when buffers were replaced.
    pub fn ensure(&mut self, geometry: &FaceGeometry) -> Result<bool, FaceError> {
        let display_size = (geometry.bounds_w as u32, geometry.bounds_h as u32);
        let face_size = (geometry.face_w.round() as u32, geometry.face_h.round() as u32);
        if display_size == self.display_size && face_size == self.face_size {
            return Ok(false);
        }
        debug!(
            "surfaces reallocated: display {:?} face {:?}",
            display_size, face_size
        );
        self.primary = alloc(display_size)?;
        self.face = alloc(face_size)?;
        self.scratch = alloc(face_size)?;
        self.display_size = display_size;
        self.face_size = face_size;
        Ok(true)
    }

    pub fn primary(&self) -> &Pixmap {
        &self.primary
    }

    pub fn primary_mut(&mut self) -> &mut Pixmap {
        &mut self.primary
    }

    pub fn face_mut(&mut self) -> &mut Pixmap {
        &mut self.face
    }

    pub fn face(&self) -> &Pixmap {
        &self.face
    }

    /// Face and scratch together, for the tint pass that reads one while
    /// writing the other.
    pub fn face_and_scratch(&mut self) -> (&mut Pixmap, &mut Pixmap) {
        (&mut self.face, &mut self.scratch)
    }

    pub fn face_size(&self) -> (u32, u32) {
        self.face_size
    }

    /// Blit the face buffer onto the primary surface at its layout origin.
    pub fn composite_face(&mut self, x: f32, y: f32, quality: FilterQuality) {
        let paint = PixmapPaint {
            opacity: 1.0,
            blend_mode: BlendMode::SourceOver,
            quality,
        };
        let face = self.face.as_ref();
        self.primary
            .draw_pixmap(0, 0, face, &paint, Transform::from_translate(x, y), None);
    }
}

fn alloc(size: (u32, u32)) -> Result<Pixmap, FaceError> {
    Pixmap::new(size.0, size.1).ok_or(FaceError::Allocation {
        width: size.0,
        height: size.1,
    })
}

/// Blit `src` onto `dst` with its top-left at `(x, y)`, uniformly scaled.
/// Ambient mode drops `quality` to nearest-neighbor.
pub fn blit_scaled(
    dst: &mut Pixmap,
    src: &Pixmap,
    x: f32,
    y: f32,
    scale: f32,
    quality: FilterQuality,
) {
    let paint = PixmapPaint {
        opacity: 1.0,
        blend_mode: BlendMode::SourceOver,
        quality,
    };
    let transform = Transform::from_translate(x, y).pre_scale(scale, scale);
    dst.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
}

/// Advance width of `len` mono-font characters.
pub fn text_width(font: &MonoFont<'_>, len: usize) -> u32 {
    if len == 0 {
        return 0;
    }
    len as u32 * font.character_size.width + (len as u32 - 1) * font.character_spacing
}

pub fn line_height(font: &MonoFont<'_>) -> u32 {
    font.character_size.height
}

/// A runtime-sized RGBA canvas the embedded-graphics text pipeline draws
/// into. Glyph pixels land opaque in the requested color on a transparent
/// background; the result is blitted onto the face surfaces.
pub struct TextCanvas {
    pix: Pixmap,
    w: u32,
    h: u32,
}

impl TextCanvas {
    pub fn new(width: u32, height: u32) -> Result<Self, FaceError> {
        Ok(Self {
            pix: alloc((width.max(1), height.max(1)))?,
            w: width.max(1),
            h: height.max(1),
        })
    }

    pub fn clear_transparent(&mut self) {
        self.pix.fill(tiny_skia::Color::TRANSPARENT);
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pix
    }

    pub fn width(&self) -> u32 {
        self.w
    }

    pub fn height(&self) -> u32 {
        self.h
    }
}

impl OriginDimensions for TextCanvas {
    fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }
}

impl DrawTarget for TextCanvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let w = self.w as i32;
        let h = self.h as i32;
        let buf = self.pix.pixels_mut();
        for Pixel(p, c) in pixels {
            if p.x >= 0 && p.y >= 0 && p.x < w && p.y < h {
                let i = (p.y * w + p.x) as usize;
                buf[i] = ColorU8::from_rgba(c.r(), c.g(), c.b(), 255).premultiply();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mono_font::ascii::FONT_6X10;
    use embedded_graphics::mono_font::MonoTextStyle;
    use embedded_graphics::text::{Baseline, Text};

    fn painted(pix: &Pixmap) -> usize {
        pix.pixels().iter().filter(|p| p.alpha() > 0).count()
    }

    #[test]
    fn surfaces_reallocate_only_on_size_change() {
        let g = FaceGeometry::measure(400, 400).unwrap();
        let mut surfaces = RenderSurfaces::new(&g).unwrap();
        assert!(!surfaces.ensure(&g).unwrap());

        let g2 = FaceGeometry::measure(320, 320).unwrap();
        assert!(surfaces.ensure(&g2).unwrap());
        assert_eq!(surfaces.primary().width(), 320);
        assert!(!surfaces.ensure(&g2).unwrap());
    }

    #[test]
    fn text_canvas_renders_glyph_pixels() {
        let mut canvas = TextCanvas::new(60, 12).unwrap();
        let style = MonoTextStyle::new(&FONT_6X10, Rgb888::WHITE);
        Text::with_baseline("42", Point::zero(), style, Baseline::Top)
            .draw(&mut canvas)
            .unwrap();
        assert!(painted(canvas.pixmap()) > 0);

        canvas.clear_transparent();
        assert_eq!(painted(canvas.pixmap()), 0);
    }

    #[test]
    fn text_canvas_clips_out_of_bounds() {
        let mut canvas = TextCanvas::new(4, 4).unwrap();
        let style = MonoTextStyle::new(&FONT_6X10, Rgb888::WHITE);
        // Far outside the canvas; must not panic.
        Text::with_baseline("x", Point::new(100, 100), style, Baseline::Top)
            .draw(&mut canvas)
            .unwrap();
    }

    #[test]
    fn mono_text_width_is_deterministic() {
        assert_eq!(text_width(&FONT_6X10, 0), 0);
        assert_eq!(text_width(&FONT_6X10, 1), 6);
        assert_eq!(text_width(&FONT_6X10, 5), 30);
    }

    #[test]
    fn blit_scaled_lands_at_offset() {
        let mut dst = Pixmap::new(40, 40).unwrap();
        let mut src = Pixmap::new(4, 4).unwrap();
        src.fill(tiny_skia::Color::WHITE);
        blit_scaled(&mut dst, &src, 10.0, 10.0, 2.0, FilterQuality::Nearest);
        let px = dst.pixels();
        let at = |x: u32, y: u32| px[(y * 40 + x) as usize].alpha();
        assert!(at(11, 11) > 0);
        assert!(at(17, 17) > 0);
        assert_eq!(at(5, 5), 0);
        assert_eq!(at(25, 25), 0);
    }
}
