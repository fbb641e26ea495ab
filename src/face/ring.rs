/*
 *  face/ring.rs
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Outer face ring: 12-dash angular-gradient stroke plus the
 *  elapsed-minutes mask arc
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

use super::geometry::{self, DashPattern, FaceGeometry};
use super::surfaces::RenderSurfaces;
use super::{FaceError, OUTER_STROKE, PIECES_GAP};
use crate::palette::{Palette, RING_GRADIENT_POSITIONS};
use tiny_skia::{
    BlendMode, Color, ColorU8, FillRule, Paint, Pixmap, PixmapPaint, Stroke, Transform,
};

/// Outer-ring renderer. Dash pattern, rotation and gradient stops are cached
/// and recomputed only when the face diameter changes.
pub struct RingRenderer {
    dash: DashPattern,
    rotation: f32,
    gradient: [Color; 5],
    mask: Color,
    anti_alias: bool,
}

impl RingRenderer {
    pub fn new(palette: &Palette, geometry: &FaceGeometry) -> Self {
        let mut renderer = Self {
            dash: DashPattern::for_diameter(1.0, PIECES_GAP),
            rotation: 0.0,
            gradient: palette.ring_gradient(),
            mask: palette.neutral,
            anti_alias: true,
        };
        renderer.measure(geometry);
        renderer
    }

    /// Recompute the cached dash alignment for a new diameter. The -90
    /// offset starts the first gap at 12 o'clock.
    pub fn measure(&mut self, geometry: &FaceGeometry) {
        self.dash = DashPattern::for_diameter(geometry.outer_oval.width(), PIECES_GAP);
        self.rotation = self.dash.rotation(-90.0);
    }

    pub fn set_ambient(&mut self, ambient_on: bool) {
        self.anti_alias = !ambient_on;
    }

    /// Draw the ring and the elapsed mask for the current minute-of-hour
    /// onto the face surface.
    pub fn draw(
        &self,
        surfaces: &mut RenderSurfaces,
        geometry: &FaceGeometry,
        minutes: u32,
    ) -> Result<(), FaceError> {
        let oval = geometry::oval_path(geometry.outer_oval)?;
        let rotate =
            Transform::from_rotate_at(self.rotation, geometry.center_x, geometry.center_y);

        let (face, scratch) = surfaces.face_and_scratch();

        // Dash raster first, gradient tint second: there is no sweep-gradient
        // shader here, so the stroke is laid down white and recolored per
        // pixel around the center.
        scratch.fill(Color::TRANSPARENT);
        let mut paint = Paint::default();
        paint.set_color(Color::WHITE);
        paint.anti_alias = self.anti_alias;
        let stroke = Stroke {
            width: OUTER_STROKE,
            dash: self.dash.stroke_dash(),
            ..Stroke::default()
        };
        scratch.stroke_path(&oval, &paint, &stroke, rotate, None);
        self.tint_sweep(scratch, geometry.center_x, geometry.center_y);

        face.draw_pixmap(
            0,
            0,
            scratch.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );

        // Elapsed mask: a pie from 12 o'clock through the sweep angle,
        // source-atop so it only ever darkens pixels the ring painted.
        let pie = geometry::pie_path(
            geometry.outer_arc_rect,
            -90.0,
            sweep_angle(minutes) as f32,
        )?;
        let mut mask_paint = Paint::default();
        mask_paint.set_color(self.mask);
        mask_paint.anti_alias = self.anti_alias;
        mask_paint.blend_mode = BlendMode::SourceAtop;
        face.fill_path(&pie, &mask_paint, FillRule::Winding, Transform::identity(), None);

        Ok(())
    }

    /// Recolor every covered dash pixel with the angular gradient. The
    /// gradient lives in ring coordinates, so the rotation applied to the
    /// stroke is subtracted back out of the sampling angle.
    fn tint_sweep(&self, scratch: &mut Pixmap, cx: f32, cy: f32) {
        let w = scratch.width() as usize;
        for (i, px) in scratch.pixels_mut().iter_mut().enumerate() {
            let alpha = px.alpha();
            if alpha == 0 {
                continue;
            }
            let x = (i % w) as f32 + 0.5;
            let y = (i / w) as f32 + 0.5;
            let deg = (y - cy).atan2(x - cx).to_degrees();
            let t = (deg - self.rotation).rem_euclid(360.0) / 360.0;
            let c = gradient_color_at(&self.gradient, t);
            *px = ColorU8::from_rgba(
                (c.red() * 255.0 + 0.5) as u8,
                (c.green() * 255.0 + 0.5) as u8,
                (c.blue() * 255.0 + 0.5) as u8,
                alpha,
            )
            .premultiply();
        }
    }
}

/// Sweep angle of the elapsed mask, degrees from 12 o'clock.
///
/// The mapping is intentionally asymmetric around the half hour: from minute
/// 30 the mask sweeps forward in 30-degree steps, below it the face fills
/// backward from the top, and minute 0 shows the almost-complete -330 ring.
/// Contract values: 0 -> -330, 15 -> -240, 30 -> 180, 59 -> 330.
pub fn sweep_angle(minutes: u32) -> i32 {
    let m = minutes as i32;
    if m >= 30 {
        (m * 6 / 30) * 30
    } else if m == 0 {
        -330
    } else {
        -(((59 - m) * 6 / 30) * 30)
    }
}

/// Evaluate the 5-stop gradient at `t` in `[0, 1)`. Duplicated stop
/// positions are hard seams.
fn gradient_color_at(colors: &[Color; 5], t: f32) -> Color {
    let pos = &RING_GRADIENT_POSITIONS;
    let t = t.clamp(0.0, 1.0);
    if t <= pos[0] {
        return colors[0];
    }
    for i in 0..pos.len() - 1 {
        let (p0, p1) = (pos[i], pos[i + 1]);
        if t <= p1 {
            if p1 <= p0 {
                return colors[i + 1];
            }
            let f = (t - p0) / (p1 - p0);
            return lerp(colors[i], colors[i + 1], f);
        }
    }
    colors[colors.len() - 1]
}

fn lerp(a: Color, b: Color, f: f32) -> Color {
    Color::from_rgba(
        a.red() + (b.red() - a.red()) * f,
        a.green() + (b.green() - a.green()) * f,
        a.blue() + (b.blue() - a.blue()) * f,
        a.alpha() + (b.alpha() - a.alpha()) * f,
    )
    .unwrap_or(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_angle_golden_values() {
        assert_eq!(sweep_angle(0), -330);
        assert_eq!(sweep_angle(1), -330);
        assert_eq!(sweep_angle(14), -270);
        assert_eq!(sweep_angle(15), -240);
        assert_eq!(sweep_angle(29), -180);
        assert_eq!(sweep_angle(30), 180);
        assert_eq!(sweep_angle(45), 270);
        assert_eq!(sweep_angle(59), 330);
    }

    #[test]
    fn sweep_angle_forward_branch_steps_by_thirty() {
        for m in 30..60 {
            let a = sweep_angle(m);
            assert!(a >= 180 && a <= 330);
            assert_eq!(a % 30, 0);
        }
    }

    #[test]
    fn gradient_seam_wraps_to_first_color() {
        let palette = Palette::default();
        let stops = palette.ring_gradient();
        let start = gradient_color_at(&stops, 0.0);
        let end = gradient_color_at(&stops, 0.9999);
        assert!((start.red() - end.red()).abs() < 1e-4);
        assert!((start.green() - end.green()).abs() < 1e-4);
    }

    #[test]
    fn gradient_jumps_at_duplicate_stop() {
        let palette = Palette::default();
        let stops = palette.ring_gradient();
        let before = gradient_color_at(&stops, 0.494);
        let after = gradient_color_at(&stops, 0.496);
        // soft_blue side vs blush side of the seam.
        assert!((before.red() - palette.soft_blue.red()).abs() < 0.05);
        assert!((after.red() - palette.blush.red()).abs() < 0.05);
    }

    #[test]
    fn draw_paints_ring_and_mask() {
        let palette = Palette::default();
        let geometry = FaceGeometry::measure(400, 400).unwrap();
        let mut surfaces = RenderSurfaces::new(&geometry).unwrap();
        let renderer = RingRenderer::new(&palette, &geometry);

        renderer.draw(&mut surfaces, &geometry, 0).unwrap();
        let unmasked: Vec<u8> = surfaces.face().pixels().iter().map(|p| p.red()).collect();
        let painted = surfaces
            .face()
            .pixels()
            .iter()
            .filter(|p| p.alpha() > 0)
            .count();
        assert!(painted > 0, "ring stroke painted nothing");

        renderer.draw(&mut surfaces, &geometry, 45).unwrap();
        let masked: Vec<u8> = surfaces.face().pixels().iter().map(|p| p.red()).collect();
        assert_ne!(unmasked, masked, "elapsed mask had no visible effect");
    }
}
