/*
 *  face/indicator.rs
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Inner event-indicator ring: dashed stroke plus the 330-degree erase
 *  arc that leaves a wedge at the event's minute-of-hour
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
use super::{FaceError, INNER_STROKE, PIECES_GAP};
use crate::palette::Palette;
use tiny_skia::{BlendMode, Color, FillRule, Paint, Stroke, Transform};

/// Width of the erase arc; what remains uncovered is the 30-degree wedge
/// pointing at the event's minute on the 12-hour face.
const ARC_MASK_SWEEP_ANGLE: f32 = 330.0;

/// Inner-ring renderer. Same dash alignment as the outer ring but
/// independently parameterized by the inner diameter, and no -90 offset.
pub struct IndicatorRenderer {
    dash: DashPattern,
    rotation: f32,
    ring_color: Color,
    anti_alias: bool,
}

impl IndicatorRenderer {
    pub fn new(palette: &Palette, geometry: &FaceGeometry) -> Self {
        let mut renderer = Self {
            dash: DashPattern::for_diameter(1.0, PIECES_GAP),
            rotation: 0.0,
            ring_color: palette.white,
            anti_alias: true,
        };
        renderer.measure(geometry);
        renderer
    }

    pub fn measure(&mut self, geometry: &FaceGeometry) {
        self.dash = DashPattern::for_diameter(geometry.inner_oval.width(), PIECES_GAP);
        self.rotation = self.dash.rotation(0.0);
    }

    pub fn set_ambient(&mut self, ambient_on: bool) {
        self.anti_alias = !ambient_on;
    }

    /// Stroke the dashed ring, then reveal only the event wedge by erasing
    /// the rest of the band.
    pub fn draw(
        &self,
        surfaces: &mut RenderSurfaces,
        geometry: &FaceGeometry,
        event_minute: u32,
    ) -> Result<(), FaceError> {
        let oval = geometry::oval_path(geometry.inner_oval)?;
        let rotate =
            Transform::from_rotate_at(self.rotation, geometry.center_x, geometry.center_y);

        let face = surfaces.face_mut();
        let mut ring_paint = Paint::default();
        ring_paint.set_color(self.ring_color);
        ring_paint.anti_alias = self.anti_alias;
        let stroke = Stroke {
            width: INNER_STROKE,
            dash: self.dash.stroke_dash(),
            ..Stroke::default()
        };
        face.stroke_path(&oval, &ring_paint, &stroke, rotate, None);

        let pie = geometry::pie_path(
            geometry.inner_arc_rect,
            start_angle(event_minute),
            ARC_MASK_SWEEP_ANGLE,
        )?;
        face.fill_path(
            &pie,
            &self.erase_paint(),
            FillRule::Winding,
            Transform::identity(),
            None,
        );

        Ok(())
    }

    /// No valid event: erase the whole indicator band so nothing of the
    /// ring or a stale wedge survives.
    pub fn clear_indication(
        &self,
        surfaces: &mut RenderSurfaces,
        geometry: &FaceGeometry,
    ) -> Result<(), FaceError> {
        let band = geometry::oval_path(geometry.indicator_band)?;
        surfaces.face_mut().fill_path(
            &band,
            &self.erase_paint(),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
        Ok(())
    }

    fn erase_paint(&self) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(Color::WHITE);
        paint.anti_alias = self.anti_alias;
        paint.blend_mode = BlendMode::DestinationOut;
        paint
    }
}

/// Start of the erase arc so the uncovered wedge ends up at the event's
/// minute position. Minute zero pins the wedge to 12 o'clock.
pub fn start_angle(minutes: u32) -> f32 {
    if minutes == 0 {
        -60.0
    } else {
        ((minutes as i32 * 6 / 30) * 30 - 60) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_angle_golden_values() {
        assert_eq!(start_angle(0), -60.0);
        assert_eq!(start_angle(1), -60.0);
        assert_eq!(start_angle(5), -30.0);
        assert_eq!(start_angle(15), 30.0);
        assert_eq!(start_angle(30), 120.0);
        assert_eq!(start_angle(45), 210.0);
        assert_eq!(start_angle(59), 270.0);
    }

    #[test]
    fn start_angle_steps_by_thirty() {
        for m in 1..60 {
            assert_eq!(start_angle(m) as i32 % 30, 0);
        }
    }

    fn painted(surfaces: &RenderSurfaces) -> usize {
        surfaces
            .face()
            .pixels()
            .iter()
            .filter(|p| p.alpha() > 0)
            .count()
    }

    #[test]
    fn draw_then_clear_removes_the_ring() {
        let palette = Palette::default();
        let geometry = FaceGeometry::measure(400, 400).unwrap();
        let mut surfaces = RenderSurfaces::new(&geometry).unwrap();
        let renderer = IndicatorRenderer::new(&palette, &geometry);

        renderer.draw(&mut surfaces, &geometry, 15).unwrap();
        let with_wedge = painted(&surfaces);
        assert!(with_wedge > 0, "indicator wedge painted nothing");

        renderer.clear_indication(&mut surfaces, &geometry).unwrap();
        let after_clear = painted(&surfaces);
        assert!(after_clear < with_wedge, "clear_indication left the wedge");
    }

    #[test]
    fn erase_arc_leaves_only_a_wedge() {
        let palette = Palette::default();
        let geometry = FaceGeometry::measure(400, 400).unwrap();
        let mut surfaces = RenderSurfaces::new(&geometry).unwrap();
        let renderer = IndicatorRenderer::new(&palette, &geometry);

        // Full ring with no erase arc, for comparison: draw, then count.
        let oval = geometry::oval_path(geometry.inner_oval).unwrap();
        let mut paint = Paint::default();
        paint.set_color(Color::WHITE);
        let stroke = Stroke {
            width: INNER_STROKE,
            dash: renderer.dash.stroke_dash(),
            ..Stroke::default()
        };
        surfaces.face_mut().stroke_path(
            &oval,
            &paint,
            &stroke,
            Transform::identity(),
            None,
        );
        let full_ring = painted(&surfaces);

        renderer.clear_indication(&mut surfaces, &geometry).unwrap();
        renderer.draw(&mut surfaces, &geometry, 15).unwrap();
        let wedge_only = painted(&surfaces);

        // 30 degrees out of 360 should survive, give or take stroke ends.
        assert!(wedge_only * 4 < full_ring, "erase arc barely erased");
        assert!(wedge_only > 0);
    }
}
