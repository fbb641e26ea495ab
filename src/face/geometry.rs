/*
 *  face/geometry.rs
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Dash alignment for the hour rings, face rectangle layout, and the
 *  arc/pie path builders the mask compositing uses
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

use super::{FaceError, FACE_PADDING, INNER_STROKE, OUTER_STROKE, OVALS_GAP};
use std::f32::consts::PI;
use tiny_skia::{Path, PathBuilder, Rect};

/// Radial divisions of the face, one per clock hour.
pub const HOURS_COUNT: u32 = 12;

/// Angle between two following hours on the clock face.
pub const HOURS_ANGLE_STEP: f32 = 360.0 / HOURS_COUNT as f32;

/// Dash/gap stroke pattern for a ring of a given diameter, with the rotation
/// that puts the dash gaps on the hour positions.
///
/// One division of the circumference is `piece = pi * D / 12`; the stroke
/// draws `piece - gap` then skips `gap`. The first gap starts at path start,
/// so the ring is rotated back by half a gap (in degrees) to center the gap
/// on the hour tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashPattern {
    pub piece: f32,
    pub dash: [f32; 2],
    gap: f32,
}

impl DashPattern {
    /// Callers reject degenerate diameters before getting here.
    pub fn for_diameter(diameter: f32, gap: f32) -> Self {
        let piece = PI * diameter / HOURS_COUNT as f32;
        Self {
            piece,
            dash: [piece - gap, gap],
            gap,
        }
    }

    /// Ring rotation in degrees. `additional_deg` is 0 for the inner ring
    /// and -90 for the outer ring, so its first gap lands at 12 o'clock.
    pub fn rotation(&self, additional_deg: f32) -> f32 {
        self.gap / 2.0 * HOURS_ANGLE_STEP / self.piece + additional_deg
    }

    pub fn stroke_dash(&self) -> Option<tiny_skia::StrokeDash> {
        tiny_skia::StrokeDash::new(self.dash.to_vec(), 0.0)
    }
}

/// Every rectangle of the face layout, derived purely from the display
/// bounds. Recomputed wholesale on resize, never diffed.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceGeometry {
    /// Display bounds the layout was computed for.
    pub bounds_w: f32,
    pub bounds_h: f32,
    /// Offscreen face surface size.
    pub face_w: f32,
    pub face_h: f32,
    /// Face-surface center (ring center).
    pub center_x: f32,
    pub center_y: f32,
    /// Where the face surface lands on the display surface.
    pub origin_x: f32,
    pub origin_y: f32,
    /// Outer ring stroke centerline rect, inside the face surface.
    pub outer_oval: Rect,
    /// Bounding box of the elapsed-minutes pie slice.
    pub outer_arc_rect: Rect,
    /// Inner ring stroke centerline rect.
    pub inner_oval: Rect,
    /// Bounding box of the indicator erase arc.
    pub inner_arc_rect: Rect,
    /// Full indicator band, erased by clear_indication.
    pub indicator_band: Rect,
}

impl FaceGeometry {
    pub fn measure(width: u32, height: u32) -> Result<Self, FaceError> {
        if width == 0 || height == 0 {
            return Err(FaceError::DegenerateBounds { width, height });
        }
        let (w, h) = (width as f32, height as f32);

        let face_w = w - FACE_PADDING * 2.0 + OUTER_STROKE * 2.0;
        let face_h = h - FACE_PADDING * 2.0 + OUTER_STROKE * 2.0;

        let ovals_padding = INNER_STROKE / 2.0 + OVALS_GAP + OUTER_STROKE / 2.0;
        let inner_diameter = face_w - 2.0 * OUTER_STROKE - 2.0 * ovals_padding;
        if face_w <= 0.0 || face_h <= 0.0 || inner_diameter <= 0.0 {
            return Err(FaceError::DegenerateBounds { width, height });
        }

        let outer_oval = rect(
            OUTER_STROKE,
            OUTER_STROKE,
            face_w - OUTER_STROKE,
            face_h - OUTER_STROKE,
        )?;
        let outer_arc_rect = rect(
            outer_oval.left() - FACE_PADDING,
            outer_oval.top() - FACE_PADDING,
            outer_oval.right() + FACE_PADDING,
            outer_oval.bottom() + FACE_PADDING,
        )?;
        let inner_oval = rect(
            outer_oval.left() + ovals_padding,
            outer_oval.top() + ovals_padding,
            outer_oval.right() - ovals_padding,
            outer_oval.bottom() - ovals_padding,
        )?;
        let inner_arc_rect = rect(
            inner_oval.left() - INNER_STROKE,
            inner_oval.top() - INNER_STROKE,
            inner_oval.right() + INNER_STROKE,
            inner_oval.bottom() + INNER_STROKE,
        )?;
        let indicator_band = rect(
            outer_oval.left() + ovals_padding - INNER_STROKE,
            outer_oval.top() + ovals_padding - INNER_STROKE,
            outer_oval.right() - ovals_padding + INNER_STROKE,
            outer_oval.bottom() - ovals_padding + INNER_STROKE,
        )?;

        Ok(Self {
            bounds_w: w,
            bounds_h: h,
            face_w,
            face_h,
            center_x: face_w / 2.0,
            center_y: face_h / 2.0,
            origin_x: FACE_PADDING - OUTER_STROKE,
            origin_y: FACE_PADDING - OUTER_STROKE,
            outer_oval,
            outer_arc_rect,
            inner_oval,
            inner_arc_rect,
            indicator_band,
        })
    }

    /// Inner ring radius, the text layout's circular constraint.
    pub fn inner_radius(&self) -> f32 {
        self.inner_oval.width() / 2.0
    }

    /// Display-surface center, where the readouts are anchored.
    pub fn display_center(&self) -> (f32, f32) {
        (self.bounds_w / 2.0, self.bounds_h / 2.0)
    }
}

fn rect(l: f32, t: f32, r: f32, b: f32) -> Result<Rect, FaceError> {
    Rect::from_ltrb(l, t, r, b).ok_or(FaceError::BadRect)
}

fn point_on(rect: &Rect, angle_deg: f32) -> (f32, f32) {
    let (cx, cy) = rect_center(rect);
    let a = angle_deg.to_radians();
    (
        cx + rect.width() / 2.0 * a.cos(),
        cy + rect.height() / 2.0 * a.sin(),
    )
}

fn rect_center(rect: &Rect) -> (f32, f32) {
    (
        (rect.left() + rect.right()) / 2.0,
        (rect.top() + rect.bottom()) / 2.0,
    )
}

/// Full ellipse path for a stroke centerline rect.
pub fn oval_path(rect: Rect) -> Result<Path, FaceError> {
    PathBuilder::from_oval(rect).ok_or(FaceError::BadRect)
}

/// Closed pie slice from the center of `rect` spanning `sweep_deg` from
/// `start_deg`. Angles are screen-space degrees: 0 at 3 o'clock, positive
/// sweeps clockwise. The arc is cubic-Bezier approximated in segments of at
/// most 90 degrees.
pub fn pie_path(rect: Rect, start_deg: f32, sweep_deg: f32) -> Result<Path, FaceError> {
    if sweep_deg == 0.0 {
        return Err(FaceError::BadRect);
    }
    let (cx, cy) = rect_center(&rect);
    let rx = rect.width() / 2.0;
    let ry = rect.height() / 2.0;

    let mut pb = PathBuilder::new();
    pb.move_to(cx, cy);
    let (sx, sy) = point_on(&rect, start_deg);
    pb.line_to(sx, sy);

    let segments = (sweep_deg.abs() / 90.0).ceil().max(1.0) as u32;
    let step = (sweep_deg / segments as f32).to_radians();
    // Cubic control distance for a circular arc of `step` radians.
    let k = 4.0 / 3.0 * (step / 4.0).tan();

    let mut a0 = start_deg.to_radians();
    for _ in 0..segments {
        let a1 = a0 + step;
        let (x0, y0) = (cx + rx * a0.cos(), cy + ry * a0.sin());
        let (x1, y1) = (cx + rx * a1.cos(), cy + ry * a1.sin());
        pb.cubic_to(
            x0 - k * rx * a0.sin(),
            y0 + k * ry * a0.cos(),
            x1 + k * rx * a1.sin(),
            y1 - k * ry * a1.cos(),
            x1,
            y1,
        );
        a0 = a1;
    }
    pb.close();
    pb.finish().ok_or(FaceError::BadRect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::PIECES_GAP;

    #[test]
    fn dash_pattern_sums_to_division_length() {
        for diameter in [80.0_f32, 123.0, 360.0, 451.5] {
            let dashes = DashPattern::for_diameter(diameter, PIECES_GAP);
            let sum = dashes.dash[0] + dashes.dash[1];
            let expected = PI * diameter / HOURS_COUNT as f32;
            assert!((sum - expected).abs() < 1e-3, "diameter {diameter}");
        }
    }

    #[test]
    fn rotation_centers_gap_on_hour_tick() {
        let dashes = DashPattern::for_diameter(360.0, PIECES_GAP);
        // Half a gap expressed in degrees of arc.
        let half_gap_deg = PIECES_GAP / 2.0 * HOURS_ANGLE_STEP / dashes.piece;
        assert!((dashes.rotation(0.0) - half_gap_deg).abs() < 1e-5);
        assert!((dashes.rotation(-90.0) - (half_gap_deg - 90.0)).abs() < 1e-5);
    }

    #[test]
    fn rotation_shrinks_with_diameter() {
        let small = DashPattern::for_diameter(100.0, PIECES_GAP);
        let large = DashPattern::for_diameter(400.0, PIECES_GAP);
        assert!(small.rotation(0.0) > large.rotation(0.0));
    }

    #[test]
    fn geometry_nests_inward() {
        let g = FaceGeometry::measure(400, 400).unwrap();
        assert!(g.inner_oval.left() > g.outer_oval.left());
        assert!(g.inner_oval.width() < g.outer_oval.width());
        assert!(g.inner_arc_rect.width() > g.inner_oval.width());
        assert_eq!(g.face_w, 400.0 - 2.0 * FACE_PADDING + 2.0 * OUTER_STROKE);
        assert_eq!(g.center_x, g.face_w / 2.0);
    }

    #[test]
    fn degenerate_bounds_rejected() {
        assert!(matches!(
            FaceGeometry::measure(0, 400),
            Err(FaceError::DegenerateBounds { .. })
        ));
        assert!(matches!(
            FaceGeometry::measure(400, 0),
            Err(FaceError::DegenerateBounds { .. })
        ));
        // Too small to fit the ring band at all.
        assert!(FaceGeometry::measure(40, 40).is_err());
    }

    #[test]
    fn pie_path_covers_expected_quadrant() {
        let rect = Rect::from_ltrb(0.0, 0.0, 100.0, 100.0).unwrap();
        let path = pie_path(rect, -90.0, 90.0).unwrap();
        let b = path.bounds();
        // From 12 o'clock sweeping clockwise a quarter turn: right-top quadrant.
        assert!(b.right() > 95.0);
        assert!(b.top() < 5.0);
        assert!(b.left() >= 40.0);
    }

    #[test]
    fn negative_sweep_goes_counterclockwise() {
        let rect = Rect::from_ltrb(0.0, 0.0, 100.0, 100.0).unwrap();
        let path = pie_path(rect, -90.0, -90.0).unwrap();
        let b = path.bounds();
        // Left-top quadrant this time.
        assert!(b.left() < 5.0);
        assert!(b.top() < 5.0);
        assert!(b.right() <= 60.0);
    }
}
