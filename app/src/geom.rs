// TODO: don't assume 72 pixels per pt, DisplayWidth / DisplayWidthMM is where to start looking.
pub const DEFAULT_PIXELS_PER_PT: f32 = 72.0;

/// length in points; pixel coordinates are divided by `pixels_per_pt` to get there.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct Pt(pub f32);

impl Pt {
    #[inline]
    pub fn from_px(px: f32, pixels_per_pt: f32) -> Self {
        Self(px / pixels_per_pt)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: Pt,
    pub y: Pt,
}

/// size of the window in points along with the scale that was used to get there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub pixels_per_pt: f32,
    pub width: Pt,
    pub height: Pt,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            pixels_per_pt: DEFAULT_PIXELS_PER_PT,
            width: Pt(0.0),
            height: Pt(0.0),
        }
    }
}

impl Geometry {
    pub fn from_px(width: i32, height: i32, pixels_per_pt: f32) -> Self {
        Self {
            pixels_per_pt,
            width: Pt::from_px(width as f32, pixels_per_pt),
            height: Pt::from_px(height as f32, pixels_per_pt),
        }
    }

    #[inline]
    pub fn point_from_px(&self, x: f32, y: f32) -> Point {
        Point {
            x: Pt::from_px(x, self.pixels_per_pt),
            y: Pt::from_px(y, self.pixels_per_pt),
        }
    }
}

#[test]
fn test_geometry_from_px() {
    let geometry = Geometry::from_px(480, 720, DEFAULT_PIXELS_PER_PT);
    assert_eq!(geometry.width, Pt(480.0 / 72.0));
    assert_eq!(geometry.height, Pt(10.0));

    let point = geometry.point_from_px(144.0, 36.0);
    assert_eq!(point, Point { x: Pt(2.0), y: Pt(0.5) });
}
