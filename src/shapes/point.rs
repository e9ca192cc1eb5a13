#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointF32 {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Point {
        Point { x, y }
    }

    /// Translate a crop-local coordinate into frame coordinates, given
    /// the crop's top-left corner.
    pub fn offset_by(&self, origin: Point) -> Point {
        Point {
            x: origin.x + self.x,
            y: origin.y + self.y,
        }
    }
}

impl PointF32 {
    pub fn new(x: f32, y: f32) -> PointF32 {
        PointF32 { x, y }
    }
}

impl From<Point> for PointF32 {
    fn from(p: Point) -> PointF32 {
        PointF32 {
            x: p.x as f32,
            y: p.y as f32,
        }
    }
}
