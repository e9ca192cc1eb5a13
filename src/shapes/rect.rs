use super::point::Point;

/// Axis-aligned rectangle anchored at its top-left corner. Coordinates
/// are signed so that padded regions may extend past the frame edge
/// before being clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Rect {
        Rect { x, y, w, h }
    }

    pub fn from_corners(left: i32, top: i32, right: i32, bottom: i32) -> Rect {
        Rect {
            x: left,
            y: top,
            w: right - left,
            h: bottom - top,
        }
    }

    pub fn left(&self) -> i32 {
        self.x
    }
    pub fn right(&self) -> i32 {
        self.x + self.w
    }
    pub fn top(&self) -> i32 {
        self.y
    }
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.w / 2,
            y: self.y + self.h / 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Intersect with the frame `[0, w) x [0, h)`. Returns `None` when
    /// nothing of the rect survives.
    pub fn clamp_to(&self, frame_w: u32, frame_h: u32) -> Option<Rect> {
        let left = self.left().max(0);
        let top = self.top().max(0);
        let right = self.right().min(frame_w as i32);
        let bottom = self.bottom().min(frame_h as i32);

        if left >= right || top >= bottom {
            return None;
        }

        Some(Rect::from_corners(left, top, right, bottom))
    }

    pub fn overlap_pct(&self, other: &Rect) -> f32 {
        let x_min = self.left().max(other.left());
        let x_max = self.right().min(other.right());
        let y_min = self.top().max(other.top());
        let y_max = self.bottom().min(other.bottom());

        let overlap_area = if x_min < x_max && y_min < y_max {
            (x_max - x_min) as i64 * (y_max - y_min) as i64
        } else {
            0
        };

        let area_delta = self.area() + other.area() - overlap_area;

        if area_delta > 0 {
            overlap_area as f32 / area_delta as f32 * 100.
        } else {
            0.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_trims_to_frame() {
        let r = Rect::new(-10, -5, 30, 20);
        let clamped = r.clamp_to(640, 480).unwrap();
        assert_eq!(clamped, Rect::from_corners(0, 0, 20, 15));
    }

    #[test]
    fn clamp_rejects_fully_outside() {
        assert!(Rect::new(700, 10, 20, 20).clamp_to(640, 480).is_none());
        assert!(Rect::new(10, 10, 0, 20).clamp_to(640, 480).is_none());
    }

    #[test]
    fn overlap_pct_of_disjoint_rects_is_zero() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 20, 10, 10);
        assert_eq!(a.overlap_pct(&b), 0.);
    }

    #[test]
    fn overlap_pct_of_identical_rects_is_full() {
        let a = Rect::new(5, 5, 10, 10);
        assert!((a.overlap_pct(&a) - 100.).abs() < f32::EPSILON);
    }
}
