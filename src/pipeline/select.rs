use super::landmarks::FaceLandmarks;
use crate::shapes::rect::Rect;

/// Index of the largest-area bounding box. Ties keep the earliest
/// index; empty input means no dominant face.
pub fn dominant_box(boxes: &[Rect]) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (i, b) in boxes.iter().enumerate() {
        let area = b.area();
        if best.map_or(true, |(_, a)| area > a) {
            best = Some((i, area));
        }
    }
    best.map(|(i, _)| i)
}

pub fn dominant(faces: &[FaceLandmarks]) -> Option<usize> {
    let boxes: Vec<Rect> = faces.iter().map(|f| f.bounds).collect();
    dominant_box(&boxes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_largest_area() {
        let boxes = [
            Rect::new(0, 0, 10, 10),   // 100
            Rect::new(0, 0, 20, 20),   // 400
            Rect::new(50, 50, 20, 20), // 400
        ];
        assert_eq!(dominant_box(&boxes), Some(1));
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        let boxes = [Rect::new(0, 0, 5, 5), Rect::new(9, 9, 5, 5)];
        assert_eq!(dominant_box(&boxes), Some(0));
    }

    #[test]
    fn empty_input_has_no_dominant_face() {
        assert_eq!(dominant_box(&[]), None);
    }
}
