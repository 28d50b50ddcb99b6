//! Boundary tracing over line masks.

use insdraw_protocol::{Contour, Point};
use tracing::debug;

use crate::normalize::LineMask;

/// Traces every boundary (outer and hole) of the mask's foreground regions.
///
/// Contours enclosing less than `min_area` square pixels are dropped. The
/// result is ordered by point count, longest first; ties keep trace order.
pub fn extract_contours(mask: &LineMask, min_area: f64) -> Vec<Contour> {
    let traced = imageproc::contours::find_contours::<i32>(mask.as_image());
    let total = traced.len();

    let mut contours: Vec<Contour> = traced
        .into_iter()
        .map(|c| Contour::new(c.points.into_iter().map(|p| Point::new(p.x, p.y)).collect()))
        .filter(|c| c.area() >= min_area)
        .collect();

    // `sort_by` is stable.
    contours.sort_by(|a, b| b.len().cmp(&a.len()));

    debug!(traced = total, kept = contours.len(), min_area, "contours extracted");
    contours
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn mask_with(rects: &[(u32, u32, u32, u32)], hollow: bool) -> LineMask {
        let mut img = GrayImage::new(100, 100);
        for &(x0, y0, x1, y1) in rects {
            for y in y0..y1 {
                for x in x0..x1 {
                    let edge = x == x0 || y == y0 || x == x1 - 1 || y == y1 - 1;
                    if !hollow || edge {
                        img.put_pixel(x, y, Luma([255]));
                    }
                }
            }
        }
        LineMask::from_gray(img)
    }

    #[test]
    fn empty_mask_has_no_contours() {
        let mask = LineMask::from_gray(GrayImage::new(10, 10));
        assert!(extract_contours(&mask, 0.0).is_empty());
    }

    #[test]
    fn filled_square_yields_one_outline() {
        let mask = mask_with(&[(10, 10, 30, 30)], false);
        let contours = extract_contours(&mask, 80.0);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].area(), 361.0);
    }

    #[test]
    fn ring_yields_outer_and_hole() {
        let mask = mask_with(&[(10, 10, 40, 40)], true);
        let contours = extract_contours(&mask, 0.0);
        assert_eq!(contours.len(), 2);
    }

    #[test]
    fn small_regions_are_filtered() {
        let mask = mask_with(&[(10, 10, 30, 30), (60, 60, 64, 64)], false);
        let contours = extract_contours(&mask, 80.0);
        assert_eq!(contours.len(), 1);

        let all = extract_contours(&mask, 0.0);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn longest_contour_comes_first() {
        let mask = mask_with(&[(5, 5, 15, 15), (40, 40, 90, 90), (20, 60, 35, 75)], false);
        let contours = extract_contours(&mask, 0.0);
        assert_eq!(contours.len(), 3);
        assert!(contours.windows(2).all(|w| w[0].len() >= w[1].len()));
        assert_eq!(contours[0].area(), 49.0 * 49.0);
    }

    #[test]
    fn points_stay_inside_the_canvas() {
        let mask = mask_with(&[(0, 0, 100, 100)], false);
        for c in extract_contours(&mask, 0.0) {
            assert!(c.points.iter().all(|p| (0..100).contains(&p.x) && (0..100).contains(&p.y)));
        }
    }
}
