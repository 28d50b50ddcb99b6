use insdraw_protocol::{Contour, Polyline};

/// Keeps every `stride`-th point of `contour` (starting with the first) and
/// collapses consecutive duplicates.
///
/// A stride of 0 behaves like 1.
pub fn sample(contour: &Contour, stride: usize) -> Polyline {
    let stride = stride.max(1);
    Polyline::from_points(contour.points.iter().copied().step_by(stride))
}

#[cfg(test)]
mod tests {
    use super::*;
    use insdraw_protocol::Point;

    fn line(n: i32) -> Contour {
        Contour::new((0..n).map(|i| Point::new(i, 0)).collect())
    }

    #[test]
    fn keeps_every_nth_point() {
        let out = sample(&line(13), 6);
        assert_eq!(
            out.points(),
            &[Point::new(0, 0), Point::new(6, 0), Point::new(12, 0)]
        );
    }

    #[test]
    fn zero_stride_is_clamped() {
        let c = line(5);
        assert_eq!(sample(&c, 0), sample(&c, 1));
        assert_eq!(sample(&c, 0).len(), 5);
    }

    #[test]
    fn duplicates_are_collapsed() {
        let c = Contour::new(vec![
            Point::new(1, 1),
            Point::new(1, 1),
            Point::new(1, 1),
            Point::new(2, 2),
            Point::new(2, 2),
        ]);
        let out = sample(&c, 1);
        assert_eq!(out.points(), &[Point::new(1, 1), Point::new(2, 2)]);
    }

    #[test]
    fn never_longer_than_input_and_keeps_first() {
        for stride in 1..10 {
            let c = line(37);
            let out = sample(&c, stride);
            assert!(out.len() <= c.len());
            assert_eq!(out.points()[0], c.points[0]);
            assert!(out.points().windows(2).all(|w| w[0] != w[1]));
        }
    }

    #[test]
    fn resampling_at_stride_one_is_idempotent() {
        let c = Contour::new(vec![
            Point::new(0, 0),
            Point::new(0, 0),
            Point::new(3, 4),
            Point::new(3, 4),
            Point::new(0, 0),
        ]);
        let once = sample(&c, 1);
        let twice = sample(&Contour::new(once.points().to_vec()), 1);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_contour_gives_empty_polyline() {
        assert!(sample(&Contour::default(), 6).is_empty());
    }
}
