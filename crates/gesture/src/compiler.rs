use insdraw_protocol::{Polyline, Primitive};

/// Compiles one polyline into touch primitives.
///
/// The stroke is anchored with a tap on its first point. Each following
/// segment becomes a swipe of `segment_ms`, unless its squared length is
/// within `tap_threshold`, in which case it collapses into a tap on the
/// segment end. Polylines shorter than two points produce nothing.
pub fn compile(polyline: &Polyline, segment_ms: u32, tap_threshold: i64) -> Vec<Primitive> {
    let points = polyline.points();
    let [first, _, ..] = points else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(points.len());
    out.push(Primitive::tap(*first));
    for pair in points.windows(2) {
        let (p, q) = (pair[0], pair[1]);
        if p.dist2(q) <= tap_threshold {
            out.push(Primitive::tap(q));
        } else {
            out.push(Primitive::swipe(p, q, segment_ms));
        }
    }
    out
}
