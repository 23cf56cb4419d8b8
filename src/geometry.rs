use egui::{Pos2, Rect, Vec2};

/// Even-odd (ray crossing) point-in-polygon test.
///
/// The polygon is treated as implicitly closed: the segment from the last
/// point back to the first is part of the boundary. Degenerate polygons
/// (fewer than 3 points) contain nothing.
pub fn polygon_contains(polygon: &[Pos2], p: Pos2) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > p.y) != (b.y > p.y) {
            let cross_x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Axis-aligned bounding box of a point run. `None` for an empty run.
pub fn points_bounds(points: &[Pos2]) -> Option<Rect> {
    let first = *points.first()?;
    let mut min = first;
    let mut max = first;
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some(Rect::from_min_max(min, max))
}

/// Bounding box of several point runs combined.
pub fn runs_bounds<'a, I>(runs: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a [Pos2]>,
{
    let mut acc: Option<Rect> = None;
    for run in runs {
        if let Some(bounds) = points_bounds(run) {
            acc = Some(match acc {
                Some(r) => r.union(bounds),
                None => bounds,
            });
        }
    }
    acc
}

/// Evenly spaced samples along `from → to`, at most `step` pixels apart.
///
/// Returns the intermediate points plus `to` itself; `from` is assumed to
/// have been emitted already by the caller. A fast pointer drag otherwise
/// leaves un-sampled gaps between events.
pub fn densify_segment(from: Pos2, to: Pos2, step: f32) -> Vec<Pos2> {
    let dist = from.distance(to);
    if dist <= step {
        return vec![to];
    }
    let segments = (dist / step).ceil() as usize;
    let mut out = Vec::with_capacity(segments);
    for i in 1..segments {
        out.push(from.lerp(to, i as f32 / segments as f32));
    }
    out.push(to);
    out
}

/// Remap `p` from `old` box space into `new` box space (affine scale
/// anchored at the box origins).
pub fn remap_point(p: Pos2, old: Rect, new: Rect) -> Pos2 {
    // A box never collapses below the minimum resize size, but guard the
    // division anyway.
    let sx = new.width() / old.width().max(f32::EPSILON);
    let sy = new.height() / old.height().max(f32::EPSILON);
    new.min + Vec2::new((p.x - old.min.x) * sx, (p.y - old.min.y) * sy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn polygon_contains_square() {
        let square = [
            pos2(0.0, 0.0),
            pos2(10.0, 0.0),
            pos2(10.0, 10.0),
            pos2(0.0, 10.0),
        ];
        assert!(polygon_contains(&square, pos2(5.0, 5.0)));
        assert!(!polygon_contains(&square, pos2(15.0, 5.0)));
        assert!(!polygon_contains(&square, pos2(-1.0, 5.0)));
    }

    #[test]
    fn polygon_contains_concave() {
        // A "U" shape; the notch is outside even though its bounds contain it.
        let u = [
            pos2(0.0, 0.0),
            pos2(30.0, 0.0),
            pos2(30.0, 30.0),
            pos2(20.0, 30.0),
            pos2(20.0, 10.0),
            pos2(10.0, 10.0),
            pos2(10.0, 30.0),
            pos2(0.0, 30.0),
        ];
        assert!(polygon_contains(&u, pos2(5.0, 20.0)));
        assert!(polygon_contains(&u, pos2(25.0, 20.0)));
        assert!(!polygon_contains(&u, pos2(15.0, 20.0)));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        assert!(!polygon_contains(&[], pos2(0.0, 0.0)));
        assert!(!polygon_contains(
            &[pos2(0.0, 0.0), pos2(10.0, 10.0)],
            pos2(5.0, 5.0)
        ));
    }

    #[test]
    fn bounds_of_points() {
        assert_eq!(points_bounds(&[]), None);
        let rect = points_bounds(&[pos2(3.0, 7.0), pos2(-1.0, 2.0), pos2(4.0, 5.0)]).unwrap();
        assert_eq!(rect.min, pos2(-1.0, 2.0));
        assert_eq!(rect.max, pos2(4.0, 7.0));
    }

    #[test]
    fn densify_respects_step() {
        let samples = densify_segment(pos2(0.0, 0.0), pos2(10.0, 0.0), 2.0);
        assert_eq!(samples.last(), Some(&pos2(10.0, 0.0)));
        let mut prev = pos2(0.0, 0.0);
        for s in samples {
            assert!(prev.distance(s) <= 2.0 + 1e-4);
            prev = s;
        }
    }

    #[test]
    fn densify_short_segment_is_single_sample() {
        let samples = densify_segment(pos2(0.0, 0.0), pos2(1.0, 0.0), 2.0);
        assert_eq!(samples, vec![pos2(1.0, 0.0)]);
    }

    #[test]
    fn remap_identity() {
        let rect = Rect::from_min_max(pos2(10.0, 10.0), pos2(50.0, 30.0));
        let p = pos2(20.0, 15.0);
        let mapped = remap_point(p, rect, rect);
        assert!((mapped.x - p.x).abs() < 1e-5);
        assert!((mapped.y - p.y).abs() < 1e-5);
    }

    #[test]
    fn remap_scales_relative_to_origin() {
        let old = Rect::from_min_max(pos2(0.0, 0.0), pos2(10.0, 10.0));
        let new = Rect::from_min_max(pos2(100.0, 100.0), pos2(120.0, 120.0));
        let mapped = remap_point(pos2(5.0, 5.0), old, new);
        assert!((mapped.x - 110.0).abs() < 1e-4);
        assert!((mapped.y - 110.0).abs() < 1e-4);
    }
}
