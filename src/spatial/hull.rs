//! Convex hull and polygon primitives
//!
//! Zone geometry is the convex hull of member cell centres. This is an
//! approximation: concave or fragmented zones are reported by their hull.
//! Field boundaries use `point_in_ring` to clip samples.

/// Convex hull of a planar point set (Andrew's monotone chain)
///
/// Vertices are returned counter-clockwise starting from the lowest-x
/// (then lowest-y) point, without repeating the first vertex. Degenerate
/// inputs keep their extreme points: one distinct point yields one vertex,
/// a collinear set yields its two endpoints.
pub fn convex_hull(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut pts: Vec<(f64, f64)> = points.to_vec();
    pts.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    pts.dedup();

    if pts.len() <= 2 {
        return pts;
    }

    let mut lower: Vec<(f64, f64)> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<(f64, f64)> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Polygon area by the shoelace formula (absolute value)
pub fn polygon_area(vertices: &[(f64, f64)]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let twice: f64 = vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| a.0 * b.1 - b.0 * a.1)
        .sum();
    twice.abs() / 2.0
}

/// Even-odd ray casting test of `(x, y)` against a ring
///
/// The ring may be open or closed. Points exactly on an edge may land on
/// either side.
pub fn point_in_ring(ring: &[(f64, f64)], x: f64, y: f64) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn cross(o: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_in_ring() {
        // L-shaped, closed
        let ring = vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 4.0),
            (4.0, 4.0),
            (4.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ];
        assert!(point_in_ring(&ring, 2.0, 2.0));
        assert!(point_in_ring(&ring, 8.0, 2.0));
        assert!(point_in_ring(&ring, 2.0, 8.0));
        assert!(!point_in_ring(&ring, 8.0, 8.0));
        assert!(!point_in_ring(&ring, -1.0, 5.0));
        assert!(!point_in_ring(&ring[..2], 5.0, 0.0));
    }

    #[test]
    fn test_square_with_interior_points() {
        let points = vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (5.0, 5.0),
            (2.0, 7.0),
            (5.0, 0.0),
        ];
        let hull = convex_hull(&points);
        assert_eq!(hull, vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert_relative_eq!(polygon_area(&hull), 100.0);
    }

    #[test]
    fn test_counter_clockwise() {
        let points = vec![(0.0, 0.0), (4.0, 1.0), (2.0, 5.0), (1.0, 2.0)];
        let hull = convex_hull(&points);
        let signed: f64 = hull
            .iter()
            .zip(hull.iter().cycle().skip(1))
            .map(|(a, b)| a.0 * b.1 - b.0 * a.1)
            .sum();
        assert!(signed > 0.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(convex_hull(&[]).is_empty());
        assert_eq!(convex_hull(&[(1.0, 1.0), (1.0, 1.0)]), vec![(1.0, 1.0)]);

        let line = vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)];
        assert_eq!(convex_hull(&line), vec![(0.0, 0.0), (3.0, 3.0)]);
        assert_eq!(polygon_area(&convex_hull(&line)), 0.0);
    }
}
