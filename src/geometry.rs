use crate::types::Point3D;

/// Euclidean distance in the image plane. `z` is ignored.
pub fn distance(p1: Point3D, p2: Point3D) -> f32 {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_ignores_depth() {
        let a = Point3D::new(0.0, 0.0, 0.0);
        let b = Point3D::new(0.3, 0.4, 5.0);
        assert!((distance(a, b) - 0.5).abs() < 1e-6);
        assert_eq!(distance(b, b), 0.0);
    }
}
