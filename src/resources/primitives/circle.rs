use std::f32::consts::TAU;

use crate::resources::geometry::Geometry;

/// Flat disc in the XY plane facing +Z, built as a triangle fan around the
/// center vertex.
#[must_use]
pub fn create_circle(radius: f32, segments: u32) -> Geometry {
    let segments = segments.max(3);

    let mut positions = Vec::with_capacity(segments as usize + 2);
    let mut uvs = Vec::with_capacity(segments as usize + 2);

    positions.push([0.0, 0.0, 0.0]);
    uvs.push([0.5, 0.5]);

    for s in 0..=segments {
        let theta = s as f32 / segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        positions.push([radius * cos, radius * sin, 0.0]);
        uvs.push([(cos + 1.0) * 0.5, (sin + 1.0) * 0.5]);
    }

    let normals = vec![[0.0, 0.0, 1.0]; positions.len()];

    let mut indices = Vec::with_capacity(segments as usize * 3);
    for i in 1..=segments {
        indices.extend_from_slice(&[i, i + 1, 0]);
    }

    Geometry::new(positions, indices)
        .with_normals(normals)
        .with_uvs(uvs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_has_rim_and_center() {
        let geo = create_circle(4.0, 60);
        assert_eq!(geo.vertex_count(), 62);
        assert_eq!(geo.indices.len(), 180);
        let bounds = geo.bounds().unwrap();
        assert!((bounds.max.x - 4.0).abs() < 1e-5);
        assert!((bounds.min.y + 4.0).abs() < 1e-4);
    }
}
