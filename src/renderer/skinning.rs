//! CPU linear blend skinning.
//!
//! Joint matrices are world-space (`world(bone) * inverse_bind`), so the
//! skinned output is already in world space and the mesh is drawn with an
//! identity model matrix.

use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::resources::Geometry;

/// Skinned positions and normals for one geometry.
#[derive(Debug, Default, Clone)]
pub struct SkinnedVertices {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
}

const MIN_WEIGHT: f32 = 0.0001;

/// Blends every vertex of `geometry` by its four joint influences.
///
/// Vertices without skin data, or whose joints fall outside
/// `joint_matrices`, keep their bind-pose values for the missing part.
#[must_use]
pub fn skin_geometry(geometry: &Geometry, joint_matrices: &[Mat4]) -> SkinnedVertices {
    let count = geometry.vertex_count();
    let mut out = SkinnedVertices {
        positions: Vec::with_capacity(count),
        normals: Vec::with_capacity(count),
    };

    let normal_matrices: Vec<Mat3> = joint_matrices
        .iter()
        .map(|m| Mat3::from_mat4(*m).inverse().transpose())
        .collect();

    for (index, position) in geometry.positions.iter().enumerate() {
        let p = Vec4::new(position[0], position[1], position[2], 1.0);
        let n = geometry
            .normals
            .get(index)
            .map_or(Vec3::Y, |n| Vec3::from_array(*n));

        let (Some(joints), Some(weights)) = (geometry.joints.get(index), geometry.weights.get(index)) else {
            out.positions.push(p.truncate());
            out.normals.push(n);
            continue;
        };

        let mut skinned_position = Vec4::ZERO;
        let mut skinned_normal = Vec3::ZERO;
        let mut total = 0.0;
        for k in 0..4 {
            let weight = weights[k];
            if weight < MIN_WEIGHT {
                continue;
            }
            let joint = joints[k] as usize;
            let (Some(matrix), Some(normal_matrix)) = (joint_matrices.get(joint), normal_matrices.get(joint)) else {
                continue;
            };
            skinned_position += weight * (*matrix * p);
            skinned_normal += weight * (*normal_matrix * n);
            total += weight;
        }

        if total < MIN_WEIGHT {
            out.positions.push(p.truncate());
            out.normals.push(n);
        } else {
            out.positions.push(skinned_position.truncate() / total);
            out.normals.push(skinned_normal.normalize_or(n));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_vertex(joints: [u16; 4], weights: [f32; 4]) -> Geometry {
        Geometry::new(vec![[1.0, 0.0, 0.0]], vec![0])
            .with_normals(vec![[0.0, 1.0, 0.0]])
            .with_skin(vec![joints], vec![weights])
    }

    #[test]
    fn identity_joints_keep_bind_pose() {
        let geometry = single_vertex([0, 0, 0, 0], [1.0, 0.0, 0.0, 0.0]);
        let skinned = skin_geometry(&geometry, &[Mat4::IDENTITY]);
        assert!(skinned.positions[0].abs_diff_eq(Vec3::X, 1e-6));
        assert!(skinned.normals[0].abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn weights_blend_between_joints() {
        let geometry = single_vertex([0, 1, 0, 0], [0.5, 0.5, 0.0, 0.0]);
        let joints = [Mat4::IDENTITY, Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0))];
        let skinned = skin_geometry(&geometry, &joints);
        assert!(skinned.positions[0].abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn rotation_turns_normals() {
        let geometry = single_vertex([0, 0, 0, 0], [1.0, 0.0, 0.0, 0.0]);
        let joints = [Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2)];
        let skinned = skin_geometry(&geometry, &joints);
        assert!(skinned.positions[0].abs_diff_eq(Vec3::Y, 1e-5));
        assert!(skinned.normals[0].abs_diff_eq(-Vec3::X, 1e-5));
    }

    #[test]
    fn out_of_range_joint_falls_back_to_bind_pose() {
        let geometry = single_vertex([7, 0, 0, 0], [1.0, 0.0, 0.0, 0.0]);
        let skinned = skin_geometry(&geometry, &[Mat4::IDENTITY]);
        assert!(skinned.positions[0].abs_diff_eq(Vec3::X, 1e-6));
    }
}
