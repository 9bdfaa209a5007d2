//! Per-triangle tangent generation for normal mapping.

use glam::{Vec2, Vec3};

/// Compute one tangent per vertex from a triangle list.
///
/// For each triangle the tangent solves the standard edge / UV-delta system
///
/// ```text
/// T = 1/(Δuv1.x·Δuv2.y − Δuv2.x·Δuv1.y) · (Δuv2.y·E1 − Δuv1.y·E2)
/// ```
///
/// and is assigned flat to all three of its vertices. On an indexed mesh a
/// vertex shared by several triangles keeps the tangent of the last triangle
/// that touched it; the result is intentionally non-smoothed. Triangles with
/// a zero UV determinant get no tangent at all (the affected vertices keep
/// whatever a previous triangle wrote, or zero) so non-finite values never
/// reach the vertex buffer.
///
/// The output is aligned index-for-index with `positions` for direct upload
/// as a vertex attribute.
pub fn compute_tangents(
    positions: &[[f32; 3]],
    uvs: &[[f32; 2]],
    indices: &[u32],
) -> Vec<[f32; 3]> {
    let mut tangents = vec![[0.0f32; 3]; positions.len()];

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);

        let v0 = Vec3::from_array(positions[i0]);
        let v1 = Vec3::from_array(positions[i1]);
        let v2 = Vec3::from_array(positions[i2]);

        let uv0 = Vec2::from_array(uvs[i0]);
        let uv1 = Vec2::from_array(uvs[i1]);
        let uv2 = Vec2::from_array(uvs[i2]);

        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let duv1 = uv1 - uv0;
        let duv2 = uv2 - uv0;

        let det = duv1.x * duv2.y - duv2.x * duv1.y;
        if det == 0.0 || !det.is_finite() {
            // Degenerate UV triangle: skip rather than propagate NaN.
            continue;
        }

        let t = (e1 * duv2.y - e2 * duv1.y) / det;
        let t = t.to_array();
        tangents[i0] = t;
        tangents[i1] = t;
        tangents[i2] = t;
    }

    tangents
}

#[cfg(test)]
mod tests {
    use super::*;

    // One triangle in the XZ plane with axis-aligned UVs.
    fn simple_triangle() -> (Vec<[f32; 3]>, Vec<[f32; 2]>, Vec<u32>) {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        let uvs = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let indices = vec![0, 1, 2];
        (positions, uvs, indices)
    }

    #[test]
    fn test_tangent_follows_u_direction() {
        let (positions, uvs, indices) = simple_triangle();
        let tangents = compute_tangents(&positions, &uvs, &indices);
        // With UVs aligned to the edges, the tangent is the +U edge.
        for t in &tangents {
            assert!((t[0] - 1.0).abs() < 1e-6);
            assert!(t[1].abs() < 1e-6);
            assert!(t[2].abs() < 1e-6);
        }
    }

    #[test]
    fn test_tangent_aligned_with_vertex_buffer() {
        let (positions, uvs, indices) = simple_triangle();
        let tangents = compute_tangents(&positions, &uvs, &indices);
        assert_eq!(tangents.len(), positions.len());
    }

    #[test]
    fn test_tangent_flat_per_triangle() {
        let (positions, uvs, indices) = simple_triangle();
        let tangents = compute_tangents(&positions, &uvs, &indices);
        assert_eq!(tangents[0], tangents[1]);
        assert_eq!(tangents[1], tangents[2]);
    }

    #[test]
    fn test_tangent_invariant_under_uniform_uv_scale() {
        let (positions, uvs, indices) = simple_triangle();
        let base = compute_tangents(&positions, &uvs, &indices);

        for k in [2.0f32, 0.5, 10.0] {
            let scaled: Vec<[f32; 2]> = uvs.iter().map(|uv| [uv[0] * k, uv[1] * k]).collect();
            let t = compute_tangents(&positions, &scaled, &indices);
            // Direction unchanged, magnitude scaled by 1/k.
            let got = Vec3::from_array(t[0]);
            let want = Vec3::from_array(base[0]) / k;
            assert!((got - want).length() < 1e-5, "k={k}: {got} vs {want}");
        }
    }

    #[test]
    fn test_degenerate_uvs_produce_no_nan() {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        // All three UVs identical: zero determinant.
        let uvs = vec![[0.5, 0.5]; 3];
        let tangents = compute_tangents(&positions, &uvs, &[0, 1, 2]);
        for t in &tangents {
            assert!(t.iter().all(|c| c.is_finite()));
            assert_eq!(*t, [0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_degenerate_triangle_keeps_previous_tangent() {
        // Two triangles sharing vertices 1 and 2; the second is UV-degenerate
        // and must not clobber the first one's result.
        let positions = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
        ];
        let mut uvs = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 1.0]];
        uvs[3] = uvs[1]; // collapse the second triangle's UV area
        let indices = vec![0, 1, 2, 2, 1, 3];

        let tangents = compute_tangents(&positions, &uvs, &indices);
        assert!((tangents[1][0] - 1.0).abs() < 1e-6);
        assert!(tangents.iter().flatten().all(|c| c.is_finite()));
    }
}
