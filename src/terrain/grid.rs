use bytemuck::{Pod, Zeroable};

use super::tangent::compute_tangents;

/// Vertex for the two terrain pipelines: just the parametric grid position
/// in [0,1]². Displacement and coloring happen on the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GridVertex {
    pub uv: [f32; 2],
}

impl GridVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GridVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            }],
        }
    }
}

/// Vertex for the normal-mapped lit scene: full attribute set including the
/// precomputed per-triangle tangent.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LitVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub tangent: [f32; 3],
}

impl LitVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const F3: wgpu::BufferAddress = std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress;
        const F2: wgpu::BufferAddress = std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress;
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LitVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: F3,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: F3 * 2,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: F3 * 2 + F2,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Regular 2D grid of parametric positions with a triangulated index buffer.
///
/// Rebuilt whenever a resolution slider moves; building is idempotent for
/// the same `(cols, rows)`.
pub struct GridMesh {
    pub cols: u32,
    pub rows: u32,
    pub vertices: Vec<GridVertex>,
    pub indices: Vec<u32>,
}

impl GridMesh {
    /// Build a `cols x rows` grid. Callers guarantee `cols, rows >= 2`
    /// (enforced at the UI/CLI boundary).
    ///
    /// Positions are `(i/(cols-1), j/(rows-1))`; each quad becomes the two
    /// triangles `{(i,j),(i+1,j),(i,j+1)}` and `{(i,j+1),(i+1,j),(i+1,j+1)}`.
    pub fn new(cols: u32, rows: u32) -> Self {
        debug_assert!(cols >= 2 && rows >= 2);

        let mut vertices = Vec::with_capacity((cols * rows) as usize);
        for j in 0..rows {
            for i in 0..cols {
                vertices.push(GridVertex {
                    uv: [
                        i as f32 / (cols - 1) as f32,
                        j as f32 / (rows - 1) as f32,
                    ],
                });
            }
        }

        let quads = (cols - 1) * (rows - 1);
        let mut indices = Vec::with_capacity((quads * 6) as usize);
        for j in 0..rows - 1 {
            for i in 0..cols - 1 {
                let v = |x: u32, y: u32| x + y * cols;
                // triangle 1
                indices.push(v(i, j));
                indices.push(v(i + 1, j));
                indices.push(v(i, j + 1));
                // triangle 2
                indices.push(v(i, j + 1));
                indices.push(v(i + 1, j));
                indices.push(v(i + 1, j + 1));
            }
        }

        Self {
            cols,
            rows,
            vertices,
            indices,
        }
    }

    /// Expand the grid into the full lit-scene attribute set: positions on
    /// the y=0 plane spanning [-1,1]², +Y normals, UVs equal to the grid
    /// parameters, and per-triangle tangents.
    pub fn to_lit_mesh(&self) -> LitMesh {
        let positions: Vec<[f32; 3]> = self
            .vertices
            .iter()
            .map(|v| [2.0 * v.uv[0] - 1.0, 0.0, 2.0 * v.uv[1] - 1.0])
            .collect();
        let uvs: Vec<[f32; 2]> = self.vertices.iter().map(|v| v.uv).collect();
        let tangents = compute_tangents(&positions, &uvs, &self.indices);

        let vertices = positions
            .iter()
            .zip(uvs.iter())
            .zip(tangents.iter())
            .map(|((&position, &uv), &tangent)| LitVertex {
                position,
                normal: [0.0, 1.0, 0.0],
                uv,
                tangent,
            })
            .collect();

        LitMesh {
            vertices,
            indices: self.indices.clone(),
        }
    }
}

/// GPU-ready mesh for the normal-mapped lit scene.
pub struct LitMesh {
    pub vertices: Vec<LitVertex>,
    pub indices: Vec<u32>,
}

/// The water surface: a single large quad at a configurable height.
///
/// Independent of the terrain resolution and never rebuilt once created;
/// the water height reaches the shader through a uniform, not the geometry.
pub struct WaterQuad {
    pub vertices: [GridVertex; 4],
    pub indices: [u32; 6],
}

impl WaterQuad {
    /// `extent` is the half-width of the quad in grid parameter space,
    /// centered on the terrain (so an extent of 1.5 overhangs the [0,1]²
    /// terrain footprint on every side).
    pub fn new(extent: f32) -> Self {
        let lo = 0.5 - extent;
        let hi = 0.5 + extent;
        Self {
            vertices: [
                GridVertex { uv: [lo, lo] },
                GridVertex { uv: [hi, lo] },
                GridVertex { uv: [lo, hi] },
                GridVertex { uv: [hi, hi] },
            ],
            indices: [0, 1, 2, 2, 1, 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_vertex_and_index_counts() {
        for &(cols, rows) in &[(2u32, 2u32), (3, 5), (10, 10), (4, 4)] {
            let grid = GridMesh::new(cols, rows);
            assert_eq!(grid.vertices.len(), (cols * rows) as usize);
            assert_eq!(grid.indices.len(), (6 * (cols - 1) * (rows - 1)) as usize);
        }
    }

    #[test]
    fn test_grid_4x4_scenario() {
        let grid = GridMesh::new(4, 4);
        assert_eq!(grid.vertices.len(), 16);
        // 9 quads, 6 indices each
        assert_eq!(grid.indices.len(), 54);
    }

    #[test]
    fn test_grid_indices_in_bounds() {
        let grid = GridMesh::new(7, 3);
        let n = grid.vertices.len() as u32;
        assert!(grid.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn test_grid_positions_span_unit_square() {
        let grid = GridMesh::new(5, 4);
        let first = grid.vertices.first().unwrap().uv;
        let last = grid.vertices.last().unwrap().uv;
        assert_eq!(first, [0.0, 0.0]);
        assert_eq!(last, [1.0, 1.0]);
        for v in &grid.vertices {
            assert!((0.0..=1.0).contains(&v.uv[0]));
            assert!((0.0..=1.0).contains(&v.uv[1]));
        }
    }

    #[test]
    fn test_grid_first_quad_winding() {
        let grid = GridMesh::new(3, 3);
        // quad (0,0): {(0,0),(1,0),(0,1)} then {(0,1),(1,0),(1,1)}
        assert_eq!(&grid.indices[..6], &[0, 1, 3, 3, 1, 4]);
    }

    #[test]
    fn test_grid_rebuild_is_idempotent() {
        let a = GridMesh::new(6, 9);
        let b = GridMesh::new(6, 9);
        assert_eq!(a.indices, b.indices);
        assert_eq!(
            a.vertices.iter().map(|v| v.uv).collect::<Vec<_>>(),
            b.vertices.iter().map(|v| v.uv).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_lit_mesh_attribute_alignment() {
        let mesh = GridMesh::new(3, 3).to_lit_mesh();
        assert_eq!(mesh.vertices.len(), 9);
        assert_eq!(mesh.indices.len(), 24);
        for v in &mesh.vertices {
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
            // positions span [-1,1], uvs [0,1]
            assert!((-1.0..=1.0).contains(&v.position[0]));
            assert!((0.0..=1.0).contains(&v.uv[0]));
        }
    }

    #[test]
    fn test_water_quad_shape() {
        let quad = WaterQuad::new(1.5);
        assert_eq!(quad.vertices.len(), 4);
        assert_eq!(quad.indices.len(), 6);
        assert!(quad.indices.iter().all(|&i| i < 4));
        assert_eq!(quad.vertices[0].uv, [-1.0, -1.0]);
        assert_eq!(quad.vertices[3].uv, [2.0, 2.0]);
    }
}
