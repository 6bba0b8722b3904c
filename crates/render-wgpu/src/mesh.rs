use bytemuck::{Pod, Zeroable};
use cadence_render::DrawList;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    pub model_0: [f32; 4],
    pub model_1: [f32; 4],
    pub model_2: [f32; 4],
    pub model_3: [f32; 4],
    pub color: [f32; 4],
    pub specular: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct GridVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Unit cube centred on the origin, one quad per face.
pub(crate) fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        // normal, u axis, v axis
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ([-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (n, u, v) in FACES {
        let base = vertices.len() as u16;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = std::array::from_fn(|i| 0.5 * (n[i] + su * u[i] + sv * v[i]));
            vertices.push(Vertex {
                position,
                normal: n,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (vertices, indices)
}

/// Grid lines on the z = 0 ground plane.
pub(crate) fn grid_mesh(half_extent: i32, spacing: f32) -> Vec<GridVertex> {
    let mut verts = Vec::new();
    let color = [0.4, 0.4, 0.4, 1.0];
    let extent = half_extent as f32 * spacing;

    for i in -half_extent..=half_extent {
        let offset = i as f32 * spacing;
        // along X
        verts.push(GridVertex {
            position: [-extent, offset, 0.0],
            color,
        });
        verts.push(GridVertex {
            position: [extent, offset, 0.0],
            color,
        });
        // along Y
        verts.push(GridVertex {
            position: [offset, -extent, 0.0],
            color,
        });
        verts.push(GridVertex {
            position: [offset, extent, 0.0],
            color,
        });
    }
    verts
}

/// One instance per draw call, in submission order, at most `max`.
pub(crate) fn instances(frame: &DrawList, max: usize) -> Vec<InstanceData> {
    frame
        .calls()
        .iter()
        .take(max)
        .map(|call| {
            let cols = call.model.to_cols_array_2d();
            InstanceData {
                model_0: cols[0],
                model_1: cols[1],
                model_2: cols[2],
                model_3: cols[3],
                color: call.material.tint,
                specular: [
                    call.material.specular.intensity,
                    call.material.specular.exponent,
                    0.0,
                    0.0,
                ],
            }
        })
        .collect()
}
