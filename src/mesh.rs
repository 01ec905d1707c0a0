use glam::{Mat4, Vec2, Vec3};

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub joints: [u16; 4],
    pub weights: [f32; 4],
}

impl MeshVertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
            joints: [0; 4],
            weights: [0.0; 4],
        }
    }

    pub fn with_skin(mut self, joints: [u16; 4], weights: [f32; 4]) -> Self {
        self.joints = joints;
        self.weights = weights;
        self
    }
}

#[derive(Clone, Debug)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub bounds: MeshBounds,
}

#[derive(Clone, Copy, Debug)]
pub struct MeshBounds {
    pub min: Vec3,
    pub max: Vec3,
    pub center: Vec3,
    pub radius: f32,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        let bounds = MeshBounds::from_vertices(&vertices);
        Self { vertices, indices, bounds }
    }

    pub fn cube(size: f32) -> Self {
        let hs = size * 0.5;
        let positions = [
            Vec3::new(-hs, -hs, -hs),
            Vec3::new(hs, -hs, -hs),
            Vec3::new(hs, hs, -hs),
            Vec3::new(-hs, hs, -hs),
            Vec3::new(-hs, -hs, hs),
            Vec3::new(hs, -hs, hs),
            Vec3::new(hs, hs, hs),
            Vec3::new(-hs, hs, hs),
        ];
        let normals = [
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
        ];

        let uv_quad = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)];
        let mut vertices = Vec::with_capacity(24);
        let mut write_face = |corners: [usize; 4], normal: Vec3| {
            for (i, &corner) in corners.iter().enumerate() {
                vertices.push(MeshVertex::new(positions[corner], normal, uv_quad[i]));
            }
        };

        write_face([0, 3, 2, 1], normals[0]); // back
        write_face([4, 5, 6, 7], normals[1]); // front
        write_face([0, 4, 7, 3], normals[2]); // left
        write_face([1, 2, 6, 5], normals[3]); // right
        write_face([3, 7, 6, 2], normals[4]); // top
        write_face([0, 1, 5, 4], normals[5]); // bottom

        let mut indices = Vec::with_capacity(36);
        for face in 0..6u32 {
            let base = face * 4;
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(vertices, indices)
    }

    /// Unit quad in the XY plane, rigged so every vertex follows joint 0.
    pub fn skinned_quad(size: f32) -> Self {
        let hs = size * 0.5;
        let corners = [
            Vec3::new(-hs, -hs, 0.0),
            Vec3::new(hs, -hs, 0.0),
            Vec3::new(hs, hs, 0.0),
            Vec3::new(-hs, hs, 0.0),
        ];
        let uv_quad = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)];
        let vertices = corners
            .iter()
            .zip(uv_quad.iter())
            .map(|(&pos, &uv)| {
                MeshVertex::new(pos, Vec3::Z, uv).with_skin([0, 0, 0, 0], [1.0, 0.0, 0.0, 0.0])
            })
            .collect();
        Self::new(vertices, vec![0, 1, 2, 0, 2, 3])
    }

    /// Linear-blend skins every vertex by `pose` and multiplies the result
    /// componentwise by `scale`. The caller's scratch buffer is rebuilt from
    /// this mesh each call so stale geometry never leaks between nodes.
    pub fn bake_pose(&self, pose: &[Mat4], scale: Vec3, out: &mut Vec<MeshVertex>) {
        out.clear();
        out.extend_from_slice(&self.vertices);
        for vertex in out.iter_mut() {
            let rest = Vec3::from_array(vertex.position);
            let mut skinned = Vec3::ZERO;
            let mut total = 0.0;
            for (joint, weight) in vertex.joints.iter().zip(vertex.weights.iter()) {
                if *weight == 0.0 {
                    continue;
                }
                let Some(matrix) = pose.get(*joint as usize) else { continue };
                skinned += matrix.transform_point3(rest) * *weight;
                total += *weight;
            }
            if total == 0.0 {
                skinned = rest;
            }
            vertex.position = (skinned * scale).to_array();
        }
    }
}

impl MeshBounds {
    pub fn from_vertices(vertices: &[MeshVertex]) -> Self {
        if vertices.is_empty() {
            return MeshBounds { min: Vec3::ZERO, max: Vec3::ZERO, center: Vec3::ZERO, radius: 0.0 };
        }
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for vertex in vertices {
            let pos = Vec3::from_array(vertex.position);
            min = min.min(pos);
            max = max.max(pos);
        }
        let center = (min + max) * 0.5;
        let mut radius: f32 = 0.0;
        for vertex in vertices {
            let pos = Vec3::from_array(vertex.position);
            radius = radius.max((pos - center).length());
        }
        MeshBounds { min, max, center, radius }
    }
}
