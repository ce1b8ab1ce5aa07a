/// GPU vertex/index buffers for one drawable.
struct DrawableBuffers {
    positions: wgpu::Buffer,
    uvs: wgpu::Buffer,
    indices: wgpu::Buffer,
    vertex_capacity: usize,
    index_capacity: usize,
    index_count: u32,
}

/// Per-drawable buffer pool.
///
/// Buffers grow to the next power of two and are re-uploaded on every draw,
/// since positions change with deformation and a drawable may be drawn both
/// into the mask and onto the screen in one frame.
#[derive(Default)]
pub struct MeshBuffers {
    drawables: Vec<Option<DrawableBuffers>>,
}

/// Slices ready for `set_vertex_buffer` / `set_index_buffer`.
pub struct MeshSlices<'a> {
    pub positions: wgpu::BufferSlice<'a>,
    pub uvs: wgpu::BufferSlice<'a>,
    pub indices: wgpu::BufferSlice<'a>,
    pub index_count: u32,
}

impl MeshBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads one drawable's mesh. Returns `false` if the mesh cannot be
    /// drawn (no indices, or UV count differing from vertex count).
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        drawable: usize,
        positions: &[[f32; 2]],
        uvs: &[[f32; 2]],
        indices: &[u16],
    ) -> bool {
        if !is_drawable(positions, uvs, indices) {
            return false;
        }

        if drawable >= self.drawables.len() {
            self.drawables.resize_with(drawable + 1, || None);
        }

        let padded = padded_indices(indices);
        let slot = &mut self.drawables[drawable];

        let fits = slot
            .as_ref()
            .is_some_and(|b| b.vertex_capacity >= positions.len() && b.index_capacity >= padded.len());
        if !fits {
            let vertex_capacity = positions.len().next_power_of_two();
            let index_capacity = padded.len().next_power_of_two();
            *slot = Some(create(device, drawable, vertex_capacity, index_capacity));
        }

        let Some(buffers) = slot.as_mut() else {
            return false;
        };

        queue.write_buffer(&buffers.positions, 0, bytemuck::cast_slice(positions));
        queue.write_buffer(&buffers.uvs, 0, bytemuck::cast_slice(uvs));
        queue.write_buffer(&buffers.indices, 0, bytemuck::cast_slice(&padded));
        buffers.index_count = indices.len() as u32;
        true
    }

    /// Slices of the last upload for `drawable`.
    pub fn slices(&self, drawable: usize) -> Option<MeshSlices<'_>> {
        let b = self.drawables.get(drawable)?.as_ref()?;
        Some(MeshSlices {
            positions: b.positions.slice(..),
            uvs: b.uvs.slice(..),
            indices: b.indices.slice(..),
            index_count: b.index_count,
        })
    }

    pub fn clear(&mut self) {
        self.drawables.clear();
    }
}

fn is_drawable(positions: &[[f32; 2]], uvs: &[[f32; 2]], indices: &[u16]) -> bool {
    !positions.is_empty() && !indices.is_empty() && uvs.len() == positions.len()
}

/// `write_buffer` requires a multiple of 4 bytes; pad odd `u16` counts.
fn padded_indices(indices: &[u16]) -> Vec<u16> {
    let mut out = indices.to_vec();
    if out.len() % 2 != 0 {
        out.push(0);
    }
    out
}

fn create(device: &wgpu::Device, drawable: usize, vertex_capacity: usize, index_capacity: usize) -> DrawableBuffers {
    let vertex_bytes = (vertex_capacity * std::mem::size_of::<[f32; 2]>()) as u64;
    let index_bytes = (index_capacity * std::mem::size_of::<u16>()) as u64;

    log::debug!("mesh buffers for drawable {drawable}: {vertex_capacity} vertices, {index_capacity} indices");

    let vertex_buffer = |label: &str| {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    };

    DrawableBuffers {
        positions: vertex_buffer("puppet mesh positions"),
        uvs: vertex_buffer("puppet mesh uvs"),
        indices: device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("puppet mesh indices"),
            size: index_bytes,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }),
        vertex_capacity,
        index_capacity,
        index_count: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_index_counts_are_padded() {
        assert_eq!(padded_indices(&[0, 1, 2]), vec![0, 1, 2, 0]);
        assert_eq!(padded_indices(&[0, 1, 2, 0, 2, 3]).len(), 6);
    }

    #[test]
    fn mismatched_or_empty_meshes_are_rejected() {
        let quad = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        assert!(is_drawable(&quad, &quad, &[0, 1, 2]));
        assert!(!is_drawable(&quad, &quad[..2], &[0, 1, 2]));
        assert!(!is_drawable(&quad, &quad, &[]));
        assert!(!is_drawable(&[], &[], &[0]));
    }
}
