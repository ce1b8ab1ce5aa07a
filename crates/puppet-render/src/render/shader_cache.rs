use std::collections::HashMap;

use super::uniforms::MESH_UNIFORMS_SIZE;
use super::variant::ShaderVariantKey;

/// WGSL source for every mesh variant.
pub const MESH_WGSL: &str = include_str!("shaders/mesh.wgsl");

/// Stage at which a shader variant failed to build.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CompileStage {
    Parse,
    Validate,
    Link,
}

/// Pipeline identity: the shader variant plus the fixed-function state wgpu
/// bakes into a pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PipelineKey {
    pub variant: ShaderVariantKey,
    pub format: wgpu::TextureFormat,
    pub culling: bool,
}

/// Bind group layouts shared by all variants.
///
/// - group 0: per-draw uniforms (dynamic offset)
/// - group 1: primary texture + sampler
/// - group 2: mask texture + sampler (masked variants only)
pub struct BindLayouts {
    pub uniforms: wgpu::BindGroupLayout,
    pub texture: wgpu::BindGroupLayout,
    plain: wgpu::PipelineLayout,
    masked: wgpu::PipelineLayout,
}

enum ModuleState {
    NotBuilt,
    Ready {
        module: wgpu::ShaderModule,
        entry_points: Vec<String>,
    },
    Failed,
}

/// Compiles the mesh shader once and caches one render pipeline per
/// [`PipelineKey`].
///
/// Owned explicitly (usually behind `Rc<RefCell<_>>` when several models share
/// a device) and torn down with [`release`](Self::release) before the device.
/// Variants that fail to build are cached as `None` so the failure is logged
/// once and the affected draws are skipped.
pub struct ShaderVariantCache {
    module: ModuleState,
    layouts: Option<BindLayouts>,
    pipelines: HashMap<PipelineKey, Option<wgpu::RenderPipeline>>,
    source: &'static str,
}

impl Default for ShaderVariantCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderVariantCache {
    pub fn new() -> Self {
        Self::with_source(MESH_WGSL)
    }

    /// Cache over a custom WGSL source exposing the same entry points and
    /// bindings as the built-in shader.
    pub fn with_source(source: &'static str) -> Self {
        Self {
            module: ModuleState::NotBuilt,
            layouts: None,
            pipelines: HashMap::new(),
            source,
        }
    }

    /// Number of cached pipelines, failed ones included.
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Layouts used to build bind groups; created on first use.
    pub fn layouts(&mut self, device: &wgpu::Device) -> &BindLayouts {
        self.layouts.get_or_insert_with(|| create_layouts(device))
    }

    /// Returns the pipeline for `key`, building it on a miss.
    ///
    /// `None` means the variant failed to compile or link; the error has
    /// already been logged.
    pub fn variant_for(&mut self, device: &wgpu::Device, key: PipelineKey) -> Option<&wgpu::RenderPipeline> {
        if !self.pipelines.contains_key(&key) {
            let pipeline = self.build(device, key);
            self.pipelines.insert(key, pipeline);
        }
        self.pipelines.get(&key)?.as_ref()
    }

    /// Destroys every pipeline, the shader module and the layouts.
    ///
    /// Calling it again is a no-op. The cache rebuilds lazily if used afterwards.
    pub fn release(&mut self) {
        if matches!(self.module, ModuleState::NotBuilt) && self.pipelines.is_empty() && self.layouts.is_none() {
            return;
        }
        log::debug!("releasing {} shader variants", self.pipelines.len());
        self.pipelines.clear();
        self.layouts = None;
        self.module = ModuleState::NotBuilt;
    }

    fn build(&mut self, device: &wgpu::Device, key: PipelineKey) -> Option<wgpu::RenderPipeline> {
        if matches!(self.module, ModuleState::NotBuilt) {
            self.module = match validate_wgsl(self.source) {
                Ok(entry_points) => ModuleState::Ready {
                    module: device.create_shader_module(wgpu::ShaderModuleDescriptor {
                        label: Some("puppet mesh shader"),
                        source: wgpu::ShaderSource::Wgsl(self.source.into()),
                    }),
                    entry_points,
                },
                Err((stage, message)) => {
                    log::error!("mesh shader failed at {stage:?} stage:\n{message}");
                    ModuleState::Failed
                }
            };
        }

        let ModuleState::Ready { module, entry_points } = &self.module else {
            return None;
        };

        let vs = key.variant.vertex_entry();
        let fs = key.variant.fragment_entry();
        for entry in [vs, fs] {
            if !entry_points.iter().any(|e| e == entry) {
                log::error!(
                    "shader variant {:?} failed at {:?} stage: missing entry point `{entry}`",
                    key.variant,
                    CompileStage::Link
                );
                return None;
            }
        }

        let layouts = self.layouts.get_or_insert_with(|| create_layouts(device));
        let layout = if key.variant.samples_mask() { &layouts.masked } else { &layouts.plain };
        let label = format!("puppet mesh pipeline {:?}/{:?}", key.variant.pass, key.variant.mask);

        log::debug!("building {label} (format {:?}, culling {})", key.format, key.culling);

        Some(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label.as_str()),
            layout: Some(layout),

            vertex: wgpu::VertexState {
                module,
                entry_point: Some(vs),
                compilation_options: Default::default(),
                buffers: &[position_layout(), uv_layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some(fs),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: key.format,
                    blend: Some(key.variant.pass.blend().to_wgpu()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: key.culling.then_some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        }))
    }
}

/// Parses and validates WGSL, returning its entry point names.
pub fn validate_wgsl(source: &str) -> Result<Vec<String>, (CompileStage, String)> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|err| (CompileStage::Parse, err.emit_to_string(source)))?;

    naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::empty())
        .validate(&module)
        .map_err(|err| (CompileStage::Validate, format!("{err:?}")))?;

    Ok(module.entry_points.iter().map(|ep| ep.name.clone()).collect())
}

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const UV_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];

fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POSITION_ATTRS,
    }
}

fn uv_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &UV_ATTRS,
    }
}

fn create_layouts(device: &wgpu::Device) -> BindLayouts {
    let uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("puppet mesh uniforms bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: wgpu::BufferSize::new(MESH_UNIFORMS_SIZE),
            },
            count: None,
        }],
    });

    let texture = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("puppet mesh texture bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let plain = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("puppet mesh pipeline layout"),
        bind_group_layouts: &[&uniforms, &texture],
        immediate_size: 0,
    });

    // The mask texture reuses the primary texture's layout at group 2.
    let masked = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("puppet masked mesh pipeline layout"),
        bind_group_layouts: &[&uniforms, &texture, &texture],
        immediate_size: 0,
    });

    BindLayouts {
        uniforms,
        texture,
        plain,
        masked,
    }
}
