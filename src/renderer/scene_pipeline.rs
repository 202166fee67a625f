//! Forward render pipeline for the hall
//!
//! One pipeline draws everything. Draws are batched by (mesh, texture) and fed
//! through a per-instance vertex buffer, which keeps WebGL2 limits happy.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::shapes::{self, Mesh};
use super::texture::{self, GpuTexture};
use super::vertex::{InstanceRaw, Vertex};
use crate::assets::ImageData;
use crate::error::RenderInitError;
use crate::hall::{DrawItem, HallState, Lighting, MeshKind, TextureSlot, draw_list};
use crate::srgb_hex_to_linear;

/// Instance buffer grows in steps of this many instances
const INSTANCE_CHUNK: usize = 512;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4], // offset 0
    camera_pos: [f32; 4],     // offset 64
    ambient: [f32; 4],        // offset 80
    key_dir: [f32; 4],        // offset 96
    key_color: [f32; 4],      // offset 112
    rim_dir: [f32; 4],        // offset 128
    rim_color: [f32; 4],      // offset 144
    spot_pos: [f32; 4],       // offset 160, w = cos(half-angle)
    spot_dir: [f32; 4],       // offset 176
    spot_color: [f32; 4],     // offset 192
    encoding: [f32; 4],       // offset 208, x = manual sRGB encode
}

fn scaled_color(hex: u32, intensity: f32) -> [f32; 4] {
    let [r, g, b] = srgb_hex_to_linear(hex);
    [r * intensity, g * intensity, b * intensity, 1.0]
}

impl Globals {
    fn new(state: &HallState, encode_srgb: bool) -> Self {
        let Lighting {
            ambient_color,
            ambient_intensity,
            directional: [key, rim],
            spot,
        } = state.lighting;
        let camera = &state.camera;
        let spot_dir = (spot.target - spot.position).normalize_or_zero();

        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            ambient: scaled_color(ambient_color, ambient_intensity),
            // Directional lights shine from their position toward the origin
            key_dir: key.position.normalize_or_zero().extend(0.0).to_array(),
            key_color: scaled_color(key.color, key.intensity),
            rim_dir: rim.position.normalize_or_zero().extend(0.0).to_array(),
            rim_color: scaled_color(rim.color, rim.intensity),
            spot_pos: spot.position.extend(spot.angle.cos()).to_array(),
            spot_dir: spot_dir.extend(0.0).to_array(),
            spot_color: scaled_color(spot.color, spot.intensity),
            encoding: [if encode_srgb { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

/// A run of instances sharing one mesh and one texture
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub mesh: MeshKind,
    pub texture: Option<TextureSlot>,
    pub instances: Range<u32>,
}

fn mesh_order(kind: MeshKind) -> usize {
    match kind {
        MeshKind::Plane => 0,
        MeshKind::Cube => 1,
        MeshKind::Cylinder => 2,
    }
}

fn texture_order(slot: Option<TextureSlot>) -> usize {
    match slot {
        None => 0,
        Some(TextureSlot::Floor) => 1,
        Some(TextureSlot::Wall) => 2,
        Some(TextureSlot::Screen) => 3,
    }
}

/// Sort draws into contiguous instance runs
pub fn build_batches(items: &[DrawItem]) -> (Vec<InstanceRaw>, Vec<Batch>) {
    let mut sorted: Vec<&DrawItem> = items.iter().collect();
    sorted.sort_by_key(|item| (mesh_order(item.mesh), texture_order(item.material.texture)));

    let mut instances = Vec::with_capacity(sorted.len());
    let mut batches: Vec<Batch> = Vec::new();

    for item in sorted {
        let index = instances.len() as u32;
        instances.push(InstanceRaw::new(item.model, &item.material));

        match batches.last_mut() {
            Some(batch) if batch.mesh == item.mesh && batch.texture == item.material.texture => {
                batch.instances.end = index + 1;
            }
            _ => batches.push(Batch {
                mesh: item.mesh,
                texture: item.material.texture,
                instances: index..index + 1,
            }),
        }
    }

    (instances, batches)
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn new(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

// ============================================================================
// SCENE RENDER STATE
// ============================================================================

pub struct SceneRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    depth_view: wgpu::TextureView,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,

    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// Bound for untextured draws and for slots still loading
    white_bind_group: wgpu::BindGroup,
    /// Indexed by `texture_order(Some(slot)) - 1`
    slot_bind_groups: [Option<wgpu::BindGroup>; 3],

    /// Indexed by `mesh_order`
    meshes: [GpuMesh; 3],
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,

    /// Surface format is not sRGB, so the shader encodes
    encode_srgb: bool,
    pub size: (u32, u32),
}

/// Scale `width`x`height` down to fit `max_dimension` on both axes, keeping the
/// aspect ratio. Never returns a zero dimension.
pub fn fit_surface_size(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let width = width.max(1);
    let height = height.max(1);
    let largest = width.max(height);
    if largest <= max_dimension {
        return (width, height);
    }
    let fit = |v: u32| {
        ((v as u64 * max_dimension as u64 / largest as u64) as u32).clamp(1, max_dimension)
    };
    (fit(width), fit(height))
}

impl SceneRenderState {
    /// Create the surface, adapter and device for `canvas`. The returned
    /// `size` may be smaller than requested when the device caps texture size.
    #[cfg(target_arch = "wasm32")]
    pub async fn from_canvas(
        canvas: web_sys::HtmlCanvasElement,
        width: u32,
        height: u32,
        fan_segments: u32,
    ) -> Result<Self, RenderInitError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        Self::new(surface, &adapter, width, height, fan_segments).await
    }

    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        fan_segments: u32,
    ) -> Result<Self, RenderInitError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("cinema-hall-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let max_dimension = device.limits().max_texture_dimension_2d;
        let (width, height) = fit_surface_size(width, height, max_dimension);

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderInitError::NoSurfaceFormat)?;
        let encode_srgb = !surface_format.is_srgb();

        log::info!(
            "Using surface format: {:?} (shader sRGB encode: {})",
            surface_format,
            encode_srgb
        );

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
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

        let sampler = texture::repeat_sampler(&device);
        let white = GpuTexture::white(&device, &queue);
        let white_bind_group =
            Self::texture_bind_group(&device, &texture_layout, &sampler, &white, "white");

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &texture_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc(), InstanceRaw::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Single-sided materials discard back faces in the shader
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: texture::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let meshes = [
            GpuMesh::new(&device, &shapes::plane(), "plane_mesh"),
            GpuMesh::new(&device, &shapes::cube(), "cube_mesh"),
            GpuMesh::new(&device, &shapes::cylinder(fan_segments), "cylinder_mesh"),
        ];

        let instance_capacity = INSTANCE_CHUNK;
        let instance_buffer = Self::create_instance_buffer(&device, instance_capacity);
        let depth_view = texture::create_depth_view(&device, width, height);

        log::info!("Scene pipeline ready ({}x{})", width, height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            depth_view,
            globals_buffer,
            globals_bind_group,
            texture_layout,
            sampler,
            white_bind_group,
            slot_bind_groups: [None, None, None],
            meshes,
            instance_buffer,
            instance_capacity,
            encode_srgb,
            size: (width, height),
        })
    }

    fn texture_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        texture: &GpuTexture,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instances"),
            size: (std::mem::size_of::<InstanceRaw>() * capacity) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Install a decoded texture for one slot. Surfaces using the slot switch
    /// from plain color to textured on the next frame.
    pub fn set_texture(&mut self, slot: TextureSlot, image: &ImageData) {
        let label = format!("{}_texture", slot.file_name());
        let texture = GpuTexture::from_image(&self.device, &self.queue, image, &label);
        let bind_group = Self::texture_bind_group(
            &self.device,
            &self.texture_layout,
            &self.sampler,
            &texture,
            &label,
        );
        self.slot_bind_groups[texture_order(Some(slot)) - 1] = Some(bind_group);
        log::info!(
            "Texture {} uploaded ({}x{})",
            slot.file_name(),
            image.width,
            image.height
        );
    }

    fn bind_group_for(&self, slot: Option<TextureSlot>) -> &wgpu::BindGroup {
        slot.and_then(|s| self.slot_bind_groups[texture_order(Some(s)) - 1].as_ref())
            .unwrap_or(&self.white_bind_group)
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            let (new_width, new_height) = fit_surface_size(
                new_width,
                new_height,
                self.device.limits().max_texture_dimension_2d,
            );
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = texture::create_depth_view(&self.device, new_width, new_height);
        }
    }

    pub fn render(&mut self, state: &HallState) -> Result<(), wgpu::SurfaceError> {
        let globals = Globals::new(state, self.encode_srgb);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let (instances, batches) = build_batches(&draw_list(state));
        if instances.len() > self.instance_capacity {
            self.instance_capacity = instances.len().div_ceil(INSTANCE_CHUNK) * INSTANCE_CHUNK;
            self.instance_buffer = Self::create_instance_buffer(&self.device, self.instance_capacity);
            log::debug!("Instance buffer grown to {}", self.instance_capacity);
        }
        self.queue
            .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            for batch in &batches {
                let mesh = &self.meshes[mesh_order(batch.mesh)];
                render_pass.set_bind_group(1, self.bind_group_for(batch.texture), &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..mesh.index_count, 0, batch.instances.clone());
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        log::trace!("Rendered {} instances in {} batches", instances.len(), batches.len());
        Ok(())
    }
}
