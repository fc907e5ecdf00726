//! Renderer: wgpu init + depth + textured mesh list driven by a camera MVP.
//! wgpu = 26.x, winit = 0.30.x

mod error;
pub mod mesh;

use std::borrow::Cow;
use std::num::NonZeroU64;
use std::sync::Arc;

use asset::{RenderObject, ShaderProgram, TextureData};
use bytemuck::{Pod, Zeroable};
use corelib::{Mat4, MatrixSet};
use wgpu::{
    util::DeviceExt,
    AddressMode, BindGroup, BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry,
    BindingResource, BindingType, BlendState, Buffer, BufferBindingType, BufferUsages,
    ColorTargetState, ColorWrites, CommandEncoderDescriptor, DepthBiasState, DepthStencilState,
    Device, DeviceDescriptor, ErrorFilter, Extent3d, Features, FilterMode, FragmentState,
    Instance, InstanceDescriptor, Limits, LoadOp, Operations, PipelineLayoutDescriptor,
    PowerPreference, PresentMode, Queue, RenderPassColorAttachment, RenderPassDescriptor,
    RenderPipeline, RenderPipelineDescriptor, SamplerBindingType, SamplerDescriptor,
    ShaderModule, ShaderModuleDescriptor, ShaderSource, ShaderStages, StoreOp, Surface,
    SurfaceConfiguration, SurfaceError, TextureDescriptor, TextureDimension, TextureFormat,
    TextureSampleType, TextureUsages, TextureView, TextureViewDescriptor, TextureViewDimension,
    VertexState,
};
use winit::{dpi::PhysicalSize, window::Window};

pub use error::RendererError;
pub use mesh::{drawable_objects, GpuMesh};

/// Camera UBO (16-byte aligned).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct CameraUniform {
    mvp: [[f32; 4]; 4],
}

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.25,
    g: 0.35,
    b: 0.8,
    a: 0.9,
};

/// Everything loaded from disk before the GPU exists.
pub struct Scene {
    pub program: ShaderProgram,
    pub objects: Vec<RenderObject>,
    pub texture: TextureData,
}

pub struct GpuState {
    // Surface
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    // Pipeline & geometry
    pipeline: RenderPipeline,
    meshes: Vec<GpuMesh>,

    // Camera
    camera_bg: BindGroup,
    camera_buf: Buffer,

    // Texture (group 1)
    texture_bg: BindGroup,

    // Depth
    depth_view: TextureView,

    // Size cache
    width: u32,
    height: u32,
}

impl GpuState {
    /// Create GPU state bound to an Arc<Window> and upload the scene once.
    pub async fn new(
        window: Arc<Window>,
        backends: wgpu::Backends,
        scene: Scene,
    ) -> Result<Self, RendererError> {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        // Instance & surface
        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        log::info!("Using adapter '{}' ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Svarog Viewer Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            })
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let (surface_format, alpha_mode) = pick_surface_format(&caps)?;

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, &surface_config);

        // ==== Camera BGL/BG ====
        let camera_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Camera BGL"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(
                        std::mem::size_of::<CameraUniform>() as u64
                    ),
                },
                count: None,
            }],
        });
        let camera_init = CameraUniform {
            mvp: Mat4::IDENTITY.to_cols_array_2d(),
        };
        let camera_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera UBO"),
            contents: bytemuck::bytes_of(&camera_init),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let camera_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera BG"),
            layout: &camera_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buf.as_entire_binding(),
            }],
        });

        // ==== Texture BGL/BG ====
        let texture_bgl = create_texture_bgl(&device);
        let texture_bg = upload_texture(&device, &queue, &texture_bgl, &scene.texture);

        // ==== Pipeline ====
        let pipeline = create_pipeline(
            &device,
            scene.program,
            &[&camera_bgl, &texture_bgl],
            surface_format,
        )
        .await?;

        // ==== Geometry: one buffer pair per object, uploaded once ====
        let meshes = drawable_objects(&scene.objects)
            .into_iter()
            .map(|i| GpuMesh::upload(&device, &format!("Object #{i}"), &scene.objects[i]))
            .collect::<Vec<_>>();
        log::info!("Uploaded {} mesh(es) to the GPU", meshes.len());

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline,
            meshes,
            camera_bg,
            camera_buf,
            texture_bg,
            depth_view,
            width,
            height,
        })
    }

    /// Resize: reconfigure surface & recreate depth view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    /// Render one frame: upload MVP, clear, draw every mesh.
    pub fn render(&mut self, matrices: &MatrixSet) -> Result<(), SurfaceError> {
        let cam = CameraUniform {
            mvp: matrices.mvp.to_cols_array_2d(),
        };
        self.queue
            .write_buffer(&self.camera_buf, 0, bytemuck::bytes_of(&cam));

        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(CLEAR_COLOR),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.camera_bg, &[]);
            rpass.set_bind_group(1, &self.texture_bg, &[]);
            for mesh in &self.meshes {
                rpass.set_vertex_buffer(0, mesh.positions.slice(..));
                rpass.set_vertex_buffer(1, mesh.uvs.slice(..));
                rpass.draw(0..mesh.vertex_count, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        log::trace!("Frame drawn: {} mesh(es)", self.meshes.len());
        Ok(())
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.width, self.height);
    }
}

/// First sRGB format (else the first listed one) and the first alpha mode.
fn pick_surface_format(
    caps: &wgpu::SurfaceCapabilities,
) -> Result<(TextureFormat, wgpu::CompositeAlphaMode), RendererError> {
    let format = caps
        .formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| caps.formats.first().copied())
        .ok_or(RendererError::SurfaceUnsupported("no surface formats"))?;
    let alpha_mode = caps
        .alpha_modes
        .first()
        .copied()
        .ok_or(RendererError::SurfaceUnsupported("no alpha modes"))?;
    Ok((format, alpha_mode))
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}

fn create_texture_bgl(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("Texture BGL"),
        entries: &[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Texture {
                    multisampled: false,
                    view_dimension: TextureViewDimension::D2,
                    sample_type: TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Upload RGBA8 pixels as a linearly filtered 2D texture and bind it with its sampler.
fn upload_texture(
    device: &Device,
    queue: &Queue,
    layout: &BindGroupLayout,
    data: &TextureData,
) -> BindGroup {
    let size = Extent3d {
        width: data.width,
        height: data.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&TextureDescriptor {
        label: Some("Diffuse texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: TextureFormat::Rgba8UnormSrgb,
        usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &data.data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(data.bytes_per_pixel() * data.width),
            rows_per_image: Some(data.height),
        },
        size,
    );

    let view = texture.create_view(&TextureViewDescriptor::default());
    let sampler = device.create_sampler(&SamplerDescriptor {
        label: Some("Diffuse sampler"),
        address_mode_u: AddressMode::Repeat,
        address_mode_v: AddressMode::Repeat,
        address_mode_w: AddressMode::Repeat,
        mag_filter: FilterMode::Linear,
        min_filter: FilterMode::Linear,
        ..Default::default()
    });
    log::info!("Uploaded texture {}x{}", data.width, data.height);

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Texture BG"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: BindingResource::Sampler(&sampler),
            },
        ],
    })
}

fn shader_module(device: &Device, label: &str, module: naga::Module) -> ShaderModule {
    device.create_shader_module(ShaderModuleDescriptor {
        label: Some(label),
        source: ShaderSource::Naga(Cow::Owned(module)),
    })
}

/// Build the pipeline inside a validation error scope; a rejected program
/// comes back as `RendererError::Pipeline`.
async fn create_pipeline(
    device: &Device,
    program: ShaderProgram,
    bind_group_layouts: &[&BindGroupLayout],
    surface_format: TextureFormat,
) -> Result<RenderPipeline, RendererError> {
    device.push_error_scope(ErrorFilter::Validation);

    let entry = asset::shader::ENTRY_POINT;
    let vs = shader_module(device, &program.vertex.label, program.vertex.module);
    let fs = shader_module(device, &program.fragment.label, program.fragment.module);

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("Mesh PipelineLayout"),
        bind_group_layouts,
        push_constant_ranges: &[],
    });
    let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("Mesh Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &vs,
            entry_point: Some(entry),
            buffers: &[mesh::POSITION_LAYOUT, mesh::UV_LAYOUT],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: &fs,
            entry_point: Some(entry),
            targets: &[Some(ColorTargetState {
                format: surface_format,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        // OBJ winding is not trusted; no culling.
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    match device.pop_error_scope().await {
        Some(err) => {
            log::error!("Shader program rejected by the device: {err}");
            Err(RendererError::Pipeline(err.to_string()))
        }
        None => Ok(pipeline),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(
        formats: Vec<TextureFormat>,
        alpha: Vec<wgpu::CompositeAlphaMode>,
    ) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats,
            alpha_modes: alpha,
            ..Default::default()
        }
    }

    #[test]
    fn srgb_format_is_preferred() {
        let c = caps(
            vec![TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb],
            vec![wgpu::CompositeAlphaMode::Opaque],
        );
        let (format, alpha) = pick_surface_format(&c).expect("supported");
        assert_eq!(format, TextureFormat::Bgra8UnormSrgb);
        assert_eq!(alpha, wgpu::CompositeAlphaMode::Opaque);
    }

    #[test]
    fn falls_back_to_first_format() {
        let c = caps(
            vec![TextureFormat::Rgba16Float],
            vec![wgpu::CompositeAlphaMode::Auto],
        );
        let (format, _) = pick_surface_format(&c).expect("supported");
        assert_eq!(format, TextureFormat::Rgba16Float);
    }

    #[test]
    fn empty_capabilities_are_an_error() {
        let err = pick_surface_format(&caps(vec![], vec![])).unwrap_err();
        assert!(matches!(err, RendererError::SurfaceUnsupported(_)), "{err}");

        let err = pick_surface_format(&caps(
            vec![TextureFormat::Bgra8UnormSrgb],
            vec![],
        ))
        .unwrap_err();
        assert!(err.to_string().contains("alpha"), "{err}");
    }
}
