//! GPU rendering pipeline using wgpu.
//!
//! This module provides the [`Renderer`] struct which handles:
//! - wgpu device and surface initialization
//! - Shader compilation and pipeline setup for all three scenes
//! - Grid mesh upload and rebuild on resolution changes
//! - The per-frame water compositing sequence
//!   (refraction pass, reflection pass, composite pass)

pub mod camera;
pub mod offscreen;
pub mod texture;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::scene::{ParamQueue, SceneKind, SceneParams};
use crate::terrain::{GridMesh, GridVertex, LitVertex, WaterQuad, COLOR_RAMP};
use crate::ui::Ui;
use camera::Camera;
use offscreen::{OffscreenTarget, OFFSCREEN_SIZE};
use texture::{AsyncCubeTexture, AsyncTexture};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// World-space span of the terrain footprint ([-1,1] on both axes).
const GRID_WORLD_SIZE: f32 = 2.0;

/// Half-width of the water quad in grid parameter space.
const WATER_EXTENT: f32 = 1.5;

/// Terrain shader modes, one per pass of the water pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
enum TerrainPassMode {
    /// Visible pass: full terrain, no discard.
    Main = 0,
    /// Refraction target: keep only fragments below the water line.
    Refraction = 1,
    /// Reflection target: folded geometry, keep only fragments above it.
    Reflection = 2,
}

/// Uniforms for the static-height terrain.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct StaticUniforms {
    view_proj: [[f32; 4]; 4],
    elevation: f32,
    _pad: [f32; 3],
}

/// Uniforms for the procedural fBm terrain, shared by all three pass modes.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct FbmUniforms {
    view_proj: [[f32; 4]; 4],
    light_pos: [f32; 3],
    light_intensity: f32,
    elevation: f32,
    water_height: f32,
    mode: u32,
    grid_size: f32,
    grid_precision: f32,
    _pad: [f32; 3],
}

/// Uniforms for the water compositing pass.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct WaterUniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 3],
    time: f32,
    light_pos: [f32; 3],
    light_intensity: f32,
    water_height: f32,
    _pad: [f32; 3],
}

/// Uniforms for the skybox; `flip` mirrors the sky for the offscreen passes.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SkyUniforms {
    inv_view_proj: [[f32; 4]; 4],
    flip: u32,
    _pad: [f32; 3],
}

/// Uniforms for the normal-mapped lit scene.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct LitUniforms {
    proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    light_pos: [f32; 3],
    light_intensity: f32,
    use_normal_map: u32,
    _pad: [f32; 3],
}

fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// GPU renderer managing wgpu state and rendering.
///
/// Owns every pipeline, the offscreen targets, and the async textures; one
/// instance drives all three scenes.
pub struct Renderer {
    // Core wgpu objects
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    /// Current window size (for aspect ratio and resize handling)
    pub size: winit::dpi::PhysicalSize<u32>,

    // Depth buffer
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,

    // Static terrain
    static_pipeline: wgpu::RenderPipeline,
    static_uniform_buffer: wgpu::Buffer,
    static_bind_group: wgpu::BindGroup,

    // Procedural terrain: one pipeline per target format, one uniform
    // buffer + bind group per pass mode
    fbm_pipeline: wgpu::RenderPipeline,
    fbm_pipeline_offscreen: wgpu::RenderPipeline,
    fbm_uniform_buffers: [wgpu::Buffer; 3],
    fbm_bind_groups: [wgpu::BindGroup; 3],

    // Skybox
    sky_pipeline: wgpu::RenderPipeline,
    sky_pipeline_offscreen: wgpu::RenderPipeline,
    sky_layout: wgpu::BindGroupLayout,
    sky_uniform_buffers: [wgpu::Buffer; 2],
    sky_bind_groups: [wgpu::BindGroup; 2],
    sky_sampler: wgpu::Sampler,

    // Water compositing
    water_pipeline: wgpu::RenderPipeline,
    water_layout: wgpu::BindGroupLayout,
    water_uniform_buffer: wgpu::Buffer,
    water_bind_group: wgpu::BindGroup,
    target_sampler: wgpu::Sampler,
    detail_sampler: wgpu::Sampler,

    // Lit scene
    lit_pipeline: wgpu::RenderPipeline,
    lit_layout: wgpu::BindGroupLayout,
    lit_uniform_buffer: wgpu::Buffer,
    lit_bind_group: wgpu::BindGroup,
    lit_sampler: wgpu::Sampler,

    // Offscreen targets, created once at the fixed resolution
    refraction_target: OffscreenTarget,
    reflection_target: OffscreenTarget,

    // Grid geometry (rebuilt on resolution changes)
    grid_vertex_buffer: wgpu::Buffer,
    grid_index_buffer: wgpu::Buffer,
    num_grid_indices: u32,
    lit_vertex_buffer: wgpu::Buffer,
    lit_index_buffer: wgpu::Buffer,
    num_lit_indices: u32,

    // Water quad (built once, never rebuilt)
    water_vertex_buffer: wgpu::Buffer,
    water_index_buffer: wgpu::Buffer,
    num_water_indices: u32,

    // Async textures
    skybox_texture: AsyncCubeTexture,
    diffuse_texture: AsyncTexture,
    normal_map_texture: AsyncTexture,
    water_normal_texture: AsyncTexture,
    distortion_texture: AsyncTexture,

    /// Render parameters, mutated only by draining the event queue
    pub params: SceneParams,
    /// Pending parameter changes from the UI
    pub param_queue: ParamQueue,

    /// Orbital camera shared by all scenes
    pub camera: Camera,

    // egui
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,

    /// UI state
    pub ui: Ui,

    /// Frame time for FPS calculation
    last_frame: Instant,
    frame_count: u32,
    fps: f32,

    /// Animation clock for the water distortion
    start_time: Instant,
}

impl Renderer {
    /// Create a new renderer for the given window.
    ///
    /// # Errors
    ///
    /// Returns an error if GPU initialization fails or the device cannot
    /// host the fixed-size offscreen targets.
    pub async fn new(
        window: Arc<Window>,
        params: SceneParams,
        assets_dir: PathBuf,
    ) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // Create wgpu instance
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface for the window
        let surface = instance.create_surface(window.clone())?;

        // Request GPU adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        // Create device and queue
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Init egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx,
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: Some(DEPTH_FORMAT),
                ..Default::default()
            },
        );
        let ui = Ui::new();

        // Create depth texture
        let (depth_texture, depth_view) = create_depth_texture(&device, size.width, size.height);

        // Offscreen targets for the water pipeline; both live at a fixed
        // resolution independent of the window, and a device that cannot
        // host them is a fatal startup error.
        let refraction_target =
            OffscreenTarget::new(&device, "Refraction Target", OFFSCREEN_FORMAT, DEPTH_FORMAT)?;
        let reflection_target =
            OffscreenTarget::new(&device, "Reflection Target", OFFSCREEN_FORMAT, DEPTH_FORMAT)?;

        // Color ramp: built once, immutable afterwards. The bind groups
        // below keep the buffer alive.
        let ramp_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Color Ramp Buffer"),
            contents: bytemuck::cast_slice(&COLOR_RAMP),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        // Shaders
        let static_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Static Terrain Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/terrain_static.wgsl").into()),
        });
        let fbm_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Fbm Terrain Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/terrain_fbm.wgsl").into()),
        });
        let sky_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Skybox Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/skybox.wgsl").into()),
        });
        let water_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Water Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/water.wgsl").into()),
        });
        let lit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Normal Map Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/normal_map.wgsl").into()),
        });

        // Samplers
        let target_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Offscreen Target Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let detail_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Water Detail Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let sky_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Skybox Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        // The reference renderer samples the lit surface with nearest
        // filtering and repeat wrapping; keep that look.
        let lit_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Lit Surface Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Async textures: placeholders bound immediately, real content
        // swapped in by `poll` when the decode threads finish.
        let skybox_texture = AsyncCubeTexture::load(
            &device,
            &queue,
            [
                assets_dir.join("skybox/posx.png"),
                assets_dir.join("skybox/negx.png"),
                assets_dir.join("skybox/posy.png"),
                assets_dir.join("skybox/negy.png"),
                assets_dir.join("skybox/posz.png"),
                assets_dir.join("skybox/negz.png"),
            ],
            [100, 150, 220, 255],
        );
        let diffuse_texture = AsyncTexture::load(
            &device,
            &queue,
            assets_dir.join("pebbles_diffuse.jpg"),
            wgpu::TextureFormat::Rgba8UnormSrgb,
            [128, 128, 128, 255],
        );
        let normal_map_texture = AsyncTexture::load(
            &device,
            &queue,
            assets_dir.join("pebbles_normal.jpg"),
            wgpu::TextureFormat::Rgba8Unorm,
            [128, 128, 255, 255],
        );
        let water_normal_texture = AsyncTexture::load(
            &device,
            &queue,
            assets_dir.join("water_normal.png"),
            wgpu::TextureFormat::Rgba8Unorm,
            [128, 128, 255, 255],
        );
        let distortion_texture = AsyncTexture::load(
            &device,
            &queue,
            assets_dir.join("water_distortion.png"),
            wgpu::TextureFormat::Rgba8Unorm,
            [128, 128, 0, 255],
        );

        // Terrain bind group layout: pass uniforms + the shared color ramp
        let terrain_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
            label: Some("Terrain Bind Group Layout"),
        });

        // Static terrain uniforms + bind group
        let static_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Static Terrain Uniform Buffer"),
            contents: bytemuck::cast_slice(&[StaticUniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                elevation: params.elevation,
                _pad: [0.0; 3],
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let static_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &terrain_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: static_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: ramp_buffer.as_entire_binding(),
                },
            ],
            label: Some("Static Terrain Bind Group"),
        });

        // Fbm terrain: one uniform buffer + bind group per pass mode
        let fbm_uniform_buffers: [wgpu::Buffer; 3] = std::array::from_fn(|i| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Fbm Uniform Buffer {i}")),
                contents: bytemuck::cast_slice(&[FbmUniforms {
                    view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                    light_pos: params.light_pos.to_array(),
                    light_intensity: params.light_intensity,
                    elevation: params.elevation,
                    water_height: params.water_height,
                    mode: i as u32,
                    grid_size: GRID_WORLD_SIZE,
                    grid_precision: params.grid_cols as f32,
                    _pad: [0.0; 3],
                }]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        });
        let fbm_bind_groups: [wgpu::BindGroup; 3] = std::array::from_fn(|i| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &terrain_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: fbm_uniform_buffers[i].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: ramp_buffer.as_entire_binding(),
                    },
                ],
                label: Some(&format!("Fbm Bind Group {i}")),
            })
        });

        // Skybox layout, uniforms (main + mirrored), bind groups
        let sky_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("Skybox Bind Group Layout"),
        });
        let sky_uniform_buffers: [wgpu::Buffer; 2] = std::array::from_fn(|flip| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Skybox Uniform Buffer {flip}")),
                contents: bytemuck::cast_slice(&[SkyUniforms {
                    inv_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                    flip: flip as u32,
                    _pad: [0.0; 3],
                }]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        });
        let sky_bind_groups = Self::create_sky_bind_groups(
            &device,
            &sky_layout,
            &sky_uniform_buffers,
            skybox_texture.view(),
            &sky_sampler,
        );

        // Water layout, uniforms, bind group
        let water_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 5,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 6,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("Water Bind Group Layout"),
        });
        let water_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Water Uniform Buffer"),
            contents: bytemuck::cast_slice(&[WaterUniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                camera_pos: [0.0; 3],
                time: 0.0,
                light_pos: params.light_pos.to_array(),
                light_intensity: params.light_intensity,
                water_height: params.water_height,
                _pad: [0.0; 3],
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let water_bind_group = Self::create_water_bind_group(
            &device,
            &water_layout,
            &water_uniform_buffer,
            &refraction_target,
            &reflection_target,
            &target_sampler,
            water_normal_texture.view(),
            distortion_texture.view(),
            &detail_sampler,
        );

        // Lit scene layout, uniforms, bind group
        let lit_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("Lit Bind Group Layout"),
        });
        let lit_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lit Uniform Buffer"),
            contents: bytemuck::cast_slice(&[LitUniforms {
                proj: Mat4::IDENTITY.to_cols_array_2d(),
                view: Mat4::IDENTITY.to_cols_array_2d(),
                light_pos: params.light_pos.to_array(),
                light_intensity: params.light_intensity,
                use_normal_map: params.use_normal_map as u32,
                _pad: [0.0; 3],
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let lit_bind_group = Self::create_lit_bind_group(
            &device,
            &lit_layout,
            &lit_uniform_buffer,
            diffuse_texture.view(),
            normal_map_texture.view(),
            &lit_sampler,
        );

        // Pipelines
        let terrain_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Terrain Pipeline Layout"),
                bind_group_layouts: &[&terrain_layout],
                push_constant_ranges: &[],
            });
        let static_pipeline = Self::create_pipeline(
            &device,
            "Static Terrain Pipeline",
            &terrain_pipeline_layout,
            &static_shader,
            &[GridVertex::desc()],
            surface_format,
            wgpu::CompareFunction::Less,
            true,
        );
        let fbm_pipeline = Self::create_pipeline(
            &device,
            "Fbm Terrain Pipeline",
            &terrain_pipeline_layout,
            &fbm_shader,
            &[GridVertex::desc()],
            surface_format,
            wgpu::CompareFunction::Less,
            true,
        );
        let fbm_pipeline_offscreen = Self::create_pipeline(
            &device,
            "Fbm Terrain Pipeline (offscreen)",
            &terrain_pipeline_layout,
            &fbm_shader,
            &[GridVertex::desc()],
            OFFSCREEN_FORMAT,
            wgpu::CompareFunction::Less,
            true,
        );

        let sky_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skybox Pipeline Layout"),
            bind_group_layouts: &[&sky_layout],
            push_constant_ranges: &[],
        });
        let sky_pipeline = Self::create_pipeline(
            &device,
            "Skybox Pipeline",
            &sky_pipeline_layout,
            &sky_shader,
            &[],
            surface_format,
            wgpu::CompareFunction::LessEqual,
            false,
        );
        let sky_pipeline_offscreen = Self::create_pipeline(
            &device,
            "Skybox Pipeline (offscreen)",
            &sky_pipeline_layout,
            &sky_shader,
            &[],
            OFFSCREEN_FORMAT,
            wgpu::CompareFunction::LessEqual,
            false,
        );

        let water_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Water Pipeline Layout"),
                bind_group_layouts: &[&water_layout],
                push_constant_ranges: &[],
            });
        let water_pipeline = Self::create_pipeline(
            &device,
            "Water Pipeline",
            &water_pipeline_layout,
            &water_shader,
            &[GridVertex::desc()],
            surface_format,
            wgpu::CompareFunction::Less,
            true,
        );

        let lit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lit Pipeline Layout"),
            bind_group_layouts: &[&lit_layout],
            push_constant_ranges: &[],
        });
        let lit_pipeline = Self::create_pipeline(
            &device,
            "Lit Pipeline",
            &lit_pipeline_layout,
            &lit_shader,
            &[LitVertex::desc()],
            surface_format,
            wgpu::CompareFunction::Less,
            true,
        );

        // Grid geometry at the initial resolution
        let (grid_vertex_buffer, grid_index_buffer, num_grid_indices) =
            Self::build_grid_buffers(&device, params.grid_cols, params.grid_rows);
        let (lit_vertex_buffer, lit_index_buffer, num_lit_indices) =
            Self::build_lit_buffers(&device, params.grid_cols, params.grid_rows);

        // Water quad, built once
        let quad = WaterQuad::new(WATER_EXTENT);
        let water_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Water Vertex Buffer"),
            contents: bytemuck::cast_slice(&quad.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let water_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Water Index Buffer"),
            contents: bytemuck::cast_slice(&quad.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::info!(
            "renderer ready: {}x{} surface, {}px offscreen targets",
            size.width,
            size.height,
            OFFSCREEN_SIZE
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            depth_texture,
            depth_view,
            static_pipeline,
            static_uniform_buffer,
            static_bind_group,
            fbm_pipeline,
            fbm_pipeline_offscreen,
            fbm_uniform_buffers,
            fbm_bind_groups,
            sky_pipeline,
            sky_pipeline_offscreen,
            sky_layout,
            sky_uniform_buffers,
            sky_bind_groups,
            sky_sampler,
            water_pipeline,
            water_layout,
            water_uniform_buffer,
            water_bind_group,
            target_sampler,
            detail_sampler,
            lit_pipeline,
            lit_layout,
            lit_uniform_buffer,
            lit_bind_group,
            lit_sampler,
            refraction_target,
            reflection_target,
            grid_vertex_buffer,
            grid_index_buffer,
            num_grid_indices,
            lit_vertex_buffer,
            lit_index_buffer,
            num_lit_indices,
            water_vertex_buffer,
            water_index_buffer,
            num_water_indices: quad.indices.len() as u32,
            skybox_texture,
            diffuse_texture,
            normal_map_texture,
            water_normal_texture,
            distortion_texture,
            params,
            param_queue: ParamQueue::new(),
            camera: Camera::new(),
            egui_state,
            egui_renderer,
            ui,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            start_time: Instant::now(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn create_pipeline(
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        buffers: &[wgpu::VertexBufferLayout<'_>],
        format: wgpu::TextureFormat,
        depth_compare: wgpu::CompareFunction,
        depth_write: bool,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: depth_write,
                depth_compare,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn create_sky_bind_groups(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform_buffers: &[wgpu::Buffer; 2],
        sky_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> [wgpu::BindGroup; 2] {
        std::array::from_fn(|i| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffers[i].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(sky_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
                label: Some(&format!("Skybox Bind Group {i}")),
            })
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn create_water_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        refraction: &OffscreenTarget,
        reflection: &OffscreenTarget,
        target_sampler: &wgpu::Sampler,
        normal_view: &wgpu::TextureView,
        distortion_view: &wgpu::TextureView,
        detail_sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&refraction.color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&reflection.color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(target_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(normal_view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(distortion_view),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::Sampler(detail_sampler),
                },
            ],
            label: Some("Water Bind Group"),
        })
    }

    fn create_lit_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        diffuse_view: &wgpu::TextureView,
        normal_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(diffuse_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(normal_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
            label: Some("Lit Bind Group"),
        })
    }

    fn build_grid_buffers(
        device: &wgpu::Device,
        cols: u32,
        rows: u32,
    ) -> (wgpu::Buffer, wgpu::Buffer, u32) {
        let grid = GridMesh::new(cols, rows);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Grid Vertex Buffer"),
            contents: bytemuck::cast_slice(&grid.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Grid Index Buffer"),
            contents: bytemuck::cast_slice(&grid.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        (vertex_buffer, index_buffer, grid.indices.len() as u32)
    }

    fn build_lit_buffers(
        device: &wgpu::Device,
        cols: u32,
        rows: u32,
    ) -> (wgpu::Buffer, wgpu::Buffer, u32) {
        let mesh = GridMesh::new(cols, rows).to_lit_mesh();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lit Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lit Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        (vertex_buffer, index_buffer, mesh.indices.len() as u32)
    }

    /// Rebuild all grid-derived geometry at the current resolution.
    ///
    /// The new buffers fully replace the old ones before any draw call can
    /// reference them; the old buffers are dropped on assignment.
    fn rebuild_grid(&mut self) {
        let (cols, rows) = (self.params.grid_cols, self.params.grid_rows);
        log::info!("rebuilding grid at {cols}x{rows}");
        let (vb, ib, n) = Self::build_grid_buffers(&self.device, cols, rows);
        self.grid_vertex_buffer = vb;
        self.grid_index_buffer = ib;
        self.num_grid_indices = n;
        let (vb, ib, n) = Self::build_lit_buffers(&self.device, cols, rows);
        self.lit_vertex_buffer = vb;
        self.lit_index_buffer = ib;
        self.num_lit_indices = n;
    }

    /// Check the async textures and rebuild any bind group whose view
    /// changed. Drawing continues with placeholders until then.
    fn poll_textures(&mut self) {
        if self.skybox_texture.poll(&self.device, &self.queue) {
            self.sky_bind_groups = Self::create_sky_bind_groups(
                &self.device,
                &self.sky_layout,
                &self.sky_uniform_buffers,
                self.skybox_texture.view(),
                &self.sky_sampler,
            );
        }
        let lit_changed = self.diffuse_texture.poll(&self.device, &self.queue)
            | self.normal_map_texture.poll(&self.device, &self.queue);
        if lit_changed {
            self.lit_bind_group = Self::create_lit_bind_group(
                &self.device,
                &self.lit_layout,
                &self.lit_uniform_buffer,
                self.diffuse_texture.view(),
                self.normal_map_texture.view(),
                &self.lit_sampler,
            );
        }
        let water_changed = self.water_normal_texture.poll(&self.device, &self.queue)
            | self.distortion_texture.poll(&self.device, &self.queue);
        if water_changed {
            self.water_bind_group = Self::create_water_bind_group(
                &self.device,
                &self.water_layout,
                &self.water_uniform_buffer,
                &self.refraction_target,
                &self.reflection_target,
                &self.target_sampler,
                self.water_normal_texture.view(),
                self.distortion_texture.view(),
                &self.detail_sampler,
            );
        }
    }

    /// Write every uniform buffer for the current frame.
    fn update_uniforms(&mut self, aspect: f32, time: f32) {
        let view_proj = self
            .camera
            .build_view_projection_matrix(aspect)
            .to_cols_array_2d();
        let p = &self.params;

        self.queue.write_buffer(
            &self.static_uniform_buffer,
            0,
            bytemuck::cast_slice(&[StaticUniforms {
                view_proj,
                elevation: p.elevation,
                _pad: [0.0; 3],
            }]),
        );

        for (i, buffer) in self.fbm_uniform_buffers.iter().enumerate() {
            self.queue.write_buffer(
                buffer,
                0,
                bytemuck::cast_slice(&[FbmUniforms {
                    view_proj,
                    light_pos: p.light_pos.to_array(),
                    light_intensity: p.light_intensity,
                    elevation: p.elevation,
                    water_height: p.water_height,
                    mode: i as u32,
                    grid_size: GRID_WORLD_SIZE,
                    grid_precision: p.grid_cols as f32,
                    _pad: [0.0; 3],
                }]),
            );
        }

        let inv_view_proj = self.camera.build_sky_inverse_matrix(aspect).to_cols_array_2d();
        for (flip, buffer) in self.sky_uniform_buffers.iter().enumerate() {
            self.queue.write_buffer(
                buffer,
                0,
                bytemuck::cast_slice(&[SkyUniforms {
                    inv_view_proj,
                    flip: flip as u32,
                    _pad: [0.0; 3],
                }]),
            );
        }

        self.queue.write_buffer(
            &self.water_uniform_buffer,
            0,
            bytemuck::cast_slice(&[WaterUniforms {
                view_proj,
                camera_pos: self.camera.position().to_array(),
                time,
                light_pos: p.light_pos.to_array(),
                light_intensity: p.light_intensity,
                water_height: p.water_height,
                _pad: [0.0; 3],
            }]),
        );

        self.queue.write_buffer(
            &self.lit_uniform_buffer,
            0,
            bytemuck::cast_slice(&[LitUniforms {
                proj: self.camera.build_projection_matrix(aspect).to_cols_array_2d(),
                view: self.camera.build_view_matrix().to_cols_array_2d(),
                light_pos: p.light_pos.to_array(),
                light_intensity: p.light_intensity,
                use_normal_map: p.use_normal_map as u32,
                _pad: [0.0; 3],
            }]),
        );
    }

    /// Encode one offscreen pass of the water pipeline: mirrored skybox
    /// first, then the terrain in the given discard mode.
    fn encode_offscreen_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &OffscreenTarget,
        mode: TerrainPassMode,
        label: &str,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        // Offscreen passes always run at the fixed target resolution,
        // whatever the window currently measures.
        pass.set_viewport(
            0.0,
            0.0,
            OFFSCREEN_SIZE as f32,
            OFFSCREEN_SIZE as f32,
            0.0,
            1.0,
        );

        pass.set_pipeline(&self.sky_pipeline_offscreen);
        pass.set_bind_group(0, &self.sky_bind_groups[1], &[]);
        pass.draw(0..3, 0..1);

        pass.set_pipeline(&self.fbm_pipeline_offscreen);
        pass.set_bind_group(0, &self.fbm_bind_groups[mode as usize], &[]);
        pass.set_vertex_buffer(0, self.grid_vertex_buffer.slice(..));
        pass.set_index_buffer(self.grid_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.num_grid_indices, 0, 0..1);
    }

    /// Handle window event
    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    /// Handle window resize.
    ///
    /// Reconfigures the surface and depth buffer for the new size. The
    /// offscreen targets keep their fixed resolution.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            // Recreate depth texture for new size
            let (depth_texture, depth_view) =
                create_depth_texture(&self.device, new_size.width, new_size.height);
            self.depth_texture = depth_texture;
            self.depth_view = depth_view;
        }
    }

    /// Render a frame.
    ///
    /// Drains the parameter queue, runs the offscreen water passes when the
    /// water scene is active, then the visible pass with the egui overlay.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] if surface acquisition fails.
    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        // Update FPS counter
        self.frame_count += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).as_secs_f32();
        if elapsed >= 1.0 {
            self.fps = self.frame_count as f32 / elapsed;
            self.frame_count = 0;
            self.last_frame = now;
        }

        // Swap in any textures whose decode finished since last frame
        self.poll_textures();

        // Begin egui frame; widgets push ParamEvents into the queue
        let raw_input = self.egui_state.take_egui_input(window);
        let egui_ctx = self.egui_state.egui_ctx().clone();
        let full_output = egui_ctx.run(raw_input, |ctx| {
            let response = self.ui.render(
                ctx,
                &mut self.camera,
                &self.params,
                &mut self.param_queue,
                self.fps,
            );
            if response.reset_camera {
                self.camera = Camera::new();
            }
        });

        // Frame boundary: apply every queued parameter change before any
        // pass is encoded.
        let applied = self.param_queue.drain_into(&mut self.params);
        if applied.grid_dirty {
            self.rebuild_grid();
        }

        // Handle egui platform output (cursor changes, etc.)
        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let aspect = self.size.width as f32 / self.size.height as f32;
        let time = self.start_time.elapsed().as_secs_f32();
        self.update_uniforms(aspect, time);

        // Prepare egui for rendering
        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.size.width, self.size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        // Update egui textures
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        // Create command encoder
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // Upload egui buffers
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        // Offscreen passes run before the visible pass touches the surface
        if self.params.scene == SceneKind::Water {
            self.encode_offscreen_pass(
                &mut encoder,
                &self.refraction_target,
                TerrainPassMode::Refraction,
                "Refraction Pass",
            );
            self.encode_offscreen_pass(
                &mut encoder,
                &self.reflection_target,
                TerrainPassMode::Reflection,
                "Reflection Pass",
            );
        }

        // Visible pass at the window's own viewport
        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
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
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // Convert to 'static lifetime for egui compatibility
            let mut render_pass = render_pass.forget_lifetime();

            match self.params.scene {
                SceneKind::Lit => {
                    render_pass.set_pipeline(&self.lit_pipeline);
                    render_pass.set_bind_group(0, &self.lit_bind_group, &[]);
                    render_pass.set_vertex_buffer(0, self.lit_vertex_buffer.slice(..));
                    render_pass.set_index_buffer(
                        self.lit_index_buffer.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    render_pass.draw_indexed(0..self.num_lit_indices, 0, 0..1);
                }
                SceneKind::Static => {
                    render_pass.set_pipeline(&self.static_pipeline);
                    render_pass.set_bind_group(0, &self.static_bind_group, &[]);
                    render_pass.set_vertex_buffer(0, self.grid_vertex_buffer.slice(..));
                    render_pass.set_index_buffer(
                        self.grid_index_buffer.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    render_pass.draw_indexed(0..self.num_grid_indices, 0, 0..1);
                }
                SceneKind::Water => {
                    render_pass.set_pipeline(&self.sky_pipeline);
                    render_pass.set_bind_group(0, &self.sky_bind_groups[0], &[]);
                    render_pass.draw(0..3, 0..1);

                    render_pass.set_pipeline(&self.fbm_pipeline);
                    render_pass
                        .set_bind_group(0, &self.fbm_bind_groups[TerrainPassMode::Main as usize], &[]);
                    render_pass.set_vertex_buffer(0, self.grid_vertex_buffer.slice(..));
                    render_pass.set_index_buffer(
                        self.grid_index_buffer.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    render_pass.draw_indexed(0..self.num_grid_indices, 0, 0..1);

                    render_pass.set_pipeline(&self.water_pipeline);
                    render_pass.set_bind_group(0, &self.water_bind_group, &[]);
                    render_pass.set_vertex_buffer(0, self.water_vertex_buffer.slice(..));
                    render_pass.set_index_buffer(
                        self.water_index_buffer.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    render_pass.draw_indexed(0..self.num_water_indices, 0, 0..1);
                }
            }

            // Render egui UI
            self.egui_renderer
                .render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        // Submit commands and present
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
