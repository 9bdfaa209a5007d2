//! Fixed-resolution offscreen render targets for the water pipeline.

use anyhow::{bail, Result};

/// Side length of both offscreen targets, independent of the window size.
pub const OFFSCREEN_SIZE: u32 = 2048;

/// A color texture plus depth buffer usable as a render destination and
/// sampled later by the water compositing pass.
pub struct OffscreenTarget {
    pub color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub depth_view: wgpu::TextureView,
}

impl OffscreenTarget {
    /// Create a target at the fixed offscreen resolution.
    ///
    /// An unsupported size is a fatal initialization failure: it is checked
    /// once here against the device limits, never per frame.
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        let max = device.limits().max_texture_dimension_2d;
        if OFFSCREEN_SIZE > max {
            bail!("offscreen target {label} needs {OFFSCREEN_SIZE}px, device supports {max}px");
        }

        let size = wgpu::Extent3d {
            width: OFFSCREEN_SIZE,
            height: OFFSCREEN_SIZE,
            depth_or_array_layers: 1,
        };
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{label} depth")),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: depth_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            color,
            color_view,
            depth_view,
        })
    }
}
