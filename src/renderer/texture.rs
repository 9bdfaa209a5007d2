//! Asynchronous texture loading.
//!
//! A load request returns immediately with a 1x1 placeholder texture that is
//! valid to bind and draw with; a worker thread decodes the image file and
//! hands the pixels back over a channel. The render loop calls `poll` once
//! per frame and swaps the populated texture in when it arrives. There is no
//! cancellation: a superseded load may complete late and overwrite newer
//! state, which is accepted.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read image {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Decoded RGBA8 pixels, ready for upload.
#[derive(Debug)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Read and decode an image file to tightly packed RGBA8.
pub fn decode_rgba(path: &Path) -> Result<DecodedImage, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let img = image::load_from_memory(&bytes)
        .map_err(|source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    Ok(DecodedImage {
        width: img.width(),
        height: img.height(),
        pixels: img.into_raw(),
    })
}

fn upload_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    layers: u32,
    data: &[u8],
) -> wgpu::Texture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: layers,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: layers,
        },
    );
    texture
}

/// A 2D texture populated in the background.
pub struct AsyncTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    format: wgpu::TextureFormat,
    label: String,
    receiver: Option<mpsc::Receiver<Result<DecodedImage, LoadError>>>,
    ready: bool,
}

impl AsyncTexture {
    /// Start loading `path`. Returns immediately with a 1x1 placeholder of
    /// the given color bound in place of the real content.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: PathBuf,
        format: wgpu::TextureFormat,
        placeholder: [u8; 4],
    ) -> Self {
        let label = path.display().to_string();
        let texture = upload_rgba(device, queue, &label, format, 1, 1, 1, &placeholder);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            // The receiver may be gone if the renderer was torn down; a send
            // failure is then irrelevant.
            let _ = sender.send(decode_rgba(&path));
        });

        Self {
            texture,
            view,
            format,
            label,
            receiver: Some(receiver),
            ready: false,
        }
    }

    /// Check for arrived pixel data and swap the real texture in.
    ///
    /// Returns `true` when the texture changed, so the caller knows to
    /// rebuild any bind group referencing the old view. A failed load logs a
    /// warning and leaves the placeholder bound for good.
    pub fn poll(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> bool {
        let Some(receiver) = &self.receiver else {
            return false;
        };
        match receiver.try_recv() {
            Ok(Ok(img)) => {
                self.texture = upload_rgba(
                    device,
                    queue,
                    &self.label,
                    self.format,
                    img.width,
                    img.height,
                    1,
                    &img.pixels,
                );
                self.view = self
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                self.ready = true;
                self.receiver = None;
                log::debug!("texture ready: {}", self.label);
                true
            }
            Ok(Err(err)) => {
                log::warn!("texture load failed, keeping placeholder: {err}");
                self.receiver = None;
                false
            }
            Err(mpsc::TryRecvError::Empty) => false,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.receiver = None;
                false
            }
        }
    }

    /// Whether the real content has been uploaded.
    pub fn ready(&self) -> bool {
        self.ready
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

/// Six cube faces loaded in the background into one cube texture.
///
/// The placeholder is a 1x1x6 cube; the real cube is created once all six
/// faces have arrived (they must share one size). Any failed or mismatched
/// face leaves the placeholder bound.
pub struct AsyncCubeTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    label: String,
    receiver: Option<mpsc::Receiver<(usize, Result<DecodedImage, LoadError>)>>,
    arrived: Vec<Option<DecodedImage>>,
    ready: bool,
    failed: bool,
}

impl AsyncCubeTexture {
    /// Face order: +X, -X, +Y, -Y, +Z, -Z.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: [PathBuf; 6],
        placeholder: [u8; 4],
    ) -> Self {
        let label = format!("skybox ({})", faces[0].display());
        let data: Vec<u8> = placeholder.repeat(6);
        let texture = upload_rgba(
            device,
            queue,
            &label,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            1,
            1,
            6,
            &data,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        let (sender, receiver) = mpsc::channel();
        for (i, path) in faces.into_iter().enumerate() {
            let sender = sender.clone();
            thread::spawn(move || {
                let _ = sender.send((i, decode_rgba(&path)));
            });
        }

        Self {
            texture,
            view,
            label,
            receiver: Some(receiver),
            arrived: (0..6).map(|_| None).collect(),
            ready: false,
            failed: false,
        }
    }

    /// Collect arrived faces; once all six are in, build the cube texture.
    /// Returns `true` when the texture changed.
    pub fn poll(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> bool {
        let Some(receiver) = &self.receiver else {
            return false;
        };
        while let Ok((i, result)) = receiver.try_recv() {
            match result {
                Ok(img) => self.arrived[i] = Some(img),
                Err(err) => {
                    log::warn!("skybox face load failed, keeping placeholder: {err}");
                    self.failed = true;
                }
            }
        }
        if self.failed {
            self.receiver = None;
            return false;
        }
        if !self.arrived.iter().all(|f| f.is_some()) {
            return false;
        }

        let faces: Vec<DecodedImage> = self.arrived.drain(..).map(|f| f.unwrap()).collect();
        let (w, h) = (faces[0].width, faces[0].height);
        if faces.iter().any(|f| f.width != w || f.height != h) {
            log::warn!("skybox faces disagree on size, keeping placeholder");
            self.receiver = None;
            return false;
        }

        let mut data = Vec::with_capacity(faces.len() * faces[0].pixels.len());
        for face in &faces {
            data.extend_from_slice(&face.pixels);
        }
        self.texture = upload_rgba(
            device,
            queue,
            &self.label,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            w,
            h,
            6,
            &data,
        );
        self.view = self.texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        self.ready = true;
        self.receiver = None;
        log::debug!("skybox ready: {}x{} faces", w, h);
        true
    }

    pub fn ready(&self) -> bool {
        self.ready
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rgba_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");

        let mut img = image::RgbaImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 1, image::Rgba([0, 0, 255, 255]));
        img.save(&path).unwrap();

        let decoded = decode_rgba(&path).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 2));
        assert_eq!(decoded.pixels.len(), 16);
        assert_eq!(&decoded.pixels[0..4], &[255, 0, 0, 255]);
        assert_eq!(&decoded.pixels[12..16], &[0, 0, 255, 255]);
    }

    #[test]
    fn test_decode_missing_file_is_io_error() {
        let err = decode_rgba(Path::new("/nonexistent/texture.png")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_an_image.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let err = decode_rgba(&path).unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
    }
}
