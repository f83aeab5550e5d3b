use std::path::Path;

use crate::render::{CpuTexture, Texture, TextureStore};

use super::{AssetError, AssetLoader};

/// Decodes PNG/JPEG files into RGBA8 pixels.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageLoader;

impl AssetLoader<CpuTexture> for ImageLoader {
    fn load(&mut self, path: &Path) -> Result<CpuTexture, AssetError> {
        let decoded = ::image::open(path).map_err(|source| match source {
            ::image::ImageError::IoError(source) => AssetError::Io {
                path: path.to_path_buf(),
                source,
            },
            source => AssetError::Image {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let rgba = decoded.into_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(AssetError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        Ok(CpuTexture {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

/// Decodes an image and uploads it into a [`TextureStore`].
pub struct GpuTextureLoader<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub store: &'a mut TextureStore,
}

impl AssetLoader<Texture> for GpuTextureLoader<'_> {
    fn load(&mut self, path: &Path) -> Result<Texture, AssetError> {
        let image = ImageLoader.load(path)?;
        Ok(self.store.upload(self.device, self.queue, &image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("px.png");
        ::image::RgbImage::from_pixel(3, 2, ::image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let tex = ImageLoader.load(&path).unwrap();
        assert_eq!((tex.width, tex.height), (3, 2));
        assert_eq!(&tex.pixels[..4], &[10, 20, 30, 255]);
        assert!(tex.is_valid());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ImageLoader.load(Path::new("nope/missing.png")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"not a png").unwrap();

        let err = ImageLoader.load(&path).unwrap_err();
        assert!(matches!(err, AssetError::Image { .. }));
    }
}
