use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::DynamicImage;

use crate::renderer::device::{SharedDevice, TextureId};

/// The material slot a texture fills. Decides the sampler name it is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
}

impl TextureKind {
    /// The sampler uniform prefix, completed by a 1-based counter per kind.
    pub fn sampler_prefix(self) -> &'static str {
        match self {
            TextureKind::Diffuse => "texture_diffuse",
            TextureKind::Specular => "texture_specular",
        }
    }
}

/// Pixel layout of a decoded image, 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Red,
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// Maps a decoder channel count to an upload format. Channel counts other
    /// than 1, 3 and 4 fall back to a single channel.
    pub fn from_channel_count(channels: u8) -> PixelFormat {
        match channels {
            1 => PixelFormat::Red,
            3 => PixelFormat::Rgb,
            4 => PixelFormat::Rgba,
            _ => PixelFormat::Red,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Red => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// Raw pixels ready for upload. `pixels.len()` is always
/// `width * height * format.bytes_per_pixel()`.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
    /// Channel count reported by the decoder, before any fallback.
    pub source_channels: u8,
}

impl DecodedImage {
    /// A 2x2 magenta and black checker, uploaded in place of textures that
    /// could not be decoded.
    pub fn placeholder() -> DecodedImage {
        const MAGENTA: [u8; 4] = [255, 0, 255, 255];
        const BLACK: [u8; 4] = [0, 0, 0, 255];
        DecodedImage {
            width: 2,
            height: 2,
            format: PixelFormat::Rgba,
            pixels: [MAGENTA, BLACK, BLACK, MAGENTA].concat(),
            source_channels: 4,
        }
    }

    fn from_dynamic(image: DynamicImage, label: &str) -> DecodedImage {
        let (width, height) = (image.width(), image.height());
        let source_channels = image.color().channel_count();
        let format = PixelFormat::from_channel_count(source_channels);
        let pixels = match source_channels {
            1 => image.into_luma8().into_raw(),
            3 => image.into_rgb8().into_raw(),
            4 => image.into_rgba8().into_raw(),
            other => {
                log::warn!(
                    "{label} has {other} channels, uploading it as a single channel texture"
                );
                image.into_luma8().into_raw()
            }
        };
        DecodedImage {
            width,
            height,
            format,
            pixels,
            source_channels,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to decode image '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("asset '{asset}' has no embedded texture {index}")]
    MissingEmbedded { asset: PathBuf, index: usize },
}

/// Decodes an image file into 8-bit-per-channel pixels.
pub fn decode_file(path: &Path) -> Result<DecodedImage, TextureError> {
    let image = image::open(path).map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(DecodedImage::from_dynamic(image, &path.display().to_string()))
}

/// Decodes an image embedded in an asset file. `label` names it in errors.
pub fn decode_memory(bytes: &[u8], label: &Path) -> Result<DecodedImage, TextureError> {
    let image = image::load_from_memory(bytes).map_err(|source| TextureError::Decode {
        path: label.to_path_buf(),
        source,
    })?;
    Ok(DecodedImage::from_dynamic(image, &label.display().to_string()))
}

/// A GPU texture object. Deleted when the last [`Texture`] sharing it is
/// dropped.
pub struct TextureResource {
    id: TextureId,
    placeholder: bool,
    device: SharedDevice,
}

impl TextureResource {
    /// Uploads the decoded image, or the placeholder if decoding failed. The
    /// decode error is handed back so the caller can record the degradation.
    pub fn upload(
        device: &SharedDevice,
        decoded: Result<DecodedImage, TextureError>,
    ) -> (TextureResource, Option<TextureError>) {
        let (image, error) = match decoded {
            Ok(image) => (image, None),
            Err(error) => {
                log::warn!("{error}, using a placeholder texture");
                (DecodedImage::placeholder(), Some(error))
            }
        };
        let resource = TextureResource {
            id: device.upload_texture(&image),
            placeholder: error.is_some(),
            device: device.clone(),
        };
        (resource, error)
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

impl fmt::Debug for TextureResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureResource")
            .field("id", &self.id)
            .field("placeholder", &self.placeholder)
            .finish()
    }
}

impl Drop for TextureResource {
    fn drop(&mut self) {
        self.device.delete_texture(self.id);
    }
}

/// A texture as referenced by a material: the shared GPU object, the slot it
/// fills, and the path string the material used for it.
#[derive(Clone, Debug)]
pub struct Texture {
    resource: Rc<TextureResource>,
    kind: TextureKind,
    path: String,
}

impl Texture {
    pub fn new(resource: Rc<TextureResource>, kind: TextureKind, path: impl Into<String>) -> Texture {
        Texture {
            resource,
            kind,
            path: path.into(),
        }
    }

    pub fn id(&self) -> TextureId {
        self.resource.id()
    }

    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_placeholder(&self) -> bool {
        self.resource.is_placeholder()
    }

    /// The same GPU texture, filling a different material slot.
    pub fn with_kind(&self, kind: TextureKind) -> Texture {
        Texture {
            resource: self.resource.clone(),
            kind,
            path: self.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_counts_map_to_formats() {
        assert_eq!(PixelFormat::from_channel_count(1), PixelFormat::Red);
        assert_eq!(PixelFormat::from_channel_count(3), PixelFormat::Rgb);
        assert_eq!(PixelFormat::from_channel_count(4), PixelFormat::Rgba);
        // Anything else is the single channel fallback.
        assert_eq!(PixelFormat::from_channel_count(2), PixelFormat::Red);
        assert_eq!(PixelFormat::from_channel_count(0), PixelFormat::Red);
        assert_eq!(PixelFormat::from_channel_count(5), PixelFormat::Red);
    }

    #[test]
    fn placeholder_is_consistent() {
        let image = DecodedImage::placeholder();
        assert_eq!(
            image.pixels.len(),
            (image.width * image.height) as usize * image.format.bytes_per_pixel()
        );
    }

    #[test]
    fn decodes_files_by_channel_count() {
        let dir = tempfile::tempdir().unwrap();

        let gray = dir.path().join("gray.png");
        image::GrayImage::from_pixel(3, 2, image::Luma([7])).save(&gray).unwrap();
        let decoded = decode_file(&gray).unwrap();
        assert_eq!(decoded.format, PixelFormat::Red);
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.pixels, vec![7; 6]);

        let rgb = dir.path().join("rgb.png");
        image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3])).save(&rgb).unwrap();
        let decoded = decode_file(&rgb).unwrap();
        assert_eq!(decoded.format, PixelFormat::Rgb);
        assert_eq!(&decoded.pixels[..3], &[1, 2, 3]);

        let rgba = dir.path().join("rgba.png");
        image::RgbaImage::from_pixel(1, 1, image::Rgba([9, 8, 7, 6])).save(&rgba).unwrap();
        let decoded = decode_file(&rgba).unwrap();
        assert_eq!(decoded.format, PixelFormat::Rgba);
        assert_eq!(decoded.pixels, vec![9, 8, 7, 6]);
    }

    #[test]
    fn two_channel_images_fall_back_to_one_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray_alpha.png");
        image::GrayAlphaImage::from_pixel(2, 2, image::LumaA([50, 255]))
            .save(&path)
            .unwrap();

        let decoded = decode_file(&path).unwrap();
        assert_eq!(decoded.source_channels, 2);
        assert_eq!(decoded.format, PixelFormat::Red);
        assert_eq!(decoded.pixels, vec![50; 4]);
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = decode_file(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(error, TextureError::Decode { .. }));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let error = decode_memory(b"definitely not a png", Path::new("model.glb#*0")).unwrap_err();
        assert!(error.to_string().contains("model.glb#*0"));
    }

    #[test]
    fn sampler_prefixes() {
        assert_eq!(TextureKind::Diffuse.sampler_prefix(), "texture_diffuse");
        assert_eq!(TextureKind::Specular.sampler_prefix(), "texture_specular");
    }
}
