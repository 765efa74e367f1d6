//! Raster transcoding: re-encode a source image to fit a target box.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};

use crate::variant::TargetBox;

/// The source could not be decoded. Raised before any document or upload
/// work, so no cleanup is required.
#[derive(Debug, thiserror::Error)]
#[error("could not read source image: {0}")]
pub struct LoadError(pub String);

/// A transcode step failed; `operation` names the failing step.
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed: {detail}")]
pub struct TranscodeError {
    pub operation: &'static str,
    pub detail: String,
}

/// A source image decoded exactly once per submission.
pub struct SourceImage {
    image: DynamicImage,
    pub width: u32,
    pub height: u32,
}

/// A re-encoded variant blob with its final dimensions.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    pub content_type: &'static str,
    pub extension: &'static str,
}

impl EncodedImage {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Decode the source bytes, guessing the container format.
pub fn load_source(data: &[u8]) -> Result<SourceImage, LoadError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| LoadError(e.to_string()))?;
    let image = reader.decode().map_err(|e| LoadError(e.to_string()))?;
    let (width, height) = image.dimensions();
    Ok(SourceImage {
        image,
        width,
        height,
    })
}

/// Compute the dimensions of `width`×`height` scaled to fit `target` with
/// the aspect ratio preserved. Sources already inside the box keep their
/// size (no upsampling).
pub fn fit_within(width: u32, height: u32, target: TargetBox) -> (u32, u32) {
    if target.contains(width, height) {
        return (width, height);
    }
    let wratio = target.width as f64 / width as f64;
    let hratio = target.height as f64 / height as f64;
    let ratio = wratio.min(hratio);
    let new_width = ((width as f64 * ratio).round() as u32).clamp(1, target.width);
    let new_height = ((height as f64 * ratio).round() as u32).clamp(1, target.height);
    (new_width, new_height)
}

/// Re-encodes source images into JPEG blobs fitting a target box.
pub struct Transcoder {
    quality: u8,
}

impl Transcoder {
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }

    /// Produce a JPEG blob fitting `target` without distortion or cropping.
    pub fn encode_to_fit(
        &self,
        source: &SourceImage,
        target: TargetBox,
    ) -> Result<EncodedImage, TranscodeError> {
        let (width, height) = fit_within(source.width, source.height, target);

        let rgb = if (width, height) == (source.width, source.height) {
            source.image.to_rgb8()
        } else {
            tracing::debug!(
                from = %format!("{}x{}", source.width, source.height),
                to = %format!("{}x{}", width, height),
                "resizing variant"
            );
            source
                .image
                .resize_exact(width, height, FilterType::Lanczos3)
                .to_rgb8()
        };

        let mut buffer = Vec::with_capacity((width * height / 4) as usize);
        let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buffer), self.quality);
        rgb.write_with_encoder(encoder)
            .map_err(|e| TranscodeError {
                operation: "jpeg encode",
                detail: e.to_string(),
            })?;

        Ok(EncodedImage {
            data: Bytes::from(buffer),
            width,
            height,
            content_type: "image/jpeg",
            extension: "jpg",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([120, 40, 200, 255]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn load_source_rejects_garbage() {
        assert!(load_source(b"not an image").is_err());
    }

    #[test]
    fn fit_within_never_exceeds_the_box() {
        let target = TargetBox {
            width: 800,
            height: 600,
        };
        for (w, h) in [(4000, 3000), (3000, 4000), (801, 600), (1600, 100)] {
            let (nw, nh) = fit_within(w, h, target);
            assert!(nw <= target.width && nh <= target.height, "{}x{}", w, h);
            assert!(nw >= 1 && nh >= 1);
        }
    }

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        let target = TargetBox {
            width: 800,
            height: 600,
        };
        let (nw, nh) = fit_within(4000, 3000, target);
        assert_eq!((nw, nh), (800, 600));
        let (nw, nh) = fit_within(4000, 1000, target);
        assert_eq!(nw, 800);
        assert_eq!(nh, 200);
    }

    #[test]
    fn smaller_sources_are_not_upsampled() {
        let target = TargetBox {
            width: 1600,
            height: 1200,
        };
        assert_eq!(fit_within(640, 480, target), (640, 480));

        let source = load_source(&png_bytes(640, 480)).unwrap();
        let encoded = Transcoder::new(82).encode_to_fit(&source, target).unwrap();
        assert_eq!((encoded.width, encoded.height), (640, 480));
    }

    #[test]
    fn oversized_source_is_scaled_into_the_box() {
        let source = load_source(&png_bytes(2000, 1500)).unwrap();
        let target = TargetBox {
            width: 800,
            height: 600,
        };
        let encoded = Transcoder::new(82).encode_to_fit(&source, target).unwrap();
        assert_eq!((encoded.width, encoded.height), (800, 600));
        assert_eq!(encoded.content_type, "image/jpeg");
        assert_eq!(encoded.extension, "jpg");

        // The blob really is a decodable JPEG of the reported size.
        let reparsed = load_source(&encoded.data).unwrap();
        assert_eq!((reparsed.width, reparsed.height), (800, 600));
    }
}
