//! Image encoding for the vision request.
//!
//! Rendered PDF pages are PNG-encoded (lossless keeps small print legible);
//! uploaded images are passed through with their own MIME type. Both are
//! base64-wrapped into `ImageData` with `detail: "high"` so the model gets
//! the full tile budget.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page as a base64 PNG.
pub fn encode_page(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(encode_bytes(&buf, "image/png"))
}

/// Wrap already-encoded image bytes.
pub fn encode_bytes(bytes: &[u8], mime_type: &str) -> ImageData {
    let b64 = STANDARD.encode(bytes);
    debug!("Encoded {} → {} bytes base64", mime_type, b64.len());
    ImageData::new(b64, mime_type).with_detail("high")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_page() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let data = encode_page(&img).expect("encode should succeed");
        assert_eq!(data.mime_type, "image/png");
        let decoded = STANDARD.decode(&data.data).expect("valid base64");
        assert_eq!(&decoded[1..4], b"PNG");
    }

    #[test]
    fn passthrough_keeps_mime() {
        let data = encode_bytes(&[0xff, 0xd8, 0xff, 0xe0], "image/jpeg");
        assert_eq!(data.mime_type, "image/jpeg");
        assert_eq!(data.data, "/9j/4A==");
    }
}
