//! Image bytes handling: JPEG normalisation, MIME sniffing and base64 transport.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::codecs::jpeg::JpegEncoder;
use thiserror::Error as ThisError;

/// Quality used for every stored image.
pub const JPEG_QUALITY: u8 = 85;

#[derive(Debug, ThisError)]
pub enum MediaError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode JPEG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Decodes any supported format and re-encodes it as RGB JPEG at [`JPEG_QUALITY`].
pub fn to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, MediaError> {
    let decoded = image::load_from_memory(bytes).map_err(MediaError::Decode)?;
    let rgb = decoded.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(MediaError::Encode)?;
    Ok(out)
}

/// Best-effort MIME type from magic bytes; JPEG when unknown.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes).map_or("image/jpeg", |format| format.to_mime_type())
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_base64(data: &str) -> Result<Vec<u8>, MediaError> {
    Ok(STANDARD.decode(data.trim())?)
}

/// `data:<mime>;base64,<payload>`, as accepted by Replicate inputs.
pub fn data_uri(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", sniff_mime(bytes), encode_base64(bytes))
}

/// Serde adapter storing `Vec<u8>` as a standard base64 string.
pub mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::encode_base64(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::decode_base64(&raw).map_err(D::Error::custom)
    }
}
