use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::{NavError, NavResult};

/// Image formats the vision model is asked to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Webp => "image/webp",
        }
    }

    /// Map an upload's filename extension, case-insensitively.
    pub fn from_filename(filename: &str) -> NavResult<Self> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".png") {
            Ok(ImageFormat::Png)
        } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            Ok(ImageFormat::Jpeg)
        } else if lower.ends_with(".webp") {
            Ok(ImageFormat::Webp)
        } else {
            Err(NavError::invalid(
                "Unsupported image format. Use PNG, JPG, or WEBP.",
            ))
        }
    }

    pub fn from_mime(mime_type: &str) -> NavResult<Self> {
        match mime_type {
            "image/png" => Ok(ImageFormat::Png),
            "image/jpeg" => Ok(ImageFormat::Jpeg),
            "image/webp" => Ok(ImageFormat::Webp),
            _ => Err(NavError::invalid(
                "Unsupported image MIME type. Use image/png, image/jpeg, or image/webp.",
            )),
        }
    }

    /// Guess from magic bytes; `None` when the header is not recognized.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }
}

/// Image bytes handed to the model for a single request.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl Screenshot {
    pub fn new(bytes: Vec<u8>, format: ImageFormat) -> NavResult<Self> {
        if bytes.is_empty() {
            return Err(NavError::invalid("Uploaded screenshot is empty."));
        }
        Ok(Self { bytes, format })
    }

    /// Build from an uploaded file; the format comes from the filename.
    pub fn from_upload(filename: &str, bytes: Vec<u8>) -> NavResult<Self> {
        let format = ImageFormat::from_filename(filename)?;
        Self::new(bytes, format)
    }

    /// Decode a base64 payload, accepting an optional `data:...,` prefix.
    /// Without an explicit MIME type the format is sniffed, defaulting to PNG.
    pub fn from_base64(payload: &str, mime_type: Option<&str>) -> NavResult<Self> {
        let explicit = mime_type.map(ImageFormat::from_mime).transpose()?;

        let mut data = payload.trim();
        if data.starts_with("data:") {
            if let Some((_, rest)) = data.split_once(',') {
                data = rest;
            }
        }

        // MIME-wrapped payloads carry line breaks the decoder won't skip.
        let compact: Vec<u8> = data
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();

        let bytes = BASE64
            .decode(&compact)
            .map_err(|e| NavError::invalid(format!("image_base64 is not valid base64: {e}")))?;

        let format = explicit
            .or_else(|| ImageFormat::sniff(&bytes))
            .unwrap_or(ImageFormat::Png);
        Self::new(bytes, format)
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}
