// pixform/src/convert.rs
//! Wire contract of the remote image-to-PDF conversion service. The service
//! itself stays external; this module only builds its request payload and
//! interprets its reply.

use crate::core::{PixformError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConvertOptions {
    #[serde(rename = "pageSize")]
    pub page_size: PageSize,
    pub orientation: Orientation,
}

/// POST body for `/convert`: page images in order, as base64 data URLs.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertRequest {
    pub images: Vec<String>,
    pub options: ConvertOptions,
}

impl ConvertRequest {
    pub fn new(images: Vec<String>, options: ConvertOptions) -> Self {
        Self { images, options }
    }
}

/// Reply from `/convert`: a download handle on success, a bare message on
/// failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConvertResponse {
    Success {
        success: bool,
        pdf_url: String,
        filename: String,
    },
    Failure {
        error: String,
    },
}

impl ConvertResponse {
    /// Folds the error arm into the crate error type.
    pub fn into_result(self) -> Result<(String, String)> {
        match self {
            ConvertResponse::Success {
                pdf_url, filename, ..
            } => Ok((pdf_url, filename)),
            ConvertResponse::Failure { error } => Err(PixformError::Network(error)),
        }
    }
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
