//! Raw evidence handed to the pipeline by the external collaborators: the
//! document structure extractor and the layout detection models.

use std::path::Path;

use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::analysis::bbox::Bbox;
use crate::error::{FusionError, JsonSnafu, ReadInputSnafu};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInput {
    #[serde(default)]
    pub pages: Vec<PageInput>,
}

impl DocumentInput {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FusionError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).context(ReadInputSnafu {
            path: path.display().to_string(),
        })?;
        serde_json::from_str(&raw).context(JsonSnafu { stage: "input" })
    }
}

/// Evidence for one page, in pixel coordinates of a `width × height` page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInput {
    pub index: usize,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub native: Vec<NativeElement>,
    /// Set when the structure extractor failed on this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_error: Option<String>,
    #[serde(default)]
    pub detections: Vec<DetectionSet>,
}

impl PageInput {
    pub fn new(index: usize, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            native: Vec::new(),
            native_error: None,
            detections: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeKind {
    Text,
    Image,
}

/// A text run or embedded image from the document's own structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeElement {
    #[serde(rename = "type")]
    pub kind: NativeKind,
    pub bbox: Bbox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
}

impl NativeElement {
    pub fn text(bbox: Bbox, text: impl Into<String>, font_size: Option<f32>) -> Self {
        Self {
            kind: NativeKind::Text,
            bbox,
            text: Some(text.into()),
            font_size,
        }
    }

    pub fn image(bbox: Bbox) -> Self {
        Self {
            kind: NativeKind::Image,
            bbox,
            text: None,
            font_size: None,
        }
    }
}

/// Output of one detection model on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSet {
    pub model: String,
    #[serde(default)]
    pub detections: Vec<RawDetection>,
    /// Set when the model failed on this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub label: String,
    pub bbox: Bbox,
    pub score: f32,
}

impl RawDetection {
    pub fn new(label: impl Into<String>, bbox: Bbox, score: f32) -> Self {
        Self {
            label: label.into(),
            bbox,
            score,
        }
    }
}
