use serde::{Deserialize, Serialize};

/// An image attached to a request, already base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Raw base64 body, no `data:` URL prefix.
    pub data: String,
}

/// All the inputs for one generation request. Only `description` is
/// required; the other fields are optional-by-emptiness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyRequest {
    pub description: String,
    pub content_type: String,
    pub location: String,
    pub trigger: String,
    pub outcome: String,
    pub tone: String,
    pub char_limit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAttachment>,
}

/// A single generated copy suggestion.
///
/// `character_count` is whatever the model reported; it is displayed
/// as-is and never recomputed from `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyOption {
    pub text: String,
    pub tone: String,
    pub character_count: u32,
}

/// The full structured reply from the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyResponse {
    pub options: Vec<CopyOption>,
}
