//! Render identifiers, codec selection, and business references.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier issued by the external render farm for one render job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderId(pub String);

impl RenderId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RenderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RenderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Output codec selector accepted by the render farm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    #[default]
    H264,
    H265,
    Vp8,
    Vp9,
    Prores,
}

impl Codec {
    pub fn as_str(&self) -> &'static str {
        match self {
            Codec::H264 => "h264",
            Codec::H265 => "h265",
            Codec::Vp8 => "vp8",
            Codec::Vp9 => "vp9",
            Codec::Prores => "prores",
        }
    }
}

/// Business identifiers associated with a render, carried through the
/// pending-render registry for downstream notification and record updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRefs {
    /// Campaign record identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,

    /// Clip record identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_id: Option<String>,
}

impl BusinessRefs {
    pub fn is_empty(&self) -> bool {
        self.campaign_id.is_none() && self.clip_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_wire_names() {
        assert_eq!(serde_json::to_string(&Codec::H264).unwrap(), "\"h264\"");
        assert_eq!(serde_json::to_string(&Codec::Prores).unwrap(), "\"prores\"");
        let codec: Codec = serde_json::from_str("\"vp9\"").unwrap();
        assert_eq!(codec, Codec::Vp9);
    }

    #[test]
    fn test_render_id_transparent() {
        let id = RenderId::from("r-abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"r-abc123\"");
    }

    #[test]
    fn test_business_refs_camel_case() {
        let refs = BusinessRefs {
            campaign_id: Some("camp1".to_string()),
            clip_id: Some("clip1".to_string()),
        };
        let json = serde_json::to_value(&refs).unwrap();
        assert_eq!(json["campaignId"], "camp1");
        assert_eq!(json["clipId"], "clip1");
    }
}
