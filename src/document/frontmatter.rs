//! Header wire format.
//!
//! The frontmatter block is the YAML between two delimiter lines of exactly
//! three hyphens. This struct is deliberately lenient: every field is
//! optional so that decoding only fails on YAML that is genuinely broken,
//! leaving schema judgments to the structural validation layer.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Decoded header block as written, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frontmatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Kept as a raw string; unknown statuses are a validation concern,
    /// not a decode failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ThinkingSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<GrantSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coordinates_with: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalates_to: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub verification_required: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub self_verification: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, Value>,
}

/// Wire form of the reasoning-depth hint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThinkingSpec {
    #[serde(rename = "default")]
    pub default_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when_to_use_deeper: Option<String>,
}

/// Wire form of the tool grant lists. The `external` list also accepts
/// the historical `mcp` key on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrantSpec {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub primary: Vec<String>,
    #[serde(alias = "mcp", skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub restricted: Vec<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_historical_mcp_key_as_external() {
        let fm: Frontmatter = serde_yaml::from_str(
            "name: sample\ntools:\n  primary: [Read]\n  mcp: [mcp__github]\n",
        )
        .unwrap();
        let tools = fm.tools.unwrap();
        assert_eq!(tools.external, vec!["mcp__github".to_string()]);
    }

    #[test]
    fn serializes_without_null_noise() {
        let fm = Frontmatter {
            name: Some("sample".to_string()),
            description: Some("a sample".to_string()),
            version: Some("3.0.0".to_string()),
            ..Frontmatter::default()
        };
        let yaml = serde_yaml::to_string(&fm).unwrap();
        assert!(!yaml.contains("null"));
        assert!(!yaml.contains("verification_required"));
    }
}
