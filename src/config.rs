//! Configuration types for fault extraction.

use serde::{Deserialize, Serialize};

/// Main configuration for fault extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultConfig {
    /// Config version
    pub version: String,

    /// Namespace the `requestID` element is qualified with
    pub request_id_namespace: String,

    /// Document loading limits
    pub document: DocumentConfig,

    /// Fault code handling
    pub fault_code: FaultCodeConfig,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            request_id_namespace: String::new(),
            document: DocumentConfig::default(),
            fault_code: FaultCodeConfig::default(),
        }
    }
}

/// Document loading limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Maximum document size to load (bytes)
    pub max_document_size: usize,

    /// Accept DOCTYPE declarations. Entities they declare are not expanded.
    pub allow_doctype: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            max_document_size: 1_048_576, // 1MB
            allow_doctype: false,
        }
    }
}

/// Fault code handling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultCodeConfig {
    /// What to do when the faultcode prefix has no namespace in scope
    pub unresolved_prefix: UnresolvedPrefix,
}

/// Policy for a faultcode prefix with no namespace binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPrefix {
    /// Fail with `MalformedFaultCode`
    #[default]
    Reject,
    /// Keep the local name with an empty namespace
    Keep,
}
