//! SOAP fault extraction.
//!
//! A [`SoapFault`] carries the fields of a server fault response: the
//! qualified fault code, the fault string, the request ID assigned by the
//! server (if it got that far) and the document itself for logging.

use crate::config::{FaultConfig, UnresolvedPrefix};
use crate::document::FaultDocument;
use crate::error::FaultError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Prefix of the namespace CyberSource qualifies reply elements with.
pub const TRANSACTION_DATA_NS_PREFIX: &str = "urn:schemas-cybersource-com:transaction-data-";

/// Namespace for `requestID` lookups for a given API version, e.g. `"1.129"`.
pub fn transaction_data_namespace(version: &str) -> String {
    format!("{}{}", TRANSACTION_DATA_NS_PREFIX, version)
}

/// An XML name qualified by a namespace URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Local part of the name
    pub local_name: String,
    /// Namespace URI, empty when unqualified
    pub namespace: String,
}

impl QualifiedName {
    pub fn new(local_name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            namespace: namespace.into(),
        }
    }

    /// Create a name with no namespace.
    pub fn unqualified(local_name: impl Into<String>) -> Self {
        Self::new(local_name, String::new())
    }

    pub fn is_qualified(&self) -> bool {
        !self.namespace.is_empty()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.local_name)
        } else {
            write!(f, "{}:{}", self.namespace, self.local_name)
        }
    }
}

/// A fault reported by the server.
///
/// Displays as the fault string. Fields are read once when the fault is
/// extracted and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SoapFault {
    code: QualifiedName,
    message: String,
    request_id: Option<String>,
    document: FaultDocument,
}

impl SoapFault {
    /// Extract a fault with the default configuration.
    pub fn from_document(document: &FaultDocument, namespace: &str) -> Result<Self, FaultError> {
        FaultExtractor::default().extract(document, namespace)
    }

    /// The fault code.
    pub fn code(&self) -> &QualifiedName {
        &self.code
    }

    /// The fault string.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The request ID generated by the server. `None` if the fault happened
    /// before one was assigned.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// The fault document returned by the server.
    pub fn document(&self) -> &FaultDocument {
        &self.document
    }

    /// The full fault document, suitable for logging.
    pub fn log_string(&self) -> &str {
        self.document.as_str()
    }
}

/// Extracts [`SoapFault`]s from fault documents.
#[derive(Debug, Clone, Default)]
pub struct FaultExtractor {
    config: FaultConfig,
}

impl FaultExtractor {
    /// Create a new extractor with configuration.
    pub fn new(config: FaultConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FaultConfig {
        &self.config
    }

    /// Parse `xml` with the configured limits and extract the fault.
    pub fn extract_str(&self, xml: &str, namespace: &str) -> Result<SoapFault, FaultError> {
        let document = FaultDocument::parse_with(xml, &self.config.document)?;
        self.extract(&document, namespace)
    }

    /// Extract the fault fields from `document`.
    ///
    /// `namespace` qualifies the `requestID` element; `faultcode` and
    /// `faultstring` are always looked up without a namespace.
    pub fn extract(&self, document: &FaultDocument, namespace: &str) -> Result<SoapFault, FaultError> {
        let message = document.text_value("faultstring", "")?.unwrap_or_default();
        let request_id = document.text_value("requestID", namespace)?;
        let code = self.extract_code(document)?;

        debug!(
            code = %code,
            request_id = request_id.as_deref().unwrap_or("-"),
            "Extracted SOAP fault"
        );

        Ok(SoapFault {
            code,
            message,
            request_id,
            document: document.clone(),
        })
    }

    /// Read `faultcode`, resolving its prefix at the faultcode's own scope.
    fn extract_code(&self, document: &FaultDocument) -> Result<QualifiedName, FaultError> {
        let parsed = document.find_text("faultcode", "", |node| {
            let fault_code = node.value();
            match fault_code.split_once(':') {
                Some((prefix, local_name)) => {
                    let namespace = node.namespace_of_prefix(prefix);
                    (
                        fault_code.to_string(),
                        Some((prefix.to_string(), local_name.to_string(), namespace)),
                    )
                }
                None => (fault_code.to_string(), None),
            }
        })?;

        let (fault_code, prefixed) = parsed.ok_or(FaultError::MissingFaultCode)?;

        match prefixed {
            None => Ok(QualifiedName::unqualified(fault_code)),
            Some((_, local_name, Some(namespace))) => Ok(QualifiedName::new(local_name, namespace)),
            Some((prefix, local_name, None)) => match self.config.fault_code.unresolved_prefix {
                UnresolvedPrefix::Reject => Err(FaultError::MalformedFaultCode {
                    code: fault_code,
                    prefix,
                }),
                UnresolvedPrefix::Keep => {
                    debug!(prefix = %prefix, "Fault code prefix not declared, keeping local name");
                    Ok(QualifiedName::unqualified(local_name))
                }
            },
        }
    }
}
