//! Error types for SOAP fault extraction.

use thiserror::Error;

/// Errors raised while loading a fault document or extracting a fault from it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FaultError {
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    #[error("Fault document has no root element")]
    NoRootElement,

    #[error("DOCTYPE declarations are not allowed in fault documents")]
    DoctypeNotAllowed,

    #[error("Fault document is {size} bytes, limit is {limit}")]
    DocumentTooLarge { size: usize, limit: usize },

    /// The `faultcode` element is absent or has no text child.
    #[error("Fault document has no faultcode")]
    MissingFaultCode,

    /// The `faultcode` prefix is not bound to a namespace at the faultcode's scope.
    #[error("Fault code '{code}' uses undeclared prefix '{prefix}'")]
    MalformedFaultCode { code: String, prefix: String },
}

impl FaultError {
    /// Get the stable string code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::XmlParse(_) => "INVALID_XML",
            Self::NoRootElement => "NO_ROOT_ELEMENT",
            Self::DoctypeNotAllowed => "DOCTYPE_NOT_ALLOWED",
            Self::DocumentTooLarge { .. } => "DOCUMENT_TOO_LARGE",
            Self::MissingFaultCode => "MISSING_FAULT_CODE",
            Self::MalformedFaultCode { .. } => "MALFORMED_FAULT_CODE",
        }
    }

    /// Whether the error comes from loading the document rather than from
    /// reading the fault fields out of it.
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            Self::XmlParse(_)
                | Self::NoRootElement
                | Self::DoctypeNotAllowed
                | Self::DocumentTooLarge { .. }
        )
    }
}

impl From<quick_xml::Error> for FaultError {
    fn from(e: quick_xml::Error) -> Self {
        Self::XmlParse(e.to_string())
    }
}
