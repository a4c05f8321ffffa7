//! Structured SOAP fault extraction for CyberSource XML clients.
//!
//! When the server answers a request with a SOAP fault instead of a reply,
//! the transport layer parses the response into a [`FaultDocument`] and hands
//! it to a [`FaultExtractor`], which pulls out the fault code, fault string
//! and request ID into an immutable [`SoapFault`].
//!
//! # Example
//!
//! ```
//! use soap_fault::{FaultDocument, QualifiedName, SoapFault};
//!
//! let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
//!   <soap:Body>
//!     <soap:Fault>
//!       <faultcode>soap:Client</faultcode>
//!       <faultstring>Invalid amount</faultstring>
//!     </soap:Fault>
//!   </soap:Body>
//! </soap:Envelope>"#;
//!
//! let document = FaultDocument::parse(xml)?;
//! let fault = SoapFault::from_document(&document, "urn:schemas-cybersource-com:transaction-data-1.129")?;
//!
//! assert_eq!(fault.message(), "Invalid amount");
//! assert_eq!(
//!     fault.code(),
//!     &QualifiedName::new("Client", "http://schemas.xmlsoap.org/soap/envelope/")
//! );
//! assert_eq!(fault.request_id(), None);
//! # Ok::<(), soap_fault::FaultError>(())
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod fault;

pub use config::FaultConfig;
pub use document::FaultDocument;
pub use error::FaultError;
pub use fault::{transaction_data_namespace, FaultExtractor, QualifiedName, SoapFault};
