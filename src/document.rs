//! Fault document loading and element lookup.
//!
//! Uses quick-xml's namespace-aware reader, which doesn't expand external
//! entities. Documents are scanned once on load to reject anything that is not
//! well-formed, and lookups rescan the retained text on demand.

use crate::config::DocumentConfig;
use crate::error::FaultError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, QName, ResolveResult};
use quick_xml::NsReader;
use std::fmt;

/// SOAP namespace URIs.
pub const SOAP_11_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SOAP_12_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// Namespaces bound to the reserved `xml` and `xmlns` prefixes.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";

/// A well-formed XML document believed to hold a SOAP fault.
///
/// The source text is kept verbatim so the document can be logged exactly as
/// it was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultDocument {
    raw: String,
}

impl FaultDocument {
    /// Parse a document with default limits.
    pub fn parse(xml: impl Into<String>) -> Result<Self, FaultError> {
        Self::parse_with(xml, &DocumentConfig::default())
    }

    /// Parse a document, enforcing the given limits.
    pub fn parse_with(xml: impl Into<String>, config: &DocumentConfig) -> Result<Self, FaultError> {
        let raw = xml.into();

        if raw.len() > config.max_document_size {
            return Err(FaultError::DocumentTooLarge {
                size: raw.len(),
                limit: config.max_document_size,
            });
        }

        check_well_formed(&raw, config)?;
        Ok(Self { raw })
    }

    /// Parse raw response bytes.
    pub fn from_bytes(data: &[u8], config: &DocumentConfig) -> Result<Self, FaultError> {
        let xml = std::str::from_utf8(data)
            .map_err(|e| FaultError::XmlParse(format!("Invalid UTF-8: {}", e)))?;
        Self::parse_with(xml, config)
    }

    /// The document text exactly as it was loaded.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Size of the document in bytes.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Locate the first element named `local_name` in `namespace` (empty for
    /// no namespace) and, if its first child is a text node, hand that node to
    /// `f`.
    ///
    /// Returns `Ok(None)` when there is no such element or its first child is
    /// not text. Only the first matching element in document order is
    /// considered. Whitespace-only text does not count as a child.
    pub fn find_text<T>(
        &self,
        local_name: &str,
        namespace: &str,
        f: impl FnOnce(TextNode<'_, '_>) -> T,
    ) -> Result<Option<T>, FaultError> {
        let mut reader = NsReader::from_str(&self.raw);

        loop {
            let (resolved, event) = reader.read_resolved_event()?;
            let has_children = match event {
                Event::Start(ref e) => {
                    if e.local_name().as_ref() != local_name.as_bytes()
                        || !namespace_matches(&resolved, namespace)
                    {
                        continue;
                    }
                    true
                }
                Event::Empty(ref e) => {
                    if e.local_name().as_ref() != local_name.as_bytes()
                        || !namespace_matches(&resolved, namespace)
                    {
                        continue;
                    }
                    false
                }
                Event::Eof => return Ok(None),
                _ => continue,
            };

            if !has_children {
                return Ok(None);
            }

            return loop {
                match reader.read_event()? {
                    Event::Text(t) => {
                        let text = t.unescape()?;
                        if text.chars().all(char::is_whitespace) {
                            continue;
                        }
                        let value = text.into_owned();
                        break Ok(Some(f(TextNode {
                            value,
                            reader: &reader,
                        })));
                    }
                    Event::CData(c) => {
                        let value = std::str::from_utf8(&c.into_inner())
                            .map_err(|e| FaultError::XmlParse(format!("Invalid UTF-8: {}", e)))?
                            .to_string();
                        break Ok(Some(f(TextNode {
                            value,
                            reader: &reader,
                        })));
                    }
                    _ => break Ok(None),
                }
            };
        }
    }

    /// Text of the first element named `local_name` in `namespace`.
    pub fn text_value(&self, local_name: &str, namespace: &str) -> Result<Option<String>, FaultError> {
        self.find_text(local_name, namespace, |node| node.into_value())
    }

    /// Check whether any element named `local_name` in `namespace` exists.
    pub fn contains_element(&self, local_name: &str, namespace: &str) -> Result<bool, FaultError> {
        let mut reader = NsReader::from_str(&self.raw);

        loop {
            match reader.read_resolved_event()? {
                (ref resolved, Event::Start(ref e)) | (ref resolved, Event::Empty(ref e)) => {
                    if e.local_name().as_ref() == local_name.as_bytes()
                        && namespace_matches(resolved, namespace)
                    {
                        return Ok(true);
                    }
                }
                (_, Event::Eof) => return Ok(false),
                _ => {}
            }
        }
    }

    /// Check whether the document carries a SOAP 1.1 or 1.2 `Fault` element.
    pub fn is_soap_fault(&self) -> Result<bool, FaultError> {
        Ok(self.contains_element("Fault", SOAP_11_NS)? || self.contains_element("Fault", SOAP_12_NS)?)
    }
}

impl fmt::Display for FaultDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A text node found by [`FaultDocument::find_text`].
///
/// Borrows the reader positioned at the node so prefixes can be resolved
/// against the declarations in scope there.
pub struct TextNode<'r, 'i> {
    value: String,
    reader: &'r NsReader<&'i [u8]>,
}

impl TextNode<'_, '_> {
    /// Decoded text of the node.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn into_value(self) -> String {
        self.value
    }

    /// Namespace URI bound to `prefix` at this node, if any.
    ///
    /// An empty prefix asks for the default namespace.
    pub fn namespace_of_prefix(&self, prefix: &str) -> Option<String> {
        match prefix {
            "xml" => return Some(XML_NS.to_string()),
            "xmlns" => return Some(XMLNS_NS.to_string()),
            _ => {}
        }

        let probe = if prefix.is_empty() {
            "_".to_string()
        } else {
            format!("{}:_", prefix)
        };

        match self.reader.resolve_element(QName(probe.as_bytes())) {
            (ResolveResult::Bound(Namespace(uri)), _) => {
                std::str::from_utf8(uri).ok().map(str::to_owned)
            }
            _ => None,
        }
    }
}

impl fmt::Debug for TextNode<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextNode").field("value", &self.value).finish()
    }
}

/// Check that `namespace` is the one the element resolved to.
fn namespace_matches(resolved: &ResolveResult, namespace: &str) -> bool {
    match resolved {
        ResolveResult::Unbound => namespace.is_empty(),
        ResolveResult::Bound(Namespace(uri)) => *uri == namespace.as_bytes(),
        ResolveResult::Unknown(_) => false,
    }
}

/// Walk the whole document once, rejecting anything that is not a single
/// well-formed element tree.
///
/// Entities declared in an allowed DOCTYPE are not expanded, so references to
/// them are rejected like any other unknown entity.
fn check_well_formed(xml: &str, config: &DocumentConfig) -> Result<(), FaultError> {
    let mut reader = NsReader::from_str(xml);

    let mut depth = 0u32;
    let mut roots = 0u32;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                check_attributes(&e)?;
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Event::Empty(e) => {
                check_attributes(&e)?;
                if depth == 0 {
                    roots += 1;
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                if depth == 0 && !text.chars().all(char::is_whitespace) {
                    return Err(FaultError::XmlParse(
                        "Text content outside the root element".to_string(),
                    ));
                }
            }
            Event::DocType(_) if !config.allow_doctype => {
                return Err(FaultError::DoctypeNotAllowed);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(FaultError::XmlParse("Unclosed element at end of document".to_string()));
    }

    match roots {
        0 => Err(FaultError::NoRootElement),
        1 => Ok(()),
        _ => Err(FaultError::XmlParse("Multiple root elements".to_string())),
    }
}

/// Reject duplicate, unquoted or badly escaped attributes.
fn check_attributes(e: &BytesStart) -> Result<(), FaultError> {
    let mut attributes = e.attributes();
    attributes.with_checks(true);

    for attr in attributes {
        let attr = attr.map_err(|err| FaultError::XmlParse(format!("Invalid attribute: {}", err)))?;
        attr.unescape_value()?;
    }
    Ok(())
}
