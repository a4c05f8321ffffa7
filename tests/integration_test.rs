//! Integration tests for the soap-fault crate.
//!
//! These tests exercise the public API surface end-to-end, combining
//! document loading, configuration and fault extraction together.

use soap_fault::config::{DocumentConfig, FaultCodeConfig, FaultConfig, UnresolvedPrefix};
use soap_fault::{
    transaction_data_namespace, FaultDocument, FaultError, FaultExtractor, QualifiedName,
    SoapFault,
};

const CYBS_NS: &str = "urn:cybersource";

// ============================================================================
// Helper: a typical fault response with all three recognized elements
// ============================================================================

fn amount_fault(code: &str, request_id: Option<&str>) -> String {
    let request_id = request_id
        .map(|id| format!("\n        <c:requestID>{}</c:requestID>", id))
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:ns1="urn:example">
  <soap:Body>
    <soap:Fault>
      <faultcode>{}</faultcode>
      <faultstring>Invalid amount</faultstring>
      <detail xmlns:c="urn:cybersource">{}
      </detail>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#,
        code, request_id
    )
}

fn extract(xml: &str) -> Result<SoapFault, FaultError> {
    let document = FaultDocument::parse(xml)?;
    SoapFault::from_document(&document, CYBS_NS)
}

// ============================================================================
// Field extraction
// ============================================================================

#[test]
fn test_e2e_prefixed_fault_code() {
    let fault = extract(&amount_fault("ns1:E_AMOUNT", Some("12345"))).unwrap();

    assert_eq!(fault.message(), "Invalid amount");
    assert_eq!(fault.code(), &QualifiedName::new("E_AMOUNT", "urn:example"));
    assert_eq!(fault.request_id(), Some("12345"));
}

#[test]
fn test_e2e_unprefixed_fault_code() {
    let fault = extract(&amount_fault("E_GENERIC", Some("12345"))).unwrap();

    assert_eq!(fault.code().local_name, "E_GENERIC");
    assert_eq!(fault.code().namespace, "");
}

#[test]
fn test_e2e_missing_request_id_is_none() {
    let fault = extract(&amount_fault("ns1:E_AMOUNT", None)).unwrap();
    assert_eq!(fault.request_id(), None);
}

#[test]
fn test_e2e_empty_request_id_is_none() {
    let xml = r#"<Fault xmlns:c="urn:cybersource"><faultcode>X</faultcode><c:requestID></c:requestID></Fault>"#;
    let fault = extract(xml).unwrap();
    assert_eq!(fault.request_id(), None);
}

#[test]
fn test_e2e_request_id_kept_verbatim() {
    let fault = extract(&amount_fault("E_GENERIC", Some(" AbC-0042 "))).unwrap();
    assert_eq!(fault.request_id(), Some(" AbC-0042 "));
}

#[test]
fn test_e2e_missing_fault_string_is_empty() {
    let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Server</faultcode>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

    let fault = extract(xml).unwrap();
    assert_eq!(fault.message(), "");
    assert_eq!(fault.to_string(), "");
}

#[test]
fn test_e2e_missing_fault_code() {
    let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultstring>Something went wrong</faultstring>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

    let err = extract(xml).unwrap_err();
    assert_eq!(err, FaultError::MissingFaultCode);
    assert_eq!(err.code(), "MISSING_FAULT_CODE");
    assert!(!err.is_document_error());
}

#[test]
fn test_e2e_fault_code_with_element_child_is_missing() {
    let xml = "<Fault><faultcode><value>E_X</value></faultcode></Fault>";
    assert_eq!(extract(xml).unwrap_err(), FaultError::MissingFaultCode);
}

#[test]
fn test_e2e_qualified_fault_code_element_is_not_matched() {
    let xml = r#"<s:Fault xmlns:s="urn:s"><s:faultcode>E_X</s:faultcode></s:Fault>"#;
    assert_eq!(extract(xml).unwrap_err(), FaultError::MissingFaultCode);
}

#[test]
fn test_e2e_first_fault_string_wins() {
    let xml = r#"<Fault>
  <faultcode>E_X</faultcode>
  <faultstring>first</faultstring>
  <faultstring>second</faultstring>
</Fault>"#;
    assert_eq!(extract(xml).unwrap().message(), "first");
}

// ============================================================================
// Prefix resolution
// ============================================================================

#[test]
fn test_e2e_prefix_resolved_at_fault_code_scope() {
    let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:e="urn:outer">
  <soap:Body>
    <soap:Fault xmlns:e="urn:inner">
      <faultcode>e:E_AMOUNT</faultcode>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

    let fault = extract(xml).unwrap();
    assert_eq!(fault.code(), &QualifiedName::new("E_AMOUNT", "urn:inner"));
}

#[test]
fn test_e2e_prefix_declared_on_fault_code_itself() {
    let xml = r#"<Fault><faultcode xmlns:e="urn:local">e:E_AMOUNT</faultcode></Fault>"#;
    let fault = extract(xml).unwrap();
    assert_eq!(fault.code(), &QualifiedName::new("E_AMOUNT", "urn:local"));
}

#[test]
fn test_e2e_prefix_declared_after_fault_code_is_not_in_scope() {
    let xml = r#"<Fault><faultcode>e:E_AMOUNT</faultcode><detail xmlns:e="urn:late"/></Fault>"#;
    let err = extract(xml).unwrap_err();
    assert_eq!(
        err,
        FaultError::MalformedFaultCode {
            code: "e:E_AMOUNT".to_string(),
            prefix: "e".to_string(),
        }
    );
    assert_eq!(err.code(), "MALFORMED_FAULT_CODE");
}

#[test]
fn test_e2e_lenient_unresolved_prefix() {
    let config = FaultConfig {
        fault_code: FaultCodeConfig {
            unresolved_prefix: UnresolvedPrefix::Keep,
        },
        ..Default::default()
    };
    let extractor = FaultExtractor::new(config);

    let fault = extractor
        .extract_str(&amount_fault("ns9:E_AMOUNT", Some("777")), CYBS_NS)
        .unwrap();
    assert_eq!(fault.code(), &QualifiedName::unqualified("E_AMOUNT"));
    assert_eq!(fault.request_id(), Some("777"));
}

// ============================================================================
// Logging and isolation
// ============================================================================

#[test]
fn test_e2e_log_string_round_trip() {
    let xml = amount_fault("ns1:E_AMOUNT", Some("12345"));
    let fault = extract(&xml).unwrap();

    assert_eq!(fault.log_string().as_bytes(), xml.as_bytes());
}

#[test]
fn test_e2e_log_string_keeps_formatting_and_entities() {
    let xml = "<Fault>\r\n\t<faultcode>E_X</faultcode>\r\n\t<faultstring>a &lt; b</faultstring>\r\n</Fault>";
    let fault = extract(xml).unwrap();

    assert_eq!(fault.message(), "a < b");
    assert_eq!(fault.log_string(), xml);
}

#[test]
fn test_e2e_no_cross_contamination() {
    let first = extract(&amount_fault("ns1:E_AMOUNT", Some("111"))).unwrap();
    let second = extract(
        r#"<Fault xmlns:c="urn:cybersource"><faultcode>E_OTHER</faultcode><faultstring>Card declined</faultstring><c:requestID>222</c:requestID></Fault>"#,
    )
    .unwrap();

    assert_eq!(first.code(), &QualifiedName::new("E_AMOUNT", "urn:example"));
    assert_eq!(first.message(), "Invalid amount");
    assert_eq!(first.request_id(), Some("111"));

    assert_eq!(second.code(), &QualifiedName::unqualified("E_OTHER"));
    assert_eq!(second.message(), "Card declined");
    assert_eq!(second.request_id(), Some("222"));
    assert_ne!(first.log_string(), second.log_string());
}

#[test]
fn test_e2e_fault_outlives_document() {
    let fault = {
        let document = FaultDocument::parse(amount_fault("E_GENERIC", Some("9"))).unwrap();
        SoapFault::from_document(&document, CYBS_NS).unwrap()
    };
    assert_eq!(fault.request_id(), Some("9"));
    assert!(fault.document().is_soap_fault().unwrap());
}

#[test]
fn test_e2e_fault_as_error_value() {
    fn charge() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let fault = extract(&amount_fault("E_GENERIC", None))?;
        Err(Box::new(fault))
    }

    let err = charge().unwrap_err();
    assert_eq!(err.to_string(), "Invalid amount");
    let fault = err.downcast_ref::<SoapFault>().unwrap();
    assert_eq!(fault.code().local_name, "E_GENERIC");
}

// ============================================================================
// Document loading
// ============================================================================

#[test]
fn test_e2e_malformed_document_rejected() {
    let err = FaultDocument::parse("<Fault><faultcode>E_X</Fault>").unwrap_err();
    assert!(err.is_document_error());
    assert_eq!(err.code(), "INVALID_XML");
}

#[test]
fn test_e2e_doctype_rejected() {
    let xml = r#"<?xml version="1.0"?>
<!DOCTYPE Fault SYSTEM "fault.dtd">
<Fault><faultcode>E_X</faultcode></Fault>"#;

    assert_eq!(FaultDocument::parse(xml).unwrap_err(), FaultError::DoctypeNotAllowed);
}

#[test]
fn test_e2e_extractor_applies_document_limits() {
    let config = FaultConfig {
        document: DocumentConfig {
            max_document_size: 64,
            allow_doctype: false,
        },
        ..Default::default()
    };
    let extractor = FaultExtractor::new(config);
    let xml = amount_fault("E_GENERIC", None);

    let err = extractor.extract_str(&xml, CYBS_NS).unwrap_err();
    assert_eq!(
        err,
        FaultError::DocumentTooLarge {
            size: xml.len(),
            limit: 64,
        }
    );
}

#[test]
fn test_e2e_transaction_namespace_lookup() {
    let namespace = transaction_data_namespace("1.129");
    let xml = format!(
        r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Client</faultcode>
      <faultstring>Missing merchantID</faultstring>
      <detail>
        <requestID xmlns="{}">6523478619126</requestID>
      </detail>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#,
        namespace
    );

    let fault = FaultExtractor::default().extract_str(&xml, &namespace).unwrap();
    assert_eq!(fault.request_id(), Some("6523478619126"));
    assert_eq!(fault.code().to_string(), "http://schemas.xmlsoap.org/soap/envelope/:Client");
}

#[test]
fn test_e2e_config_from_yaml() {
    let yaml = r#"
request_id_namespace: "urn:cybersource"
fault_code:
  unresolved_prefix: keep
"#;
    let config: FaultConfig = serde_yaml::from_str(yaml).unwrap();
    let namespace = config.request_id_namespace.clone();
    let extractor = FaultExtractor::new(config);

    let fault = extractor
        .extract_str(&amount_fault("zz:E_X", Some("31")), &namespace)
        .unwrap();
    assert_eq!(fault.code(), &QualifiedName::unqualified("E_X"));
    assert_eq!(fault.request_id(), Some("31"));
    assert_eq!(extractor.config().document.max_document_size, 1_048_576);
}
