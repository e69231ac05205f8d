use darkbay_exporter::core::collectors::{DeviceCollector, SmartPduCollector};
use darkbay_exporter::core::config::{DeviceEndpoint, ExporterConfig, Protocol};
use darkbay_exporter::core::metrics::{encode_text, find_family};
use darkbay_exporter::ExporterError;
use httpmock::prelude::*;
use serde_json::json;

const VALUES_PATH: &str = "/api/getcurrentpduvalues";

fn collector_for(server: &MockServer) -> SmartPduCollector {
    // An explicit port replaces the PDU's default API port
    let config = ExporterConfig::new(DeviceEndpoint::new(
        server.address().to_string(),
        Protocol::Http,
    ));
    SmartPduCollector::new(&config).unwrap()
}

#[test]
fn test_scrape_single_phase_pdu() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(VALUES_PATH);
        then.status(200).json_body(json!({
            "smartPDU": {
                "config": { "name": "stage-left", "model": "SP-16" },
                "mainInputValues": [
                    { "L1V": [121.4], "L1I": [8.75], "freq": [59.98] },
                    { "L1V": [0.0] }
                ]
            }
        }));
    });

    let collector = collector_for(&server);
    assert_eq!(collector.url(), server.url(VALUES_PATH));
    let families = collector.fetch_and_translate().unwrap();
    mock.assert();

    let voltage = find_family(&families, "smart_pdu_voltage").unwrap();
    assert_eq!(voltage.samples.len(), 1);
    assert_eq!(voltage.value_for(&["stage-left", "L1V"]), Some(121.4));

    let current = find_family(&families, "smart_pdu_current").unwrap();
    assert_eq!(current.value_for(&["stage-left", "L1I"]), Some(8.75));

    let frequency = find_family(&families, "smart_pdu_frequency").unwrap();
    assert_eq!(frequency.value_for(&["stage-left"]), Some(59.98));

    let text = encode_text(&families).unwrap();
    assert!(text.contains("# TYPE smart_pdu_voltage gauge"));
    assert!(text.contains("smart_pdu_frequency{name=\"stage-left\"} 59.98"));
}

#[test]
fn test_scrape_without_frequency_suppresses_it() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(VALUES_PATH);
        then.status(200).json_body(json!({
            "smartPDU": {
                "config": { "name": "pdu" },
                "mainInputValues": [{ "L1V": [230.0], "L2V": [231.0] }]
            }
        }));
    });

    let families = collector_for(&server).fetch_and_translate().unwrap();

    assert!(find_family(&families, "smart_pdu_frequency").unwrap().is_empty());
    assert!(find_family(&families, "smart_pdu_current").unwrap().is_empty());
    assert_eq!(
        find_family(&families, "smart_pdu_voltage").unwrap().samples.len(),
        2
    );

    let text = encode_text(&families).unwrap();
    assert!(!text.contains("smart_pdu_frequency"));
}

#[test]
fn test_not_found_is_a_scrape_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(VALUES_PATH);
        then.status(404);
    });

    let err = collector_for(&server).fetch_and_translate().unwrap_err();
    assert!(matches!(err, ExporterError::Status { .. }));
}
