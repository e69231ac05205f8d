use darkbay_exporter::core::collectors::{DeviceCollector, HeliosCollector};
use darkbay_exporter::core::config::{DeviceEndpoint, ExporterConfig, Protocol};
use darkbay_exporter::core::metrics::{encode_text, find_family};
use darkbay_exporter::ExporterError;
use httpmock::prelude::*;
use serde_json::{json, Value};

const DATA_PATH: &str = "/api/v1/data/";

fn status(serials: &[&str]) -> Value {
    let ldms: serde_json::Map<String, Value> = serials
        .iter()
        .enumerate()
        .map(|(i, s)| (format!("{}", i), json!({ "info": { "serial": s, "rev": "B" } })))
        .collect();

    json!({
        "dev": {
            "receivers": {
                "00:1e:c0:00:00:0a": { "temps": { "fpga": 58.0, "ambient": 31.5 }, "ldms": ldms },
                "00:1e:c0:00:00:0b": { "temps": { "fpga": 57.0, "ambient": 30.0 }, "ldms": {} },
                "00:1e:c0:00:00:0c": { "temps": { "fpga": 59.5 }, "ldms": {} }
            },
            "ingest": {
                "temps": { "cpu": 47.0 },
                "volts": { "12v": 12.02 },
                "counters": { "reboots": 12 },
                "testPattern": { "type": "grid", "enabled": false }
            }
        },
        "sys": { "info": { "version": { "app": "24.1.0" } } }
    })
}

fn collector_for(server: &MockServer) -> HeliosCollector {
    let config = ExporterConfig::new(DeviceEndpoint::new(
        server.address().to_string(),
        Protocol::Http,
    ));
    HeliosCollector::new(&config).unwrap()
}

#[test]
fn test_scrape_maps_every_receiver() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(DATA_PATH);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(status(&["L1", "L2"]));
    });

    let collector = collector_for(&server);
    let host = server.address().to_string();
    let families = collector.fetch_and_translate().unwrap();
    mock.assert();

    let ruby = find_family(&families, "ruby_temp").unwrap();
    assert_eq!(ruby.samples.len(), 5);
    for sample in &ruby.samples {
        assert_eq!(sample.labels[0], host);
    }
    assert_eq!(
        ruby.value_for(&[host.as_str(), "00:1e:c0:00:00:0b", "ambient"]),
        Some(30.0)
    );
    assert_eq!(
        ruby.value_for(&[host.as_str(), "00:1e:c0:00:00:0c", "ambient"]),
        None
    );

    let pattern = find_family(&families, "helios_test_pattern").unwrap();
    assert_eq!(pattern.value_for(&[host.as_str(), "grid"]), Some(0.0));

    let text = encode_text(&families).unwrap();
    assert!(text.contains("# TYPE helios_reboots_total counter"));
    assert!(text.contains(&format!("helios_reboots_total{{processor=\"{}\"}} 12", host)));
    assert!(text.contains("# TYPE helios_ldm_swaps_total counter"));
    assert!(text.contains(&format!("helios_ldm_swaps_total{{processor=\"{}\"}} 0", host)));
    assert!(text.contains("# TYPE ruby_temp gauge"));
    assert!(text.contains("version=\"24.1.0\""));
    assert!(text.contains(&format!(
        "helios_exporter_version{{version=\"{}\"}} 1",
        env!("CARGO_PKG_VERSION")
    )));
}

#[test]
fn test_ldm_swap_detected_between_scrapes() {
    let server = MockServer::start();
    let collector = collector_for(&server);
    let host = server.address().to_string();

    let mut mock = server.mock(|when, then| {
        when.method(GET).path(DATA_PATH);
        then.status(200).json_body(status(&["L1", "L2"]));
    });
    collector.fetch_and_translate().unwrap();
    mock.delete();

    mock = server.mock(|when, then| {
        when.method(GET).path(DATA_PATH);
        then.status(200).json_body(status(&["L1", "L3"]));
    });
    let families = collector.fetch_and_translate().unwrap();
    mock.assert();

    let swaps = find_family(&families, "helios_ldm_swaps_total").unwrap();
    assert_eq!(swaps.value_for(&[host.as_str()]), Some(1.0));
}

#[test]
fn test_failed_scrape_does_not_block_the_next_one() {
    let server = MockServer::start();
    let collector = collector_for(&server);

    let mut mock = server.mock(|when, then| {
        when.method(GET).path(DATA_PATH);
        then.status(500).body("internal error");
    });
    assert!(matches!(
        collector.fetch_and_translate(),
        Err(ExporterError::Status { .. })
    ));
    mock.delete();

    mock = server.mock(|when, then| {
        when.method(GET).path(DATA_PATH);
        then.status(200).body("{\"dev\": ");
    });
    assert!(matches!(
        collector.fetch_and_translate(),
        Err(ExporterError::Json(_))
    ));
    mock.delete();

    mock = server.mock(|when, then| {
        when.method(GET).path(DATA_PATH);
        then.status(200).json_body(status(&["L1"]));
    });
    let families = collector.fetch_and_translate().unwrap();
    mock.assert_hits(1);
    assert_eq!(families.len(), 8);
}
