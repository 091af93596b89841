use std::fs;

use cucumber_cloudbeat::{
    event::Status, report::ElementKind, screenshot::NoScreenshot,
    source::Gherkin, Event, Plugin, Settings, Transport, TransportError,
};

const EVENTS: &str = include_str!("fixtures/checkout.ndjson");

const PAYLOAD: &str = r#"{
    "runId": "run-42",
    "instanceId": "instance-7",
    "metadata": {"build": "1.2.3"},
    "environmentVariables": "LANG=en",
    "cases": [{"id": 11, "cucumberId": "features/checkout.feature/Pay by card", "order": 3}]
}"#;

/// [`Transport`] rejecting everything.
struct Unavailable;

impl Transport for Unavailable {
    fn post_json(
        &mut self,
        _: &str,
        _: &str,
        _: &str,
    ) -> Result<u16, TransportError> {
        Ok(503)
    }
}

fn events() -> Vec<Event> {
    EVENTS
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn replays_recorded_run() {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("payload.json");
    fs::write(&payload, PAYLOAD).unwrap();
    let results = dir.path().join("results.json");
    let report = dir.path().join("cucumber.json");

    let mut plugin = Plugin::custom(
        Some(
            Settings::new(&payload, "http://monitor", "token")
                .results_path(&results)
                .cucumber_json(&report),
        ),
        Unavailable,
        NoScreenshot,
        Gherkin,
    );
    plugin.run(events()).unwrap();

    // Report tree is enriched from the recorded source.
    let feature = &plugin.features()[0];
    assert_eq!(feature.name, "Checkout");
    assert_eq!(feature.tags[0].name.trim_start_matches('@'), "shop");
    let kinds: Vec<_> = feature.elements.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, [ElementKind::Background, ElementKind::Scenario]);

    let background = &feature.elements[0];
    assert_eq!(background.steps.len(), 1);
    assert!(background.before.is_empty());

    let scenario = &feature.elements[1];
    assert_eq!(scenario.id, "checkout;pay-by-card");
    assert_eq!(scenario.before.len(), 1);
    assert_eq!(scenario.steps.len(), 2);
    assert_eq!(
        scenario.steps[0].match_info.arguments[0].val.as_deref(),
        Some("10"),
    );
    assert_eq!(scenario.steps[1].status(), Some(Status::Failed));
    assert_eq!(scenario.steps[1].after.len(), 1);

    // Rejected notifications don't affect the result.
    let written: serde_json::Value =
        serde_json::from_slice(&fs::read(&results).unwrap()).unwrap();
    assert_eq!(written["runId"], "run-42");
    assert_eq!(written["metadata"]["build"], "1.2.3");
    assert_eq!(written["environmentVariables"], "LANG=en");
    assert_eq!(written["status"], "Failed");

    let case = &written["suites"][0]["cases"][0];
    assert_eq!(case["id"], 11);
    assert_eq!(case["order"], 3);
    assert_eq!(case["iterationNum"], 1);
    assert_eq!(case["steps"].as_array().unwrap().len(), 2);
    assert_eq!(case["steps"][0]["status"], "Passed");
    assert_eq!(case["steps"][0]["duration"], 3);
    assert!(case["steps"][0].get("failure").is_none());
    assert_eq!(case["steps"][1]["screenShot"], "iVBORw0KGgo=");
    assert_eq!(case["steps"][1]["failure"]["message"], "no order found");

    let report: serde_json::Value =
        serde_json::from_slice(&fs::read(&report).unwrap()).unwrap();
    assert_eq!(report[0]["uri"], "features/checkout.feature");
    assert_eq!(
        report[0]["elements"][1]["steps"][1]["embeddings"][0]["mime_type"],
        "image/png",
    );
}
