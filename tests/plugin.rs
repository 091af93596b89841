use std::{cell::RefCell, fs, path::Path, rc::Rc};

use cucumber_cloudbeat::{
    event::{
        HookStep, HookType, PickleStep, Status, StepResult, TestCase, TestStep,
    },
    report::ElementKind,
    result::{ResultStatus, FAILURE_TYPE, FALLBACK_MESSAGE},
    screenshot::NoScreenshot,
    source::Gherkin,
    Event, Plugin, Settings, Transport, TransportError, TreeError,
};
use tempfile::TempDir;

/// [`Transport`] recording every posted body.
#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<(String, serde_json::Value)>>>);

impl Recorder {
    fn bodies(&self) -> Vec<serde_json::Value> {
        self.0.borrow().iter().map(|(_, b)| b.clone()).collect()
    }
}

impl Transport for Recorder {
    fn post_json(
        &mut self,
        url: &str,
        body: &str,
        _: &str,
    ) -> Result<u16, TransportError> {
        let body = serde_json::from_str(body).unwrap();
        self.0.borrow_mut().push((url.into(), body));
        Ok(200)
    }
}

struct Run {
    dir: TempDir,
    recorder: Recorder,
    plugin: Plugin<Recorder, NoScreenshot, Gherkin>,
}

impl Run {
    fn new(payload: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let payload_path = dir.path().join("payload.json");
        fs::write(&payload_path, payload).unwrap();

        let settings = Settings::new(payload_path, "http://monitor/api", "token")
            .results_path(dir.path().join("results.json"))
            .cucumber_json(dir.path().join("cucumber.json"));
        let recorder = Recorder::default();
        let plugin = Plugin::custom(
            Some(settings),
            recorder.clone(),
            NoScreenshot,
            Gherkin,
        );
        Self { dir, recorder, plugin }
    }

    fn feed(&mut self, events: impl IntoIterator<Item = Event>) {
        self.plugin.run(events).unwrap();
    }

    fn written(&self, name: &str) -> serde_json::Value {
        read_json(&self.dir.path().join(name))
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

fn payload(cases: &[(i64, &str, i64)]) -> String {
    let cases: Vec<_> = cases
        .iter()
        .map(|(id, key, order)| {
            serde_json::json!({"id": id, "cucumberId": key, "order": order})
        })
        .collect();
    serde_json::json!({
        "runId": "run-1",
        "instanceId": "instance-1",
        "capabilities": {"browserName": "web.chrome"},
        "cases": cases,
    })
    .to_string()
}

fn case(uri: &str, line: usize, name: &str) -> TestCase {
    TestCase {
        uri: uri.into(),
        line,
        name: name.into(),
        scenario_designation: format!(".../{name}"),
        tags: vec![],
    }
}

fn pickle(line: usize, text: &str) -> TestStep {
    TestStep::Pickle(PickleStep {
        text: text.into(),
        line,
        ..PickleStep::default()
    })
}

fn step(line: usize, text: &str, result: StepResult) -> [Event; 2] {
    [
        Event::StepStarted(pickle(line, text)),
        Event::StepFinished { step: pickle(line, text), result },
    ]
}

fn passed() -> StepResult {
    StepResult::new(Status::Passed)
}

#[test]
fn login_end_to_end() {
    let mut run =
        Run::new(&payload(&[(1, "proj/feat.feature/Scenario: Login", 1)]));
    assert!(run.plugin.is_active());
    assert_eq!(run.plugin.browser_name(), Some("chrome"));

    let login = case("feat.feature", 3, "Scenario: Login");
    run.feed([Event::CaseStarted(login.clone())]);
    for n in 0..3 {
        run.feed(step(4 + n, &format!("step {n}"), passed()));
    }
    run.feed([Event::CaseFinished(login), Event::RunFinished]);

    let bodies = run.recorder.bodies();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["case"]["id"], 1);
    assert_eq!(bodies[0]["case"]["iterationsPassed"], 1);
    assert_eq!(bodies[0]["case"]["iterationsFailed"], 0);
    assert_eq!(bodies[0]["status"], 2);
    assert_eq!(run.recorder.0.borrow()[0].0, "http://monitor/api/status");

    let results = run.written("results.json");
    let cases = results["suites"][0]["cases"].as_array().unwrap();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0]["id"], 1);
    assert_eq!(cases[0]["status"], "Passed");
    let steps = cases[0]["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 3);
    assert!(steps.iter().all(|s| s["status"] == "Passed"));
    assert_eq!(results["status"], "Passed");
    assert_eq!(results["runId"], "run-1");

    assert_eq!(
        run.plugin.result().unwrap().suites[0].cases[0].status,
        ResultStatus::Passed,
    );
}

#[test]
fn progress_follows_registry_hits() {
    let mut run =
        Run::new(&payload(&[(1, "A", 1), (2, "B", 2), (3, "C", 3), (4, "D", 4)]));

    for name in ["A", "unknown", "B", "C", "D"] {
        let c = case("x.feature", 1, name);
        run.feed([Event::CaseStarted(c.clone()), Event::CaseFinished(c)]);
    }

    let bodies = run.recorder.bodies();
    assert_eq!(bodies.len(), 4);
    for (k, body) in bodies.iter().enumerate() {
        let k = k + 1;
        assert_eq!(body["case"]["order"], k);
        assert_eq!(body["progress"].as_f64().unwrap(), k as f64 / 4.0);
    }
}

#[test]
fn background_steps_stay_in_background() {
    const FEATURE: &str = "\
Feature: Basket
  Background:
    Given an empty basket

  Scenario: Add
    When I add an apple

  Scenario: Remove
    When I remove an apple
";

    let mut run = Run::new(&payload(&[(1, "Add", 1), (2, "Remove", 2)]));
    run.feed([Event::TestSourceRead {
        uri: "basket.feature".into(),
        source: FEATURE.into(),
    }]);
    for (line, name, text) in
        [(5, "Add", "I add an apple"), (8, "Remove", "I remove an apple")]
    {
        let c = case("basket.feature", line, name);
        run.feed([Event::CaseStarted(c.clone())]);
        run.feed(step(3, "an empty basket", passed()));
        run.feed(step(line + 1, text, passed()));
        run.feed([Event::CaseFinished(c)]);
    }
    run.feed([Event::RunFinished]);

    let elements = &run.plugin.features()[0].elements;
    assert_eq!(elements.len(), 4);
    for pair in elements.chunks(2) {
        assert_eq!(pair[0].kind, ElementKind::Background);
        assert_eq!(pair[1].kind, ElementKind::Scenario);
        assert_eq!(pair[0].steps.len(), 1);
        assert_eq!(pair[0].steps[0].name, "an empty basket");
        assert_eq!(pair[1].steps.len(), 1);
        assert_ne!(pair[1].steps[0].name, "an empty basket");
    }

    let results = run.written("results.json");
    let cases = results["suites"][0]["cases"].as_array().unwrap();
    assert_eq!(cases.len(), 2);
    assert!(cases.iter().all(|c| c["steps"].as_array().unwrap().len() == 1));

    let report = run.written("cucumber.json");
    assert_eq!(report[0]["name"], "Basket");
    assert_eq!(report[0]["elements"][0]["type"], "background");
    assert_eq!(report[0]["elements"][1]["name"], "Add");
}

#[test]
fn failed_step_without_message_gets_fallback() {
    let mut run = Run::new(&payload(&[(5, "Broken", 1)]));

    let c = case("x.feature", 1, "Broken");
    run.feed([Event::CaseStarted(c.clone())]);
    run.feed(step(2, "it breaks", StepResult::new(Status::Failed)));
    run.feed([Event::CaseFinished(c), Event::RunFinished]);

    assert_eq!(run.recorder.bodies()[0]["case"]["iterationsFailed"], 1);

    let results = run.written("results.json");
    let case = &results["suites"][0]["cases"][0];
    assert_eq!(case["status"], "Failed");
    assert_eq!(case["steps"][0]["failure"]["type"], FAILURE_TYPE);
    assert_eq!(case["steps"][0]["failure"]["message"], FALLBACK_MESSAGE);
    assert_eq!(results["status"], "Failed");
}

#[test]
fn after_step_without_step_faults_plugin() {
    let mut run = Run::new(&payload(&[(1, "A", 1)]));

    let c = case("x.feature", 1, "A");
    run.feed([Event::CaseStarted(c.clone())]);

    let err = run
        .plugin
        .run([
            Event::StepStarted(TestStep::Hook(HookStep {
                hook_type: HookType::AfterStep,
                code_location: None,
            })),
            Event::CaseFinished(c),
        ])
        .unwrap_err();
    assert_eq!(err, TreeError::AfterStepWithoutStep { location: None });
    assert!(!run.plugin.is_active());

    run.feed([Event::RunFinished]);
    assert!(run.recorder.bodies().is_empty());
    assert!(run.plugin.result().is_none());
    assert!(!run.dir.path().join("results.json").exists());
}

#[test]
fn plugin_without_settings_is_inert() {
    let mut plugin = Plugin::new(None);
    assert!(!plugin.is_active());

    let c = case("x.feature", 1, "A");
    plugin
        .run([
            Event::CaseStarted(c.clone()),
            Event::StepStarted(TestStep::Hook(HookStep {
                hook_type: HookType::AfterStep,
                code_location: None,
            })),
            Event::CaseFinished(c),
            Event::RunFinished,
        ])
        .unwrap();
    assert!(plugin.features().is_empty());
    assert!(plugin.result().is_none());
}

#[test]
fn unloadable_payload_makes_plugin_inert() {
    let dir = tempfile::tempdir().unwrap();
    let results = dir.path().join("results.json");
    let settings =
        Settings::new(dir.path().join("missing.json"), "http://m", "t")
            .results_path(&results);

    let mut plugin =
        Plugin::custom(Some(settings), Recorder::default(), NoScreenshot, Gherkin);
    assert!(!plugin.is_active());

    plugin.run([Event::RunFinished]).unwrap();
    assert!(!results.exists());
}

#[test]
fn unwritable_results_are_logged_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let payload_path = dir.path().join("payload.json");
    fs::write(&payload_path, payload(&[(1, "A", 1)])).unwrap();
    let results = dir.path().join("missing").join("results.json");
    let report = dir.path().join("missing").join("cucumber.json");

    let settings = Settings::new(payload_path, "http://m", "t")
        .results_path(&results)
        .cucumber_json(&report);
    let mut plugin =
        Plugin::custom(Some(settings), Recorder::default(), NoScreenshot, Gherkin);

    let c = case("x.feature", 1, "A");
    let [started, finished] = step(2, "it works", passed());
    plugin
        .run([Event::CaseStarted(c.clone()), started, finished, Event::CaseFinished(c)])
        .unwrap();
    assert_eq!(plugin.handle_event(Event::RunFinished), Ok(()));

    let result = plugin.result().unwrap();
    assert_eq!(result.status, ResultStatus::Passed);
    assert_eq!(result.suites[0].cases.len(), 1);
    assert!(!results.exists());
    assert!(!report.exists());
}
