// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Element (Scenario/Background), step and hook nodes of the report tree.

use inflector::Inflector as _;
use serde::Serialize;

use crate::{
    event::{self, Status},
    report::types::{DocString, Embedding, MatchInfo, Row, RunResult, Tag},
    source::AstNode,
};

/// Kind of an [`ElementNode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Scenario (or a single row of a scenario outline).
    Scenario,

    /// Background steps run before a scenario.
    Background,
}

/// [`Serialize`]able scenario or background of a feature.
#[derive(Clone, Debug, Serialize)]
pub struct ElementNode {
    /// [`ElementKind`] of this [`ElementNode`].
    #[serde(rename = "type")]
    pub kind: ElementKind,

    /// Identifier of this [`ElementNode`]. Doesn't have to be unique.
    pub id: String,

    /// Keyword of the Gherkin declaration.
    pub keyword: String,

    /// Name of this [`ElementNode`].
    pub name: String,

    /// Description of the Gherkin declaration.
    pub description: String,

    /// Line number inside a `.feature` file.
    pub line: usize,

    /// External key of the scenario, used to join with the case registry.
    ///
    /// Always [`None`] for [`ElementKind::Background`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cucumber_id: Option<String>,

    /// Tags of the scenario.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,

    /// [`HookNode`]s of `Before` hooks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<HookNode>,

    /// [`HookNode`]s of `After` hooks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<HookNode>,

    /// [`StepNode`]s of this [`ElementNode`].
    pub steps: Vec<StepNode>,
}

impl ElementNode {
    /// Creates a new scenario [`ElementNode`] of the given `case`.
    ///
    /// `node` is the [`AstNode`] at the `case` line, if its source is known.
    #[must_use]
    pub fn scenario(
        case: &event::TestCase,
        external_key: &str,
        node: Option<&AstNode<'_>>,
    ) -> Self {
        let definition = node.and_then(AstNode::scenario_definition);

        Self {
            kind: ElementKind::Scenario,
            id: match (node, definition) {
                (Some(n), Some(_)) => format!(
                    "{}{};{}",
                    n.feature.name.to_kebab_case(),
                    n.rule
                        .map(|r| format!(";{}", r.name.to_kebab_case()))
                        .unwrap_or_default(),
                    case.name.to_kebab_case(),
                ),
                _ => external_key.to_owned(),
            },
            keyword: definition.map(|sc| sc.keyword.clone()).unwrap_or_default(),
            name: case.name.clone(),
            description: definition
                .and_then(|sc| sc.description.clone())
                .unwrap_or_default(),
            line: case.line,
            cucumber_id: Some(external_key.to_owned()),
            tags: case
                .tags
                .iter()
                .map(|t| Tag { name: t.clone(), line: case.line })
                .collect(),
            before: vec![],
            after: vec![],
            steps: vec![],
        }
    }

    /// Creates a new background [`ElementNode`] out of the given
    /// [`gherkin::Background`].
    #[must_use]
    pub fn background(feature: &str, bg: &gherkin::Background) -> Self {
        Self {
            kind: ElementKind::Background,
            id: format!("{};background", feature.to_kebab_case()),
            keyword: bg.keyword.clone(),
            name: String::new(),
            description: bg.description.clone().unwrap_or_default(),
            line: bg.position.line,
            cucumber_id: None,
            tags: vec![],
            before: vec![],
            after: vec![],
            steps: vec![],
        }
    }

    /// Indicates whether every [`StepNode`] of this [`ElementNode`] has
    /// [`Status::Passed`].
    ///
    /// Vacuously `true` without steps. Unfinished steps aren't passed.
    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.steps.iter().all(StepNode::is_passed)
    }
}

/// [`Serialize`]able step of an [`ElementNode`].
#[derive(Clone, Debug, Serialize)]
pub struct StepNode {
    /// Keyword of the step, if its source is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,

    /// Line number inside a `.feature` file.
    pub line: usize,

    /// Text of the step.
    pub name: String,

    /// [`DocString`] argument of the step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_string: Option<DocString>,

    /// Data table argument of the step.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Row>,

    /// [`HookNode`]s of `BeforeStep` hooks run right before this step.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<HookNode>,

    /// [`HookNode`]s of `AfterStep` hooks run right after this step.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<HookNode>,

    /// [`MatchInfo`] of the step definition.
    #[serde(rename = "match")]
    pub match_info: MatchInfo,

    /// [`RunResult`] of this step, [`None`] until finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RunResult>,

    /// [`Embedding`]s attached while running this step.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeddings: Vec<Embedding>,
}

impl StepNode {
    /// Creates a new unfinished [`StepNode`] of the given `step`.
    #[must_use]
    pub fn new(step: &event::PickleStep, source: Option<&gherkin::Step>) -> Self {
        let (doc_string, rows) = match &step.argument {
            Some(event::StepArgument::DocString {
                content,
                line,
                content_type,
            }) => (
                Some(DocString {
                    value: content.clone(),
                    line: *line,
                    content_type: content_type.clone(),
                }),
                vec![],
            ),
            Some(event::StepArgument::Table(rows)) => (
                None,
                rows.iter().map(|cells| Row { cells: cells.clone() }).collect(),
            ),
            None => (None, vec![]),
        };

        Self {
            keyword: source.map(|s| s.keyword.clone()),
            line: step.line,
            name: step.text.clone(),
            doc_string,
            rows,
            before: vec![],
            after: vec![],
            match_info: MatchInfo::default(),
            result: None,
            embeddings: vec![],
        }
    }

    /// Indicates whether this [`StepNode`] has finished with
    /// [`Status::Passed`].
    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.status() == Some(Status::Passed)
    }

    /// Returns [`Status`] of this [`StepNode`], if finished.
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        self.result.as_ref().map(|r| r.status)
    }

    /// Returns the first PNG [`Embedding`] of this [`StepNode`] itself, or of
    /// its `AfterStep` hooks.
    #[must_use]
    pub fn png_embedding(&self) -> Option<&Embedding> {
        self.embeddings
            .iter()
            .chain(self.after.iter().flat_map(|h| &h.embeddings))
            .find(|e| e.is_png())
    }
}

/// [`Serialize`]able result of running a hook.
#[derive(Clone, Debug, Default, Serialize)]
pub struct HookNode {
    /// [`MatchInfo`] of the hook definition.
    #[serde(rename = "match", skip_serializing_if = "MatchInfo::is_empty")]
    pub match_info: MatchInfo,

    /// [`RunResult`] of the hook, [`None`] until finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RunResult>,

    /// [`Embedding`]s attached while running the hook.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeddings: Vec<Embedding>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        event::{PickleStep, StepArgument, TestCase},
        source::Sources,
    };

    fn case() -> TestCase {
        TestCase {
            uri: "shop.feature".into(),
            line: 4,
            name: "Buy apples".into(),
            scenario_designation: "shop.feature:4 # Buy apples".into(),
            tags: vec!["@smoke".into()],
        }
    }

    fn finished(status: Status) -> StepNode {
        let mut step = StepNode::new(&PickleStep::default(), None);
        step.result =
            Some(RunResult { status, error_message: None, duration: None });
        step
    }

    #[test]
    fn scenario_without_source() {
        let el = ElementNode::scenario(&case(), "Buy apples", None);

        assert_eq!(el.kind, ElementKind::Scenario);
        assert_eq!(el.id, "Buy apples");
        assert_eq!(el.cucumber_id.as_deref(), Some("Buy apples"));
        assert_eq!(el.keyword, "");
        assert_eq!(el.tags, vec![Tag { name: "@smoke".into(), line: 4 }]);
    }

    #[test]
    fn scenario_enriched_from_source() {
        let mut sources = Sources::new();
        sources.record_source(
            "shop.feature",
            "Feature: Online Shop\n\n\n  Scenario: Buy apples\n    Given x\n",
        );
        let node = sources.ast_node_at("shop.feature", 4);

        let el = ElementNode::scenario(&case(), "key", node.as_ref());
        assert_eq!(el.id, "online-shop;buy-apples");
        assert!(!el.keyword.is_empty());
        assert_eq!(el.cucumber_id.as_deref(), Some("key"));
    }

    #[test]
    fn background_has_no_cucumber_id() {
        let mut sources = Sources::new();
        sources.record_source(
            "shop.feature",
            "Feature: Shop\n  Background:\n    Given x\n\n  Scenario: A\n    Given y\n",
        );
        let bg = sources.background_of("shop.feature", 5).unwrap();

        let el = ElementNode::background("Shop", bg);
        assert_eq!(el.kind, ElementKind::Background);
        assert_eq!(el.line, 2);
        assert!(el.cucumber_id.is_none());
    }

    #[test]
    fn passed_is_vacuous_and_strict() {
        let mut el = ElementNode::scenario(&case(), "k", None);
        assert!(el.is_passed());

        el.steps.push(finished(Status::Passed));
        assert!(el.is_passed());

        el.steps.push(StepNode::new(&PickleStep::default(), None));
        assert!(!el.is_passed());

        _ = el.steps.pop();
        el.steps.push(finished(Status::Skipped));
        assert!(!el.is_passed());
    }

    #[test]
    fn step_arguments() {
        let step = StepNode::new(
            &PickleStep {
                text: "a table".into(),
                line: 7,
                argument: Some(StepArgument::Table(vec![
                    vec!["a".into()],
                    vec!["1".into()],
                ])),
                ..PickleStep::default()
            },
            None,
        );
        assert_eq!(step.rows.len(), 2);
        assert!(step.doc_string.is_none());

        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["rows"][1]["cells"][0], "1");
        assert!(json.get("result").is_none());
    }

    #[test]
    fn png_embedding_prefers_step_then_after_hooks() {
        let mut step = finished(Status::Failed);
        assert!(step.png_embedding().is_none());

        step.after.push(HookNode {
            embeddings: vec![Embedding::new("hook", "image/png")],
            ..HookNode::default()
        });
        assert_eq!(
            step.png_embedding().unwrap().data,
            crate::report::Base64::encode("hook"),
        );

        step.embeddings.push(Embedding::new("log", "text/plain"));
        step.embeddings.push(Embedding::new("own", "image/png"));
        assert_eq!(
            step.png_embedding().unwrap().data,
            crate::report::Base64::encode("own"),
        );
    }
}
