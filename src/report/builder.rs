// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Event-driven builder of the report tree.

use std::mem;

use crate::{
    error::TreeError,
    event::{self, Event, HookType, TestStep},
    registry::external_key,
    report::{
        element::{ElementNode, HookNode, StepNode},
        feature::FeatureNode,
        types::{Embedding, MatchInfo, RunResult},
    },
    source::{Gherkin, Parser, Sources},
};

/// Result of feeding a single [`Event`] into a [`Builder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to act upon.
    Continue,

    /// A test case has been finished.
    CaseCompleted(CompletedCase),

    /// The run has been finished and the tree is frozen now.
    RunFinished,
}

/// Summary of a finished test case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletedCase {
    /// External key of the case.
    pub external_key: String,

    /// Name of the case.
    pub name: String,

    /// Whether every step of the current element passed.
    pub passed: bool,
}

/// Position of an [`ElementNode`] in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ElementRef {
    feature: usize,
    element: usize,
}

/// Position of the node which [`Event::Embed`] and [`Event::StepFinished`]
/// apply to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NodeRef {
    Step { at: ElementRef, step: usize },
    BeforeHook { at: ElementRef, hook: usize },
    AfterHook { at: ElementRef, hook: usize },
    AfterStepHook { at: ElementRef, step: usize, hook: usize },
    PendingBeforeStep(usize),
}

/// Where in the tree the [`Builder`] is right now.
#[derive(Debug, Default)]
struct Cursor {
    /// URI of the current [`FeatureNode`].
    uri: Option<String>,

    /// Current scenario [`ElementNode`].
    scenario: Option<ElementRef>,

    /// [`ElementNode`] steps are appended to: either the current scenario or
    /// its background.
    element: Option<ElementRef>,

    /// Most recently started step or hook.
    node: Option<NodeRef>,

    /// `BeforeStep` hooks waiting for the step they run before.
    before_step: Vec<HookNode>,
}

/// Mutable access to a step or a hook node.
enum NodeMut<'a> {
    Step(&'a mut StepNode),
    Hook(&'a mut HookNode),
}

impl NodeMut<'_> {
    fn embed(self, embedding: Embedding) {
        match self {
            Self::Step(s) => s.embeddings.push(embedding),
            Self::Hook(h) => h.embeddings.push(embedding),
        }
    }

    fn finish(self, match_info: MatchInfo, result: RunResult) {
        let (m, r) = match self {
            Self::Step(s) => (&mut s.match_info, &mut s.result),
            Self::Hook(h) => (&mut h.match_info, &mut h.result),
        };
        if r.is_some() {
            tracing::warn!("step result reported twice, overwriting");
        }
        *m = match_info;
        *r = Some(result);
    }
}

/// State machine reconstructing the nested report tree out of the flat
/// [`Event`] stream.
///
/// States go `Idle → InFeature → InElement → InStep`, and finally `Frozen`
/// once [`Event::RunFinished`] is seen. Events after that are ignored.
#[derive(Debug, Default)]
pub struct Builder<P = Gherkin> {
    /// [`Sources`] to enrich nodes from.
    sources: Sources<P>,

    /// Built [`FeatureNode`]s in order of their first appearance.
    features: Vec<FeatureNode>,

    /// Current position in the tree.
    cursor: Cursor,

    /// Whether the run has been finished.
    frozen: bool,
}

impl Builder {
    /// Creates a new [`Builder`] parsing sources with the default [`Gherkin`]
    /// [`Parser`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_parser(Gherkin)
    }
}

impl<P: Parser> Builder<P> {
    /// Creates a new [`Builder`] parsing sources with the given [`Parser`].
    #[must_use]
    pub fn with_parser(parser: P) -> Self {
        Self {
            sources: Sources::with_parser(parser),
            features: vec![],
            cursor: Cursor::default(),
            frozen: false,
        }
    }

    /// Returns the built [`FeatureNode`]s.
    #[must_use]
    pub fn features(&self) -> &[FeatureNode] {
        &self.features
    }

    /// Returns the [`Sources`] lookup of this [`Builder`].
    #[must_use]
    pub const fn sources(&self) -> &Sources<P> {
        &self.sources
    }

    /// Indicates whether [`Event::RunFinished`] has been handled already.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Feeds the given [`Event`] into this [`Builder`].
    ///
    /// # Errors
    ///
    /// If the [`Event`] order is violated in a way the tree can't be built
    /// from. See [`TreeError`] for details.
    pub fn handle(&mut self, event: Event) -> Result<Outcome, TreeError> {
        if self.frozen {
            tracing::warn!("event received after the run has finished, ignoring");
            return Ok(Outcome::Continue);
        }

        match event {
            Event::TestSourceRead { uri, source } => {
                self.sources.record_source(uri, source);
            }
            Event::CaseStarted(case) => self.case_started(&case),
            Event::StepStarted(TestStep::Pickle(step)) => {
                self.step_started(&step);
            }
            Event::StepStarted(TestStep::Hook(hook)) => {
                self.hook_started(&hook)?;
            }
            Event::Embed { data, mime_type } => {
                self.embed(Embedding::new(data, &mime_type));
            }
            Event::StepFinished { step, result } => {
                self.step_finished(&step, &result);
            }
            Event::CaseFinished(case) => {
                return Ok(self.case_finished(&case));
            }
            Event::RunFinished => {
                self.frozen = true;
                return Ok(Outcome::RunFinished);
            }
        }
        Ok(Outcome::Continue)
    }

    fn case_started(&mut self, case: &event::TestCase) {
        if self.cursor.uri.as_deref() != Some(case.uri.as_str()) {
            self.cursor.uri = Some(case.uri.clone());
            self.features
                .push(FeatureNode::new(&case.uri, self.sources.feature(&case.uri)));
        }
        if !self.cursor.before_step.is_empty() {
            tracing::warn!(
                count = self.cursor.before_step.len(),
                "`BeforeStep` hooks without a following step, discarding",
            );
            self.cursor.before_step.clear();
        }

        let feature = self.features.len() - 1;
        let key = external_key(&case.scenario_designation);
        let node = self.sources.ast_node_at(&case.uri, case.line);
        let background = node.as_ref().and_then(|n| {
            n.background()
                .map(|bg| ElementNode::background(&n.feature.name, bg))
        });
        let scenario = ElementNode::scenario(case, key, node.as_ref());

        let elements = &mut self.features[feature].elements;
        let background = background.map(|bg| {
            elements.push(bg);
            ElementRef { feature, element: elements.len() - 1 }
        });
        elements.push(scenario);
        let scenario = ElementRef { feature, element: elements.len() - 1 };

        self.cursor.scenario = Some(scenario);
        self.cursor.element = Some(background.unwrap_or(scenario));
        self.cursor.node = None;
    }

    fn step_started(&mut self, step: &event::PickleStep) {
        let (Some(scenario), Some(mut element), Some(uri)) = (
            self.cursor.scenario,
            self.cursor.element,
            self.cursor.uri.as_deref(),
        ) else {
            tracing::warn!(step = %step.text, "step started outside of a case, ignoring");
            return;
        };

        let node = self.sources.ast_node_at(uri, step.line);
        // Background steps are reported first, so the first step not
        // belonging to the background moves the cursor to the scenario.
        if element != scenario
            && node.as_ref().is_some_and(|n| !n.is_background_step())
        {
            element = scenario;
            self.cursor.element = Some(scenario);
        }

        let mut new = StepNode::new(step, node.as_ref().and_then(|n| n.step()));
        new.before = mem::take(&mut self.cursor.before_step);

        let steps = &mut self.element_mut(element).steps;
        steps.push(new);
        self.cursor.node =
            Some(NodeRef::Step { at: element, step: steps.len() - 1 });
    }

    fn hook_started(&mut self, hook: &event::HookStep) -> Result<(), TreeError> {
        let (Some(scenario), Some(element)) =
            (self.cursor.scenario, self.cursor.element)
        else {
            tracing::warn!(%hook.hook_type, "hook started outside of a case, ignoring");
            return Ok(());
        };

        let node = match hook.hook_type {
            HookType::Before => {
                let before = &mut self.element_mut(scenario).before;
                before.push(HookNode::default());
                NodeRef::BeforeHook { at: scenario, hook: before.len() - 1 }
            }
            HookType::After => {
                let after = &mut self.element_mut(scenario).after;
                after.push(HookNode::default());
                NodeRef::AfterHook { at: scenario, hook: after.len() - 1 }
            }
            HookType::BeforeStep => {
                self.cursor.before_step.push(HookNode::default());
                NodeRef::PendingBeforeStep(self.cursor.before_step.len() - 1)
            }
            HookType::AfterStep => {
                let steps = &mut self.element_mut(element).steps;
                let step = steps.len().checked_sub(1).ok_or_else(|| {
                    TreeError::AfterStepWithoutStep {
                        location: hook.code_location.clone(),
                    }
                })?;
                let after = &mut steps[step].after;
                after.push(HookNode::default());
                NodeRef::AfterStepHook { at: element, step, hook: after.len() - 1 }
            }
        };
        self.cursor.node = Some(node);
        Ok(())
    }

    fn embed(&mut self, embedding: Embedding) {
        match self.current_mut() {
            Some(node) => node.embed(embedding),
            None => tracing::warn!(
                mime_type = %embedding.mime_type,
                "embedding outside of a step or hook, dropping",
            ),
        }
    }

    fn step_finished(&mut self, step: &TestStep, result: &event::StepResult) {
        let match_info = MatchInfo::new(step, result);
        match self.current_mut() {
            Some(node) => node.finish(match_info, result.into()),
            None => tracing::warn!(
                status = %result.status,
                "step finished without being started, ignoring",
            ),
        }
    }

    fn case_finished(&mut self, case: &event::TestCase) -> Outcome {
        let passed =
            self.cursor.element.map_or(true, |at| self.element(at).is_passed());
        // `uri` is kept, so the next case of the same feature is grouped.
        self.cursor.scenario = None;
        self.cursor.element = None;
        self.cursor.node = None;

        Outcome::CaseCompleted(CompletedCase {
            external_key: external_key(&case.scenario_designation).to_owned(),
            name: case.name.clone(),
            passed,
        })
    }

    fn element(&self, at: ElementRef) -> &ElementNode {
        // PANIC: `ElementRef`s are only created right after pushing the
        //        referenced element, and nothing is ever removed.
        #[allow(clippy::indexing_slicing)]
        &self.features[at.feature].elements[at.element]
    }

    fn element_mut(&mut self, at: ElementRef) -> &mut ElementNode {
        // PANIC: `ElementRef`s are only created right after pushing the
        //        referenced element, and nothing is ever removed.
        #[allow(clippy::indexing_slicing)]
        &mut self.features[at.feature].elements[at.element]
    }

    fn current_mut(&mut self) -> Option<NodeMut<'_>> {
        let node = self.cursor.node?;
        match node {
            NodeRef::Step { at, step } => {
                self.element_mut(at).steps.get_mut(step).map(NodeMut::Step)
            }
            NodeRef::BeforeHook { at, hook } => {
                self.element_mut(at).before.get_mut(hook).map(NodeMut::Hook)
            }
            NodeRef::AfterHook { at, hook } => {
                self.element_mut(at).after.get_mut(hook).map(NodeMut::Hook)
            }
            NodeRef::AfterStepHook { at, step, hook } => self
                .element_mut(at)
                .steps
                .get_mut(step)?
                .after
                .get_mut(hook)
                .map(NodeMut::Hook),
            NodeRef::PendingBeforeStep(hook) => {
                self.cursor.before_step.get_mut(hook).map(NodeMut::Hook)
            }
        }
    }
}
