// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Line-keyed view over a parsed [`gherkin::Feature`].

use std::collections::HashMap;

/// Position of a node inside a [`gherkin::Feature`], as indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Path {
    Background {
        rule: Option<usize>,
    },
    Scenario {
        rule: Option<usize>,
        scenario: usize,
    },
    ExamplesRow {
        rule: Option<usize>,
        scenario: usize,
        examples: usize,
    },
    Step {
        rule: Option<usize>,
        scenario: Option<usize>,
        step: usize,
    },
}

/// Parsed [`gherkin::Feature`] along with its line index.
#[derive(Debug)]
pub(crate) struct Indexed {
    feature: gherkin::Feature,
    lines: HashMap<usize, Path>,
}

impl Indexed {
    /// Indexes every background, scenario, examples data row and step of the
    /// given [`gherkin::Feature`] by its line.
    pub(crate) fn new(feature: gherkin::Feature) -> Self {
        let mut lines = HashMap::new();

        index_container(
            &mut lines,
            None,
            feature.background.as_ref(),
            &feature.scenarios,
        );
        for (n, rule) in feature.rules.iter().enumerate() {
            index_container(
                &mut lines,
                Some(n),
                rule.background.as_ref(),
                &rule.scenarios,
            );
        }

        Self { feature, lines }
    }

    /// Returns the underlying [`gherkin::Feature`].
    pub(crate) const fn feature(&self) -> &gherkin::Feature {
        &self.feature
    }

    /// Returns an [`AstNode`] at the given `line`, if any.
    pub(crate) fn node_at(&self, line: usize) -> Option<AstNode<'_>> {
        let path = *self.lines.get(&line)?;
        let feature = &self.feature;

        let (rule, kind) = match path {
            Path::Background { rule } => {
                let rule = rule_at(feature, rule)?;
                let bg = background_in(feature, rule)?;
                (rule, NodeKind::Background(bg))
            }
            Path::Scenario { rule, scenario } => {
                let rule = rule_at(feature, rule)?;
                let sc = scenarios_in(feature, rule).get(scenario)?;
                (rule, NodeKind::Scenario(sc))
            }
            Path::ExamplesRow { rule, scenario, examples } => {
                let rule = rule_at(feature, rule)?;
                let sc = scenarios_in(feature, rule).get(scenario)?;
                let ex = sc.examples.get(examples)?;
                (rule, NodeKind::ExamplesRow { scenario: sc, examples: ex })
            }
            Path::Step { rule, scenario: Some(scenario), step } => {
                let rule = rule_at(feature, rule)?;
                let sc = scenarios_in(feature, rule).get(scenario)?;
                let st = sc.steps.get(step)?;
                (rule, NodeKind::Step { step: st, scenario: Some(sc) })
            }
            Path::Step { rule, scenario: None, step } => {
                let rule = rule_at(feature, rule)?;
                let bg = background_in(feature, rule)?;
                let st = bg.steps.get(step)?;
                (rule, NodeKind::Step { step: st, scenario: None })
            }
        };

        Some(AstNode { feature, rule, kind })
    }
}

/// Resolves an optional [`gherkin::Rule`] index.
///
/// Outer [`None`] means an invalid index, inner [`None`] means no rule.
fn rule_at(
    feature: &gherkin::Feature,
    rule: Option<usize>,
) -> Option<Option<&gherkin::Rule>> {
    match rule {
        Some(n) => feature.rules.get(n).map(Some),
        None => Some(None),
    }
}

fn scenarios_in<'a>(
    feature: &'a gherkin::Feature,
    rule: Option<&'a gherkin::Rule>,
) -> &'a [gherkin::Scenario] {
    rule.map_or(&feature.scenarios, |r| &r.scenarios)
}

/// Returns the [`gherkin::Background`] declared directly in the given
/// [`gherkin::Rule`], or in the [`gherkin::Feature`] if there is no rule.
fn background_in<'a>(
    feature: &'a gherkin::Feature,
    rule: Option<&'a gherkin::Rule>,
) -> Option<&'a gherkin::Background> {
    rule.map_or(feature.background.as_ref(), |r| r.background.as_ref())
}

/// Indexes a [`gherkin::Feature`] or a [`gherkin::Rule`] body.
fn index_container(
    lines: &mut HashMap<usize, Path>,
    rule: Option<usize>,
    background: Option<&gherkin::Background>,
    scenarios: &[gherkin::Scenario],
) {
    if let Some(bg) = background {
        _ = lines.insert(bg.position.line, Path::Background { rule });
        for (step, st) in bg.steps.iter().enumerate() {
            _ = lines.insert(
                st.position.line,
                Path::Step { rule, scenario: None, step },
            );
        }
    }

    for (scenario, sc) in scenarios.iter().enumerate() {
        _ = lines.insert(sc.position.line, Path::Scenario { rule, scenario });
        for (step, st) in sc.steps.iter().enumerate() {
            _ = lines.insert(
                st.position.line,
                Path::Step { rule, scenario: Some(scenario), step },
            );
        }
        for (examples, ex) in sc.examples.iter().enumerate() {
            let rows = ex.table.as_ref().map_or(0, |t| t.rows.len());
            // Data rows follow the `Examples:` keyword line and the header row.
            for row in 0..rows.saturating_sub(1) {
                _ = lines.insert(
                    ex.position.line + row + 2,
                    Path::ExamplesRow { rule, scenario, examples },
                );
            }
        }
    }
}

/// Kind of an [`AstNode`].
#[derive(Clone, Copy, Debug)]
pub enum NodeKind<'a> {
    /// [`gherkin::Background`] declaration line.
    Background(&'a gherkin::Background),

    /// [`gherkin::Scenario`] declaration line.
    Scenario(&'a gherkin::Scenario),

    /// Data row of a [Scenario Outline][1] examples table.
    ///
    /// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
    ExamplesRow {
        /// Outline the row belongs to.
        scenario: &'a gherkin::Scenario,

        /// Examples table the row belongs to.
        examples: &'a gherkin::Examples,
    },

    /// [`gherkin::Step`] line.
    Step {
        /// The step itself.
        step: &'a gherkin::Step,

        /// [`gherkin::Scenario`] declaring the step, or [`None`] for
        /// a [`gherkin::Background`] step.
        scenario: Option<&'a gherkin::Scenario>,
    },
}

/// Node of a [`gherkin::Feature`] found at some line.
#[derive(Clone, Copy, Debug)]
pub struct AstNode<'a> {
    /// [`gherkin::Feature`] containing the node.
    pub feature: &'a gherkin::Feature,

    /// [`gherkin::Rule`] containing the node, if any.
    pub rule: Option<&'a gherkin::Rule>,

    /// [`NodeKind`] of the node.
    pub kind: NodeKind<'a>,
}

impl<'a> AstNode<'a> {
    /// Returns the [`gherkin::Scenario`] definition this node belongs to.
    #[must_use]
    pub const fn scenario_definition(&self) -> Option<&'a gherkin::Scenario> {
        match self.kind {
            NodeKind::Scenario(sc)
            | NodeKind::ExamplesRow { scenario: sc, .. } => Some(sc),
            NodeKind::Step { scenario, .. } => scenario,
            NodeKind::Background(_) => None,
        }
    }

    /// Returns the [`gherkin::Background`] applying to this node.
    ///
    /// Background of the enclosing [`gherkin::Rule`] takes precedence over
    /// the [`gherkin::Feature`] one.
    #[must_use]
    pub fn background(&self) -> Option<&'a gherkin::Background> {
        if let NodeKind::Background(bg) = self.kind {
            return Some(bg);
        }
        self.rule
            .and_then(|r| r.background.as_ref())
            .or(self.feature.background.as_ref())
    }

    /// Indicates whether this node is a step of a [`gherkin::Background`].
    #[must_use]
    pub const fn is_background_step(&self) -> bool {
        matches!(self.kind, NodeKind::Step { scenario: None, .. })
    }

    /// Returns the [`gherkin::Step`] of this node, if it's a step.
    #[must_use]
    pub const fn step(&self) -> Option<&'a gherkin::Step> {
        match self.kind {
            NodeKind::Step { step, .. } => Some(step),
            NodeKind::Background(_)
            | NodeKind::Scenario(_)
            | NodeKind::ExamplesRow { .. } => None,
        }
    }
}
