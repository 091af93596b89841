// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`ResultDocument`] assembling out of the finished report tree.

use std::time::SystemTime;

use crate::{
    event::Status,
    registry::{Registry, RunInfo},
    report::{ElementKind, ElementNode, FeatureNode, StepNode},
    result::{
        CaseResult, Failure, ResultDocument, ResultStatus, StepModel,
        SuiteResult, FAILURE_TYPE, FALLBACK_MESSAGE,
    },
    screenshot::Screenshot,
};

/// Assembler of a [`ResultDocument`] joining the report tree with the
/// [`Registry`].
#[derive(Debug)]
pub struct Assembler<'a, S: ?Sized> {
    registry: &'a Registry,
    screenshot: &'a mut S,
}

impl<'a, S: Screenshot + ?Sized> Assembler<'a, S> {
    /// Creates a new [`Assembler`] over the given [`Registry`], capturing
    /// missing screenshots of failed steps with the given [`Screenshot`].
    #[must_use]
    pub fn new(registry: &'a Registry, screenshot: &'a mut S) -> Self {
        Self { registry, screenshot }
    }

    /// Assembles a [`ResultDocument`] of the run between `started` and
    /// `finished`.
    ///
    /// Scenarios missing in the [`Registry`] are omitted.
    pub fn assemble(
        &mut self,
        features: &[FeatureNode],
        run: &RunInfo,
        started: SystemTime,
        finished: SystemTime,
    ) -> ResultDocument {
        let cases: Vec<_> = features
            .iter()
            .flat_map(|f| &f.elements)
            .filter(|el| el.kind == ElementKind::Scenario)
            .filter_map(|el| self.case(el))
            .collect();
        let status = ResultStatus::all(cases.iter().map(|c| c.status));

        ResultDocument {
            run_id: run.run_id.clone(),
            instance_id: run.instance_id.clone(),
            capabilities: run.capabilities.clone(),
            metadata: run.metadata.clone(),
            environment_variables: run.environment_variables.clone(),
            start_time: started,
            end_time: finished,
            duration: finished
                .duration_since(started)
                .unwrap_or_default()
                .as_secs(),
            status,
            suites: vec![SuiteResult { status, cases }],
        }
    }

    fn case(&mut self, scenario: &ElementNode) -> Option<CaseResult> {
        let key = scenario.cucumber_id.as_deref().unwrap_or_default();
        let registry = self.registry;
        let Some(entry) = registry.lookup(key) else {
            tracing::error!(
                key,
                "no matching case in the payload, omitting it from results",
            );
            return None;
        };

        let steps: Vec<_> = scenario
            .steps
            .iter()
            .enumerate()
            .map(|(order, step)| self.step(order, step))
            .collect();

        Some(CaseResult {
            id: entry.internal_id,
            name: scenario.name.clone(),
            order: entry.declared_order,
            iteration_num: 1,
            status: ResultStatus::all(steps.iter().map(|s| s.status)),
            steps,
        })
    }

    fn step(&mut self, order: usize, step: &StepNode) -> StepModel {
        let result = step.result.as_ref();
        let passed = step.is_passed();

        let failure = (!passed).then(|| Failure {
            kind: FAILURE_TYPE.to_owned(),
            message: result
                .and_then(|r| r.error_message.clone())
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_owned()),
        });
        let unsuccessful = step
            .status()
            .is_some_and(|s| !matches!(s, Status::Passed | Status::Skipped));
        let screenshot = unsuccessful
            .then(|| {
                step.png_embedding()
                    .map(|e| e.data.as_str().to_owned())
                    .or_else(|| self.screenshot.capture())
            })
            .flatten();
        let duration = result
            .and_then(|r| r.duration)
            .map(|nanos| u64::try_from(nanos / 1_000_000).unwrap_or(u64::MAX));

        StepModel {
            name: step.name.clone(),
            order,
            status: if passed {
                ResultStatus::Passed
            } else {
                ResultStatus::Failed
            },
            transaction_name: step.name.clone(),
            screenshot,
            duration,
            failure,
        }
    }
}
