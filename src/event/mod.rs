// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Key occurrences in a lifecycle of a test run, as emitted by an external
//! execution engine.
//!
//! The top-level enum here is [`Event`]. Events are expected to arrive
//! strictly ordered and one at a time, so every consumer here is a plain
//! synchronous state machine.

pub mod case_events;
pub mod hook_events;
pub mod step_events;

use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

pub use case_events::TestCase;
pub use hook_events::{HookStep, HookType};
pub use step_events::{
    Argument, PickleStep, Status, StepArgument, StepResult, TestStep,
};

/// Top-level lifecycle event of a test run.
///
/// Serialized form is internally tagged by `"event"`, so a recorded run is
/// a sequence of lines like `{"event":"run_finished"}`.
#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Source text of a `.feature` file has been read.
    TestSourceRead {
        /// URI of the source.
        uri: String,

        /// Raw source text.
        source: String,
    },

    /// [`TestCase`] execution has been started.
    CaseStarted(TestCase),

    /// [`TestStep`] execution has been started.
    StepStarted(TestStep),

    /// Binary artifact has been attached to the currently running
    /// [`TestStep`].
    Embed {
        /// Raw artifact bytes, [`base64`] encoded when serialized.
        ///
        /// [`base64`]: https://docs.rs/base64
        #[serde_as(as = "Base64")]
        data: Vec<u8>,

        /// MIME type of the artifact.
        mime_type: String,
    },

    /// [`TestStep`] execution has been finished.
    StepFinished {
        /// Finished [`TestStep`].
        step: TestStep,

        /// [`StepResult`] of the execution.
        result: StepResult,
    },

    /// [`TestCase`] execution has been finished.
    CaseFinished(TestCase),

    /// The whole run has been finished.
    RunFinished,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_lines() {
        let ev: Event = serde_json::from_str(
            r#"{"event":"case_started","uri":"a.feature","line":3,
                "name":"Login","scenario_designation":"a.feature:3 # Login"}"#,
        )
        .unwrap();
        assert!(matches!(ev, Event::CaseStarted(c) if c.line == 3));

        let ev: Event =
            serde_json::from_str(r#"{"event":"run_finished"}"#).unwrap();
        assert_eq!(ev, Event::RunFinished);
    }

    #[test]
    fn embed_data_is_base64() {
        let ev: Event = serde_json::from_str(
            r#"{"event":"embed","data":"aGk=","mime_type":"text/plain"}"#,
        )
        .unwrap();

        assert_eq!(
            ev,
            Event::Embed { data: b"hi".to_vec(), mime_type: "text/plain".into() },
        );
    }

    #[test]
    fn deserializes_hook_step() {
        let ev: Event = serde_json::from_str(
            r#"{"event":"step_started","kind":"hook","hook_type":"after_step"}"#,
        )
        .unwrap();

        assert_eq!(
            ev,
            Event::StepStarted(TestStep::Hook(HookStep {
                hook_type: HookType::AfterStep,
                code_location: None,
            })),
        );
    }
}
