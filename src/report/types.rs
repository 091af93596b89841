// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Basic serializable types of the report tree.

use base64::Engine as _;
use derive_more::with_trait::Display;
use mime::Mime;
use serde::Serialize;
use serde_with::{serde_as, DisplayFromStr};

use crate::event::{self, Status};

/// [`base64`] encoded data.
#[derive(Clone, Debug, Display, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Base64(String);

impl Base64 {
    /// Used [`base64::engine`].
    const ENGINE: base64::engine::GeneralPurpose =
        base64::engine::general_purpose::STANDARD;

    /// Encodes `bytes` as [`base64`].
    #[must_use]
    pub fn encode(bytes: impl AsRef<[u8]>) -> Self {
        Self(Self::ENGINE.encode(bytes))
    }

    /// Returns the encoded text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Artifact attached to a [`StepNode`] or a [`HookNode`].
///
/// [`HookNode`]: super::HookNode
/// [`StepNode`]: super::StepNode
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Embedding {
    /// [`base64`] encoded data.
    pub data: Base64,

    /// [`Mime`] of this [`Embedding::data`].
    #[serde_as(as = "DisplayFromStr")]
    pub mime_type: Mime,
}

impl Embedding {
    /// Creates a new [`Embedding`] out of raw `data` and its `mime_type`.
    ///
    /// Unparsable `mime_type` falls back to
    /// [`mime::APPLICATION_OCTET_STREAM`].
    pub fn new(data: impl AsRef<[u8]>, mime_type: &str) -> Self {
        let mime_type = mime_type.parse().unwrap_or_else(|e| {
            tracing::warn!(%mime_type, "invalid embedding MIME type: {e}");
            mime::APPLICATION_OCTET_STREAM
        });
        Self { data: Base64::encode(data), mime_type }
    }

    /// Indicates whether this [`Embedding`] is a PNG image.
    #[must_use]
    pub fn is_png(&self) -> bool {
        self.mime_type == mime::IMAGE_PNG
    }
}

/// [`Serialize`]able tag of a feature or a scenario.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Tag {
    /// Name of this [`Tag`].
    pub name: String,

    /// Line number of this [`Tag`] in a `.feature` file.
    ///
    /// As [`gherkin`] parser omits this info, line number is taken from the
    /// tagged node.
    pub line: usize,
}

/// [`Serialize`]able result of running a step or a hook.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunResult {
    /// [`Status`] of this running result.
    pub status: Status,

    /// Error message, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Execution time in nanoseconds, if reported and nonzero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u128>,
}

impl From<&event::StepResult> for RunResult {
    fn from(result: &event::StepResult) -> Self {
        Self {
            status: result.status,
            error_message: result.error_message.clone(),
            duration: result
                .duration
                .map(|d| d.as_nanos())
                .filter(|nanos| *nanos != 0),
        }
    }
}

/// Argument captured by a step definition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MatchArgument {
    /// Captured value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,

    /// Offset of the captured value in the step text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

/// Step definition matching info of a step or a hook.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MatchInfo {
    /// [`MatchArgument`]s captured by the step definition.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<MatchArgument>,

    /// Code location of the matched definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl MatchInfo {
    /// Creates a [`MatchInfo`] of the finished `step` with the given `result`.
    ///
    /// Code location is omitted for [`Status::Undefined`] steps, as there is
    /// nothing matched.
    #[must_use]
    pub fn new(step: &event::TestStep, result: &event::StepResult) -> Self {
        let arguments = match step {
            event::TestStep::Pickle(st) => st
                .definition_arguments
                .iter()
                .map(|arg| match &arg.value {
                    Some(val) => MatchArgument {
                        val: Some(val.clone()),
                        offset: Some(arg.offset),
                    },
                    None => MatchArgument::default(),
                })
                .collect(),
            event::TestStep::Hook(_) => vec![],
        };
        let location = (result.status != Status::Undefined)
            .then(|| step.code_location().map(str::to_owned))
            .flatten();

        Self { arguments, location }
    }

    /// Indicates whether this [`MatchInfo`] carries nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty() && self.location.is_none()
    }
}

/// [Doc string][1] of a step.
///
/// [1]: https://cucumber.io/docs/gherkin/reference#doc-strings
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocString {
    /// Content of the doc string.
    pub value: String,

    /// Line where the doc string starts.
    pub line: usize,

    /// Content type of the doc string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Row of a step [data table][1].
///
/// [1]: https://cucumber.io/docs/gherkin/reference#data-tables
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Cells of this [`Row`].
    pub cells: Vec<String>,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::event::{Argument, HookStep, HookType, PickleStep, StepResult};

    #[test]
    fn base64_display() {
        let encoded = Base64::encode("test");
        assert_eq!(encoded.to_string(), "dGVzdA==");
    }

    #[test]
    fn embedding_falls_back_on_invalid_mime() {
        let emb = Embedding::new(b"raw", "not a mime");

        assert_eq!(emb.mime_type, mime::APPLICATION_OCTET_STREAM);
        assert!(!emb.is_png());
        assert!(Embedding::new(b"\x89PNG", "image/png").is_png());
    }

    #[test]
    fn embedding_serializes_mime_as_string() {
        let json = serde_json::to_value(Embedding::new("hi", "text/plain"))
            .unwrap();

        assert_eq!(json["mime_type"], "text/plain");
        assert_eq!(json["data"], "aGk=");
    }

    #[test]
    fn run_result_drops_zero_duration() {
        let res = RunResult::from(
            &StepResult::new(Status::Passed).with_duration(Duration::ZERO),
        );
        assert_eq!(res.duration, None);

        let res = RunResult::from(
            &StepResult::new(Status::Failed)
                .with_error("boom")
                .with_duration(Duration::from_millis(3)),
        );
        assert_eq!(res.duration, Some(3_000_000));
        assert_eq!(res.error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn match_info_of_pickle_step() {
        let step = event::TestStep::Pickle(PickleStep {
            text: "I have 3 apples".into(),
            line: 4,
            definition_arguments: vec![
                Argument { value: Some("3".into()), offset: 7 },
                Argument { value: None, offset: 0 },
            ],
            code_location: Some("steps.rs:12".into()),
            ..PickleStep::default()
        });

        let info = MatchInfo::new(&step, &StepResult::new(Status::Passed));
        assert_eq!(info.arguments.len(), 2);
        assert_eq!(info.arguments[0].val.as_deref(), Some("3"));
        assert_eq!(info.arguments[0].offset, Some(7));
        assert_eq!(info.arguments[1], MatchArgument::default());
        assert_eq!(info.location.as_deref(), Some("steps.rs:12"));

        let info = MatchInfo::new(&step, &StepResult::new(Status::Undefined));
        assert!(info.location.is_none());
    }

    #[test]
    fn match_info_of_hook() {
        let step = event::TestStep::Hook(HookStep {
            hook_type: HookType::Before,
            code_location: Some("hooks.rs:1".into()),
        });

        let info = MatchInfo::new(&step, &StepResult::new(Status::Passed));
        assert!(info.arguments.is_empty());
        assert_eq!(info.location.as_deref(), Some("hooks.rs:1"));
    }
}
