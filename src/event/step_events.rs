//! Step-level events data.

use std::time::Duration;

use derive_more::with_trait::Display;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationNanoSeconds};

use super::hook_events::HookStep;

/// Step of a [`TestCase`], either a declared one or a fixture hook.
///
/// [`TestCase`]: super::TestCase
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TestStep {
    /// Step declared in a `.feature` file.
    Pickle(PickleStep),

    /// Fixture hook.
    Hook(HookStep),
}

impl TestStep {
    /// Returns code location of the matched definition, if any.
    #[must_use]
    pub fn code_location(&self) -> Option<&str> {
        match self {
            Self::Pickle(step) => step.code_location.as_deref(),
            Self::Hook(hook) => hook.code_location.as_deref(),
        }
    }
}

/// Step declared in a `.feature` file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct PickleStep {
    /// Text of this step, without a keyword.
    pub text: String,

    /// Line of this step in its `.feature` file.
    pub line: usize,

    /// Doc string or data table passed to this step.
    #[serde(default)]
    pub argument: Option<StepArgument>,

    /// Arguments captured by the matched step definition.
    #[serde(default)]
    pub definition_arguments: Vec<Argument>,

    /// Code location of the matched step definition.
    #[serde(default)]
    pub code_location: Option<String>,
}

/// Doc string or data table of a [`PickleStep`].
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepArgument {
    /// [Doc string][1].
    ///
    /// [1]: https://cucumber.io/docs/gherkin/reference#doc-strings
    DocString {
        /// Content of the doc string.
        content: String,

        /// Line where the doc string starts.
        line: usize,

        /// Optional content type following the opening delimiter.
        #[serde(default)]
        content_type: Option<String>,
    },

    /// [Data table][1] as rows of cells.
    ///
    /// [1]: https://cucumber.io/docs/gherkin/reference#data-tables
    Table(Vec<Vec<String>>),
}

/// Argument captured by a step definition.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct Argument {
    /// Captured value, [`None`] for an optional group which didn't match.
    #[serde(default)]
    pub value: Option<String>,

    /// Byte offset of the captured value in the step text.
    pub offset: usize,
}

/// Possible statuses of a finished [`TestStep`].
#[derive(
    Clone, Copy, Debug, Deserialize, Display, PartialEq, Eq, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Step passed.
    #[display("passed")]
    Passed,

    /// Step failed.
    #[display("failed")]
    Failed,

    /// Step was skipped.
    #[display("skipped")]
    Skipped,

    /// Step definition is pending.
    #[display("pending")]
    Pending,

    /// There is no step definition matching the step.
    #[display("undefined")]
    Undefined,

    /// More than one step definition matches the step.
    #[display("ambiguous")]
    Ambiguous,
}

/// Result of a finished [`TestStep`].
#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct StepResult {
    /// [`Status`] of the step.
    pub status: Status,

    /// Error message, usually present for [`Status::Failed`] only.
    #[serde(default)]
    pub error_message: Option<String>,

    /// Execution time of the step, in nanoseconds when serialized.
    #[serde(default)]
    #[serde_as(as = "Option<DurationNanoSeconds<u64>>")]
    pub duration: Option<Duration>,
}

impl StepResult {
    /// Creates a [`StepResult`] without error message and duration.
    #[must_use]
    pub const fn new(status: Status) -> Self {
        Self { status, error_message: None, duration: None }
    }

    /// Sets [`StepResult::error_message`].
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Sets [`StepResult::duration`].
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}
