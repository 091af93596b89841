//! Hook-related events data.

use derive_more::with_trait::Display;
use serde::{Deserialize, Serialize};

/// Type of a fixture hook.
#[derive(Clone, Copy, Debug, Deserialize, Display, PartialEq, Eq, Serialize)]
#[display("{self:?}")]
#[serde(rename_all = "snake_case")]
pub enum HookType {
    /// Executing on each scenario before running all its steps.
    Before,

    /// Executing on each scenario after running all its steps.
    After,

    /// Executing before each step.
    BeforeStep,

    /// Executing after each step.
    AfterStep,
}

/// Fixture hook reported as a test step.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct HookStep {
    /// [`HookType`] of this hook.
    pub hook_type: HookType,

    /// Code location of the hook definition.
    #[serde(default)]
    pub code_location: Option<String>,
}
