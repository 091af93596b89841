//! Test case related events data.

use serde::{Deserialize, Serialize};

/// Single executed test case (a scenario, or one row of a scenario outline).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct TestCase {
    /// URI of the `.feature` file this [`TestCase`] comes from.
    pub uri: String,

    /// Line of this [`TestCase`] in its `.feature` file.
    pub line: usize,

    /// Name of this [`TestCase`].
    pub name: String,

    /// Designation of this [`TestCase`] as reported by the engine.
    ///
    /// Its last `/`-delimited segment is the external key of the case.
    pub scenario_designation: String,

    /// Tags of this [`TestCase`], inherited ones included.
    #[serde(default)]
    pub tags: Vec<String>,
}
