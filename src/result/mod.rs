// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Final result document of a run, consumed by the test monitor once the run
//! is over.

mod assembler;

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write as _},
    path::Path,
    time::SystemTime,
};

use serde::{Serialize, Serializer};

use crate::error::WriteError;

pub use self::assembler::Assembler;

/// Default path of the written [`ResultDocument`].
pub const DEFAULT_RESULTS_PATH: &str = ".CB_TEST_RESULTS";

/// [`Failure::kind`] of every failed step.
pub const FAILURE_TYPE: &str = "CUCUMBER_ERROR";

/// [`Failure::message`] of failed steps which reported no error message.
pub const FALLBACK_MESSAGE: &str = "See execution log for details";

/// Aggregated status of a step, a case, a suite or a whole run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ResultStatus {
    /// Everything passed.
    Passed,

    /// Something failed.
    Failed,
}

impl ResultStatus {
    /// Conjunction of the given statuses, vacuously [`ResultStatus::Passed`].
    pub fn all(statuses: impl IntoIterator<Item = Self>) -> Self {
        if statuses.into_iter().all(|s| s == Self::Passed) {
            Self::Passed
        } else {
            Self::Failed
        }
    }
}

/// Failure details of a non-passed step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Taxonomy tag of this [`Failure`], always [`FAILURE_TYPE`].
    #[serde(rename = "type")]
    pub kind: String,

    /// Human-readable description.
    pub message: String,
}

/// Result of a single step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepModel {
    pub name: String,

    /// 0-based position of the step within its case.
    pub order: usize,

    pub status: ResultStatus,

    /// Same as [`StepModel::name`].
    pub transaction_name: String,

    /// [`base64`] encoded PNG of a failed step.
    #[serde(rename = "screenShot", skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,

    /// Duration in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
}

/// Result of a single registered case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseResult {
    /// Identifier of the case in the test monitor.
    pub id: i64,

    pub name: String,

    /// Declared order of the case.
    pub order: i64,

    /// Always `1`, as every case runs exactly once.
    pub iteration_num: u32,

    pub status: ResultStatus,

    pub steps: Vec<StepModel>,
}

/// The only suite of a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SuiteResult {
    pub status: ResultStatus,
    pub cases: Vec<CaseResult>,
}

/// Final outcome of a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultDocument {
    pub run_id: String,
    pub instance_id: String,
    pub capabilities: BTreeMap<String, String>,
    pub metadata: BTreeMap<String, String>,
    pub environment_variables: String,

    #[serde(serialize_with = "rfc3339")]
    pub start_time: SystemTime,

    #[serde(serialize_with = "rfc3339")]
    pub end_time: SystemTime,

    /// Duration of the run in whole seconds.
    pub duration: u64,

    pub status: ResultStatus,
    pub suites: Vec<SuiteResult>,
}

impl ResultDocument {
    /// Writes this [`ResultDocument`] as UTF-8 JSON into the file at the
    /// given `path`, replacing it if exists.
    ///
    /// # Errors
    ///
    /// If serialization or writing fails.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), WriteError> {
        let json = serde_json::to_vec(self)?;
        let mut file = io::BufWriter::new(fs::File::create(path)?);
        file.write_all(&json)?;
        file.flush()?;
        Ok(())
    }
}

/// Serializes [`SystemTime`] as RFC 3339 with milliseconds.
fn rfc3339<S: Serializer>(time: &SystemTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&humantime::format_rfc3339_millis(*time))
}
