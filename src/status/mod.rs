// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Best-effort progress notifications sent to the test monitor after every
//! finished scenario.

pub mod transport;

use serde::Serialize;

use crate::{
    registry::{RegistryEntry, RunInfo},
    report::CompletedCase,
};

#[doc(inline)]
pub use self::transport::{HttpTransport, Transport};

/// Run status of a [`StatusUpdate`].
///
/// Only [`RunStatus::Running`] is ever reported by this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RunStatus {
    /// Run is queued.
    Pending = 0,

    /// Run is being set up.
    Initializing = 1,

    /// Run is executing cases.
    Running = 2,

    /// Run has finished.
    Finished = 3,

    /// Run is being canceled.
    Canceling = 4,

    /// Run has been canceled.
    Canceled = 5,
}

impl Serialize for RunStatus {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(*self as u8)
    }
}

/// Status of a single finished case.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStatus {
    /// Identifier of the case in the test monitor.
    pub id: i64,

    /// Name of the case.
    pub name: String,

    /// Running index of the case.
    pub order: usize,

    /// `1` if the case passed, `0` otherwise.
    pub iterations_passed: u8,

    /// `1` if the case failed, `0` otherwise.
    pub iterations_failed: u8,

    /// Progress of the case itself, always `1.0` once it's finished.
    pub progress: f64,
}

/// Progress notification of a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    /// Identifier of the run.
    pub run_id: String,

    /// Identifier of the run instance.
    pub instance_id: String,

    /// [`RunStatus`] of the run.
    pub status: RunStatus,

    /// Share of the registered cases finished so far.
    pub progress: f64,

    /// [`CaseStatus`] of the just finished case.
    pub case: CaseStatus,
}

/// Tracker of the running case index.
#[derive(Clone, Copy, Debug)]
pub struct Progress {
    /// Index of the next reported case, starting from `1`.
    index: usize,

    /// Total number of registered cases.
    total: usize,
}

impl Progress {
    /// Creates a new [`Progress`] over `total` registered cases.
    #[must_use]
    pub const fn new(total: usize) -> Self {
        Self { index: 1, total }
    }

    /// Index the next [`StatusUpdate`] will be produced with.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Produces the [`StatusUpdate`] of the `completed` case and advances the
    /// running index.
    #[allow(clippy::cast_precision_loss)]
    pub fn advance(
        &mut self,
        entry: &RegistryEntry,
        completed: &CompletedCase,
        run: &RunInfo,
    ) -> StatusUpdate {
        let order = self.index;
        self.index += 1;

        StatusUpdate {
            run_id: run.run_id.clone(),
            instance_id: run.instance_id.clone(),
            status: RunStatus::Running,
            progress: if self.total == 0 {
                1.0
            } else {
                order as f64 / self.total as f64
            },
            case: CaseStatus {
                id: entry.internal_id,
                name: completed.name.clone(),
                order,
                iterations_passed: u8::from(completed.passed),
                iterations_failed: u8::from(!completed.passed),
                progress: 1.0,
            },
        }
    }
}

/// Sender of [`StatusUpdate`]s to `{base_url}/status`.
#[derive(Debug)]
pub struct StatusReporter<T = HttpTransport> {
    url: String,
    token: String,
    transport: T,
}

impl<T: Transport> StatusReporter<T> {
    /// Creates a new [`StatusReporter`] posting to the `/status` endpoint of
    /// the given `base_url`.
    #[must_use]
    pub fn new(base_url: &str, token: impl Into<String>, transport: T) -> Self {
        Self {
            url: format!("{}/status", base_url.trim_end_matches('/')),
            token: token.into(),
            transport,
        }
    }

    /// URL notifications are posted to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends the given `update` once, returning whether it has been accepted.
    ///
    /// Never fails: every problem is logged and reported as `false`.
    pub fn notify(&mut self, update: &StatusUpdate) -> bool {
        let body = match serde_json::to_string(update) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("failed to serialize status update: {e}");
                return false;
            }
        };

        match self.transport.post_json(&self.url, &body, &self.token) {
            Ok(code) if (200..300).contains(&code) => {
                tracing::debug!(url = %self.url, code, "status update accepted");
                true
            }
            Ok(code) => {
                tracing::error!(
                    url = %self.url,
                    code,
                    "status update rejected by the test monitor",
                );
                false
            }
            Err(e) => {
                tracing::error!(url = %self.url, "{e}");
                false
            }
        }
    }
}
