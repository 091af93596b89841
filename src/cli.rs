// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Startup configuration of a [`Plugin`].
//!
//! Every option may be provided either on the command line or via its
//! environment variable, the command line taking precedence.
//!
//! [`Plugin`]: crate::Plugin

use std::path::PathBuf;

use crate::result::DEFAULT_RESULTS_PATH;

pub use clap::Parser;

/// CLI (command line interface) of the `cucumber-cloudbeat` binary.
#[derive(clap::Parser, Clone, Debug)]
#[command(
    name = "cucumber-cloudbeat",
    about = "Replay Cucumber events into a CloudBeat test monitor",
    long_about = "Replays newline-delimited JSON events of a Cucumber run, \
                  reporting per-scenario progress to a CloudBeat test monitor \
                  and writing the final result document."
)]
pub struct Opts {
    /// Path to the payload file declaring the cases of the run.
    #[arg(long, value_name = "path", env = "CB_PAYLOAD_PATH")]
    pub payload_path: Option<PathBuf>,

    /// Base URL of the test monitor.
    #[arg(long, value_name = "url", env = "CB_TEST_MONITOR_URL")]
    pub monitor_url: Option<String>,

    /// Bearer token to authorize with at the test monitor.
    #[arg(
        long,
        value_name = "token",
        env = "CB_TEST_MONITOR_TOKEN",
        hide_env_values = true
    )]
    pub monitor_token: Option<String>,

    /// Path to write the final result document to.
    #[arg(long, value_name = "path", default_value = DEFAULT_RESULTS_PATH)]
    pub results: PathBuf,

    /// Path to additionally write the Cucumber JSON report to.
    #[arg(long, value_name = "path")]
    pub cucumber_json: Option<PathBuf>,

    /// File with newline-delimited JSON events. Read from STDIN if omitted.
    #[arg(value_name = "events")]
    pub events: Option<PathBuf>,
}

impl Opts {
    /// Shortcut for [`clap::Parser::parse()`], which doesn't require the trait
    /// being imported.
    #[must_use]
    pub fn parsed() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Extracts [`Settings`] out of these [`Opts`].
    ///
    /// [`None`] if any of the payload path, the monitor URL or the monitor
    /// token is missing.
    #[must_use]
    pub fn settings(&self) -> Option<Settings> {
        Some(Settings {
            payload_path: self.payload_path.clone()?,
            monitor_url: self.monitor_url.clone()?,
            monitor_token: self.monitor_token.clone()?,
            results_path: self.results.clone(),
            cucumber_json: self.cucumber_json.clone(),
        })
    }
}

/// Complete configuration of an active [`Plugin`].
///
/// [`Plugin`]: crate::Plugin
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Path to the payload file.
    pub payload_path: PathBuf,

    /// Base URL of the test monitor.
    pub monitor_url: String,

    /// Bearer token of the test monitor.
    pub monitor_token: String,

    /// Path to write the final result document to.
    pub results_path: PathBuf,

    /// Path to additionally write the Cucumber JSON report to.
    pub cucumber_json: Option<PathBuf>,
}

impl Settings {
    /// Creates new [`Settings`] writing results to the
    /// [`DEFAULT_RESULTS_PATH`].
    #[must_use]
    pub fn new(
        payload_path: impl Into<PathBuf>,
        monitor_url: impl Into<String>,
        monitor_token: impl Into<String>,
    ) -> Self {
        Self {
            payload_path: payload_path.into(),
            monitor_url: monitor_url.into(),
            monitor_token: monitor_token.into(),
            results_path: DEFAULT_RESULTS_PATH.into(),
            cucumber_json: None,
        }
    }

    /// Sets the path to write the final result document to.
    #[must_use]
    pub fn results_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.results_path = path.into();
        self
    }

    /// Sets the path to additionally write the Cucumber JSON report to.
    #[must_use]
    pub fn cucumber_json(mut self, path: impl Into<PathBuf>) -> Self {
        self.cucumber_json = Some(path.into());
        self
    }
}
