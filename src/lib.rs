// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reporter of [Cucumber] runs to a [CloudBeat] test monitor.
//!
//! A [`Plugin`] consumes the ordered [`Event`]s of a run and:
//! 1. rebuilds the nested [Cucumber JSON] report tree out of them;
//! 2. after every scenario, sends a best-effort progress notification to the
//!    test monitor;
//! 3. once the run is over, joins the report tree with the cases declared in
//!    the payload file and writes the final [`ResultDocument`].
//!
//! Reporting problems never break the run: they're logged via [`tracing`],
//! and only a malformed [`Event`] order surfaces as a [`TreeError`].
//!
//! [CloudBeat]: https://cloudbeat.io
//! [Cucumber]: https://cucumber.io
//! [Cucumber JSON]: https://github.com/cucumber/cucumber-json-schema

pub mod cli;
pub mod error;
pub mod event;
pub mod plugin;
pub mod registry;
pub mod report;
pub mod result;
pub mod screenshot;
pub mod source;
pub mod status;

pub use gherkin;

#[doc(inline)]
pub use self::{
    cli::Settings,
    error::{LoadError, ParseError, TransportError, TreeError, WriteError},
    event::Event,
    plugin::Plugin,
    registry::{external_key, Payload, Registry, RegistryEntry, RunInfo},
    report::{Builder, FeatureNode, Outcome},
    result::ResultDocument,
    screenshot::{NoScreenshot, Screenshot},
    source::{Parser, Sources},
    status::{StatusReporter, StatusUpdate, Transport},
};
