// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Top-level [`Plugin`] wiring the report tree with status notifications and
//! the final result document.

use std::{fs, io, time::SystemTime};

use crate::{
    cli::Settings,
    error::{TreeError, WriteError},
    event::Event,
    registry::Payload,
    report::{self, Builder, CompletedCase, FeatureNode, Outcome},
    result::{Assembler, ResultDocument},
    screenshot::{NoScreenshot, Screenshot},
    source::{Gherkin, Parser},
    status::{HttpTransport, Progress, StatusReporter, Transport},
};

/// Collaborators of a [`Plugin`] which has been configured successfully.
#[derive(Debug)]
struct Active<T, S> {
    settings: Settings,
    payload: Payload,
    reporter: StatusReporter<T>,
    progress: Progress,
    screenshot: S,
    started: SystemTime,
}

/// Consumer of a run's [`Event`]s reporting it to a test monitor.
///
/// A [`Plugin`] without complete [`Settings`] or with an unloadable payload is
/// inert: it accepts and ignores every [`Event`]. The host run is never
/// affected by reporting problems, except a [`TreeError`] which is returned
/// from [`Plugin::handle_event()`] once and turns the [`Plugin`] off.
#[derive(Debug)]
pub struct Plugin<T = HttpTransport, S = NoScreenshot, P = Gherkin> {
    /// [`None`] if inert.
    active: Option<Active<T, S>>,

    /// Report tree of the run.
    builder: Builder<P>,

    /// Whether a [`TreeError`] has happened.
    faulted: bool,

    /// [`ResultDocument`] assembled once the run finishes.
    result: Option<ResultDocument>,
}

impl Plugin {
    /// Creates a new [`Plugin`] with the default collaborators.
    ///
    /// [`None`] `settings` make it inert.
    #[must_use]
    pub fn new(settings: Option<Settings>) -> Self {
        let Some(settings) = settings else {
            return Self::inert(Gherkin);
        };
        match HttpTransport::new() {
            Ok(transport) => {
                Self::custom(Some(settings), transport, NoScreenshot, Gherkin)
            }
            Err(e) => {
                tracing::error!("plugin will be disabled: {e}");
                Self::inert(Gherkin)
            }
        }
    }
}

impl<T, S, P: Parser> Plugin<T, S, P> {
    /// Creates a new inert [`Plugin`].
    fn inert(parser: P) -> Self {
        tracing::info!("plugin is inert, events will be ignored");
        Self {
            active: None,
            builder: Builder::with_parser(parser),
            faulted: false,
            result: None,
        }
    }
}

impl<T: Transport, S: Screenshot, P: Parser> Plugin<T, S, P> {
    /// Creates a new [`Plugin`] with the given collaborators.
    ///
    /// [`None`] `settings` make it inert.
    #[must_use]
    pub fn custom(
        settings: Option<Settings>,
        transport: T,
        screenshot: S,
        parser: P,
    ) -> Self {
        let Some(settings) = settings else {
            return Self::inert(parser);
        };
        let payload = match Payload::load(&settings.payload_path) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("plugin will be disabled: {e}");
                return Self::inert(parser);
            }
        };
        match payload.browser_name() {
            Some(browser) => tracing::info!(browser, "browser under test"),
            None => {
                tracing::warn!("`browserName` is not specified in capabilities");
            }
        }
        tracing::info!(
            cases = payload.registry.len(),
            run_id = %payload.run.run_id,
            "plugin is active",
        );

        Self {
            active: Some(Active {
                reporter: StatusReporter::new(
                    &settings.monitor_url,
                    settings.monitor_token.clone(),
                    transport,
                ),
                progress: Progress::new(payload.registry.len()),
                settings,
                payload,
                screenshot,
                started: SystemTime::now(),
            }),
            builder: Builder::with_parser(parser),
            faulted: false,
            result: None,
        }
    }

    /// Indicates whether this [`Plugin`] handles [`Event`]s.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some() && !self.faulted
    }

    /// Returns the report tree built so far.
    #[must_use]
    pub fn features(&self) -> &[FeatureNode] {
        self.builder.features()
    }

    /// Returns the [`ResultDocument`], once the run has finished.
    #[must_use]
    pub const fn result(&self) -> Option<&ResultDocument> {
        self.result.as_ref()
    }

    /// Returns the browser name of the environment under test.
    #[must_use]
    pub fn browser_name(&self) -> Option<&str> {
        self.active.as_ref()?.payload.browser_name()
    }

    /// Handles all the given `events` in order.
    ///
    /// # Errors
    ///
    /// On the first [`TreeError`]. See [`Plugin::handle_event()`].
    pub fn run(
        &mut self,
        events: impl IntoIterator<Item = Event>,
    ) -> Result<(), TreeError> {
        events.into_iter().try_for_each(|ev| self.handle_event(ev))
    }

    /// Handles a single [`Event`].
    ///
    /// # Errors
    ///
    /// If the report tree can't be built out of the [`Event`]. This
    /// [`Plugin`] ignores all further [`Event`]s then.
    pub fn handle_event(&mut self, event: Event) -> Result<(), TreeError> {
        if !self.is_active() {
            return Ok(());
        }

        match self.builder.handle(event) {
            Ok(Outcome::Continue) => {}
            Ok(Outcome::CaseCompleted(case)) => self.case_completed(&case),
            Ok(Outcome::RunFinished) => self.run_finished(),
            Err(e) => {
                tracing::error!("{e}, plugin will be disabled");
                self.faulted = true;
                return Err(e);
            }
        }
        Ok(())
    }

    fn case_completed(&mut self, case: &CompletedCase) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let Some(entry) = active.payload.registry.lookup(&case.external_key)
        else {
            tracing::error!(
                key = %case.external_key,
                "no matching case in the payload, status won't be reported",
            );
            return;
        };

        let update = active.progress.advance(entry, case, &active.payload.run);
        if active.reporter.notify(&update) {
            tracing::info!(key = %case.external_key, "status report sent");
        }
    }

    fn run_finished(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        let document =
            Assembler::new(&active.payload.registry, &mut active.screenshot)
                .assemble(
                    self.builder.features(),
                    &active.payload.run,
                    active.started,
                    SystemTime::now(),
                );
        match document.write(&active.settings.results_path) {
            Ok(()) => tracing::info!(
                path = %active.settings.results_path.display(),
                status = ?document.status,
                "result document written",
            ),
            Err(e) => tracing::error!(
                path = %active.settings.results_path.display(),
                "failed to write result document: {e}",
            ),
        }

        if let Some(path) = &active.settings.cucumber_json {
            let written = fs::File::create(path)
                .map(io::BufWriter::new)
                .map_err(WriteError::from)
                .and_then(|out| report::write_json(self.builder.features(), out));
            if let Err(e) = written {
                tracing::error!(
                    path = %path.display(),
                    "failed to write Cucumber JSON report: {e}",
                );
            }
        }

        self.result = Some(document);
    }
}
