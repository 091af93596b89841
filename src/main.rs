// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Replays newline-delimited JSON [`Event`]s into a [`Plugin`].

use std::{
    fs,
    io::{self, BufRead},
};

use anyhow::Context as _;
use cucumber_cloudbeat::{cli::Opts, Event, Plugin};
use tracing_subscriber::{
    fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter,
};

/// Environment variable to configure the log filter with.
const LOG_ENV: &str = "CB_LOG";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let opts = Opts::parsed();
    let input: Box<dyn BufRead> = match &opts.events {
        Some(path) => Box::new(io::BufReader::new(
            fs::File::open(path)
                .with_context(|| format!("failed to open `{}`", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut plugin = Plugin::new(opts.settings());
    for (n, line) in input.lines().enumerate() {
        let line = line.context("failed to read events")?;
        if line.trim().is_empty() {
            continue;
        }
        let event: Event = serde_json::from_str(&line)
            .with_context(|| format!("malformed event at line {}", n + 1))?;
        plugin.handle_event(event)?;
    }

    Ok(())
}
