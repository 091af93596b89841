// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types of every stage of the reporting pipeline.
//!
//! Only [`TreeError`] ever escapes the event handling path: everything else
//! is logged by the [`Plugin`] and the run continues (or the [`Plugin`] turns
//! itself off at startup).
//!
//! [`Plugin`]: crate::Plugin

use std::{io, path::PathBuf};

use derive_more::with_trait::{Display, Error, From};

/// Error of loading a [`Payload`] file.
///
/// [`Payload`]: crate::registry::Payload
#[derive(Debug, Display, Error, From)]
pub enum LoadError {
    /// Payload file is missing or unreadable.
    #[display("failed to read payload file `{}`: {source}", path.display())]
    #[from(ignore)]
    Io {
        /// Path of the payload file.
        path: PathBuf,

        /// Underlying I/O error.
        source: io::Error,
    },

    /// Payload file is not a valid payload JSON document.
    #[display("malformed payload: {_0}")]
    Malformed(serde_json::Error),

    /// Two payload cases resolve to the same external key.
    #[display("duplicate case key in payload: `{_0}`")]
    #[from(ignore)]
    DuplicateKey(#[error(not(source))] String),
}

/// Error of parsing a `.feature` source text.
#[derive(Clone, Debug, Display, Error)]
#[display("failed to parse `{uri}`: {message}")]
pub struct ParseError {
    /// URI of the source which failed to parse.
    pub uri: String,

    /// Human-readable parser message.
    pub message: String,
}

/// Violation of the event ordering the report tree relies on.
///
/// The ordering guarantee is foundational for building a correct tree, so
/// this is never recovered from within a run.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum TreeError {
    /// An `AfterStep` hook started while the current element has no steps.
    #[display(
        "`AfterStep` hook{} started without a preceding step in the current \
         element",
        location.as_ref().map(|l| format!(" `{l}`")).unwrap_or_default(),
    )]
    AfterStepWithoutStep {
        /// Code location of the offending hook, if known.
        location: Option<String>,
    },
}

/// Error of sending a status notification.
#[derive(Debug, Display, Error, From)]
pub enum TransportError {
    /// HTTP client failed to perform the request.
    #[display("HTTP request failed: {_0}")]
    Http(reqwest::Error),

    /// Notification couldn't be serialized.
    #[display("failed to serialize notification: {_0}")]
    Serialize(serde_json::Error),
}

/// Error of writing a report or a result document.
#[derive(Debug, Display, Error, From)]
pub enum WriteError {
    /// Document couldn't be serialized.
    #[display("failed to serialize: {_0}")]
    Serialize(serde_json::Error),

    /// Document couldn't be written.
    #[display("failed to write: {_0}")]
    Io(io::Error),
}
