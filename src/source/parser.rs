// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parsing of `.feature` source texts into [`gherkin::Feature`]s.

use std::{borrow::Cow, path::PathBuf};

use crate::error::ParseError;

/// Source of parsed [`gherkin::Feature`]s for the [`Sources`] lookup.
///
/// [`Sources`]: super::Sources
pub trait Parser {
    /// Parses the given `.feature` source `text` located at `uri`.
    ///
    /// # Errors
    ///
    /// If the `text` isn't a valid [Gherkin] document.
    ///
    /// [Gherkin]: https://cucumber.io/docs/gherkin/reference
    fn parse(&self, uri: &str, text: &str)
        -> Result<gherkin::Feature, ParseError>;
}

impl<F> Parser for F
where
    F: Fn(&str, &str) -> Result<gherkin::Feature, ParseError>,
{
    fn parse(
        &self,
        uri: &str,
        text: &str,
    ) -> Result<gherkin::Feature, ParseError> {
        self(uri, text)
    }
}

/// Default [`Parser`] backed by the [`gherkin`] crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct Gherkin;

impl Parser for Gherkin {
    fn parse(
        &self,
        uri: &str,
        text: &str,
    ) -> Result<gherkin::Feature, ParseError> {
        // The grammar requires a trailing newline after the last line.
        let text = if text.ends_with('\n') {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(format!("{text}\n"))
        };

        let mut feature =
            gherkin::Feature::parse(text.as_ref(), gherkin::GherkinEnv::default())
                .map_err(|e| ParseError {
                    uri: uri.to_owned(),
                    message: e.to_string(),
                })?;
        if feature.path.is_none() {
            feature.path = Some(PathBuf::from(uri));
        }
        Ok(feature)
    }
}
