// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Read-only lookup over `.feature` sources seen during a run.
//!
//! Sources are recorded from [`Event::TestSourceRead`]s as raw text and
//! parsed lazily on the first query via a [`Parser`]. Queries about a URI
//! which was never recorded (or failed to parse) return [`None`], so callers
//! always fall back to minimally populated report nodes.
//!
//! [`Event::TestSourceRead`]: crate::event::Event::TestSourceRead

mod ast;
pub mod parser;

use std::collections::HashMap;

use once_cell::unsync::OnceCell;

pub use self::{
    ast::{AstNode, NodeKind},
    parser::{Gherkin, Parser},
};

use self::ast::Indexed;

/// Recorded source text along with its lazily parsed form.
#[derive(Debug)]
struct Entry {
    text: String,
    parsed: OnceCell<Option<Indexed>>,
}

/// Lookup of `.feature` sources by their URI.
#[derive(Debug, Default)]
pub struct Sources<P = Gherkin> {
    /// [`Parser`] to parse recorded sources with.
    parser: P,

    /// Recorded sources by their URI.
    entries: HashMap<String, Entry>,
}

impl Sources {
    /// Creates an empty [`Sources`] lookup with the default [`Gherkin`]
    /// [`Parser`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_parser(Gherkin)
    }
}

impl<P: Parser> Sources<P> {
    /// Creates an empty [`Sources`] lookup parsing with the given [`Parser`].
    #[must_use]
    pub fn with_parser(parser: P) -> Self {
        Self { parser, entries: HashMap::new() }
    }

    /// Records the source `text` of the given `uri` for later queries.
    ///
    /// The first recorded text of a `uri` wins.
    pub fn record_source(
        &mut self,
        uri: impl Into<String>,
        text: impl Into<String>,
    ) {
        let uri = uri.into();
        if self.entries.contains_key(&uri) {
            tracing::debug!(%uri, "source already recorded, ignoring");
            return;
        }
        _ = self
            .entries
            .insert(uri, Entry { text: text.into(), parsed: OnceCell::new() });
    }

    /// Returns the parsed [`gherkin::Feature`] of the given `uri`.
    #[must_use]
    pub fn feature(&self, uri: &str) -> Option<&gherkin::Feature> {
        self.indexed(uri).map(Indexed::feature)
    }

    /// Returns the [`AstNode`] at the given `line` of the given `uri`.
    #[must_use]
    pub fn ast_node_at(&self, uri: &str, line: usize) -> Option<AstNode<'_>> {
        self.indexed(uri)?.node_at(line)
    }

    /// Indicates whether the scenario at the given `line` of the given `uri`
    /// has a [`gherkin::Background`].
    #[must_use]
    pub fn has_background(&self, uri: &str, line: usize) -> bool {
        self.background_of(uri, line).is_some()
    }

    /// Returns the [`gherkin::Background`] applying to the node at the given
    /// `line` of the given `uri`.
    #[must_use]
    pub fn background_of(
        &self,
        uri: &str,
        line: usize,
    ) -> Option<&gherkin::Background> {
        self.ast_node_at(uri, line)?.background()
    }

    /// Returns the [`gherkin::Scenario`] definition of the node at the given
    /// `line` of the given `uri`.
    #[must_use]
    pub fn scenario_definition_of(
        &self,
        uri: &str,
        line: usize,
    ) -> Option<&gherkin::Scenario> {
        self.ast_node_at(uri, line)?.scenario_definition()
    }

    /// Indicates whether the node at the given `line` of the given `uri` is
    /// a [`gherkin::Background`] step. [`None`] if there is no such node.
    #[must_use]
    pub fn is_background_step(&self, uri: &str, line: usize) -> Option<bool> {
        self.ast_node_at(uri, line).map(|n| n.is_background_step())
    }

    /// Parses the source of the given `uri` on the first call.
    fn indexed(&self, uri: &str) -> Option<&Indexed> {
        let entry = self.entries.get(uri)?;
        entry
            .parsed
            .get_or_init(|| match self.parser.parse(uri, &entry.text) {
                Ok(feature) => Some(Indexed::new(feature)),
                Err(e) => {
                    tracing::warn!("{e}, source won't be used to enrich report");
                    None
                }
            })
            .as_ref()
    }
}
