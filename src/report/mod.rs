// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Nested report tree in a [Cucumber JSON format][1], built out of the flat
//! [`Event`] stream.
//!
//! [1]: https://github.com/cucumber/cucumber-json-schema
//! [`Event`]: crate::Event

mod builder;
mod element;
mod feature;
mod types;

use std::io;

use crate::error::WriteError;

#[doc(inline)]
pub use self::{
    builder::{Builder, CompletedCase, Outcome},
    element::{ElementKind, ElementNode, HookNode, StepNode},
    feature::FeatureNode,
    types::{
        Base64, DocString, Embedding, MatchArgument, MatchInfo, Row,
        RunResult, Tag,
    },
};

/// Writes the given `features` into the `out`put as a Cucumber JSON array.
///
/// # Errors
///
/// If serialization or writing fails.
pub fn write_json<W: io::Write>(
    features: &[FeatureNode],
    mut out: W,
) -> Result<(), WriteError> {
    serde_json::to_writer(&mut out, features)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_json_array() {
        let mut out = vec![];
        write_json(&[FeatureNode::new("a.feature", None)], &mut out).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json[0]["uri"], "a.feature");
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[test]
    fn writes_empty_array() {
        let mut out = vec![];
        write_json(&[], &mut out).unwrap();

        assert_eq!(out, b"[]");
    }
}
