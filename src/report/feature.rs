// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Feature node of the report tree.

use inflector::Inflector as _;
use serde::Serialize;

use crate::report::{element::ElementNode, types::Tag};

/// [`Serialize`]able feature of the report tree.
///
/// Everything except [`FeatureNode::uri`] and [`FeatureNode::elements`] is
/// left empty if the feature source is unknown.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FeatureNode {
    /// URI of the `.feature` file.
    pub uri: String,

    /// Identifier of this [`FeatureNode`].
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// [`gherkin::Feature::keyword`].
    pub keyword: String,

    /// [`gherkin::Feature::name`].
    pub name: String,

    /// [`gherkin::Feature::description`].
    pub description: String,

    /// Line of the feature declaration.
    pub line: usize,

    /// [`gherkin::Feature::tags`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,

    /// [`ElementNode`]s of this feature in order of execution.
    pub elements: Vec<ElementNode>,
}

impl FeatureNode {
    /// Creates a new [`FeatureNode`] of the given `uri`, enriched from the
    /// parsed `source` if available.
    #[must_use]
    pub fn new(uri: &str, source: Option<&gherkin::Feature>) -> Self {
        let Some(feature) = source else {
            return Self { uri: uri.to_owned(), ..Self::default() };
        };

        Self {
            uri: uri.to_owned(),
            id: feature.name.to_kebab_case(),
            keyword: feature.keyword.clone(),
            name: feature.name.clone(),
            description: feature.description.clone().unwrap_or_default(),
            line: feature.position.line,
            tags: feature
                .tags
                .iter()
                .map(|tag| Tag { name: tag.clone(), line: feature.position.line })
                .collect(),
            elements: vec![],
        }
    }
}
