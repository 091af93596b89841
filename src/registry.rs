// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pre-declared test cases of a run, loaded from a payload file.

use std::{collections::BTreeMap, fs, path::Path};

use linked_hash_map::LinkedHashMap;
use serde::Deserialize;

use crate::error::LoadError;

/// Derives the external key of a scenario out of its `designation`.
///
/// This is the last `/` separated segment, so both
/// `proj/feat.feature/Scenario: Login` and `.../Scenario: Login` resolve to
/// `Scenario: Login`.
#[must_use]
pub fn external_key(designation: &str) -> &str {
    designation.rsplit('/').next().unwrap_or(designation)
}

/// Payload file exactly as it's laid out on disk.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPayload {
    run_id: String,
    instance_id: String,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    #[serde(default)]
    capabilities: BTreeMap<String, String>,
    #[serde(default)]
    environment_variables: String,
    #[serde(default)]
    cases: Vec<RawCase>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCase {
    id: i64,
    cucumber_id: String,
    order: i64,
}

/// Run-level metadata copied into status updates and the result document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunInfo {
    /// Identifier of the run.
    pub run_id: String,

    /// Identifier of the run instance.
    pub instance_id: String,

    /// Free-form run metadata.
    pub metadata: BTreeMap<String, String>,

    /// Capabilities of the environment under test.
    pub capabilities: BTreeMap<String, String>,

    /// Environment variables of the run, as a single opaque string.
    pub environment_variables: String,
}

/// Parsed payload file.
#[derive(Clone, Debug, Default)]
pub struct Payload {
    /// [`RunInfo`] of the payload.
    pub run: RunInfo,

    /// [`Registry`] of the payload cases.
    pub registry: Registry,
}

impl Payload {
    /// Loads a [`Payload`] from the file at the given `path`.
    ///
    /// # Errors
    ///
    /// If the file is missing, unreadable, malformed, or declares two cases
    /// with the same external key.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parses a [`Payload`] out of the given JSON `text`.
    ///
    /// # Errors
    ///
    /// If the `text` is malformed, or declares two cases with the same
    /// external key.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        let raw: RawPayload = serde_json::from_str(text)?;
        let registry = Registry::from_cases(raw.cases.into_iter().map(|c| {
            (c.id, c.cucumber_id, c.order)
        }))?;

        Ok(Self {
            run: RunInfo {
                run_id: raw.run_id,
                instance_id: raw.instance_id,
                metadata: raw.metadata,
                capabilities: raw.capabilities,
                environment_variables: raw.environment_variables,
            },
            registry,
        })
    }

    /// Returns the browser name of the environment under test, with any
    /// `technology.` prefix stripped.
    #[must_use]
    pub fn browser_name(&self) -> Option<&str> {
        let name = self.run.capabilities.get("browserName")?;
        Some(match name.split_once('.') {
            Some((prefix, rest)) if !prefix.is_empty() => rest,
            _ => name.as_str(),
        })
    }
}

/// Pre-declared test case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Identifier of this case in the test monitor.
    pub internal_id: i64,

    /// `cucumberId` as declared in the payload.
    pub cucumber_id: String,

    /// [`external_key()`] of the [`RegistryEntry::cucumber_id`].
    pub external_key: String,

    /// Declared order of this case.
    pub declared_order: i64,
}

/// Lookup of [`RegistryEntry`]s by their external key, preserving the
/// declared order.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    entries: LinkedHashMap<String, RegistryEntry>,
}

impl Registry {
    /// Builds a [`Registry`] out of `(id, cucumber_id, order)` triples.
    ///
    /// # Errors
    ///
    /// With [`LoadError::DuplicateKey`] if two cases resolve to the same
    /// external key.
    pub fn from_cases<I, S>(cases: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = (i64, S, i64)>,
        S: Into<String>,
    {
        let mut entries = LinkedHashMap::new();
        for (internal_id, cucumber_id, declared_order) in cases {
            let cucumber_id = cucumber_id.into();
            let key = external_key(&cucumber_id).to_owned();
            if entries.contains_key(&key) {
                return Err(LoadError::DuplicateKey(key));
            }
            _ = entries.insert(
                key.clone(),
                RegistryEntry {
                    internal_id,
                    cucumber_id,
                    external_key: key,
                    declared_order,
                },
            );
        }
        Ok(Self { entries })
    }

    /// Loads only the [`Registry`] of the payload file at the given `path`.
    ///
    /// # Errors
    ///
    /// See [`Payload::load()`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Payload::load(path).map(|p| p.registry)
    }

    /// Returns the [`RegistryEntry`] of the given external `key`.
    ///
    /// The `key` is normalized with [`external_key()`] first.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&RegistryEntry> {
        self.entries.get(external_key(key))
    }

    /// Number of registered cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Indicates whether no cases are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over [`RegistryEntry`]s in declared payload order.
    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }
}
