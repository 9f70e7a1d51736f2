//! Per-file import aggregation.
//!
//! Rendering runs twice per file. The first pass records every
//! [`Reference`] the file touches (after macro expansion); the recorded set
//! is then deduplicated by import path, sorted, and checked for colliding
//! local names. The second pass writes references through the finished
//! [`ImportSet`] so aliases are applied consistently.

use crate::symbol::Reference;
use std::collections::{BTreeMap, HashSet};

/// How a colliding import is disambiguated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disambiguation {
    /// Bind the import under another local name.
    Alias(String),
    /// Do not import; spell references with the full import path.
    Qualify,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub path: String,
    pub local: String,
    pub alias: Option<String>,
    /// Referenced by full path instead of being imported.
    pub qualified: bool,
}

impl ImportEntry {
    /// Identifier that references through this import should use.
    pub fn binding(&self) -> &str {
        if self.qualified {
            &self.path
        } else {
            self.alias.as_deref().unwrap_or(&self.local)
        }
    }
}

/// Deduplicated, sorted imports of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    entries: Vec<ImportEntry>,
}

impl ImportSet {
    /// Build from recorded `path -> local` pairs.
    ///
    /// The first path (in sorted order) keeps its local name; later
    /// collisions are handed to `disambiguate` together with the names
    /// already taken.
    pub fn build(
        recorded: &BTreeMap<String, String>,
        mut disambiguate: impl FnMut(&str, &HashSet<String>) -> Disambiguation,
    ) -> Self {
        let mut taken = HashSet::new();
        let mut entries = Vec::with_capacity(recorded.len());
        for (path, local) in recorded {
            let mut entry = ImportEntry {
                path: path.clone(),
                local: local.clone(),
                alias: None,
                qualified: false,
            };
            if taken.contains(local) {
                match disambiguate(local, &taken) {
                    Disambiguation::Alias(alias) => {
                        tracing::trace!(path = %path, alias = %alias, "aliasing import");
                        taken.insert(alias.clone());
                        entry.alias = Some(alias);
                    }
                    Disambiguation::Qualify => entry.qualified = true,
                }
            } else {
                taken.insert(local.clone());
            }
            entries.push(entry);
        }
        Self { entries }
    }

    pub fn get(&self, path: &str) -> Option<&ImportEntry> {
        self.entries
            .binary_search_by(|e| e.path.as_str().cmp(path))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Entries that appear in the import section.
    pub fn imported(&self) -> impl Iterator<Item = &ImportEntry> {
        self.entries.iter().filter(|e| !e.qualified)
    }

    pub fn entries(&self) -> &[ImportEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Spell a reference through this set.
    pub fn spell(&self, reference: &Reference) -> String {
        let base = match &reference.import {
            Some(path) => self
                .get(path)
                .map(|e| e.binding().to_string())
                .unwrap_or_else(|| reference.local.clone()),
            None => reference.local.clone(),
        };
        match &reference.member {
            Some(member) => format!("{}.{}", base, member),
            None => base,
        }
    }
}

/// First free `{local}{n}` starting from 2.
pub fn numbered_alias(local: &str, taken: &HashSet<String>) -> String {
    (2..)
        .map(|n| format!("{}{}", local, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| format!("{}_", local))
}
