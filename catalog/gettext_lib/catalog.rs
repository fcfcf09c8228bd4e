//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Message catalog for runtime message lookups
//!
//! This module provides the `Catalog` type which is the runtime
//! representation of a loaded .mo file, used for looking up translated
//! messages.  A catalog is immutable once built, and lookups never fail:
//! when no translation exists the original string is returned.

use log::warn;
use std::collections::HashMap;
use std::path::Path;

use crate::gettext_lib::entry::table_key;
use crate::gettext_lib::mo_file::{MoError, MoFile};
use crate::gettext_lib::plural::{default_plural_index, PluralExpr};

/// Translation data stored for one key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableEntry {
    /// Plural forms of the original (msgid_plural); informational only
    pub original_plurals: Vec<String>,
    /// msgstr or msgstr[0]
    pub translation_singular: String,
    /// msgstr[1], msgstr[2], ...
    pub translation_plurals: Vec<String>,
}

impl TableEntry {
    /// Translation for plural form `index`
    ///
    /// Missing slots and empty (untranslated) strings yield `None`.
    pub fn form(&self, index: usize) -> Option<&str> {
        let form = match index {
            0 => Some(self.translation_singular.as_str()),
            k => self.translation_plurals.get(k - 1).map(|s| s.as_str()),
        };
        form.filter(|s| !s.is_empty())
    }
}

/// Map from context + msgid to translation data
pub type CatalogTable = HashMap<String, TableEntry>;

/// Catalog-wide data from the header entry
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogMetadata {
    /// Number of plural forms (nplurals)
    pub plural_count: usize,
    /// Compiled plural expression
    pub plural_expr: Option<PluralExpr>,
    /// Character set from Content-Type
    pub charset: Option<String>,
}

impl Default for CatalogMetadata {
    fn default() -> Self {
        CatalogMetadata {
            plural_count: 2,
            plural_expr: None,
            charset: None,
        }
    }
}

/// Runtime message catalog for lookups
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    table: CatalogTable,
    metadata: CatalogMetadata,
}

impl Catalog {
    /// Create a catalog from a parsed table and its metadata
    pub fn new(table: CatalogTable, metadata: CatalogMetadata) -> Self {
        Catalog { table, metadata }
    }

    /// A catalog without translations; every lookup returns the original
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a catalog from a .mo file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MoError> {
        MoFile::open(path).map(Catalog::from)
    }

    /// Load a catalog from the bytes of a .mo file
    pub fn from_bytes(data: &[u8]) -> Result<Self, MoError> {
        MoFile::read(data).map(Catalog::from)
    }

    /// Look up a message, returning `original` when there is no translation
    pub fn translate<'a>(&'a self, original: &'a str, context: Option<&str>) -> &'a str {
        self.table
            .get(&table_key(original, context))
            .and_then(|entry| entry.form(0))
            .unwrap_or(original)
    }

    /// Look up a plural message
    ///
    /// Without a usable translation, `singular` is returned when `count` is 1
    /// and `plural` otherwise.
    pub fn translate_plural<'a>(
        &'a self,
        singular: &'a str,
        plural: &'a str,
        count: u64,
        context: Option<&str>,
    ) -> &'a str {
        let fallback = if count == 1 { singular } else { plural };

        let Some(entry) = self.table.get(&table_key(singular, context)) else {
            return fallback;
        };

        let index = self.plural_index(count);
        if index >= self.metadata.plural_count {
            warn!(
                "plural index {} for n={} out of range (nplurals={})",
                index, count, self.metadata.plural_count
            );
            return fallback;
        }

        entry.form(index).unwrap_or(fallback)
    }

    /// Get the plural form index for a count
    pub fn plural_index(&self, count: u64) -> usize {
        match self.metadata.plural_expr {
            Some(ref expr) => usize::try_from(expr.evaluate(count)).unwrap_or(usize::MAX),
            None => default_plural_index(count),
        }
    }

    /// Character set declared in the header entry
    pub fn charset(&self) -> Option<&str> {
        self.metadata.charset.as_deref()
    }

    /// Number of plural forms (nplurals)
    pub fn plural_count(&self) -> usize {
        self.metadata.plural_count
    }

    /// Header data of this catalog
    pub fn metadata(&self) -> &CatalogMetadata {
        &self.metadata
    }

    /// Raw entry for a message, if present
    pub fn get(&self, original: &str, context: Option<&str>) -> Option<&TableEntry> {
        self.table.get(&table_key(original, context))
    }

    /// Number of messages (the header entry is not counted)
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the catalog holds no messages
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl From<MoFile> for Catalog {
    fn from(mo: MoFile) -> Self {
        Catalog::new(mo.table, mo.metadata)
    }
}
