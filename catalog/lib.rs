//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! gettext-catalog library
//!
//! Reading, writing and querying GNU gettext message catalogs:
//! - .mo binary catalogs (both byte orders, revision 0)
//! - .po text catalogs
//! - plural form selection from the `Plural-Forms` header
//!
//! Locating catalog files and caching loaded catalogs is left to the caller.

pub mod gettext_lib;

use std::path::Path;

pub use gettext_lib::catalog::Catalog;
pub use gettext_lib::entry::{CatalogEntry, Msgstr};
pub use gettext_lib::mo_file::MoError;
pub use gettext_lib::mo_writer::MoWriter;
pub use gettext_lib::plural::{PluralError, PluralExpr};
pub use gettext_lib::po_file::{PoError, PoOptions, PoReader};

/// Load a .mo catalog from disk
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog, MoError> {
    Catalog::open(path)
}

/// Serialize entries into the bytes of a .mo file
pub fn build_catalog_from_entries<I>(entries: I) -> Result<Vec<u8>, MoError>
where
    I: IntoIterator<Item = CatalogEntry>,
{
    let mut writer = MoWriter::new();
    writer.add_list(entries);
    writer.build()
}
