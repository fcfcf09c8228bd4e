//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! GNU .mo file writer
//!
//! Entries are sorted by key (context + EOT + msgid) and laid out as header,
//! original offset table, translation offset table, original strings and
//! translation strings.  No hash table is written.

use byteorder::{LittleEndian, WriteBytesExt};
use log::debug;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::gettext_lib::entry::{CatalogEntry, Msgstr, CONTEXT_SEPARATOR, PLURAL_SEPARATOR};
use crate::gettext_lib::mo_file::{MoError, MoHeader, StringDescriptor, MO_MAGIC};

/// Builder for .mo files
#[derive(Debug, Clone, Default)]
pub struct MoWriter {
    entries: Vec<CatalogEntry>,
}

impl MoWriter {
    /// Create a writer with no entries
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of entries
    ///
    /// Duplicates are not checked here; [`MoWriter::build`] rejects them.
    pub fn add_list<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = CatalogEntry>,
    {
        self.entries.extend(entries);
    }

    /// Entries added so far
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Map each key to its entry index, sorted by key
    fn entry_table(&self) -> Result<BTreeMap<String, usize>, MoError> {
        let mut table = BTreeMap::new();

        for (i, entry) in self.entries.iter().enumerate() {
            check_separators(entry)?;
            if table.insert(entry.key(), i).is_some() {
                return Err(MoError::DuplicateKey(entry.msgid.clone()));
            }
        }

        Ok(table)
    }

    /// Build the .mo file contents
    pub fn build(&self) -> Result<Vec<u8>, MoError> {
        let table = self.entry_table()?;

        let mut originals = Vec::with_capacity(table.len());
        let mut translations = Vec::with_capacity(table.len());
        for (key, &i) in &table {
            let entry = &self.entries[i];

            let mut original = key.clone();
            if let Some(ref plural) = entry.msgid_plural {
                original.push(PLURAL_SEPARATOR);
                original.push_str(plural);
            }
            originals.push(original);
            translations.push(entry.msgstr.joined());
        }

        let nstrings = u32::try_from(table.len())
            .map_err(|_| MoError::InvalidFormat("too many entries".to_string()))?;
        let orig_tab_offset = MoHeader::SIZE as u32;
        let trans_tab_offset = orig_tab_offset + nstrings * StringDescriptor::SIZE as u32;
        let strings_offset = trans_tab_offset + nstrings * StringDescriptor::SIZE as u32;

        // Build string data and descriptors
        let mut descriptors = Vec::with_capacity(table.len() * 2);
        let mut string_data = Vec::new();
        for s in originals.iter().chain(&translations) {
            let offset = u32::try_from(string_data.len())
                .ok()
                .and_then(|len| len.checked_add(strings_offset))
                .ok_or_else(|| MoError::InvalidFormat("catalog too large".to_string()))?;
            descriptors.push(StringDescriptor {
                length: s.len() as u32,
                offset,
            });
            string_data.extend_from_slice(s.as_bytes());
            string_data.push(0); // null terminator
        }

        let mut data = Vec::with_capacity(strings_offset as usize + string_data.len());

        // Header, little-endian
        data.write_u32::<LittleEndian>(MO_MAGIC)?;
        data.write_u32::<LittleEndian>(0)?; // revision
        data.write_u32::<LittleEndian>(nstrings)?;
        data.write_u32::<LittleEndian>(orig_tab_offset)?;
        data.write_u32::<LittleEndian>(trans_tab_offset)?;
        data.write_u32::<LittleEndian>(0)?; // hash_tab_size
        data.write_u32::<LittleEndian>(0)?; // hash_tab_offset

        // Original descriptors are followed directly by translation descriptors
        for desc in &descriptors {
            data.write_u32::<LittleEndian>(desc.length)?;
            data.write_u32::<LittleEndian>(desc.offset)?;
        }

        data.extend_from_slice(&string_data);

        debug!("built catalog: {} entries, {} bytes", nstrings, data.len());

        Ok(data)
    }

    /// Write the .mo file to a writer
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), MoError> {
        let data = self.build()?;
        writer.write_all(&data)?;
        Ok(())
    }

    /// Write the .mo file to disk
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), MoError> {
        let mut file = BufWriter::new(File::create(path)?);
        self.write_to(&mut file)?;
        file.flush()?;
        Ok(())
    }
}

/// Reject strings that would be split differently when read back
fn check_separators(entry: &CatalogEntry) -> Result<(), MoError> {
    let separators: &[char] = &[PLURAL_SEPARATOR, CONTEXT_SEPARATOR];
    let reject = |field: &str| {
        Err(MoError::InvalidFormat(format!(
            "separator byte in {} of {:?}",
            field, entry.msgid
        )))
    };

    if entry.msgid.contains(separators) {
        return reject("msgid");
    }
    if entry.msgctxt.as_deref().is_some_and(|c| c.contains(separators)) {
        return reject("msgctxt");
    }
    if entry
        .msgid_plural
        .as_deref()
        .is_some_and(|p| p.contains(separators))
    {
        return reject("msgid_plural");
    }
    let msgstr_ok = match entry.msgstr {
        Msgstr::Single(ref s) => !s.contains(PLURAL_SEPARATOR),
        Msgstr::Plural(ref forms) => forms.iter().all(|f| !f.contains(PLURAL_SEPARATOR)),
    };
    if !msgstr_ok {
        return reject("msgstr");
    }

    Ok(())
}
