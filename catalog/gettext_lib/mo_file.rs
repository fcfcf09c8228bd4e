//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! GNU .mo file format reader
//!
//! The .mo (Machine Object) file format is the binary format used by GNU gettext
//! for storing translated message catalogs:
//!
//! ```text
//! offset 0    magic number
//! offset 4    file format revision (0)
//! offset 8    N, number of strings
//! offset 12   O, offset of table with original strings
//! offset 16   T, offset of table with translation strings
//! offset 20   S, size of hashing table
//! offset 24   H, offset of hashing table
//! ```
//!
//! Each of the two tables holds N (length, offset) pairs locating the
//! strings inside the file.  The whole file is loaded into one buffer and
//! strings are sliced out of it.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::{debug, trace};
use regex::Regex;
use std::io::{self, Read};
use std::path::Path;
use std::sync::LazyLock;

use crate::gettext_lib::catalog::{CatalogMetadata, CatalogTable, TableEntry};
use crate::gettext_lib::entry::{table_key, CONTEXT_SEPARATOR, PLURAL_SEPARATOR};
use crate::gettext_lib::plural::{parse_plural_forms, PluralError};

/// Magic number of a .mo file, as a u32 in the file's own byte order
pub const MO_MAGIC: u32 = 0x950412de;

/// Magic bytes of a big-endian .mo file
pub const MO_MAGIC_BE: [u8; 4] = [0x95, 0x04, 0x12, 0xde];

/// Magic bytes of a little-endian .mo file
pub const MO_MAGIC_LE: [u8; 4] = [0xde, 0x12, 0x04, 0x95];

static CHARSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^charset\s*=\s*(\S+)$").expect("invalid regex"));

/// Header of a .mo file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoHeader {
    /// File format revision (only 0 is supported)
    pub revision: u32,
    /// Number of strings
    pub nstrings: u32,
    /// Offset of table with original strings
    pub orig_tab_offset: u32,
    /// Offset of table with translation strings
    pub trans_tab_offset: u32,
    /// Size of hashing table (unused)
    pub hash_tab_size: u32,
    /// Offset of hashing table (unused)
    pub hash_tab_offset: u32,
}

impl MoHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = 28;
}

/// A string descriptor (length + offset pair) in the .mo file
#[derive(Debug, Clone, Copy, Default)]
pub struct StringDescriptor {
    /// Length of the string (excluding null terminator)
    pub length: u32,
    /// Offset of the string from the start of the file
    pub offset: u32,
}

impl StringDescriptor {
    /// Size of a string descriptor in bytes
    pub const SIZE: usize = 8;
}

/// Error type for .mo file operations
#[derive(Debug, thiserror::Error)]
pub enum MoError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Magic number matches neither byte order
    #[error("not a gettext binary catalog (magic {0:02x?})")]
    InvalidMagic([u8; 4]),
    /// Revision other than 0
    #[error("unsupported revision: {0}")]
    UnsupportedRevision(u32),
    /// Truncated file or offsets pointing outside of it
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    /// String is not valid UTF-8
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    /// Plural-Forms expression outside the accepted grammar
    #[error("invalid plural expression: {0}")]
    Plural(#[from] PluralError),
    /// Two entries share the same context and msgid
    #[error("duplicate msgid: {0}")]
    DuplicateKey(String),
}

/// Parsed .mo file
#[derive(Debug, Clone)]
pub struct MoFile {
    /// File header
    pub header: MoHeader,
    /// Whether the file is little-endian
    pub is_little_endian: bool,
    /// Messages keyed by context + msgid
    pub table: CatalogTable,
    /// Data taken from the header entry
    pub metadata: CatalogMetadata,
}

impl MoFile {
    /// Read a .mo file from bytes
    pub fn read(data: &[u8]) -> Result<Self, MoError> {
        if data.len() < MoHeader::SIZE {
            return Err(MoError::InvalidFormat("file too small".to_string()));
        }

        let magic = [data[0], data[1], data[2], data[3]];
        let is_little_endian = if magic == MO_MAGIC_LE {
            true
        } else if magic == MO_MAGIC_BE {
            false
        } else {
            return Err(MoError::InvalidMagic(magic));
        };

        let header = Self::read_header(data, is_little_endian)?;
        if header.revision != 0 {
            return Err(MoError::UnsupportedRevision(header.revision));
        }

        debug!(
            "reading {}-endian catalog with {} strings",
            if is_little_endian { "little" } else { "big" },
            header.nstrings
        );

        let mut table = CatalogTable::new();
        let mut metadata = CatalogMetadata::default();

        let nstrings = header.nstrings;
        let originals = Self::read_table(data, header.orig_tab_offset, nstrings, is_little_endian)?;
        let translations =
            Self::read_table(data, header.trans_tab_offset, nstrings, is_little_endian)?;

        for (orig_desc, trans_desc) in originals.iter().zip(&translations) {
            let original = Self::read_string(data, orig_desc)?;
            let translation = Self::read_string(data, trans_desc)?;

            if original.is_empty() {
                metadata = Self::parse_header_entry(&translation)?;
            } else {
                let (key, entry) = Self::parse_translation(&original, &translation);
                table.insert(key, entry);
            }
        }

        debug!(
            "catalog loaded: {} messages, nplurals={}, charset={:?}",
            table.len(),
            metadata.plural_count,
            metadata.charset
        );

        Ok(MoFile {
            header,
            is_little_endian,
            table,
            metadata,
        })
    }

    /// Read a .mo file from a reader
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self, MoError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::read(&data)
    }

    /// Read a .mo file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MoError> {
        let path = path.as_ref();
        debug!("loading catalog {}", path.display());
        let data = std::fs::read(path)?;
        Self::read(&data)
    }

    /// Read the header from the data
    fn read_header(data: &[u8], le: bool) -> Result<MoHeader, MoError> {
        Ok(MoHeader {
            revision: Self::read_u32(data, 4, le)?,
            nstrings: Self::read_u32(data, 8, le)?,
            orig_tab_offset: Self::read_u32(data, 12, le)?,
            trans_tab_offset: Self::read_u32(data, 16, le)?,
            hash_tab_size: Self::read_u32(data, 20, le)?,
            hash_tab_offset: Self::read_u32(data, 24, le)?,
        })
    }

    /// Read `count` string descriptors starting at `offset`
    fn read_table(
        data: &[u8],
        offset: u32,
        count: u32,
        le: bool,
    ) -> Result<Vec<StringDescriptor>, MoError> {
        let start = offset as usize;
        let end = (count as usize)
            .checked_mul(StringDescriptor::SIZE)
            .and_then(|size| size.checked_add(start));
        if end.is_none_or(|end| end > data.len()) {
            return Err(MoError::InvalidFormat(
                "string descriptor table out of bounds".to_string(),
            ));
        }

        (0..count as usize)
            .map(|i| {
                let pos = start + i * StringDescriptor::SIZE;
                Ok(StringDescriptor {
                    length: Self::read_u32(data, pos, le)?,
                    offset: Self::read_u32(data, pos + 4, le)?,
                })
            })
            .collect()
    }

    /// Read a string from the data
    fn read_string(data: &[u8], desc: &StringDescriptor) -> Result<String, MoError> {
        let start = desc.offset as usize;
        let bytes = start
            .checked_add(desc.length as usize)
            .and_then(|end| data.get(start..end))
            .ok_or_else(|| MoError::InvalidFormat("string data out of bounds".to_string()))?;

        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Read a u32 value with the specified endianness
    fn read_u32(data: &[u8], offset: usize, le: bool) -> Result<u32, MoError> {
        let bytes = data
            .get(offset..offset + 4)
            .ok_or_else(|| MoError::InvalidFormat(format!("short read at offset {}", offset)))?;
        Ok(if le {
            LittleEndian::read_u32(bytes)
        } else {
            BigEndian::read_u32(bytes)
        })
    }

    /// Split a stored original/translation pair into its table entry
    ///
    /// The original is `[context EOT] singular [NUL plural]`, the translation
    /// `form0 [NUL form1 ...]`.
    fn parse_translation(original: &str, translation: &str) -> (String, TableEntry) {
        let (context, original) = match original.split_once(CONTEXT_SEPARATOR) {
            Some((ctx, rest)) => (Some(ctx), rest),
            None => (None, original),
        };

        let mut originals = original.split(PLURAL_SEPARATOR);
        let singular = originals.next().unwrap_or_default();
        let original_plurals = originals.map(str::to_string).collect();

        let mut forms = translation.split(PLURAL_SEPARATOR);
        let translation_singular = forms.next().unwrap_or_default().to_string();
        let translation_plurals = forms.map(str::to_string).collect();

        (
            table_key(singular, context),
            TableEntry {
                original_plurals,
                translation_singular,
                translation_plurals,
            },
        )
    }

    /// Parse the header entry (msgid = "") to extract plural forms and charset
    ///
    /// Header names are compared case-insensitively; unknown headers are
    /// skipped.
    pub fn parse_header_entry(header_str: &str) -> Result<CatalogMetadata, MoError> {
        let mut metadata = CatalogMetadata::default();

        for line in header_str.split('\n') {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let name = name.trim().to_ascii_lowercase();
            trace!("header {}: {}", name, value.trim());

            if name == "plural-forms" {
                let forms = parse_plural_forms(value)?;
                if let Some(nplurals) = forms.nplurals {
                    metadata.plural_count = nplurals;
                }
                if forms.expr.is_some() {
                    metadata.plural_expr = forms.expr;
                }
            } else if name == "content-type" {
                for part in value.split(';') {
                    if let Some(caps) = CHARSET_RE.captures(part.trim()) {
                        metadata.charset = Some(caps[1].to_string());
                    }
                }
            }
        }

        Ok(metadata)
    }
}
