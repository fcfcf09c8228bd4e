//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! .po (Portable Object) file parser
//!
//! The .po file format is a human-readable format for translated message catalogs.
//! This module turns a .po file into a list of [`CatalogEntry`] values that
//! can be handed to the .mo writer.
//!
//! PO file format:
//! - Comments: lines starting with #
//!   - #, - flags (fuzzy, c-format, etc.)
//!   - every other comment is skipped
//! - msgctxt "context" - message context (optional)
//! - msgid "original" - original string
//! - msgid_plural "plural" - plural original (optional)
//! - msgstr "translation" - translation (for singular)
//! - msgstr[N] "translation" - plural translations
//! - "..." - continuation of the previous string
//! - blank line - end of entry

use log::debug;
use regex::Regex;
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::LazyLock;

use crate::gettext_lib::entry::{CatalogEntry, Msgstr};

static MSGSTR_INDEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^msgstr\[(\d+)\]$").expect("invalid regex"));

static FLAG_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*").expect("invalid regex"));

/// Upper bound for N in `msgstr[N]`
const MAX_PLURAL_FORMS: usize = 256;

/// Error type for .po file parsing
#[derive(Debug, thiserror::Error)]
pub enum PoError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Grammar violation with line number
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// Options controlling which entries are returned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoOptions {
    /// Keep entries flagged `fuzzy`
    pub use_fuzzy: bool,
}

/// Entry under construction
#[derive(Debug, Default)]
struct PendingEntry {
    msgctxt: Option<String>,
    msgid: Option<String>,
    msgid_plural: Option<String>,
    msgstr: Option<String>,
    msgstr_plural: BTreeMap<usize, String>,
    flags: Vec<String>,
}

impl PendingEntry {
    /// True once any keyword has been stored; flags alone do not count
    fn has_content(&self) -> bool {
        self.msgctxt.is_some()
            || self.msgid.is_some()
            || self.msgid_plural.is_some()
            || self.msgstr.is_some()
            || !self.msgstr_plural.is_empty()
    }
}

/// Keyword a pending string is stored under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Msgctxt,
    Msgid,
    MsgidPlural,
    Msgstr,
    MsgstrIndex(usize),
}

/// Line-oriented .po parser
struct PoParser {
    line_number: usize,
    pending: Option<(Keyword, String)>,
    entry: PendingEntry,
    entries: Vec<CatalogEntry>,
}

impl PoParser {
    fn new() -> Self {
        PoParser {
            line_number: 0,
            pending: None,
            entry: PendingEntry::default(),
            entries: Vec::new(),
        }
    }

    fn syntax(&self, message: impl Into<String>) -> PoError {
        PoError::Syntax {
            line: self.line_number,
            message: message.into(),
        }
    }

    fn parse<R: BufRead>(mut self, reader: R) -> Result<Vec<CatalogEntry>, PoError> {
        for line in reader.lines() {
            let line = line?;
            self.line_number += 1;
            self.parse_line(&line)?;
        }
        self.flush_entry()?;

        Ok(self.entries)
    }

    fn parse_line(&mut self, line: &str) -> Result<(), PoError> {
        let line = line.trim_matches(|c: char| c.is_whitespace() || c == '\0');

        if line.is_empty() {
            self.flush_entry()
        } else if let Some(comment) = line.strip_prefix('#') {
            self.flush_string();
            if let Some(flags) = comment.strip_prefix(',') {
                self.entry.flags.extend(
                    FLAG_SEPARATOR_RE
                        .split(flags)
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .map(str::to_string),
                );
            }
            Ok(())
        } else if line.starts_with('"') {
            let value = self.parse_quoted(line)?;
            if let Some((_, buf)) = self.pending.as_mut() {
                buf.push_str(&value);
                Ok(())
            } else {
                Err(self.syntax("unexpected string"))
            }
        } else {
            self.flush_string();

            let (keyword, value) = line
                .split_once(char::is_whitespace)
                .ok_or_else(|| self.syntax(format!("missing string after '{}'", line)))?;
            let keyword = self.parse_keyword(keyword)?;
            let value = self.parse_quoted(value.trim_start())?;
            self.pending = Some((keyword, value));
            Ok(())
        }
    }

    fn parse_keyword(&self, keyword: &str) -> Result<Keyword, PoError> {
        match keyword {
            "msgctxt" => Ok(Keyword::Msgctxt),
            "msgid" => Ok(Keyword::Msgid),
            "msgid_plural" => Ok(Keyword::MsgidPlural),
            "msgstr" => Ok(Keyword::Msgstr),
            _ => {
                let index = MSGSTR_INDEX_RE
                    .captures(keyword)
                    .and_then(|caps| caps[1].parse::<usize>().ok())
                    .ok_or_else(|| self.syntax(format!("unknown keyword '{}'", keyword)))?;
                if index >= MAX_PLURAL_FORMS {
                    return Err(self.syntax(format!("plural index {} too large", index)));
                }
                Ok(Keyword::MsgstrIndex(index))
            }
        }
    }

    /// Strip the surrounding quotes and unescape
    fn parse_quoted(&self, s: &str) -> Result<String, PoError> {
        if !s.starts_with('"') {
            return Err(self.syntax("expected quoted string"));
        }
        if s.len() < 2 || !s.ends_with('"') {
            return Err(self.syntax("unterminated string"));
        }
        unescape(&s[1..s.len() - 1]).map_err(|message| self.syntax(message))
    }

    /// Store the pending string in the current entry
    fn flush_string(&mut self) {
        let Some((keyword, value)) = self.pending.take() else {
            return;
        };
        let entry = &mut self.entry;
        match keyword {
            Keyword::Msgctxt => entry.msgctxt = Some(value),
            Keyword::Msgid => entry.msgid = Some(value),
            Keyword::MsgidPlural => entry.msgid_plural = Some(value),
            Keyword::Msgstr => entry.msgstr = Some(value),
            Keyword::MsgstrIndex(i) => {
                entry.msgstr_plural.insert(i, value);
            }
        }
    }

    /// Append the current entry to the list
    fn flush_entry(&mut self) -> Result<(), PoError> {
        self.flush_string();

        let pending = std::mem::take(&mut self.entry);
        if !pending.has_content() {
            return Ok(());
        }

        let msgid = pending
            .msgid
            .ok_or_else(|| self.syntax("missing msgid entry"))?;

        let msgstr = if !pending.msgstr_plural.is_empty() {
            let mut forms = pending.msgstr_plural;
            if let Some(single) = pending.msgstr {
                forms.entry(0).or_insert(single);
            }
            let len = forms.keys().next_back().map_or(0, |max| max + 1);
            let mut list = vec![String::new(); len];
            for (i, form) in forms {
                list[i] = form;
            }
            Msgstr::Plural(list)
        } else if let Some(single) = pending.msgstr {
            if pending.msgid_plural.is_some() {
                Msgstr::Plural(vec![single])
            } else {
                Msgstr::Single(single)
            }
        } else {
            return Err(self.syntax("missing msgstr entry"));
        };

        self.entries.push(CatalogEntry {
            msgctxt: pending.msgctxt,
            msgid,
            msgid_plural: pending.msgid_plural,
            msgstr,
            flags: pending.flags,
        });

        Ok(())
    }
}

/// Resolve C-style escape sequences
///
/// Octal and hex escapes produce raw bytes, so the result is checked for
/// UTF-8 validity once all escapes are resolved.  NUL bytes are refused
/// since .mo files use them to separate plural forms.
pub fn unescape(s: &str) -> Result<String, String> {
    let mut out: Vec<u8> = Vec::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        let Some(esc) = chars.next() else {
            return Err("trailing backslash".to_string());
        };
        match esc {
            'n' => out.push(b'\n'),
            't' => out.push(b'\t'),
            'r' => out.push(b'\r'),
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'v' => out.push(0x0b),
            '0'..='7' => {
                let mut value = esc.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                let byte = u8::try_from(value)
                    .map_err(|_| format!("octal escape \\{:o} out of range", value))?;
                out.push(byte);
            }
            'x' => {
                let mut value = 0u32;
                let mut digits = 0;
                while digits < 2 {
                    match chars.peek().and_then(|c| c.to_digit(16)) {
                        Some(d) => {
                            value = value * 16 + d;
                            chars.next();
                            digits += 1;
                        }
                        None => break,
                    }
                }
                if digits == 0 {
                    out.push(b'x');
                } else {
                    out.push(value as u8);
                }
            }
            // \\ \" \' \? and unknown escapes keep the escaped character
            other => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }

    if out.contains(&0) {
        return Err("NUL byte in string".to_string());
    }
    String::from_utf8(out).map_err(|_| "invalid UTF-8 in escaped string".to_string())
}

/// Entries read from a .po file
#[derive(Debug, Clone, Default)]
pub struct PoReader {
    options: PoOptions,
    entries: Vec<CatalogEntry>,
}

impl PoReader {
    /// Parse .po text held in memory
    pub fn parse_str(s: &str, options: PoOptions) -> Result<Self, PoError> {
        Self::parse_from(s.as_bytes(), options)
    }

    /// Parse a .po file from a reader
    pub fn parse_from<R: Read>(reader: R, options: PoOptions) -> Result<Self, PoError> {
        let entries = PoParser::new().parse(BufReader::new(reader))?;
        debug!(
            "parsed {} entries ({} fuzzy)",
            entries.len(),
            entries.iter().filter(|e| e.is_fuzzy()).count()
        );
        Ok(PoReader { options, entries })
    }

    /// Parse a .po file from disk
    pub fn open<P: AsRef<Path>>(path: P, options: PoOptions) -> Result<Self, PoError> {
        let path = path.as_ref();
        debug!("reading {}", path.display());
        let file = std::fs::File::open(path)?;
        Self::parse_from(file, options)
    }

    /// The options this reader was created with
    pub fn options(&self) -> PoOptions {
        self.options
    }

    fn keep(&self, entry: &CatalogEntry) -> bool {
        self.options.use_fuzzy || !entry.is_fuzzy()
    }

    /// Entries, without fuzzy ones unless `use_fuzzy` is set
    pub fn list(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| self.keep(e))
    }

    /// Consume the reader, returning the same entries as [`PoReader::list`]
    pub fn into_list(self) -> Vec<CatalogEntry> {
        let use_fuzzy = self.options.use_fuzzy;
        self.entries
            .into_iter()
            .filter(|e| use_fuzzy || !e.is_fuzzy())
            .collect()
    }

    /// Every parsed entry, fuzzy or not
    pub fn all(&self) -> &[CatalogEntry] {
        &self.entries
    }
}
