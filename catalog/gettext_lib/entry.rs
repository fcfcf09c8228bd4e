//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Translation entries shared by the .po reader and the .mo writer

/// Separator between the context and the message ID in a catalog key
pub const CONTEXT_SEPARATOR: char = '\x04';

/// Separator between plural forms in original and translated strings
pub const PLURAL_SEPARATOR: char = '\0';

/// Translated string(s) of an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msgstr {
    /// `msgstr "..."`
    Single(String),
    /// `msgstr[0] "..."`, `msgstr[1] "..."`, ... indexed by plural form
    Plural(Vec<String>),
}

impl Msgstr {
    /// The string stored in the translation pool of a .mo file
    pub fn joined(&self) -> String {
        match self {
            Msgstr::Single(s) => s.clone(),
            Msgstr::Plural(forms) => forms.join("\0"),
        }
    }

    /// Translation for plural form `index` (0 for singular entries)
    pub fn form(&self, index: usize) -> Option<&str> {
        match self {
            Msgstr::Single(s) if index == 0 => Some(s),
            Msgstr::Single(_) => None,
            Msgstr::Plural(forms) => forms.get(index).map(|s| s.as_str()),
        }
    }
}

impl Default for Msgstr {
    fn default() -> Self {
        Msgstr::Single(String::new())
    }
}

/// A single translation entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Message context (msgctxt)
    pub msgctxt: Option<String>,
    /// Original string (msgid)
    pub msgid: String,
    /// Plural original (msgid_plural)
    pub msgid_plural: Option<String>,
    /// Translation(s)
    pub msgstr: Msgstr,
    /// Flags from `#,` comments (fuzzy, c-format, ...)
    pub flags: Vec<String>,
}

impl CatalogEntry {
    /// Create a singular entry without context
    pub fn new(msgid: impl Into<String>, msgstr: impl Into<String>) -> Self {
        CatalogEntry {
            msgid: msgid.into(),
            msgstr: Msgstr::Single(msgstr.into()),
            ..Default::default()
        }
    }

    /// Create a plural entry without context
    pub fn with_plural(
        msgid: impl Into<String>,
        msgid_plural: impl Into<String>,
        forms: Vec<String>,
    ) -> Self {
        CatalogEntry {
            msgid: msgid.into(),
            msgid_plural: Some(msgid_plural.into()),
            msgstr: Msgstr::Plural(forms),
            ..Default::default()
        }
    }

    /// Set the message context
    pub fn with_context(mut self, msgctxt: impl Into<String>) -> Self {
        self.msgctxt = Some(msgctxt.into());
        self
    }

    /// Key under which this entry is stored in a catalog
    pub fn key(&self) -> String {
        table_key(&self.msgid, self.msgctxt.as_deref())
    }

    /// Check if this is the header entry (empty msgid, no context)
    pub fn is_header(&self) -> bool {
        self.msgid.is_empty() && self.msgctxt.is_none()
    }

    /// Check if this is a plural entry
    pub fn is_plural(&self) -> bool {
        self.msgid_plural.is_some()
    }

    /// Check if the entry carries the `fuzzy` flag
    pub fn is_fuzzy(&self) -> bool {
        self.flags.iter().any(|f| f == "fuzzy")
    }
}

/// Build the catalog key for a message and optional context
///
/// An empty context is distinct from no context at all.
pub fn table_key(msgid: &str, msgctxt: Option<&str>) -> String {
    match msgctxt {
        Some(ctx) => {
            let mut key = String::with_capacity(ctx.len() + 1 + msgid.len());
            key.push_str(ctx);
            key.push(CONTEXT_SEPARATOR);
            key.push_str(msgid);
            key
        }
        None => msgid.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_key() {
        assert_eq!(table_key("File", None), "File");
        assert_eq!(table_key("File", Some("menu")), "menu\x04File");
        assert_eq!(table_key("File", Some("")), "\x04File");
    }

    #[test]
    fn test_msgstr_joined() {
        assert_eq!(Msgstr::Single("Hola".to_string()).joined(), "Hola");
        let forms = Msgstr::Plural(vec!["plik".to_string(), "pliki".to_string()]);
        assert_eq!(forms.joined(), "plik\0pliki");
        assert_eq!(forms.form(1), Some("pliki"));
        assert_eq!(forms.form(2), None);
    }

    #[test]
    fn test_entry_helpers() {
        let mut entry = CatalogEntry::new("Open", "Abrir").with_context("menu");
        assert_eq!(entry.key(), "menu\x04Open");
        assert!(!entry.is_header());
        assert!(!entry.is_fuzzy());

        entry.flags = vec!["c-format".to_string(), "fuzzy".to_string()];
        assert!(entry.is_fuzzy());

        assert!(CatalogEntry::new("", "Project-Id-Version: x\n").is_header());
    }
}
