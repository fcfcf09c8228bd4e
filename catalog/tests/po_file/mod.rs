//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use crate::fixture;
use gettext_catalog::{Msgstr, PoError, PoOptions, PoReader};
use test_log::test;

#[test]
fn test_po_fixture() {
    let reader = PoReader::open(fixture("test.po"), PoOptions::default()).unwrap();
    let list: Vec<_> = reader.list().collect();

    assert_eq!(list.len(), 7);
    assert!(list[0].is_header());

    assert_eq!(list[1].msgid, "Standard test: Lorem ipsum dolor sit amet.");

    assert_eq!(
        list[2].msgid_plural.as_deref(),
        Some("Plural test: %d tests.")
    );
    assert_eq!(list[2].flags, vec!["c-format"]);
    assert_eq!(
        list[2].msgstr.form(3),
        Some("Plural test: %d (EIGHT OR ELEVEN) TESTS.")
    );

    assert_eq!(list[3].msgctxt.as_deref(), Some("Context 1"));
    assert_eq!(list[5].msgctxt.as_deref(), Some(""));
    assert_eq!(list[6].msgctxt, None);
    assert_eq!(
        list[6].msgstr,
        Msgstr::Single("Context test: LOREM IPSUM DOLOR SIT AMET (NULL CONTEXT).".to_string())
    );
}

#[test]
fn test_po_fixture_with_fuzzy() {
    let options = PoOptions { use_fuzzy: true };
    let entries = PoReader::open(fixture("test.po"), options)
        .unwrap()
        .into_list();

    assert_eq!(entries.len(), 8);
    assert!(entries[7].is_fuzzy());
    assert_eq!(entries[7].msgid, "Fuzzy test: Lorem ipsum dolor sit amet.");
}

#[test]
fn test_po_missing_file() {
    let result = PoReader::open(fixture("does-not-exist.po"), PoOptions::default());
    assert!(matches!(result, Err(PoError::Io(_))));
}

#[test]
fn test_po_syntax_error_reports_line() {
    let input = "msgid \"ok\"\nmsgstr \"ok\"\n\nmsgid \"broken\nmsgstr \"\"\n";
    let err = PoReader::parse_str(input, PoOptions::default()).unwrap_err();
    assert!(matches!(err, PoError::Syntax { line: 4, .. }));
    assert_eq!(err.to_string(), "line 4: unterminated string");
}
