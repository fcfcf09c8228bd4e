//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use crate::fixture;
use gettext_catalog::{load_catalog, Catalog, MoWriter, PoOptions, PoReader};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;
use test_log::test;

/// Compile the fixture .po file into a .mo file and load it back
fn compile_fixture(dir: &TempDir) -> Catalog {
    let reader = PoReader::open(fixture("test.po"), PoOptions::default()).unwrap();
    let mo_path = dir.path().join("test.mo");

    let mut writer = MoWriter::new();
    writer.add_list(reader.into_list());
    writer.write(&mo_path).unwrap();

    load_catalog(&mo_path).unwrap()
}

#[test]
fn test_standard_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = compile_fixture(&dir);

    assert_eq!(catalog.len(), 6);
    assert_eq!(catalog.charset(), Some("UTF-8"));
    assert_eq!(
        catalog.translate("Standard test: Lorem ipsum dolor sit amet.", None),
        "Standard test: LOREM IPSUM DOLOR SIT AMET."
    );
    assert_eq!(
        catalog.translate("Not in the catalog.", None),
        "Not in the catalog."
    );
}

#[test]
fn test_fuzzy_entry_not_compiled() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = compile_fixture(&dir);

    let msgid = "Fuzzy test: Lorem ipsum dolor sit amet.";
    assert!(catalog.get(msgid, None).is_none());
    assert_eq!(catalog.translate(msgid, None), msgid);
}

#[test]
fn test_plural_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = compile_fixture(&dir);

    let singular = "Plural test: %d test.";
    let plural = "Plural test: %d tests.";
    assert_eq!(catalog.plural_count(), 4);

    assert_eq!(
        catalog.translate_plural(singular, plural, 1, None),
        "Plural test: %d TEST."
    );
    assert_eq!(
        catalog.translate_plural(singular, plural, 2, None),
        "Plural test: %d (TWO) TESTS."
    );
    assert_eq!(
        catalog.translate_plural(singular, plural, 3, None),
        "Plural test: %d (OTHER) TESTS."
    );
    assert_eq!(
        catalog.translate_plural(singular, plural, 8, None),
        "Plural test: %d (EIGHT OR ELEVEN) TESTS."
    );
    assert_eq!(
        catalog.translate_plural(singular, plural, 11, None),
        "Plural test: %d (EIGHT OR ELEVEN) TESTS."
    );
    assert_eq!(
        catalog.translate_plural(singular, plural, 0, None),
        "Plural test: %d (OTHER) TESTS."
    );

    // unknown messages fall back to the English rule
    assert_eq!(catalog.translate_plural("%d cat", "%d cats", 1, None), "%d cat");
    assert_eq!(catalog.translate_plural("%d cat", "%d cats", 2, None), "%d cats");
}

#[test]
fn test_context_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = compile_fixture(&dir);

    let msgid = "Context test: Lorem ipsum dolor sit amet.";
    assert_eq!(
        catalog.translate(msgid, None),
        "Context test: LOREM IPSUM DOLOR SIT AMET (NULL CONTEXT)."
    );
    assert_eq!(
        catalog.translate(msgid, Some("")),
        "Context test: LOREM IPSUM DOLOR SIT AMET (EMPTY CONTEXT)."
    );
    assert_eq!(
        catalog.translate(msgid, Some("Context 1")),
        "Context test: LOREM IPSUM DOLOR SIT AMET (CONTEXT 1)."
    );
    assert_eq!(
        catalog.translate(msgid, Some("Context 2")),
        "Context test: LOREM IPSUM DOLOR SIT AMET (CONTEXT 2)."
    );
    assert_eq!(catalog.translate(msgid, Some("Context 3")), msgid);
}

#[test]
fn test_shared_between_threads() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Arc::new(compile_fixture(&dir));

    let handles: Vec<_> = (0..4u64)
        .map(|n| {
            let catalog = Arc::clone(&catalog);
            thread::spawn(move || {
                catalog
                    .translate_plural("Plural test: %d test.", "Plural test: %d tests.", n, None)
                    .to_string()
            })
        })
        .collect();

    let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(
        results,
        vec![
            "Plural test: %d (OTHER) TESTS.",
            "Plural test: %d TEST.",
            "Plural test: %d (TWO) TESTS.",
            "Plural test: %d (OTHER) TESTS.",
        ]
    );
}
