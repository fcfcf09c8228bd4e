//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use gettext_catalog::gettext_lib::mo_file::{MoFile, MO_MAGIC_BE};
use gettext_catalog::{build_catalog_from_entries, Catalog, CatalogEntry, MoError, MoWriter};
use proptest::prelude::*;
use std::collections::BTreeSet;
use test_log::test;

/// Rewrite a little-endian catalog produced by MoWriter in big-endian order
fn to_big_endian(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    let count = u32::from_le_bytes([data[8], data[9], data[10], data[11]]) as usize;
    let words_end = 28 + 16 * count;

    out[0..4].copy_from_slice(&MO_MAGIC_BE);
    for word in out[4..words_end].chunks_exact_mut(4) {
        word.reverse();
    }
    out
}

fn sample_entries() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new(
            "",
            "Content-Type: text/plain; charset=UTF-8\nPlural-Forms: nplurals=3; plural=(n==1 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);\n",
        ),
        CatalogEntry::new("Hello", "Cześć"),
        CatalogEntry::new("Open", "Otwórz").with_context("menu"),
        CatalogEntry::with_plural(
            "%d file",
            "%d files",
            vec!["%d plik".into(), "%d pliki".into(), "%d plików".into()],
        ),
    ]
}

#[test]
fn test_endianness_independent() {
    let le = build_catalog_from_entries(sample_entries()).unwrap();
    let be = to_big_endian(&le);
    assert_ne!(le, be);

    let le_mo = MoFile::read(&le).unwrap();
    let be_mo = MoFile::read(&be).unwrap();
    assert!(le_mo.is_little_endian);
    assert!(!be_mo.is_little_endian);
    assert_eq!(le_mo.table, be_mo.table);
    assert_eq!(le_mo.metadata, be_mo.metadata);

    let be_catalog = Catalog::from(be_mo);
    assert_eq!(be_catalog.translate("Open", Some("menu")), "Otwórz");
    assert_eq!(be_catalog.translate_plural("%d file", "%d files", 23, None), "%d pliki");
}

#[test]
fn test_write_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pl.mo");

    let mut writer = MoWriter::new();
    writer.add_list(sample_entries());
    writer.write(&path).unwrap();

    let catalog = gettext_catalog::load_catalog(&path).unwrap();
    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.charset(), Some("UTF-8"));
    assert_eq!(catalog.plural_count(), 3);
    assert_eq!(catalog.translate("Hello", None), "Cześć");
    assert_eq!(catalog.translate_plural("%d file", "%d files", 1, None), "%d plik");
    assert_eq!(catalog.translate_plural("%d file", "%d files", 4, None), "%d pliki");
    assert_eq!(catalog.translate_plural("%d file", "%d files", 12, None), "%d plików");
}

#[test]
fn test_load_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = gettext_catalog::load_catalog(dir.path().join("missing.mo"));
    assert!(matches!(missing, Err(MoError::Io(_))));

    let garbage = dir.path().join("garbage.mo");
    std::fs::write(&garbage, b"this is not a catalog, just some text").unwrap();
    let err = gettext_catalog::load_catalog(&garbage).unwrap_err();
    assert!(matches!(err, MoError::InvalidMagic(_)));
    assert!(err.to_string().starts_with("not a gettext binary catalog"));
}

#[test]
fn test_duplicate_across_batches() {
    let mut writer = MoWriter::new();
    writer.add_list(vec![CatalogEntry::new("Open", "Abrir").with_context("menu")]);
    writer.add_list(vec![CatalogEntry::new("Open", "Abre").with_context("menu")]);
    assert!(matches!(writer.build(), Err(MoError::DuplicateKey(_))));
}

#[test]
fn test_separator_in_msgid_not_written() {
    let entries = vec![CatalogEntry::new("a\0x", "AX"), CatalogEntry::new("a\0y", "AY")];
    assert!(matches!(
        build_catalog_from_entries(entries),
        Err(MoError::InvalidFormat(_))
    ));
}

/// Message text without the separator bytes used by the format
fn message() -> impl Strategy<Value = String> {
    "[^\u{0}\u{4}]{1,12}"
}

proptest! {
    #[test]
    fn decode_matches_encoded_entries(
        singles in proptest::collection::btree_map(message(), "[^\u{0}]{0,12}", 0..16),
        plurals in proptest::collection::btree_map(
            message(),
            proptest::collection::vec("[^\u{0}]{1,8}", 2..4),
            0..6,
        ),
        context in proptest::option::of(message()),
    ) {
        let mut entries: Vec<CatalogEntry> = singles
            .iter()
            .map(|(id, s)| CatalogEntry::new(id.clone(), s.clone()))
            .collect();
        let mut plural_keys = BTreeSet::new();
        for (id, forms) in &plurals {
            let mut entry = CatalogEntry::with_plural(id.clone(), format!("{}s", id), forms.clone());
            if let Some(ref ctx) = context {
                entry = entry.with_context(ctx.clone());
            }
            plural_keys.insert(entry.key());
            entries.push(entry);
        }
        prop_assume!(plural_keys.iter().all(|k| !singles.contains_key(k)));

        let catalog = Catalog::from_bytes(&build_catalog_from_entries(entries).unwrap()).unwrap();

        for (id, s) in &singles {
            let expected = if s.is_empty() { id.as_str() } else { s.as_str() };
            prop_assert_eq!(catalog.translate(id, None), expected);
        }
        for (id, forms) in &plurals {
            let entry = catalog.get(id, context.as_deref()).unwrap();
            prop_assert_eq!(&entry.translation_singular, &forms[0]);
            prop_assert_eq!(&entry.translation_plurals[..], &forms[1..]);
            prop_assert_eq!(&entry.original_plurals, &vec![format!("{}s", id)]);
        }
    }
}
