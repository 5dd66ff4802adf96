use pretty_assertions::assert_eq;

use docindex::{IndexManifest, IndexRecord, IndexRecordStore, MalformedRecordError, StoreError};

const GENERATED: &str =
    include_str!("../index-parser/tests/fixtures/payloads/documenter-search-index.js");
const GENERATED_PATH: &str = "index-parser/tests/fixtures/payloads/documenter-search-index.js";

#[test]
fn loads_generated_index() {
    let store = IndexRecordStore::load(GENERATED).expect("load generated index");

    assert_eq!(store.len(), 21);
    for record in &store {
        assert!(!record.page.is_empty());
        assert!(!record.title.is_empty());
        assert!(!record.category.is_empty());
    }
    assert_eq!(
        store.get(0),
        Some(&IndexRecord::new(
            "2d_wave/2d_FDM/#Finite-Difference-Method",
            "Finite Difference Method",
            "Finite Difference Method",
            "",
            "section",
        ))
    );
}

#[test]
fn file_and_memory_loads_agree() {
    let from_path = IndexRecordStore::from_path(GENERATED_PATH).expect("load from path");
    let from_str = IndexRecordStore::load(GENERATED).expect("load from str");

    assert_eq!(from_path, from_str);
    assert_eq!(from_path.manifest(), from_str.manifest());
}

#[test]
fn manifest_of_generated_index() {
    let store = IndexRecordStore::load(GENERATED).expect("load generated index");
    assert_eq!(
        store.manifest(),
        IndexManifest {
            records: 21,
            sections: 5,
            pages: 16,
            other: 0,
            page_paths: 3,
            text_bytes: 2403,
            checksum: Some(3_272_751_314),
        }
    );
}

#[test]
fn pages_group_sections_by_path() {
    let store = IndexRecordStore::load(GENERATED).expect("load generated index");
    let pages = store.pages();

    let summary: Vec<_> = pages
        .iter()
        .map(|page| (page.path, page.page, page.sections.len(), page.body.len()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("2d_wave/2d_FDM/", "Finite Difference Method", 1, 0),
            ("1d_wave/1d_FDM/", "Finite Difference Method", 1, 0),
            ("", "Home", 3, 16),
        ]
    );
    assert_eq!(
        pages[2].section_titles().collect::<Vec<_>>(),
        vec![
            "WaveSim.jl",
            "1D Wave Equation",
            "2D Wave Equation (NOT FINALIZED YET)"
        ]
    );
}

#[test]
fn end_to_end_single_record() {
    let store = IndexRecordStore::load(
        r##"{"docs":[{"location":"/#intro","page":"Home","title":"Home","text":"hello","category":"section"}]}"##,
    )
    .expect("load");
    let records: Vec<_> = store.iterate().cloned().collect();
    assert_eq!(
        records,
        vec![IndexRecord::new("/#intro", "Home", "Home", "hello", "section")]
    );
}

#[test]
fn malformed_file_is_reported() {
    let err = IndexRecordStore::from_reader(
        &br#"{"docs":[{"location":"a","page":"A","title":"A","text":"","category":5}]}"#[..],
    )
    .unwrap_err();
    match err {
        StoreError::Malformed(err) => assert_eq!(
            err,
            MalformedRecordError::WrongType {
                index: 0,
                field: "category",
                found: "number"
            }
        ),
        other => panic!("unexpected error: {other}"),
    }
}
