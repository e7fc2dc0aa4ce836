use std::fs;

use lingo_tools::ToolError;
use lingo_tools::config::RowPolicy;
use lingo_tools::hierarchy::build_tree;
use lingo_tools::io::xml_read::{self, parse_entries, parse_resources};
use lingo_tools::io::xml_write::{
    self, ClassificationInfo, HierarchyLayout, XML_DECLARATION, ensure_declaration,
};
use lingo_tools::model::{KeyValueEntry, Row, TemplateEntry};
use tempfile::tempdir;

fn entries(pairs: &[(&str, &str)]) -> Vec<KeyValueEntry> {
    pairs
        .iter()
        .map(|(key, value)| KeyValueEntry::new(*key, *value))
        .collect()
}

#[test]
fn flat_document_roundtrip_preserves_pairs_and_order() {
    let source = entries(&[
        ("greeting", "Hello"),
        ("empty", ""),
        ("markup", "a < b & \"c\""),
        ("spaced", "  padded  "),
        ("unicode", "你好"),
    ]);

    let document = xml_write::flat_document(&source).expect("document written");
    let parsed = parse_entries(&document, false, RowPolicy::Strict).expect("document parsed");

    assert_eq!(parsed.entries, source);
    assert_eq!(parsed.skipped, 0);
}

#[test]
fn flat_document_skips_rows_without_key() {
    let document = xml_write::flat_document(&entries(&[("", "orphan"), ("k", "v")]))
        .expect("document written");
    let parsed = parse_entries(&document, false, RowPolicy::Strict).expect("document parsed");

    assert_eq!(parsed.entries, entries(&[("k", "v")]));
}

#[test]
fn every_document_starts_with_declaration() {
    let pairs = entries(&[("k", "v")]);
    let root = build_tree(&[Row::new("1", "one", 1)]).expect("tree built");
    let documents = [
        xml_write::flat_document(&pairs).expect("flat"),
        xml_write::resource_document(&pairs).expect("resources"),
        xml_write::template_document(&[TemplateEntry::default()]).expect("template"),
        xml_write::hierarchy_document(&root, &HierarchyLayout::LanguageStrings)
            .expect("hierarchy"),
    ];

    for document in documents {
        assert_eq!(document.lines().next(), Some(XML_DECLARATION));
        assert_eq!(document.matches("<?xml").count(), 1);
    }
}

#[test]
fn declaration_is_not_added_twice() {
    let once = ensure_declaration("<root/>");
    assert_eq!(once, format!("{XML_DECLARATION}\n<root/>"));
    assert_eq!(ensure_declaration(&once), once);
}

#[test]
fn declaration_is_prepended_to_written_files() {
    let temp_dir = tempdir().expect("temporary directory");
    let bare = temp_dir.path().join("bare.xml");
    fs::write(&bare, "<resources/>\n").expect("file written");

    xml_write::add_declaration(&bare).expect("declaration added");
    xml_write::add_declaration(&bare).expect("second call is a no-op");

    let content = fs::read_to_string(&bare).expect("file read");
    assert_eq!(content, format!("{XML_DECLARATION}\n<resources/>\n"));

    let written = temp_dir.path().join("flat.xml");
    xml_write::write_flat(&written, &entries(&[("k", "v")])).expect("file written");
    let content = fs::read_to_string(&written).expect("file read");
    assert!(content.starts_with(XML_DECLARATION));
}

#[test]
fn hierarchy_document_mirrors_tree() {
    let root = build_tree(&[
        Row::new("1", "Animals", 1),
        Row::new("2", "Cats", 2),
        Row::new("3", "Lions", 3),
        Row::new("4", "Plants", 1),
    ])
    .expect("tree built");

    let document = xml_write::hierarchy_document(&root, &HierarchyLayout::LanguageStrings)
        .expect("document written");

    assert!(document.contains("<LanguageStringConvertor>"));
    assert_eq!(document.matches("<entry>").count(), 4);
    assert_eq!(document.matches("<Children>").count(), 2);
    // Synthetic root is not emitted.
    assert!(!document.contains("<KEY>0</KEY>"));

    let top_level = parse_entries(&document, false, RowPolicy::Strict).expect("parsed");
    assert_eq!(top_level.entries, entries(&[("1", "Animals"), ("4", "Plants")]));

    let all = parse_entries(&document, true, RowPolicy::Strict).expect("parsed");
    assert_eq!(
        all.entries,
        entries(&[("1", "Animals"), ("2", "Cats"), ("3", "Lions"), ("4", "Plants")])
    );
}

#[test]
fn classification_layout_writes_system_header() {
    let root = build_tree(&[Row::new("10", "Walls", 1)]).expect("tree built");
    let info = ClassificationInfo {
        name: "Uniclass".into(),
        edition_version: "2.1".into(),
        year: "2024".into(),
        month: "05".into(),
        day: "17".into(),
        description: String::new(),
        source: "NBS".into(),
    };

    let document = xml_write::hierarchy_document(&root, &HierarchyLayout::Classification(info))
        .expect("document written");

    for fragment in [
        "<BuildingInformation>",
        "<Name>Uniclass</Name>",
        "<EditionVersion>2.1</EditionVersion>",
        "<Year>2024</Year>",
        "<Description></Description>",
        "<Source>NBS</Source>",
        "<Items>",
        "<KEY>10</KEY>",
        "<VALUE1>Walls</VALUE1>",
    ] {
        assert!(document.contains(fragment), "missing {fragment}");
    }
}

#[test]
fn template_document_keeps_empty_fields() {
    let records = vec![TemplateEntry {
        key: "sword".into(),
        id: "101".into(),
        value1: "12".into(),
        value2: String::new(),
        tag: String::new(),
    }];

    let document = xml_write::template_document(&records).expect("document written");

    assert!(document.contains(r#"<root xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#));
    assert!(document.contains("<Template>"));
    assert!(document.contains("<KEY>sword</KEY>"));
    assert!(document.contains("<ID>101</ID>"));
    assert!(document.contains("<Value1>12</Value1>"));
    assert!(document.contains("<Value2></Value2>"));
    assert!(document.contains("<Tag></Tag>"));
}

#[test]
fn resource_document_writes_key_verbatim() {
    let document = xml_write::resource_document(&entries(&[
        (r#"name="menu_start""#, "Start & go"),
        (r#"name="blank""#, ""),
    ]))
    .expect("document written");

    assert!(document.contains(r#"<string name="menu_start">Start &amp; go</string>"#));
    assert!(!document.contains("blank"));
    assert!(document.contains("<resources>"));
}

#[test]
fn resource_parse_ignores_control_artifact() {
    let clean = r#"<?xml version="1.0" encoding="utf-8"?>
<resources>
  <string name="title">Main menu</string>
  <string name="quit" group="ui">Quit</string>
  <string name="empty"/>
</resources>"#;
    let dirty = clean.replace("Main", "Ma\u{3}in").replace("<resources>", "<resources>\u{3}");

    let expected = entries(&[
        (r#"name="title""#, "Main menu"),
        (r#"name="quit" group="ui""#, "Quit"),
        (r#"name="empty""#, ""),
    ]);
    assert_eq!(parse_resources(clean).expect("clean parsed"), expected);
    assert_eq!(parse_resources(&dirty).expect("dirty parsed"), expected);
}

#[test]
fn resource_roundtrip_through_file() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("strings_en.xml");
    let source = entries(&[(r#"name="ok""#, "OK"), (r#"name="cancel""#, "Cancel")]);

    xml_write::write_resources(&path, &source).expect("file written");
    let restored = xml_read::read_resources(&path).expect("file read");

    assert_eq!(restored, source);
}

#[test]
fn resource_keys_keep_entity_references() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("strings_en.xml");
    let source = entries(&[
        (r#"name="a&amp;b""#, "Fish & chips"),
        (r#"name="plain" note="x&lt;y""#, "Plain"),
    ]);

    xml_write::write_resources(&path, &source).expect("file written");
    let restored = xml_read::read_resources(&path).expect("file read");

    assert_eq!(restored, source);
}

#[test]
fn invalid_utf8_is_a_parse_error() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("broken.xml");
    let mut bytes =
        b"<root><data><LanguageStringConvertor><entry><KEY>k</KEY><VALUE1>".to_vec();
    bytes.extend_from_slice(&[0xC3, 0x28, 0xFF]);
    bytes.extend_from_slice(b"</VALUE1></entry></LanguageStringConvertor></data></root>");
    fs::write(&path, &bytes).expect("file written");

    for policy in [RowPolicy::Strict, RowPolicy::Lenient] {
        let error = xml_read::read_entries(&path, false, policy).expect_err("rejected");
        assert!(matches!(error, ToolError::Parse(_)));
    }

    let resources = temp_dir.path().join("strings_fr.xml");
    let mut bytes = b"<resources><string name=\"ok\">".to_vec();
    bytes.push(0xFF);
    bytes.extend_from_slice(b"</string></resources>");
    fs::write(&resources, &bytes).expect("file written");

    let error = xml_read::read_resources(&resources).expect_err("rejected");
    assert!(matches!(error, ToolError::Parse(_)));
}

#[test]
fn missing_children_read_as_empty_strings() {
    let document = r#"<root><data><LanguageStringConvertor>
        <entry><KEY>only-key</KEY></entry>
        <entry><VALUE1>only-value</VALUE1></entry>
        <entry><KEY>self-closing</KEY><VALUE1/></entry>
    </LanguageStringConvertor></data></root>"#;

    let parsed = parse_entries(document, false, RowPolicy::Strict).expect("parsed");

    assert_eq!(
        parsed.entries,
        entries(&[("only-key", ""), ("", "only-value"), ("self-closing", "")])
    );
}

#[test]
fn entries_outside_fixed_path_are_ignored() {
    let document = r#"<root>
        <entry><KEY>stray</KEY><VALUE1>x</VALUE1></entry>
        <data><LanguageStringConvertor>
            <entry><KEY>kept</KEY><VALUE1>y</VALUE1></entry>
        </LanguageStringConvertor></data>
    </root>"#;

    let parsed = parse_entries(document, true, RowPolicy::Strict).expect("parsed");

    assert_eq!(parsed.entries, entries(&[("kept", "y")]));
}

const BROKEN_ENTITY: &str = r#"<root><data><LanguageStringConvertor>
    <entry><KEY>first</KEY><VALUE1>1</VALUE1></entry>
    <entry><KEY>bad&bogus;</KEY><VALUE1>2</VALUE1></entry>
    <entry><KEY>third</KEY><VALUE1>3</VALUE1></entry>
</LanguageStringConvertor></data></root>"#;

#[test]
fn lenient_policy_skips_undecodable_entries() {
    let parsed = parse_entries(BROKEN_ENTITY, false, RowPolicy::Lenient).expect("parsed");

    assert_eq!(parsed.entries, entries(&[("first", "1"), ("third", "3")]));
    assert_eq!(parsed.skipped, 1);
}

#[test]
fn strict_policy_rejects_undecodable_entries() {
    let error = parse_entries(BROKEN_ENTITY, false, RowPolicy::Strict).expect_err("rejected");
    assert!(matches!(error, ToolError::Parse(_)));
}

#[test]
fn malformed_document_is_a_parse_error() {
    let error = parse_entries(
        "<root><data><LanguageStringConvertor><entry></data></root>",
        false,
        RowPolicy::Lenient,
    )
    .expect_err("rejected");
    assert!(matches!(error, ToolError::Parse(_)));

    let error = parse_resources("<resources><string name=\"a\">x</resources>")
        .expect_err("rejected");
    assert!(matches!(error, ToolError::Parse(_)));
}
