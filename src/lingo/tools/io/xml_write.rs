//! XML emission for the hierarchical, flat, resource-string and template
//! shapes.
//!
//! Every document body is produced without a declaration; the declaration
//! is prepended afterwards by [`ensure_declaration`] (in memory) or
//! [`add_declaration`] (on a written file). Downstream consumers rely on the
//! exact declaration text, so it is never left to the writer.

use std::fs;
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::lingo::tools::error::Result;
use crate::lingo::tools::hierarchy::Node;
use crate::lingo::tools::model::{
    KEY_COLUMN, KeyValueEntry, TEMPLATE_COLUMNS, TemplateEntry, VALUE_COLUMN,
};

/// Declaration required on the first line of every emitted document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no" ?>"#;

/// Element path (below the document root) holding language entries.
pub const LANGUAGE_PATH: [&str; 3] = ["root", "data", "LanguageStringConvertor"];
/// Element path holding template entries.
pub const TEMPLATE_PATH: [&str; 3] = ["root", "data", "Template"];

const ENTRY: &str = "entry";
const CHILDREN: &str = "Children";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Descriptive header written by the classification layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationInfo {
    pub name: String,
    pub edition_version: String,
    pub year: String,
    pub month: String,
    pub day: String,
    pub description: String,
    pub source: String,
}

/// Container the hierarchical entries are written into.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HierarchyLayout {
    /// `root/data/LanguageStringConvertor/entry...`
    #[default]
    LanguageStrings,
    /// `BuildingInformation/Classification/System/Items/entry...`
    Classification(ClassificationInfo),
}

/// Prepends [`XML_DECLARATION`] unless the content already starts with a
/// declaration.
pub fn ensure_declaration(content: &str) -> String {
    if content.starts_with("<?xml") {
        content.to_string()
    } else {
        format!("{XML_DECLARATION}\n{content}")
    }
}

/// Rewrites the file at `path` with the declaration prepended if it lacks
/// one.
pub fn add_declaration(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)?;
    if !content.starts_with("<?xml") {
        fs::write(path, ensure_declaration(&content))?;
    }
    Ok(())
}

/// Serialises the tree below `root` as nested entries. The synthetic root is
/// not emitted; its children are the top-level entries.
pub fn hierarchy_document(root: &Node, layout: &HierarchyLayout) -> Result<String> {
    Ok(ensure_declaration(&hierarchy_body(root, layout)?))
}

pub fn write_hierarchy(path: &Path, root: &Node, layout: &HierarchyLayout) -> Result<()> {
    save_document(path, &hierarchy_body(root, layout)?)
}

/// Serialises key/value pairs as flat entries under the language path.
pub fn flat_document(entries: &[KeyValueEntry]) -> Result<String> {
    Ok(ensure_declaration(&flat_body(entries)?))
}

pub fn write_flat(path: &Path, entries: &[KeyValueEntry]) -> Result<()> {
    save_document(path, &flat_body(entries)?)
}

/// Serialises one language of a resource sheet. Keys are written verbatim
/// as raw attribute text; values are escaped.
pub fn resource_document(entries: &[KeyValueEntry]) -> Result<String> {
    Ok(ensure_declaration(&resource_body(entries)?))
}

pub fn write_resources(path: &Path, entries: &[KeyValueEntry]) -> Result<()> {
    save_document(path, &resource_body(entries)?)
}

/// Serialises template records; every field is written even when empty.
pub fn template_document(entries: &[TemplateEntry]) -> Result<String> {
    Ok(ensure_declaration(&template_body(entries)?))
}

pub fn write_template(path: &Path, entries: &[TemplateEntry]) -> Result<()> {
    save_document(path, &template_body(entries)?)
}

fn save_document(path: &Path, body: &str) -> Result<()> {
    fs::write(path, body)?;
    add_declaration(path)
}

fn hierarchy_body(root: &Node, layout: &HierarchyLayout) -> Result<String> {
    let mut emitter = Emitter::new();
    let containers: Vec<&str> = match layout {
        HierarchyLayout::LanguageStrings => {
            for name in LANGUAGE_PATH {
                emitter.open(name)?;
            }
            LANGUAGE_PATH.to_vec()
        }
        HierarchyLayout::Classification(info) => {
            emitter.open("BuildingInformation")?;
            emitter.open("Classification")?;
            emitter.open("System")?;
            emitter.field("Name", &info.name)?;
            emitter.field("EditionVersion", &info.edition_version)?;
            emitter.open("EditionDate")?;
            emitter.field("Year", &info.year)?;
            emitter.field("Month", &info.month)?;
            emitter.field("Day", &info.day)?;
            emitter.close("EditionDate")?;
            emitter.field("Description", &info.description)?;
            emitter.field("Source", &info.source)?;
            emitter.open("Items")?;
            vec!["BuildingInformation", "Classification", "System", "Items"]
        }
    };

    // Each frame iterates one node's children; an exhausted frame closes the
    // `Children` wrapper and the entry that owns it.
    let mut stack = vec![root.children.iter()];
    while let Some(siblings) = stack.last_mut() {
        match siblings.next() {
            Some(node) => {
                emitter.open(ENTRY)?;
                emitter.field(KEY_COLUMN, &node.row.id)?;
                emitter.field(VALUE_COLUMN, &node.row.name)?;
                if node.children.is_empty() {
                    emitter.close(ENTRY)?;
                } else {
                    emitter.open(CHILDREN)?;
                    stack.push(node.children.iter());
                }
            }
            None => {
                stack.pop();
                if !stack.is_empty() {
                    emitter.close(CHILDREN)?;
                    emitter.close(ENTRY)?;
                }
            }
        }
    }

    for name in containers.iter().rev() {
        emitter.close(name)?;
    }
    Ok(emitter.finish())
}

fn flat_body(entries: &[KeyValueEntry]) -> Result<String> {
    let mut emitter = Emitter::new();
    for name in LANGUAGE_PATH {
        emitter.open(name)?;
    }
    for entry in entries.iter().filter(|entry| !entry.key.is_empty()) {
        emitter.open(ENTRY)?;
        emitter.field(KEY_COLUMN, &entry.key)?;
        emitter.field(VALUE_COLUMN, &entry.value)?;
        emitter.close(ENTRY)?;
    }
    for name in LANGUAGE_PATH.iter().rev() {
        emitter.close(name)?;
    }
    Ok(emitter.finish())
}

fn resource_body(entries: &[KeyValueEntry]) -> Result<String> {
    let mut emitter = Emitter::new();
    emitter.open("resources")?;
    for entry in entries
        .iter()
        .filter(|entry| !entry.key.trim().is_empty() && !entry.value.is_empty())
    {
        let start = BytesStart::from_content(format!("string {}", entry.key), "string".len());
        emitter.write(Event::Start(start))?;
        emitter.write(Event::Text(BytesText::new(&entry.value)))?;
        emitter.close("string")?;
    }
    emitter.close("resources")?;
    Ok(emitter.finish())
}

fn template_body(entries: &[TemplateEntry]) -> Result<String> {
    let mut emitter = Emitter::new();
    let [root, data, container] = TEMPLATE_PATH;
    emitter.write(Event::Start(
        BytesStart::new(root).with_attributes([("xmlns:xsi", XSI_NAMESPACE)]),
    ))?;
    emitter.open(data)?;
    emitter.open(container)?;
    for entry in entries {
        emitter.open(ENTRY)?;
        let fields = [&entry.key, &entry.id, &entry.value1, &entry.value2, &entry.tag];
        for (name, value) in TEMPLATE_COLUMNS.iter().zip(fields) {
            emitter.field(name, value)?;
        }
        emitter.close(ENTRY)?;
    }
    emitter.close(container)?;
    emitter.close(data)?;
    emitter.close(root)?;
    Ok(emitter.finish())
}

/// Thin wrapper over an indenting `quick_xml` writer.
struct Emitter {
    writer: Writer<Vec<u8>>,
}

impl Emitter {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event)?;
        Ok(())
    }

    fn open(&mut self, name: &str) -> Result<()> {
        self.write(Event::Start(BytesStart::new(name)))
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// Writes `<name>text</name>`; empty text still yields both tags.
    fn field(&mut self, name: &str, text: &str) -> Result<()> {
        self.open(name)?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn finish(self) -> String {
        let mut body = String::from_utf8_lossy(&self.writer.into_inner()).into_owned();
        body.push('\n');
        body
    }
}
