use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::warn;

use crate::lingo::tools::config::RowPolicy;
use crate::lingo::tools::error::{Result, ToolError};
use crate::lingo::tools::io::xml_write::LANGUAGE_PATH;
use crate::lingo::tools::model::{KEY_COLUMN, KeyValueEntry, VALUE_COLUMN};

/// Control character some exporters leave in resource files.
const CONTROL_ARTIFACT: char = '\u{3}';

/// Entries parsed from a language document together with the number of
/// entries dropped under [`RowPolicy::Lenient`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryParse {
    pub entries: Vec<KeyValueEntry>,
    pub skipped: usize,
}

/// Removes the `0x03` producer artifact that otherwise breaks parsing.
pub fn strip_control_artifacts(content: &str) -> String {
    content.replace(CONTROL_ARTIFACT, "")
}

/// Reads `root/data/LanguageStringConvertor/entry` elements from a file.
pub fn read_entries(path: &Path, include_nested: bool, policy: RowPolicy) -> Result<EntryParse> {
    let content = strip_control_artifacts(&read_utf8(path)?);
    parse_entries(&content, include_nested, policy)
}

/// Extracts `KEY`/`VALUE1` pairs from the entries at the fixed language path,
/// in document order. A missing child reads as an empty string.
///
/// With `include_nested`, entries found under `entry/Children` are collected
/// as well, each directly after its parent.
pub fn parse_entries(content: &str, include_nested: bool, policy: RowPolicy) -> Result<EntryParse> {
    let mut reader = Reader::from_str(content);
    let mut collector = EntryCollector::new(include_nested);

    loop {
        let event = reader
            .read_event()
            .map_err(|err| parse_error(&err, reader.buffer_position()))?;
        match event {
            Event::Start(start) => collector.enter(element_name(&start)),
            Event::Empty(start) => {
                collector.enter(element_name(&start));
                collector.leave();
            }
            Event::End(_) => collector.leave(),
            Event::Text(text) => {
                if collector.wants_text() {
                    match text.unescape() {
                        Ok(value) => collector.push_text(&value),
                        Err(err) => collector.fail(err.to_string()),
                    }
                }
            }
            Event::CData(data) => {
                if collector.wants_text() {
                    collector.push_text(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !collector.path.is_empty() {
        return Err(ToolError::Parse(format!(
            "document ended inside <{}>",
            collector.path.join("/")
        )));
    }

    let mut parsed = EntryParse::default();
    for (index, slot) in collector.slots.into_iter().enumerate() {
        match slot {
            Some(Ok(entry)) => parsed.entries.push(entry),
            Some(Err(message)) => match policy {
                RowPolicy::Lenient => {
                    warn!(entry = index + 1, %message, "skipping undecodable entry");
                    parsed.skipped += 1;
                }
                RowPolicy::Strict => {
                    return Err(ToolError::Parse(format!("entry {}: {message}", index + 1)));
                }
            },
            None => {}
        }
    }
    Ok(parsed)
}

/// Reads a resource-string file. See [`parse_resources`].
pub fn read_resources(path: &Path) -> Result<Vec<KeyValueEntry>> {
    parse_resources(&read_utf8(path)?)
}

/// Reads a whole document, rejecting bytes that are not valid UTF-8.
fn read_utf8(path: &Path) -> Result<String> {
    let raw = fs::read(path)?;
    String::from_utf8(raw).map_err(|err| {
        ToolError::Parse(format!(
            "{} is not valid UTF-8 (byte {})",
            path.display(),
            err.utf8_error().valid_up_to()
        ))
    })
}

/// Parses a resource-string document. Each child of the document element
/// becomes one entry: its attributes rendered literally as `name="value"`
/// joined by spaces form the key, its text content the value. Attribute
/// values keep their entity references, matching the verbatim keys the
/// resource writer emits.
pub fn parse_resources(content: &str) -> Result<Vec<KeyValueEntry>> {
    let content = strip_control_artifacts(content);
    let mut reader = Reader::from_str(&content);
    let mut depth = 0usize;
    let mut entries: Vec<KeyValueEntry> = Vec::new();
    let mut current: Option<KeyValueEntry> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|err| parse_error(&err, reader.buffer_position()))?;
        match event {
            Event::Start(start) => {
                depth += 1;
                if depth == 2 {
                    current = Some(KeyValueEntry::new(render_attributes(&start)?, ""));
                }
            }
            Event::Empty(start) => {
                if depth == 1 {
                    entries.push(KeyValueEntry::new(render_attributes(&start)?, ""));
                }
            }
            Event::End(_) => {
                if depth == 2 {
                    entries.extend(current.take());
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(text) if depth == 2 => {
                if let Some(entry) = current.as_mut() {
                    let value = text
                        .unescape()
                        .map_err(|err| ToolError::Parse(err.to_string()))?;
                    entry.value.push_str(&value);
                }
            }
            Event::CData(data) if depth == 2 => {
                if let Some(entry) = current.as_mut() {
                    entry.value.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

fn render_attributes(start: &BytesStart<'_>) -> Result<String> {
    let mut parts = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| ToolError::Parse(err.to_string()))?;
        let name = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|err| ToolError::Parse(err.to_string()))?;
        let value = std::str::from_utf8(&attribute.value)
            .map_err(|err| ToolError::Parse(err.to_string()))?;
        parts.push(format!(r#"{name}="{value}""#));
    }
    Ok(parts.join(" "))
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn parse_error(err: &quick_xml::Error, position: impl std::fmt::Display) -> ToolError {
    ToolError::Parse(format!("{err} (near byte {position})"))
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Key,
    Value,
}

struct OpenEntry {
    /// `path` length once the entry element itself has been entered.
    depth: usize,
    slot: usize,
    field: Option<Field>,
    key: String,
    value: String,
    error: Option<String>,
}

/// Tracks the element path while streaming events and assembles entries.
/// Results are stored in slots reserved when an entry opens, which keeps
/// parents ahead of their nested children.
struct EntryCollector {
    include_nested: bool,
    path: Vec<String>,
    open: Vec<OpenEntry>,
    slots: Vec<Option<std::result::Result<KeyValueEntry, String>>>,
}

impl EntryCollector {
    fn new(include_nested: bool) -> Self {
        Self {
            include_nested,
            path: Vec::new(),
            open: Vec::new(),
            slots: Vec::new(),
        }
    }

    fn enter(&mut self, name: String) {
        let is_entry = name == "entry" && self.at_entry_position();
        let field = match self.open.last() {
            Some(entry) if self.path.len() == entry.depth => match name.as_str() {
                KEY_COLUMN => Some(Field::Key),
                VALUE_COLUMN => Some(Field::Value),
                _ => None,
            },
            _ => None,
        };
        self.path.push(name);

        if is_entry {
            self.slots.push(None);
            self.open.push(OpenEntry {
                depth: self.path.len(),
                slot: self.slots.len() - 1,
                field: None,
                key: String::new(),
                value: String::new(),
                error: None,
            });
        } else if let (Some(field), Some(entry)) = (field, self.open.last_mut()) {
            entry.field = Some(field);
        }
    }

    fn leave(&mut self) {
        if let Some(entry) = self.open.last_mut() {
            if self.path.len() == entry.depth + 1 {
                entry.field = None;
            } else if self.path.len() == entry.depth {
                if let Some(done) = self.open.pop() {
                    let result = match done.error {
                        Some(message) => Err(message),
                        None => Ok(KeyValueEntry::new(done.key, done.value)),
                    };
                    self.slots[done.slot] = Some(result);
                }
            }
        }
        self.path.pop();
    }

    fn wants_text(&self) -> bool {
        self.open
            .last()
            .is_some_and(|entry| entry.field.is_some() && self.path.len() == entry.depth + 1)
    }

    fn push_text(&mut self, text: &str) {
        if let Some(entry) = self.open.last_mut() {
            match entry.field {
                Some(Field::Key) => entry.key.push_str(text),
                Some(Field::Value) => entry.value.push_str(text),
                None => {}
            }
        }
    }

    fn fail(&mut self, message: String) {
        if let Some(entry) = self.open.last_mut() {
            entry.error.get_or_insert(message);
        }
    }

    /// True when the next element would sit at the language path, or (with
    /// nesting enabled) inside a `Children` wrapper of a collected entry.
    fn at_entry_position(&self) -> bool {
        let prefix_len = LANGUAGE_PATH.len();
        if self.path.len() < prefix_len
            || self.path[..prefix_len]
                .iter()
                .zip(LANGUAGE_PATH)
                .any(|(actual, expected)| actual != expected)
        {
            return false;
        }
        let rest = &self.path[prefix_len..];
        if rest.is_empty() {
            return true;
        }
        self.include_nested
            && rest.len() % 2 == 0
            && rest
                .chunks(2)
                .all(|pair| pair[0] == "entry" && pair[1] == "Children")
    }
}
