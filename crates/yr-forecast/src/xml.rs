//! Markup <-> tree conversion.
//!
//! Documents become nested `serde_json::Value` objects: attributes are keyed
//! `@name`, repeated children collapse into arrays, and element text lives
//! under `#text` unless the element carries nothing else.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};

use crate::error::{ForecastError, Result};

const TEXT_KEY: &str = "#text";
const ATTR_PREFIX: char = '@';

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut children = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ForecastError::Parse(e.to_string()))?;
            let key = format!(
                "{}{}",
                ATTR_PREFIX,
                String::from_utf8_lossy(attr.key.as_ref())
            );
            let value = attr
                .unescape_value()
                .map_err(|e| ForecastError::Parse(e.to_string()))?;
            children.insert(key, Value::String(value.into_owned()));
        }
        Ok(Self {
            name,
            children,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let text = self.text.trim();
        let value = match (self.children.is_empty(), text.is_empty()) {
            (true, true) => Value::Null,
            (true, false) => Value::String(text.to_string()),
            (false, _) => {
                let mut children = self.children;
                if !text.is_empty() {
                    children.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
                }
                Value::Object(children)
            }
        };
        (self.name, value)
    }
}

fn insert_child(parent: &mut Map<String, Value>, name: String, value: Value) {
    match parent.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.insert(name, value);
        }
    }
}

/// Parse a markup document into a tree keyed by its root element.
pub fn parse(source: &str) -> Result<Value> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root = Map::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(Frame::open(&start)?),
            Ok(Event::Empty(start)) => {
                let (name, value) = Frame::open(&start)?.close();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, value),
                    None => insert_child(&mut root, name, value),
                }
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| ForecastError::Parse(e.to_string()))?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::End(_)) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| ForecastError::Parse("unbalanced closing tag".to_string()))?;
                let (name, value) = frame.close();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, value),
                    None => insert_child(&mut root, name, value),
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ForecastError::Parse(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    if !stack.is_empty() {
        return Err(ForecastError::Parse("unexpected end of document".to_string()));
    }
    if root.is_empty() {
        return Err(ForecastError::Parse("document has no root element".to_string()));
    }
    Ok(Value::Object(root))
}

/// Write a tree produced by [`parse`] back out as indented markup.
pub fn unparse(tree: &Value) -> Result<String> {
    let root = match tree {
        Value::Object(map) if map.len() == 1 => map,
        _ => {
            return Err(ForecastError::Parse(
                "tree must have exactly one root element".to_string(),
            ))
        }
    };

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
    )?;

    for (name, value) in root {
        write_element(&mut writer, name, value)?;
    }

    String::from_utf8(writer.into_inner()).map_err(|e| ForecastError::Parse(e.to_string()))
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<()> {
    if let Value::Array(items) = value {
        for item in items {
            write_element(writer, name, item)?;
        }
        return Ok(());
    }

    let mut start = BytesStart::new(name);
    let mut text: Option<String> = None;
    let mut children: Vec<(&String, &Value)> = Vec::new();

    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, child) in map {
                if let Some(attr) = key.strip_prefix(ATTR_PREFIX) {
                    start.push_attribute((attr, scalar(child).as_str()));
                } else if key == TEXT_KEY {
                    text = Some(scalar(child));
                } else {
                    children.push((key, child));
                }
            }
        }
        other => text = Some(scalar(other)),
    }

    if text.is_none() && children.is_empty() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    if let Some(text) = &text {
        emit(writer, Event::Text(BytesText::new(text)))?;
    }
    for (key, child) in children {
        write_element(writer, key, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| ForecastError::Parse(e.to_string()))
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
