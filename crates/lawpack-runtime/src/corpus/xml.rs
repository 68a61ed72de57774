//! XML to JSON tree decoding for corpus responses.
//!
//! Attributes become `@name` keys, element text becomes `#text` (or the
//! whole value when the element has nothing else), and repeated children
//! collapse into arrays. The root element is kept as the single top-level key.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use super::CorpusError;

struct Frame {
    name: String,
    attrs: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, CorpusError> {
        let mut attrs = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| CorpusError::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(v) => v.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            attrs.insert(format!("@{}", key), Value::String(value));
        }

        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attrs,
            children: Map::new(),
            text: String::new(),
        })
    }

    fn into_value(self) -> (String, Value) {
        let Frame {
            name,
            attrs,
            children,
            text,
        } = self;

        if attrs.is_empty() && children.is_empty() {
            let value = if text.is_empty() {
                Value::Null
            } else {
                Value::String(text)
            };
            return (name, value);
        }

        let mut object = attrs;
        for (key, value) in children {
            object.insert(key, value);
        }
        if !text.is_empty() {
            object.insert("#text".to_string(), Value::String(text));
        }
        (name, Value::Object(object))
    }
}

fn insert_child(children: &mut Map<String, Value>, key: String, value: Value) {
    match children.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(key, value);
        }
    }
}

/// Decode an XML document into a JSON tree.
pub fn xml_to_value(xml: &str) -> Result<Value, CorpusError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| CorpusError::Xml(format!("{} at byte {}", e, reader.buffer_position())))?;

        match event {
            Event::Start(start) => stack.push(Frame::open(&start)?),
            Event::Empty(start) => {
                let (name, value) = Frame::open(&start)?.into_value();
                close(&mut stack, &mut root, name, value);
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    match text.unescape() {
                        Ok(t) => frame.text.push_str(&t),
                        Err(_) => frame.text.push_str(&String::from_utf8_lossy(&text)),
                    }
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| CorpusError::Xml("unbalanced end tag".to_string()))?;
                let (name, value) = frame.into_value();
                close(&mut stack, &mut root, name, value);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(CorpusError::Xml("document ended inside an element".to_string()));
    }

    let (name, value) = root.ok_or_else(|| CorpusError::Xml("empty document".to_string()))?;
    let mut object = Map::new();
    object.insert(name, value);
    Ok(Value::Object(object))
}

fn close(stack: &mut [Frame], root: &mut Option<(String, Value)>, name: String, value: Value) {
    match stack.last_mut() {
        Some(parent) => insert_child(&mut parent.children, name, value),
        None => {
            if root.is_none() {
                *root = Some((name, value));
            }
        }
    }
}
