//! XML/SOAP envelope codec for the legacy case-management dialect.
//!
//! Inbound messages arrive as a SOAP envelope whose body carries exactly
//! one dialect message element; [`decode`] returns the message name and
//! the body translated to a JSON record (elements become object fields,
//! repeated siblings become arrays, text-only elements become strings).
//! [`encode`] wraps an outbound JSON payload — a mapped success record or
//! an `{"Error": message}` structure — back into the wire envelope,
//! dropping empty values the way the legacy peers expect.
//!
//! Values are carried verbatim in both directions: no trimming or case
//! folding, since natural-key matching downstream is exact.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use roxmltree::Document;
use serde_json::{Map, Value};
use std::io::Cursor;

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("XML write error: {0}")]
    XmlWrite(#[from] quick_xml::Error),
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("expected a SOAP envelope, found <{0}>")]
    NotAnEnvelope(String),
    #[error("the envelope has no body")]
    MissingBody,
    #[error("the envelope body carries no message element")]
    EmptyBody,
    #[error("expected a JSON object as the envelope payload")]
    ExpectedObject,
}

/// Decode an inbound envelope into `(message name, message content)`.
///
/// The message name is the local name of the body's first element and
/// drives dispatch; namespace prefixes are ignored.
pub fn decode(input: &str) -> Result<(String, Value), EnvelopeError> {
    let doc = Document::parse(input)?;
    let root = doc.root_element();

    if root.tag_name().name() != "Envelope" {
        return Err(EnvelopeError::NotAnEnvelope(
            root.tag_name().name().to_string(),
        ));
    }

    let body = root
        .children()
        .filter(|n| n.is_element())
        .find(|n| n.tag_name().name() == "Body")
        .ok_or(EnvelopeError::MissingBody)?;

    let message = body
        .children()
        .find(|n| n.is_element())
        .ok_or(EnvelopeError::EmptyBody)?;

    let name = message.tag_name().name().to_string();
    Ok((name, element_to_value(&message)))
}

/// Encode an outbound payload into the wire envelope.
///
/// Null values, empty strings, and empty containers are omitted
/// (the legacy dialect's "remove empty tags" behavior).
pub fn encode(payload: &Value) -> Result<String, EnvelopeError> {
    let obj = payload.as_object().ok_or(EnvelopeError::ExpectedObject)?;

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    let mut root = BytesStart::new("SOAP-ENV:Envelope");
    root.push_attribute(("xmlns:SOAP-ENV", SOAP_ENV_NS));
    writer.write_event(Event::Start(root))?;
    writer.write_event(Event::Start(BytesStart::new("SOAP-ENV:Body")))?;

    for (name, value) in obj {
        write_value(&mut writer, name, value)?;
    }

    writer.write_event(Event::End(BytesEnd::new("SOAP-ENV:Body")))?;
    writer.write_event(Event::End(BytesEnd::new("SOAP-ENV:Envelope")))?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

fn element_to_value(node: &roxmltree::Node) -> Value {
    let mut children = node.children().filter(|n| n.is_element()).peekable();

    if children.peek().is_none() {
        // Text-only element; the value is carried verbatim.
        return Value::String(node.text().unwrap_or_default().to_string());
    }

    let mut map = Map::new();
    for child in children {
        let name = child.tag_name().name().to_string();
        insert_property(&mut map, &name, element_to_value(&child));
    }
    Value::Object(map)
}

/// Insert a decoded child; a repeated sibling name promotes the entry to
/// an array.
fn insert_property(map: &mut Map<String, Value>, name: &str, value: Value) {
    match map.entry(name.to_string()) {
        serde_json::map::Entry::Vacant(entry) => {
            entry.insert(value);
        }
        serde_json::map::Entry::Occupied(mut entry) => match entry.get_mut() {
            Value::Array(items) => items.push(value),
            existing => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        },
    }
}

fn write_value(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    name: &str,
    value: &Value,
) -> Result<(), EnvelopeError> {
    if is_empty(value) {
        return Ok(());
    }

    match value {
        Value::Array(items) => {
            for item in items {
                write_value(writer, name, item)?;
            }
        }
        Value::Object(obj) => {
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            for (child_name, child) in obj {
                write_value(writer, child_name, child)?;
            }
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        primitive => {
            let text = primitive_to_string(primitive);
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            writer.write_event(Event::Text(BytesText::new(&text)))?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
    }
    Ok(())
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.iter().all(is_empty),
        Value::Object(obj) => obj.values().all(is_empty),
        _ => false,
    }
}

fn primitive_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
