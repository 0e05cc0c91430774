use crate::core::{AppError, ParameterSet, Result};
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Request body encoding used by a gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// `<root><key>value</key>...</root>`
    Xml { root: &'static str },
    /// `application/x-www-form-urlencoded`
    Form,
}

impl WireFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            WireFormat::Xml { .. } => "application/xml",
            WireFormat::Form => "application/x-www-form-urlencoded",
        }
    }

    /// Encode `params` in their insertion order. The caller must already have
    /// removed the reserved secret field.
    pub fn encode(&self, params: &ParameterSet) -> Result<String> {
        match self {
            WireFormat::Xml { root } => encode_xml(root, params),
            WireFormat::Form => encode_form(params),
        }
    }

    /// Reject field names the format cannot carry. XML names become tags, so
    /// they must be plain names; form encoding escapes anything.
    pub fn check_field_names(&self, params: &ParameterSet) -> Result<()> {
        match self {
            WireFormat::Xml { .. } => match params.keys().find(|k| !is_xml_name(k)) {
                Some(bad) => Err(AppError::validation(format!(
                    "Field name {:?} cannot be sent as an XML element",
                    bad
                ))),
                None => Ok(()),
            },
            WireFormat::Form => Ok(()),
        }
    }
}

/// ASCII element name: letter or `_` first, then letters, digits, `_`, `-`, `.`
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

pub fn encode_xml(root: &str, params: &ParameterSet) -> Result<String> {
    WireFormat::Xml { root: "xml" }.check_field_names(params)?;

    let mut out = format!("<{}>", root);
    for (key, value) in params.iter() {
        let text = value.to_string();
        out.push_str(&format!("<{0}>{1}</{0}>", key, escape(text.as_str())));
    }
    out.push_str(&format!("</{}>", root));
    Ok(out)
}

pub fn encode_form(params: &ParameterSet) -> Result<String> {
    let pairs: Vec<_> = params.iter().collect();
    serde_urlencoded::to_string(pairs)
        .map_err(|e| AppError::internal(format!("Failed to form-encode request: {}", e)))
}

/// Parse a response body into a field map. XML and JSON are told apart by
/// their first significant character.
pub fn decode(body: &str) -> Result<Map<String, Value>> {
    let trimmed = body.trim_start_matches('\u{feff}').trim();
    match trimmed.chars().next() {
        Some('<') => decode_xml(trimmed),
        Some('{') => decode_json(trimmed),
        Some(_) => Err(AppError::parse(format!(
            "Unrecognized response format: {}",
            preview(trimmed)
        ))),
        None => Err(AppError::parse("Empty response body")),
    }
}

fn decode_json(body: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::parse("JSON response is not an object")),
        Err(e) => Err(AppError::parse(format!("Malformed JSON: {}", e))),
    }
}

enum Segment {
    Text(String),
    CData(String),
}

struct Node {
    name: String,
    children: Map<String, Value>,
    segments: Vec<Segment>,
}

impl Node {
    fn new(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            children: Map::new(),
            segments: Vec::new(),
        }
    }

    /// Leaf text exactly as sent. Whitespace-only runs around CDATA
    /// sections are layout and are dropped.
    fn text(self) -> String {
        let has_cdata = self.segments.iter().any(|s| matches!(s, Segment::CData(_)));
        self.segments
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::CData(text) => Some(text),
                Segment::Text(text) if has_cdata && text.trim().is_empty() => None,
                Segment::Text(text) => Some(text),
            })
            .collect()
    }
}

/// Root element is stripped; leaf elements become strings, elements with
/// children become objects, repeated siblings become arrays. Leaf text is
/// kept as sent.
fn decode_xml(body: &str) -> Result<Map<String, Value>> {
    let mut reader = Reader::from_str(body);

    let mut stack: Vec<Node> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(Node::new(e.name().as_ref())),
            Event::Empty(e) => {
                let node = Node::new(e.name().as_ref());
                if let Some(root) = close(&mut stack, node) {
                    return Ok(root);
                }
            }
            Event::Text(t) => {
                let raw = String::from_utf8_lossy(&t);
                let text = unescape(&raw)
                    .map_err(|e| AppError::parse(format!("Bad XML entity: {}", e)))?;
                if let Some(top) = stack.last_mut() {
                    top.segments.push(Segment::Text(text.into_owned()));
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.segments
                        .push(Segment::CData(String::from_utf8_lossy(&c).into_owned()));
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| AppError::parse("Unbalanced XML end tag"))?;
                if let Some(root) = close(&mut stack, node) {
                    return Ok(root);
                }
            }
            Event::Eof => return Err(AppError::parse("XML document has no complete root element")),
            _ => {}
        }
    }
}

/// Attach a finished node to its parent; returns the root's fields once the
/// root itself closes.
fn close(stack: &mut [Node], node: Node) -> Option<Map<String, Value>> {
    let Some(parent) = stack.last_mut() else {
        return Some(node.children);
    };

    let name = node.name.clone();
    let value = if node.children.is_empty() {
        Value::String(node.text())
    } else {
        Value::Object(node.children)
    };

    match parent.children.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.children.insert(name, value);
        }
    }
    None
}

fn preview(body: &str) -> String {
    body.chars().take(64).collect()
}
