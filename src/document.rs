//! Parsed JSON document tree
//!
//! The tree is produced by the JSON parser (through the [`Deserialize`] impl
//! on [`JsonNode`]) and consumed by the flattener and the canonicalizer.
//! Besides the three JSON node kinds it can carry comment, undefined and
//! constructor nodes, which a front-end may surface but which have no
//! flattened representation.

use crate::error::{FormatError, JsonConfigError, Position};
use crate::path::PathContext;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use indexmap::IndexMap;
use serde::de::{self, Deserialize, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, Serialize, SerializeMap, SerializeSeq, Serializer};
use smallvec::SmallVec;
use std::fmt;

/// JSON object type (preserves source order)
pub type JsonObject = IndexMap<String, JsonNode>;

/// JSON array type - uses SmallVec so short arrays stay inline
pub type JsonArray = SmallVec<[JsonNode; 4]>;

/// Every kind of node or primitive the tree can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Object,
    Array,
    Integer,
    Float,
    String,
    Boolean,
    Null,
    Raw,
    Bytes,
    Comment,
    Undefined,
    Constructor,
}

impl NodeKind {
    /// Returns the display name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Object => "Object",
            NodeKind::Array => "Array",
            NodeKind::Integer => "Integer",
            NodeKind::Float => "Float",
            NodeKind::String => "String",
            NodeKind::Boolean => "Boolean",
            NodeKind::Null => "Null",
            NodeKind::Raw => "Raw",
            NodeKind::Bytes => "Bytes",
            NodeKind::Comment => "Comment",
            NodeKind::Undefined => "Undefined",
            NodeKind::Constructor => "Constructor",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A primitive leaf value
#[derive(Debug, Clone, PartialEq)]
pub enum JsonPrimitive {
    Integer(i128),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    /// Literal JSON text, kept verbatim
    Raw(String),
    Bytes(Vec<u8>),
}

impl JsonPrimitive {
    /// Returns the kind of this primitive
    pub fn kind(&self) -> NodeKind {
        match self {
            JsonPrimitive::Integer(_) => NodeKind::Integer,
            JsonPrimitive::Float(_) => NodeKind::Float,
            JsonPrimitive::String(_) => NodeKind::String,
            JsonPrimitive::Boolean(_) => NodeKind::Boolean,
            JsonPrimitive::Null => NodeKind::Null,
            JsonPrimitive::Raw(_) => NodeKind::Raw,
            JsonPrimitive::Bytes(_) => NodeKind::Bytes,
        }
    }

    /// Builds a primitive from JSON number text.
    ///
    /// Integers that fit in an `i128` and finite floats are converted; any
    /// other number (and `-0`) is kept as [`JsonPrimitive::Raw`] so its text
    /// survives unchanged.
    pub fn from_number_text(text: String) -> JsonPrimitive {
        if text.contains(['.', 'e', 'E']) {
            match text.parse::<f64>() {
                Ok(f) if f.is_finite() => JsonPrimitive::Float(f),
                _ => JsonPrimitive::Raw(text),
            }
        } else {
            match text.parse::<i128>() {
                Ok(i) if text != "-0" => JsonPrimitive::Integer(i),
                _ => JsonPrimitive::Raw(text),
            }
        }
    }

    /// Renders the value the way it is stored in a flattened configuration.
    ///
    /// The output never depends on locale. `None` is the null marker, which
    /// configuration consumers read as "no value" and which is distinct from
    /// an empty string.
    ///
    /// - integers: plain decimal digits
    /// - floats: shortest round-trip JSON number text (`1.5`, `1.0`, `1e300`);
    ///   non-finite values become `NaN`, `Infinity` or `-Infinity`
    /// - strings: verbatim
    /// - booleans: `true` / `false`
    /// - raw: the literal text unchanged
    /// - bytes: standard padded base64
    pub fn to_config_value(&self) -> Option<String> {
        match self {
            JsonPrimitive::Integer(i) => Some(i.to_string()),
            JsonPrimitive::Float(f) => Some(format_float(*f)),
            JsonPrimitive::String(s) => Some(s.clone()),
            JsonPrimitive::Boolean(b) => Some(b.to_string()),
            JsonPrimitive::Null => None,
            JsonPrimitive::Raw(raw) => Some(raw.clone()),
            JsonPrimitive::Bytes(bytes) => Some(BASE64.encode(bytes)),
        }
    }
}

fn format_float(value: f64) -> String {
    match serde_json::Number::from_f64(value) {
        Some(number) => number.to_string(),
        None if value.is_nan() => "NaN".to_string(),
        None if value.is_sign_negative() => "-Infinity".to_string(),
        None => "Infinity".to_string(),
    }
}

/// A node of the parsed document tree
#[derive(Debug, Clone, PartialEq)]
pub enum JsonNode {
    Object(JsonObject),
    /// Arrays use Box<SmallVec> to keep the enum small
    Array(Box<JsonArray>),
    Primitive(JsonPrimitive),
    Comment {
        text: String,
        position: Option<Position>,
    },
    Undefined {
        position: Option<Position>,
    },
    Constructor {
        name: String,
        arguments: Vec<JsonNode>,
        position: Option<Position>,
    },
}

impl JsonNode {
    /// Creates an empty object node
    pub fn object() -> Self {
        JsonNode::Object(JsonObject::new())
    }

    /// Creates an array node from its elements
    pub fn array(elements: impl IntoIterator<Item = JsonNode>) -> Self {
        JsonNode::Array(Box::new(elements.into_iter().collect()))
    }

    /// Creates a null primitive
    pub fn null() -> Self {
        JsonNode::Primitive(JsonPrimitive::Null)
    }

    /// Returns the kind of this node; primitives report their own kind
    pub fn kind(&self) -> NodeKind {
        match self {
            JsonNode::Object(_) => NodeKind::Object,
            JsonNode::Array(_) => NodeKind::Array,
            JsonNode::Primitive(primitive) => primitive.kind(),
            JsonNode::Comment { .. } => NodeKind::Comment,
            JsonNode::Undefined { .. } => NodeKind::Undefined,
            JsonNode::Constructor { .. } => NodeKind::Constructor,
        }
    }

    /// Source location, when the producing parser recorded one
    pub fn position(&self) -> Option<Position> {
        match self {
            JsonNode::Comment { position, .. }
            | JsonNode::Undefined { position }
            | JsonNode::Constructor { position, .. } => *position,
            _ => None,
        }
    }

    /// Returns true if the node is an object
    pub fn is_object(&self) -> bool {
        matches!(self, JsonNode::Object(_))
    }

    /// Returns true if the node is an array
    pub fn is_array(&self) -> bool {
        matches!(self, JsonNode::Array(_))
    }

    /// Returns true if the node is a primitive leaf
    pub fn is_primitive(&self) -> bool {
        matches!(self, JsonNode::Primitive(_))
    }

    /// Returns a reference to the object if this is an Object variant
    pub fn as_object(&self) -> Option<&JsonObject> {
        if let JsonNode::Object(obj) = self {
            Some(obj)
        } else {
            None
        }
    }

    /// Returns a mutable reference to the object if this is an Object variant
    pub fn as_object_mut(&mut self) -> Option<&mut JsonObject> {
        if let JsonNode::Object(obj) = self {
            Some(obj)
        } else {
            None
        }
    }

    /// Returns a reference to the array if this is an Array variant
    pub fn as_array(&self) -> Option<&JsonArray> {
        if let JsonNode::Array(arr) = self {
            Some(arr)
        } else {
            None
        }
    }

    /// Returns a reference to the primitive if this is a leaf
    pub fn as_primitive(&self) -> Option<&JsonPrimitive> {
        if let JsonNode::Primitive(primitive) = self {
            Some(primitive)
        } else {
            None
        }
    }
}

impl From<JsonPrimitive> for JsonNode {
    fn from(primitive: JsonPrimitive) -> Self {
        JsonNode::Primitive(primitive)
    }
}

impl From<&str> for JsonNode {
    fn from(value: &str) -> Self {
        JsonNode::Primitive(JsonPrimitive::String(value.to_string()))
    }
}

impl From<String> for JsonNode {
    fn from(value: String) -> Self {
        JsonNode::Primitive(JsonPrimitive::String(value))
    }
}

impl From<i64> for JsonNode {
    fn from(value: i64) -> Self {
        JsonNode::Primitive(JsonPrimitive::Integer(value.into()))
    }
}

impl From<f64> for JsonNode {
    fn from(value: f64) -> Self {
        JsonNode::Primitive(JsonPrimitive::Float(value))
    }
}

impl From<bool> for JsonNode {
    fn from(value: bool) -> Self {
        JsonNode::Primitive(JsonPrimitive::Boolean(value))
    }
}

impl From<JsonObject> for JsonNode {
    fn from(object: JsonObject) -> Self {
        JsonNode::Object(object)
    }
}

impl From<serde_json::Value> for JsonNode {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => JsonNode::null(),
            Value::Bool(b) => b.into(),
            Value::Number(n) => {
                let primitive = if let Some(i) = n.as_i64() {
                    JsonPrimitive::Integer(i.into())
                } else if let Some(u) = n.as_u64() {
                    JsonPrimitive::Integer(u.into())
                } else {
                    JsonPrimitive::from_number_text(n.to_string())
                };
                JsonNode::Primitive(primitive)
            }
            Value::String(s) => s.into(),
            Value::Array(items) => JsonNode::array(items.into_iter().map(JsonNode::from)),
            Value::Object(map) => JsonNode::Object(
                map.into_iter()
                    .map(|(key, value)| (key, JsonNode::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Map key under which serde_json hands over number text it did not convert
const NUMBER_TOKEN: &str = "$serde_json::private::Number";

impl JsonNode {
    /// Parses JSON bytes into a document tree.
    ///
    /// A property name repeated inside one object is reported as
    /// [`FormatError::DuplicateKey`] carrying the composed path of the repeat.
    pub fn from_slice(input: &[u8]) -> Result<JsonNode, JsonConfigError> {
        let mut state = LoadState::default();
        let mut deserializer = serde_json::Deserializer::from_slice(input);
        let result = NodeSeed::new(&mut state)
            .deserialize(&mut deserializer)
            .and_then(|node| deserializer.end().map(|()| node));

        match result {
            Ok(node) => Ok(node),
            Err(err) => match state.duplicate.take() {
                Some(key) => Err(FormatError::DuplicateKey { key }.into()),
                None => Err(err.into()),
            },
        }
    }
}

/// State shared by every node of one document while it is deserialized
#[derive(Default)]
struct LoadState {
    path: PathContext,
    duplicate: Option<String>,
}

struct NodeSeed<'s> {
    state: &'s mut LoadState,
}

impl<'s> NodeSeed<'s> {
    fn new(state: &'s mut LoadState) -> Self {
        Self { state }
    }
}

impl<'de> DeserializeSeed<'de> for NodeSeed<'_> {
    type Value = JsonNode;

    fn deserialize<D>(self, deserializer: D) -> Result<JsonNode, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(JsonNodeVisitor { state: self.state })
    }
}

struct JsonNodeVisitor<'s> {
    state: &'s mut LoadState,
}

impl<'de> Visitor<'de> for JsonNodeVisitor<'_> {
    type Value = JsonNode;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any valid JSON value")
    }

    fn visit_bool<E>(self, value: bool) -> Result<JsonNode, E> {
        Ok(value.into())
    }

    fn visit_i64<E>(self, value: i64) -> Result<JsonNode, E> {
        Ok(JsonNode::Primitive(JsonPrimitive::Integer(value.into())))
    }

    fn visit_u64<E>(self, value: u64) -> Result<JsonNode, E> {
        Ok(JsonNode::Primitive(JsonPrimitive::Integer(value.into())))
    }

    fn visit_i128<E>(self, value: i128) -> Result<JsonNode, E> {
        Ok(JsonNode::Primitive(JsonPrimitive::Integer(value)))
    }

    fn visit_u128<E>(self, value: u128) -> Result<JsonNode, E> {
        Ok(JsonNode::Primitive(JsonPrimitive::from_number_text(
            value.to_string(),
        )))
    }

    fn visit_f64<E>(self, value: f64) -> Result<JsonNode, E> {
        Ok(value.into())
    }

    fn visit_str<E>(self, value: &str) -> Result<JsonNode, E> {
        Ok(value.into())
    }

    fn visit_string<E>(self, value: String) -> Result<JsonNode, E> {
        Ok(value.into())
    }

    fn visit_bytes<E>(self, value: &[u8]) -> Result<JsonNode, E> {
        Ok(JsonNode::Primitive(JsonPrimitive::Bytes(value.to_vec())))
    }

    fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<JsonNode, E> {
        Ok(JsonNode::Primitive(JsonPrimitive::Bytes(value)))
    }

    fn visit_none<E>(self) -> Result<JsonNode, E> {
        Ok(JsonNode::null())
    }

    fn visit_some<D>(self, deserializer: D) -> Result<JsonNode, D::Error>
    where
        D: Deserializer<'de>,
    {
        NodeSeed::new(self.state).deserialize(deserializer)
    }

    fn visit_unit<E>(self) -> Result<JsonNode, E> {
        Ok(JsonNode::null())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<JsonNode, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let state = self.state;
        let mut array = JsonArray::new();
        loop {
            state.path.enter(array.len().to_string());
            let element = seq.next_element_seed(NodeSeed::new(&mut *state))?;
            state.path.exit();
            match element {
                Some(element) => array.push(element),
                None => break,
            }
        }
        Ok(JsonNode::Array(Box::new(array)))
    }

    fn visit_map<A>(self, mut map: A) -> Result<JsonNode, A::Error>
    where
        A: MapAccess<'de>,
    {
        let state = self.state;
        let mut object = JsonObject::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<String>()? {
            if object.is_empty() && key == NUMBER_TOKEN {
                let text: String = map.next_value()?;
                return Ok(JsonNode::Primitive(JsonPrimitive::from_number_text(text)));
            }

            state.path.enter(key.as_str());
            if object.contains_key(&key) {
                let path = state.path.current_path().to_string();
                let err = <A::Error as de::Error>::custom(FormatError::DuplicateKey {
                    key: path.clone(),
                });
                state.duplicate = Some(path);
                return Err(err);
            }
            let value = map.next_value_seed(NodeSeed::new(&mut *state))?;
            state.path.exit();
            object.insert(key, value);
        }
        Ok(JsonNode::Object(object))
    }
}

impl<'de> Deserialize<'de> for JsonNode {
    fn deserialize<D>(deserializer: D) -> Result<JsonNode, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut state = LoadState::default();
        NodeSeed::new(&mut state).deserialize(deserializer)
    }
}

impl Serialize for JsonNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            JsonNode::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (key, value) in object {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            JsonNode::Array(array) => {
                let mut seq = serializer.serialize_seq(Some(array.len()))?;
                for element in array.iter() {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            JsonNode::Primitive(primitive) => primitive.serialize(serializer),
            other => Err(ser::Error::custom(format_args!(
                "Unsupported JSON token '{}' cannot be serialized",
                other.kind()
            ))),
        }
    }
}

impl Serialize for JsonPrimitive {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            JsonPrimitive::Integer(i) => {
                if let Ok(small) = i64::try_from(*i) {
                    serializer.serialize_i64(small)
                } else if let Ok(unsigned) = u64::try_from(*i) {
                    serializer.serialize_u64(unsigned)
                } else {
                    serializer.serialize_i128(*i)
                }
            }
            JsonPrimitive::Float(f) => {
                if f.is_finite() {
                    serializer.serialize_f64(*f)
                } else {
                    Err(ser::Error::custom(format_args!(
                        "{} has no JSON representation",
                        format_float(*f)
                    )))
                }
            }
            JsonPrimitive::String(s) => serializer.serialize_str(s),
            JsonPrimitive::Boolean(b) => serializer.serialize_bool(*b),
            JsonPrimitive::Null => serializer.serialize_unit(),
            JsonPrimitive::Raw(raw) => {
                let raw = serde_json::value::RawValue::from_string(raw.clone())
                    .map_err(ser::Error::custom)?;
                raw.serialize(serializer)
            }
            JsonPrimitive::Bytes(bytes) => serializer.serialize_str(&BASE64.encode(bytes)),
        }
    }
}
