//! Value model explored by the traverser.
//!
//! Domain types opt into exploration by implementing [`Inspectable`]. Everything
//! else is represented by the closed [`Value`] union: scalars, collections,
//! string-keyed mappings and producer failures.

use std::fmt;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A type object, kept by name only.
    Type(String),
}

impl Scalar {
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "None",
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "i64",
            Scalar::Float(_) => "f64",
            Scalar::Str(_) => "String",
            Scalar::Type(_) => "type",
        }
    }

    pub fn repr(&self) -> String {
        match self {
            Scalar::Null => "None".to_string(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => format!("{:?}", f),
            Scalar::Str(s) => format!("'{}'", s),
            Scalar::Type(name) => format!("<type '{}'>", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    List,
    Tuple,
    Set,
}

impl SequenceKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            SequenceKind::List => "Vec",
            SequenceKind::Tuple => "Tuple",
            SequenceKind::Set => "Set",
        }
    }

    fn delimiters(&self) -> (&'static str, &'static str) {
        match self {
            SequenceKind::List => ("[", "]"),
            SequenceKind::Tuple => ("(", ")"),
            SequenceKind::Set => ("{", "}"),
        }
    }
}

/// Ordered or unordered collection. Sets keep insertion order so that
/// sampling the first element is deterministic.
#[derive(Debug, Clone)]
pub struct Sequence {
    kind: SequenceKind,
    items: Vec<Value>,
}

impl Sequence {
    pub fn new(kind: SequenceKind, items: Vec<Value>) -> Self {
        Self { kind, items }
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn first(&self) -> Option<&Value> {
        self.items.first()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// String-keyed entries in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    entries: Vec<(String, Value)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the value stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

/// How a member of an [`Inspectable`] is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    /// Zero-argument callable whose result is a discovered child value.
    Producer,
    Container,
    Mapping,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
}

impl Member {
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn field(name: impl Into<String>) -> Self {
        Self::new(name, MemberKind::Field)
    }

    pub fn producer(name: impl Into<String>) -> Self {
        Self::new(name, MemberKind::Producer)
    }

    pub fn container(name: impl Into<String>) -> Self {
        Self::new(name, MemberKind::Container)
    }

    pub fn mapping(name: impl Into<String>) -> Self {
        Self::new(name, MemberKind::Mapping)
    }
}

/// Reading a member failed; the member is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot access '{member}': {message}")]
pub struct AccessError {
    pub member: String,
    pub message: String,
}

impl AccessError {
    pub fn new(member: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            member: member.into(),
            message: message.into(),
        }
    }

    pub fn no_such_member(member: &str) -> Self {
        Self::new(member, "no such member")
    }
}

/// Failure raised by a producer. Carries only the failure's type name and
/// message so it can be turned into a standalone error node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{type_name}: {message}")]
pub struct ProducerError {
    pub type_name: String,
    pub message: String,
}

impl ProducerError {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    pub fn not_a_producer(owner: &str, member: &str) -> Self {
        Self::new(
            "TypeError",
            format!("'{}.{}' is not a zero-argument producer", owner, member),
        )
    }

    /// Converts a caught panic payload into a producer failure.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "producer panicked".to_string()
        };
        Self::new("Panic", message)
    }
}

/// Capability implemented by domain types that can be explored.
pub trait Inspectable: Send + Sync {
    /// Runtime type name, e.g. `Wizard`.
    fn type_name(&self) -> &str;

    /// Defining namespace, e.g. `magic::world`.
    fn namespace(&self) -> &str;

    /// Members in a stable order.
    fn members(&self) -> Vec<Member>;

    /// Reads a field, container or mapping member.
    fn get(&self, name: &str) -> Result<Value, AccessError>;

    /// Invokes a zero-argument producer. Anything the producer wants to print
    /// goes to `out`.
    fn call(&self, name: &str, _out: &mut dyn Write) -> Result<Value, ProducerError> {
        Err(ProducerError::not_a_producer(self.type_name(), name))
    }

    fn preview(&self) -> String {
        format!("<{}.{} object>", self.namespace(), self.type_name())
    }
}

/// Top-level segment of a namespace path (`magic::world` -> `magic`).
pub fn namespace_root(namespace: &str) -> &str {
    namespace
        .split(|c| c == ':' || c == '.')
        .next()
        .unwrap_or(namespace)
}

#[derive(Clone)]
pub enum Value {
    Scalar(Scalar),
    Sequence(Arc<Sequence>),
    Mapping(Arc<Mapping>),
    Object(Arc<dyn Inspectable>),
    Error(Arc<ProducerError>),
}

impl Value {
    pub fn null() -> Self {
        Value::Scalar(Scalar::Null)
    }

    pub fn str(s: impl Into<String>) -> Self {
        Value::Scalar(Scalar::Str(s.into()))
    }

    pub fn type_object(name: impl Into<String>) -> Self {
        Value::Scalar(Scalar::Type(name.into()))
    }

    pub fn object<T: Inspectable + 'static>(obj: T) -> Self {
        Value::Object(Arc::new(obj))
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::sequence(SequenceKind::List, items)
    }

    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Self::sequence(SequenceKind::Tuple, items)
    }

    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Self::sequence(SequenceKind::Set, items)
    }

    pub fn sequence(kind: SequenceKind, items: impl IntoIterator<Item = Value>) -> Self {
        Value::Sequence(Arc::new(Sequence::new(kind, items.into_iter().collect())))
    }

    pub fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Mapping(Arc::new(entries.into_iter().collect()))
    }

    pub fn error(err: ProducerError) -> Self {
        Value::Error(Arc::new(err))
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::Scalar(s) => s.type_name().to_string(),
            Value::Sequence(seq) => seq.kind().type_name().to_string(),
            Value::Mapping(_) => "Map".to_string(),
            Value::Object(obj) => obj.type_name().to_string(),
            Value::Error(err) => err.type_name.clone(),
        }
    }

    /// Element count for countable containers.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Sequence(seq) => Some(seq.len()),
            Value::Mapping(map) => Some(map.len()),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Address of the shared allocation backing a reference value. Scalars and
    /// errors have no identity.
    pub fn address(&self) -> Option<usize> {
        match self {
            Value::Sequence(seq) => Some(Arc::as_ptr(seq) as *const () as usize),
            Value::Mapping(map) => Some(Arc::as_ptr(map) as *const () as usize),
            Value::Object(obj) => Some(Arc::as_ptr(obj) as *const () as usize),
            Value::Scalar(_) | Value::Error(_) => None,
        }
    }

    /// Renders the value, descending `depth` levels into containers.
    pub fn render(&self, depth: usize) -> String {
        match self {
            Value::Scalar(s) => s.repr(),
            Value::Sequence(seq) => {
                let (open, close) = seq.kind().delimiters();
                if depth == 0 {
                    return format!("{}...{}", open, close);
                }
                let items: Vec<String> = seq.items().iter().map(|v| v.render(depth - 1)).collect();
                format!("{}{}{}", open, items.join(", "), close)
            }
            Value::Mapping(map) => {
                if depth == 0 {
                    return "{...}".to_string();
                }
                let entries: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("'{}': {}", k, v.render(depth - 1)))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            Value::Object(obj) => obj.preview(),
            Value::Error(err) => format!("{}('{}')", err.type_name, err.message),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "Scalar({:?})", s),
            Value::Sequence(seq) => write!(f, "Sequence({:?}, len={})", seq.kind(), seq.len()),
            Value::Mapping(map) => write!(f, "Mapping(len={})", map.len()),
            Value::Object(obj) => write!(f, "Object({}::{})", obj.namespace(), obj.type_name()),
            Value::Error(err) => write!(f, "Error({})", err),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Scalar(Scalar::Int(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Scalar(Scalar::Float(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::str(s)
    }
}

impl<T: Inspectable + 'static> From<Arc<T>> for Value {
    fn from(obj: Arc<T>) -> Self {
        Value::Object(obj)
    }
}
