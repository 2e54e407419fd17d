//! Runtime values validated by schema nodes.
//!
//! Schemas describe dynamically-typed data, so the engine works over a small
//! closed value model:
//!
//! | Variant | `typeof` | Equality |
//! |---------|----------|----------|
//! | `Undefined` / `Null` | `"undefined"` / `"object"` | by variant |
//! | `Boolean`, `Number`, `BigInt`, `String` | primitive name | by value |
//! | `Symbol` | `"symbol"` | by identity |
//! | `Object` | `"object"` or `"function"` | by identity |
//!
//! Objects carry an optional [`Proto`] (their constructor chain), ordered own
//! properties, and a body describing whether they are plain objects, arrays,
//! dates, or callables.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// =============================================================================
// Domain
// =============================================================================

/// The runtime domain of a value.
///
/// Only the non-enumerable domains (`string`, `number`, `bigint`, `symbol`,
/// `object`) can be the basis of a `domain` node; `boolean`, `null` and
/// `undefined` have finitely many values and are represented as units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Domain {
    Bigint,
    Boolean,
    Null,
    Number,
    Object,
    String,
    Symbol,
    Undefined,
}

impl Domain {
    pub const NON_ENUMERABLE: [Domain; 5] = [
        Domain::Bigint,
        Domain::Number,
        Domain::Object,
        Domain::String,
        Domain::Symbol,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Domain::Bigint => "bigint",
            Domain::Boolean => "boolean",
            Domain::Null => "null",
            Domain::Number => "number",
            Domain::Object => "object",
            Domain::String => "string",
            Domain::Symbol => "symbol",
            Domain::Undefined => "undefined",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "bigint" => Domain::Bigint,
            "boolean" => Domain::Boolean,
            "null" => Domain::Null,
            "number" => Domain::Number,
            "object" => Domain::Object,
            "string" => Domain::String,
            "symbol" => Domain::Symbol,
            "undefined" => Domain::Undefined,
            _ => return None,
        })
    }

    pub const fn is_non_enumerable(self) -> bool {
        !matches!(self, Domain::Boolean | Domain::Null | Domain::Undefined)
    }

    /// Default description used by `domain` nodes and error messages.
    pub const fn description(self) -> &'static str {
        match self {
            Domain::Bigint => "a bigint",
            Domain::Boolean => "boolean",
            Domain::Null => "null",
            Domain::Number => "a number",
            Domain::Object => "an object",
            Domain::String => "a string",
            Domain::Symbol => "a symbol",
            Domain::Undefined => "undefined",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Symbol
// =============================================================================

/// A unique symbol, compared by identity.
#[derive(Clone)]
pub struct Symbol(Arc<SymbolData>);

struct SymbolData {
    description: Option<Arc<str>>,
}

impl Symbol {
    pub fn new(description: impl Into<Arc<str>>) -> Self {
        Self(Arc::new(SymbolData {
            description: Some(description.into()),
        }))
    }

    pub fn anonymous() -> Self {
        Self(Arc::new(SymbolData { description: None }))
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or(""))
    }
}

// =============================================================================
// Proto
// =============================================================================

/// A constructor that objects can be instances of.
///
/// Protos form a single-inheritance chain; `instanceof` succeeds for the
/// object's own proto and every ancestor.
#[derive(Clone)]
pub struct Proto(Arc<ProtoData>);

struct ProtoData {
    name: Arc<str>,
    parent: Option<Proto>,
}

static OBJECT_PROTO: Lazy<Proto> = Lazy::new(|| {
    Proto(Arc::new(ProtoData {
        name: Arc::from("Object"),
        parent: None,
    }))
});
static ARRAY_PROTO: Lazy<Proto> = Lazy::new(|| Proto::extending("Array", &OBJECT_PROTO));
static DATE_PROTO: Lazy<Proto> = Lazy::new(|| Proto::extending("Date", &OBJECT_PROTO));
static FUNCTION_PROTO: Lazy<Proto> = Lazy::new(|| Proto::extending("Function", &OBJECT_PROTO));
static REGEXP_PROTO: Lazy<Proto> = Lazy::new(|| Proto::extending("RegExp", &OBJECT_PROTO));
static ERROR_PROTO: Lazy<Proto> = Lazy::new(|| Proto::extending("Error", &OBJECT_PROTO));

impl Proto {
    /// A new constructor deriving directly from `Object`.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self::extending(name, &OBJECT_PROTO)
    }

    pub fn extending(name: impl Into<Arc<str>>, parent: &Proto) -> Self {
        Self(Arc::new(ProtoData {
            name: name.into(),
            parent: Some(parent.clone()),
        }))
    }

    pub fn object() -> Proto {
        OBJECT_PROTO.clone()
    }

    pub fn array() -> Proto {
        ARRAY_PROTO.clone()
    }

    pub fn date() -> Proto {
        DATE_PROTO.clone()
    }

    pub fn function() -> Proto {
        FUNCTION_PROTO.clone()
    }

    pub fn regexp() -> Proto {
        REGEXP_PROTO.clone()
    }

    pub fn error() -> Proto {
        ERROR_PROTO.clone()
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&Proto> {
        self.0.parent.as_ref()
    }

    /// True if `self` is `ancestor` or derives from it.
    pub fn is_subclass_of(&self, ancestor: &Proto) -> bool {
        let mut current = Some(self);
        while let Some(proto) = current {
            if proto == ancestor {
                return true;
            }
            current = proto.parent();
        }
        false
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for Proto {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Proto {}

impl Hash for Proto {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for Proto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Proto({})", self.name())
    }
}

// =============================================================================
// Property keys
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropKey {
    String(Arc<str>),
    Symbol(Symbol),
}

impl PropKey {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropKey::String(s) => Some(s),
            PropKey::Symbol(_) => None,
        }
    }
}

impl From<&str> for PropKey {
    fn from(s: &str) -> Self {
        PropKey::String(Arc::from(s))
    }
}

impl From<String> for PropKey {
    fn from(s: String) -> Self {
        PropKey::String(Arc::from(s))
    }
}

impl From<Symbol> for PropKey {
    fn from(s: Symbol) -> Self {
        PropKey::Symbol(s)
    }
}

impl fmt::Display for PropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropKey::String(s) => f.write_str(s),
            PropKey::Symbol(sym) => write!(f, "[Symbol({})]", sym.description().unwrap_or("")),
        }
    }
}

// =============================================================================
// Objects
// =============================================================================

/// Internal payload distinguishing objects with special runtime behavior.
#[derive(Clone, Debug)]
pub enum ObjectBody {
    Plain,
    Array(Vec<Value>),
    /// Milliseconds since the epoch.
    Date(f64),
    Function,
}

/// A reference-identity object value.
#[derive(Clone)]
pub struct Object(Arc<ObjectData>);

struct ObjectData {
    proto: Option<Proto>,
    props: IndexMap<PropKey, Value>,
    body: ObjectBody,
}

impl Object {
    pub fn new(proto: Option<Proto>, body: ObjectBody, props: IndexMap<PropKey, Value>) -> Self {
        Self(Arc::new(ObjectData { proto, props, body }))
    }

    /// A plain `{...}` object.
    pub fn plain<K, I>(props: I) -> Self
    where
        K: Into<PropKey>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let props = props.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::new(Some(Proto::object()), ObjectBody::Plain, props)
    }

    pub fn array(items: Vec<Value>) -> Self {
        Self::new(Some(Proto::array()), ObjectBody::Array(items), IndexMap::new())
    }

    pub fn date(timestamp: f64) -> Self {
        Self::new(Some(Proto::date()), ObjectBody::Date(timestamp), IndexMap::new())
    }

    pub fn function() -> Self {
        Self::new(Some(Proto::function()), ObjectBody::Function, IndexMap::new())
    }

    /// An instance of `proto` with the given own properties.
    pub fn instance<K, I>(proto: &Proto, props: I) -> Self
    where
        K: Into<PropKey>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let props = props.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::new(Some(proto.clone()), ObjectBody::Plain, props)
    }

    pub fn proto(&self) -> Option<&Proto> {
        self.0.proto.as_ref()
    }

    pub fn body(&self) -> &ObjectBody {
        &self.0.body
    }

    pub fn props(&self) -> &IndexMap<PropKey, Value> {
        &self.0.props
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.0.body, ObjectBody::Function)
    }

    pub fn instance_of(&self, proto: &Proto) -> bool {
        self.proto().is_some_and(|own| own.is_subclass_of(proto))
    }

    /// Array length, if this is an array.
    pub fn length(&self) -> Option<usize> {
        match &self.0.body {
            ObjectBody::Array(items) => Some(items.len()),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> Option<f64> {
        match self.0.body {
            ObjectBody::Date(ts) => Some(ts),
            _ => None,
        }
    }

    /// Property lookup, including array indices and `length`.
    pub fn get(&self, key: &PropKey) -> Option<Value> {
        if let Some(value) = self.0.props.get(key) {
            return Some(value.clone());
        }
        let ObjectBody::Array(items) = &self.0.body else {
            return None;
        };
        let name = key.as_str()?;
        if name == "length" {
            return Some(Value::Number(items.len() as f64));
        }
        name.parse::<usize>().ok().and_then(|i| items.get(i).cloned())
    }

    /// A copy of this object with `key` set to `value`.
    ///
    /// The copy keeps the proto and body, so it is a new identity with the
    /// same shape.
    pub fn with_prop(&self, key: &PropKey, value: Value) -> Object {
        let mut body = self.0.body.clone();
        let mut props = self.0.props.clone();
        let index = match (&mut body, key.as_str()) {
            (ObjectBody::Array(items), Some(name)) => name
                .parse::<usize>()
                .ok()
                .filter(|i| *i < items.len())
                .map(|i| (items, i)),
            _ => None,
        };
        match index {
            Some((items, i)) => items[i] = value,
            None => {
                props.insert(key.clone(), value);
            }
        }
        Object::new(self.0.proto.clone(), body, props)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.clone()))
    }
}

// =============================================================================
// Value
// =============================================================================

#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    BigInt(i128),
    String(Arc<str>),
    Symbol(Symbol),
    Object(Object),
}

impl Value {
    /// Shorthand for a plain object value.
    pub fn object<K, I>(props: I) -> Value
    where
        K: Into<PropKey>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(Object::plain(props))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Object(Object::array(items))
    }

    pub fn domain(&self) -> Domain {
        match self {
            Value::Undefined => Domain::Undefined,
            Value::Null => Domain::Null,
            Value::Boolean(_) => Domain::Boolean,
            Value::Number(_) => Domain::Number,
            Value::BigInt(_) => Domain::Bigint,
            Value::String(_) => Domain::String,
            Value::Symbol(_) => Domain::Symbol,
            Value::Object(_) => Domain::Object,
        }
    }

    /// The result of JavaScript's `typeof` operator.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Null => "object",
            Value::Object(o) if o.is_callable() => "function",
            other => other.domain().name(),
        }
    }

    /// `===` semantics: primitives by value, symbols and objects by identity.
    pub fn strictly_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// `length` of strings (in UTF-16 code units) and arrays.
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.encode_utf16().count()),
            Value::Object(o) => o.length(),
            _ => None,
        }
    }

    /// Own property lookup on objects.
    pub fn get(&self, key: &PropKey) -> Option<Value> {
        self.as_object().and_then(|o| o.get(key))
    }

    /// True for values that can be written as literals in a serialized id.
    pub fn is_serializable(&self) -> bool {
        !matches!(self, Value::Symbol(_) | Value::Object(_))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strictly_equals(other)
    }
}

/// Format a number the way JavaScript prints it.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::BigInt(n) => write!(f, "{n}n"),
            Value::String(s) => write!(f, "{}", serde_json::Value::String(s.to_string())),
            Value::Symbol(sym) => write!(f, "{sym:?}"),
            Value::Object(o) => match o.body() {
                ObjectBody::Array(items) => {
                    f.write_str("[")?;
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{item}")?;
                    }
                    f.write_str("]")
                }
                ObjectBody::Date(ts) => write!(f, "Date({})", format_number(*ts)),
                ObjectBody::Function => f.write_str("Function"),
                ObjectBody::Plain => {
                    f.write_str("{")?;
                    for (i, (key, value)) in o.props().iter().enumerate() {
                        if i > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, " {key}: {value}")?;
                    }
                    if o.props().is_empty() { f.write_str("}") } else { f.write_str(" }") }
                }
            },
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Value::Symbol(s)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

/// Converts JSON data into values: arrays become array objects and maps
/// become plain objects.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => {
                Value::array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::object(map.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}
