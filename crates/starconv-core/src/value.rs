//! Dynamic values as seen by the scripting side.
//!
//! The model mirrors the Starlark value universe the host exchanges data
//! with: `None`, `bool`, `int` (arbitrary width), `float`, `string`, `list`,
//! `dict`, branded `struct` values and callables. Every variant is a closed
//! enum case so that decode/encode must handle all of them.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::error::{ErrorKind, Result};
use crate::symbol::Symbol;

/// A dynamically-typed script value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(BigInt),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Dict(Dict),
    Struct(Struct),
    Callable(Callable),
}

impl Value {
    /// Script-visible type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Struct(_) => "struct",
            Value::Callable(c) => c.type_name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Script truthiness.
    pub fn truth(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => !i.is_zero(),
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Dict(d) => !d.is_empty(),
            Value::Struct(_) | Value::Callable(_) => true,
        }
    }

    /// Hash used for dict keys.
    ///
    /// Lists, dicts and symbols are unhashable.
    pub fn hash(&self) -> Result<u64> {
        let mut hasher = DefaultHasher::new();
        self.hash_into(&mut hasher)?;
        Ok(hasher.finish())
    }

    fn hash_into(&self, hasher: &mut DefaultHasher) -> Result<()> {
        match self {
            Value::Null => 0u8.hash(hasher),
            Value::Bool(b) => b.hash(hasher),
            Value::Int(i) => i.hash(hasher),
            Value::Float(f) => f.to_bits().hash(hasher),
            Value::String(s) => s.hash(hasher),
            // Equality ignores field order, so hashing must too.
            Value::Struct(s) => {
                s.brand().name().hash(hasher);
                let mut fields: Vec<_> = s.fields().collect();
                fields.sort_by(|a, b| a.0.cmp(b.0));
                for (name, value) in fields {
                    name.hash(hasher);
                    value.hash_into(hasher)?;
                }
            }
            Value::Callable(c) => c.hash()?.hash(hasher),
            Value::List(_) | Value::Dict(_) => {
                return Err(ErrorKind::Unhashable {
                    type_name: self.type_name(),
                }
                .into())
            }
        }
        Ok(())
    }

    /// Invoke the value with positional and keyword arguments.
    pub fn call(&self, args: &[Value], kwargs: &[(String, Value)]) -> Result<Value> {
        match self {
            Value::Callable(c) => c.call(args, kwargs),
            other => Err(ErrorKind::NotCallable {
                type_name: other.type_name(),
            }
            .into()),
        }
    }

    /// The natural text of a scalar: strings unquoted, everything else as
    /// its repr. Returns `None` for lists, dicts and structs.
    pub fn key_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::List(_) | Value::Dict(_) | Value::Struct(_) => None,
            other => Some(other.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("None"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Dict(d) => {
                f.write_str("{")?;
                for (i, (k, v)) in d.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Struct(s) => {
                write!(f, "{}(", s.brand())?;
                for (i, (name, value)) in s.fields().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name} = {value}")?;
                }
                f.write_str(")")
            }
            Value::Callable(c) => c.fmt(f),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(BigInt::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Value::Dict(d)
    }
}

impl From<Struct> for Value {
    fn from(s: Struct) -> Self {
        Value::Struct(s)
    }
}

impl From<Symbol> for Value {
    fn from(sym: Symbol) -> Self {
        Value::Callable(Callable::Symbol(sym))
    }
}

/// Insertion-ordered mapping with keys compared by value.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: Vec<(Value, Value)>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Build a dict from key/value pairs; fails on the first unhashable key.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let mut dict = Dict::new();
        for (k, v) in entries {
            dict.insert(k, v)?;
        }
        Ok(dict)
    }

    /// Insert or replace. An existing equal key keeps its position.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<()> {
        key.hash()?;
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        Ok(())
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Lookup by string key, the common case for record fields.
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

/// A branded record value, produced by calling a [`Symbol`].
#[derive(Debug, Clone)]
pub struct Struct {
    brand: Symbol,
    fields: Vec<(String, Value)>,
}

impl Struct {
    /// Later duplicates overwrite earlier ones.
    pub fn new<I>(brand: Symbol, fields: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut s = Self {
            brand,
            fields: Vec::new(),
        };
        for (name, value) in fields {
            s.set(name, value);
        }
        s
    }

    pub fn brand(&self) -> &Symbol {
        &self.brand
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn set(&mut self, name: String, value: Value) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(field) => field.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PartialEq for Struct {
    fn eq(&self, other: &Self) -> bool {
        self.brand == other.brand
            && self.len() == other.len()
            && self.fields().all(|(n, v)| other.attr(n) == Some(v))
    }
}

/// Signature of a host function exposed to scripts.
pub type BuiltinFn = dyn Fn(&[Value], &[(String, Value)]) -> Result<Value> + Send + Sync;

/// A named host function. Builtins compare by identity.
#[derive(Clone)]
pub struct Builtin {
    name: String,
    func: Arc<BuiltinFn>,
}

impl Builtin {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value], &[(String, Value)]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value], kwargs: &[(String, Value)]) -> Result<Value> {
        (self.func)(args, kwargs)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

/// Anything a script can call.
#[derive(Debug, Clone, PartialEq)]
pub enum Callable {
    Symbol(Symbol),
    Builtin(Builtin),
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Callable::Symbol(sym) => sym.name(),
            Callable::Builtin(b) => b.name(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Callable::Symbol(_) => Symbol::TYPE_NAME,
            Callable::Builtin(_) => "builtin_function_or_method",
        }
    }

    pub fn call(&self, args: &[Value], kwargs: &[(String, Value)]) -> Result<Value> {
        match self {
            Callable::Symbol(sym) => sym.call(args, kwargs),
            Callable::Builtin(b) => b.call(args, kwargs),
        }
    }

    fn hash(&self) -> Result<u64> {
        match self {
            Callable::Symbol(sym) => sym.hash(),
            Callable::Builtin(b) => {
                let mut hasher = DefaultHasher::new();
                (Arc::as_ptr(&b.func) as *const () as usize).hash(&mut hasher);
                Ok(hasher.finish())
            }
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Symbol(sym) => sym.fmt(f),
            Callable::Builtin(b) => write!(f, "<built-in function {}>", b.name()),
        }
    }
}

/// Narrow an int to its low 128 bits, two's complement. Callers cast the
/// result down to the destination width.
pub(crate) fn low_bits(i: &BigInt) -> u128 {
    if let Some(v) = i.to_i128() {
        return v as u128;
    }
    let bytes = i.to_signed_bytes_le();
    let fill = if i.sign() == num_bigint::Sign::Minus {
        0xff
    } else {
        0
    };
    let mut buf = [fill; 16];
    for (slot, b) in buf.iter_mut().zip(bytes.iter()) {
        *slot = *b;
    }
    u128::from_le_bytes(buf)
}
