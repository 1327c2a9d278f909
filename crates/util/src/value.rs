//! The value tree that drafts are taken over.
//!
//! Containers are reference counted so that untouched subtrees are shared
//! between a base state and the states produced from it. Every container
//! mutator on [`Value`] checks the node's frozen flag first.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::json_equal::deep_equal;
use crate::node::{Node, WriteError};

pub type Array = Vec<Value>;
pub type Object = IndexMap<String, Value>;
pub type Map = IndexMap<Value, Value>;
pub type Set = IndexSet<Value>;

#[derive(Debug, Clone, Default)]
pub enum Value {
    /// A missing value or an array hole.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Arc<Node<Array>>),
    Object(Arc<Node<Object>>),
    Map(Arc<Node<Map>>),
    Set(Arc<Node<Set>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Undefined,
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
    Map,
    Set,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Undefined => "undefined",
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
            ValueKind::Map => "map",
            ValueKind::Set => "set",
        }
    }
}

fn write<T: Clone>(node: &mut Arc<Node<T>>) -> Result<&mut T, WriteError> {
    if node.is_frozen() {
        return Err(WriteError::Frozen);
    }
    Arc::make_mut(node).get_mut()
}

impl Value {
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(Arc::new(Node::new(items.into_iter().collect())))
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(Arc::new(Node::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Value::Map(Arc::new(Node::new(entries.into_iter().collect())))
    }

    pub fn set(members: impl IntoIterator<Item = Value>) -> Self {
        Value::Set(Arc::new(Node::new(members.into_iter().collect())))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Undefined => ValueKind::Undefined,
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
            Value::Map(_) => ValueKind::Map,
            Value::Set(_) => ValueKind::Set,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Value::Array(_) | Value::Object(_) | Value::Map(_) | Value::Set(_)
        )
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Whether the container node is frozen. Scalars are always immutable.
    pub fn is_frozen(&self) -> bool {
        match self {
            Value::Array(n) => n.is_frozen(),
            Value::Object(n) => n.is_frozen(),
            Value::Map(n) => n.is_frozen(),
            Value::Set(n) => n.is_frozen(),
            _ => true,
        }
    }

    /// Whether both values are the same shared container node.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            (Value::Set(a), Value::Set(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
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

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&Set> {
        match self {
            Value::Set(n) => Some(n),
            _ => None,
        }
    }

    /// Number of members of a container; `0` for scalars.
    pub fn len(&self) -> usize {
        match self {
            Value::Array(n) => n.len(),
            Value::Object(n) => n.len(),
            Value::Map(n) => n.len(),
            Value::Set(n) => n.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Object property lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|o| o.get(key))
    }

    /// Array element lookup.
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.as_array().and_then(|a| a.get(index))
    }

    fn mismatch(&self, expected: &'static str) -> WriteError {
        WriteError::Mismatch {
            expected,
            found: self.kind().as_str(),
        }
    }

    pub fn array_mut(&mut self) -> Result<&mut Array, WriteError> {
        match self {
            Value::Array(n) => write(n),
            other => Err(other.mismatch("array")),
        }
    }

    pub fn object_mut(&mut self) -> Result<&mut Object, WriteError> {
        match self {
            Value::Object(n) => write(n),
            other => Err(other.mismatch("object")),
        }
    }

    pub fn map_mut(&mut self) -> Result<&mut Map, WriteError> {
        match self {
            Value::Map(n) => write(n),
            other => Err(other.mismatch("map")),
        }
    }

    pub fn set_mut(&mut self) -> Result<&mut Set, WriteError> {
        match self {
            Value::Set(n) => write(n),
            other => Err(other.mismatch("set")),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Result<Option<Value>, WriteError> {
        Ok(self.object_mut()?.insert(key.into(), value))
    }

    pub fn remove(&mut self, key: &str) -> Result<Option<Value>, WriteError> {
        Ok(self.object_mut()?.shift_remove(key))
    }

    pub fn push(&mut self, value: Value) -> Result<(), WriteError> {
        self.array_mut()?.push(value);
        Ok(())
    }

    pub fn map_set(&mut self, key: Value, value: Value) -> Result<Option<Value>, WriteError> {
        Ok(self.map_mut()?.insert(key, value))
    }

    pub fn map_delete(&mut self, key: &Value) -> Result<bool, WriteError> {
        Ok(self.map_mut()?.shift_remove(key).is_some())
    }

    pub fn map_clear(&mut self) -> Result<(), WriteError> {
        self.map_mut()?.clear();
        Ok(())
    }

    pub fn set_add(&mut self, member: Value) -> Result<bool, WriteError> {
        Ok(self.set_mut()?.insert(member))
    }

    pub fn set_delete(&mut self, member: &Value) -> Result<bool, WriteError> {
        Ok(self.set_mut()?.shift_remove(member))
    }

    pub fn set_clear(&mut self) -> Result<(), WriteError> {
        self.set_mut()?.clear();
        Ok(())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        deep_equal(self, other)
    }
}

impl Eq for Value {}

fn hash_number<H: Hasher>(n: f64, state: &mut H) {
    // SameValueZero: 0.0 and -0.0 collide, every NaN collides
    let bits = if n == 0.0 {
        0u64
    } else if n.is_nan() {
        f64::NAN.to_bits()
    } else {
        n.to_bits()
    };
    bits.hash(state);
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Value::Undefined | Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Number(n) => hash_number(*n, state),
            Value::String(s) => s.hash(state),
            Value::Array(items) => {
                items.len().hash(state);
                for item in items.iter() {
                    item.hash(state);
                }
            }
            // unordered containers compare order-insensitively
            Value::Object(n) => n.len().hash(state),
            Value::Map(n) => n.len().hash(state),
            Value::Set(n) => n.len().hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
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
        Value::array(items)
    }
}
