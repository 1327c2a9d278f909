//! Conversion between [`Value`] and `serde_json::Value`.
//!
//! JSON has no map or set, so those use tagged single-key objects:
//!
//! - `{"$map": [[key, value], ...]}`
//! - `{"$set": [member, ...]}`
//!
//! An object whose only key is `"$map"` or `"$set"` therefore cannot round
//! trip as a plain object. `Undefined` is written as `null`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map as JsonMap, Number, Value as Json};

use crate::value::Value;

pub const MAP_TAG: &str = "$map";
pub const SET_TAG: &str = "$set";

fn number_to_json(n: f64) -> Json {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Json::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map(Json::Number).unwrap_or(Json::Null)
}

/// Converts a value to JSON.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Undefined | Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => number_to_json(*n),
        Value::String(s) => Json::String(s.clone()),
        Value::Array(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Object(obj) => Json::Object(
            obj.iter().map(|(k, v)| (k.clone(), to_json(v))).collect(),
        ),
        Value::Map(map) => {
            let pairs = map
                .iter()
                .map(|(k, v)| Json::Array(vec![to_json(k), to_json(v)]))
                .collect();
            let mut tagged = JsonMap::new();
            tagged.insert(MAP_TAG.to_string(), Json::Array(pairs));
            Json::Object(tagged)
        }
        Value::Set(set) => {
            let mut tagged = JsonMap::new();
            tagged.insert(SET_TAG.to_string(), Json::Array(set.iter().map(to_json).collect()));
            Json::Object(tagged)
        }
    }
}

fn tagged(obj: &JsonMap<String, Json>) -> Option<Value> {
    if obj.len() != 1 {
        return None;
    }
    let (tag, body) = obj.iter().next()?;
    let items = body.as_array()?;
    match tag.as_str() {
        MAP_TAG => {
            let mut pairs = Vec::with_capacity(items.len());
            for item in items {
                match item.as_array().map(Vec::as_slice) {
                    Some([k, v]) => pairs.push((from_json(k), from_json(v))),
                    _ => return None,
                }
            }
            Some(Value::map(pairs))
        }
        SET_TAG => Some(Value::set(items.iter().map(from_json))),
        _ => None,
    }
}

/// Converts JSON to a value.
pub fn from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::array(items.iter().map(from_json)),
        Json::Object(obj) => tagged(obj).unwrap_or_else(|| {
            Value::object(obj.iter().map(|(k, v)| (k.clone(), from_json(v))))
        }),
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        from_json(&json)
    }
}

impl From<&Value> for Json {
    fn from(value: &Value) -> Self {
        to_json(value)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        to_json(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Json::deserialize(deserializer).map(|json| from_json(&json))
    }
}
