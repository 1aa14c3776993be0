//! Core type system for tfplug
//!
//! This module provides the core types used throughout the framework,
//! including Dynamic values, numbers, attribute paths and diagnostics.

use crate::error::{Result, TfplugError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Number is Terraform's arbitrary-precision number.
///
/// The value is kept as canonical decimal text (no leading zeros, no
/// trailing fractional zeros, no negative zero) so that equality is exact
/// and integers of any size survive a round trip. Conversions to machine
/// types are checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number(String);

impl Number {
    pub fn from_i64(value: i64) -> Self {
        Self(value.to_string())
    }

    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(TfplugError::InvalidNumber(value.to_string()));
        }
        // f64 Display never uses exponent notation
        Self::parse(&value.to_string())
    }

    /// Parses plain decimal notation such as `42`, `-7`, `0.25` or `+3.50`.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || TfplugError::InvalidNumber(text.to_string());

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let int_part = match int_part.trim_start_matches('0') {
            "" => "0",
            digits => digits,
        };
        let frac_part = frac_part.trim_end_matches('0');

        let mut canonical = String::with_capacity(text.len());
        if negative && (int_part != "0" || !frac_part.is_empty()) {
            canonical.push('-');
        }
        canonical.push_str(int_part);
        if !frac_part.is_empty() {
            canonical.push('.');
            canonical.push_str(frac_part);
        }
        Ok(Self(canonical))
    }

    pub fn is_integer(&self) -> bool {
        !self.0.contains('.')
    }

    /// Exact conversion; fails for fractional values and values outside the i64 range.
    pub fn as_i64(&self) -> Result<i64> {
        if !self.is_integer() {
            return Err(TfplugError::InvalidNumber(format!(
                "{} is not an integer",
                self.0
            )));
        }
        self.0
            .parse::<i64>()
            .map_err(|_| TfplugError::NumberOutOfRange {
                value: self.0.clone(),
                target: "i64",
            })
    }

    /// Nearest f64; large or long values lose precision.
    pub fn as_f64(&self) -> f64 {
        self.0.parse().unwrap_or(f64::NAN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Number {
    type Err = TfplugError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.as_i64() {
            Ok(n) => serializer.serialize_i64(n),
            Err(_) => serializer.serialize_f64(self.as_f64()),
        }
    }
}

/// Dynamic represents Terraform values that can be of any type
/// This is the core type for all configuration and state data
/// IMPORTANT: Always use type-safe accessors instead of matching directly
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    /// Explicit null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value, arbitrary precision
    Number(Number),
    /// String value
    String(String),
    /// List of values (ordered, allows duplicates)
    List(Vec<Dynamic>),
    /// Map of string keys to values (objects are represented as Maps)
    Map(HashMap<String, Dynamic>),
    /// Value not yet known (during planning)
    Unknown,
}

impl Dynamic {
    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Dynamic::Unknown)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Dynamic::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Dynamic::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Dynamic]> {
        match self {
            Dynamic::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, Dynamic>> {
        match self {
            Dynamic::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Number(_) => "number",
            Dynamic::String(_) => "string",
            Dynamic::List(_) => "list",
            Dynamic::Map(_) => "map",
            Dynamic::Unknown => "unknown",
        }
    }
}

impl From<String> for Dynamic {
    fn from(value: String) -> Self {
        Dynamic::String(value)
    }
}

impl From<&str> for Dynamic {
    fn from(value: &str) -> Self {
        Dynamic::String(value.to_string())
    }
}

impl From<bool> for Dynamic {
    fn from(value: bool) -> Self {
        Dynamic::Bool(value)
    }
}

impl From<Number> for Dynamic {
    fn from(value: Number) -> Self {
        Dynamic::Number(value)
    }
}

impl From<i64> for Dynamic {
    fn from(value: i64) -> Self {
        Dynamic::Number(Number::from_i64(value))
    }
}

impl<T: Into<Dynamic>> From<Option<T>> for Dynamic {
    fn from(value: Option<T>) -> Self {
        value.map_or(Dynamic::Null, Into::into)
    }
}

impl Serialize for Dynamic {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Dynamic::Null => serializer.serialize_unit(),
            Dynamic::Bool(b) => serializer.serialize_bool(*b),
            Dynamic::Number(n) => n.serialize(serializer),
            Dynamic::String(s) => serializer.serialize_str(s),
            Dynamic::List(l) => l.serialize(serializer),
            Dynamic::Map(m) => m.serialize(serializer),
            Dynamic::Unknown => serializer.serialize_str("__unknown__"),
        }
    }
}

impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct DynamicVisitor;

        impl<'de> Visitor<'de> for DynamicVisitor {
            type Value = Dynamic;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid Dynamic value")
            }

            fn visit_unit<E>(self) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Null)
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Number(Number::from_i64(value)))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Number::parse(&value.to_string())
                    .map(Dynamic::Number)
                    .map_err(E::custom)
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Number::from_f64(value)
                    .map(Dynamic::Number)
                    .map_err(E::custom)
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                if value == "__unknown__" {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value.to_string()))
                }
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                if value == "__unknown__" {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value))
                }
            }

            fn visit_seq<V>(self, mut seq: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Dynamic::List(vec))
            }

            fn visit_map<V>(self, mut map: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut hashmap = HashMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    hashmap.insert(key, value);
                }
                Ok(Dynamic::Map(hashmap))
            }
        }

        deserializer.deserialize_any(DynamicVisitor)
    }
}

/// DynamicValue wraps Dynamic and provides path-based access
/// This is what gets passed between Terraform and the provider
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicValue {
    pub value: Dynamic,
}

impl DynamicValue {
    pub fn new(value: Dynamic) -> Self {
        Self { value }
    }

    pub fn null() -> Self {
        Self {
            value: Dynamic::Null,
        }
    }

    pub fn unknown() -> Self {
        Self {
            value: Dynamic::Unknown,
        }
    }

    /// Empty object, the usual starting point for building state
    pub fn object() -> Self {
        Self {
            value: Dynamic::Map(HashMap::new()),
        }
    }

    pub fn encode_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.value)
            .map_err(|e| TfplugError::EncodingError(format!("json encoding failed: {}", e)))
    }

    pub fn decode_json(data: &[u8]) -> Result<Self> {
        let value = serde_json::from_slice(data)?;
        Ok(Self { value })
    }

    /// Raw access to the value at `path`
    pub fn get(&self, path: &AttributePath) -> Result<&Dynamic> {
        self.navigate_path(path)
    }

    /// Type-safe accessors - ALWAYS use these instead of pattern matching
    /// These handle path navigation and type checking
    pub fn get_string(&self, path: &AttributePath) -> Result<String> {
        let value = self.navigate_path(path)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| type_mismatch("string", value))
    }

    pub fn get_number(&self, path: &AttributePath) -> Result<Number> {
        let value = self.navigate_path(path)?;
        value
            .as_number()
            .cloned()
            .ok_or_else(|| type_mismatch("number", value))
    }

    pub fn get_i64(&self, path: &AttributePath) -> Result<i64> {
        self.get_number(path)?.as_i64()
    }

    pub fn get_bool(&self, path: &AttributePath) -> Result<bool> {
        let value = self.navigate_path(path)?;
        value
            .as_bool()
            .ok_or_else(|| type_mismatch("bool", value))
    }

    pub fn get_list(&self, path: &AttributePath) -> Result<Vec<Dynamic>> {
        let value = self.navigate_path(path)?;
        value
            .as_list()
            .map(<[Dynamic]>::to_vec)
            .ok_or_else(|| type_mismatch("list", value))
    }

    pub fn get_map(&self, path: &AttributePath) -> Result<HashMap<String, Dynamic>> {
        let value = self.navigate_path(path)?;
        value
            .as_map()
            .cloned()
            .ok_or_else(|| type_mismatch("map", value))
    }

    /// Optional accessors treat a missing, null or unknown attribute as `None`
    /// but still reject a value of the wrong type
    pub fn get_optional_string(&self, path: &AttributePath) -> Result<Option<String>> {
        self.optional(path, |v| v.as_str().map(str::to_string), "string")
    }

    pub fn get_optional_number(&self, path: &AttributePath) -> Result<Option<Number>> {
        self.optional(path, |v| v.as_number().cloned(), "number")
    }

    pub fn get_optional_bool(&self, path: &AttributePath) -> Result<Option<bool>> {
        self.optional(path, Dynamic::as_bool, "bool")
    }

    pub fn get_optional_list(&self, path: &AttributePath) -> Result<Option<Vec<Dynamic>>> {
        self.optional(path, |v| v.as_list().map(<[Dynamic]>::to_vec), "list")
    }

    /// Type-safe setters - Use for building state/config objects
    pub fn set_string(&mut self, path: &AttributePath, value: String) -> Result<()> {
        self.set_value(path, Dynamic::String(value))
    }

    pub fn set_number(&mut self, path: &AttributePath, value: Number) -> Result<()> {
        self.set_value(path, Dynamic::Number(value))
    }

    pub fn set_bool(&mut self, path: &AttributePath, value: bool) -> Result<()> {
        self.set_value(path, Dynamic::Bool(value))
    }

    pub fn set_list(&mut self, path: &AttributePath, value: Vec<Dynamic>) -> Result<()> {
        self.set_value(path, Dynamic::List(value))
    }

    pub fn set_map(&mut self, path: &AttributePath, value: HashMap<String, Dynamic>) -> Result<()> {
        self.set_value(path, Dynamic::Map(value))
    }

    pub fn set_null(&mut self, path: &AttributePath) -> Result<()> {
        self.set_value(path, Dynamic::Null)
    }

    pub fn set(&mut self, path: &AttributePath, value: impl Into<Dynamic>) -> Result<()> {
        self.set_value(path, value.into())
    }

    /// Helpers for handling unknown values during planning
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn is_unknown(&self) -> bool {
        self.value.is_unknown()
    }

    /// Mark computed values as unknown during planning
    pub fn mark_unknown(&mut self, path: &AttributePath) -> Result<()> {
        self.set_value(path, Dynamic::Unknown)
    }

    // Private helper methods
    fn optional<T>(
        &self,
        path: &AttributePath,
        extract: impl Fn(&Dynamic) -> Option<T>,
        expected: &str,
    ) -> Result<Option<T>> {
        match self.navigate_path(path) {
            Ok(Dynamic::Null) | Ok(Dynamic::Unknown) => Ok(None),
            Ok(value) => extract(value)
                .map(Some)
                .ok_or_else(|| type_mismatch(expected, value)),
            Err(TfplugError::AttributeNotFound(_)) => Ok(None),
            // a null parent object also means the attribute is absent
            Err(_) if self.parent_is_null(path) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn parent_is_null(&self, path: &AttributePath) -> bool {
        let mut parent = path.clone();
        while parent.steps.pop().is_some() {
            if matches!(self.navigate_path(&parent), Ok(Dynamic::Null)) {
                return true;
            }
        }
        false
    }

    fn navigate_path<'a>(&'a self, path: &AttributePath) -> Result<&'a Dynamic> {
        let mut current = &self.value;

        for step in &path.steps {
            current = match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name))
                | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => m
                    .get(name)
                    .ok_or_else(|| TfplugError::AttributeNotFound(name.clone()))?,
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => usize::try_from(*idx)
                    .ok()
                    .and_then(|i| l.get(i))
                    .ok_or_else(|| {
                        TfplugError::InvalidPath(format!("list index {} out of bounds", idx))
                    })?,
                (value, step) => {
                    return Err(TfplugError::InvalidPath(format!(
                        "cannot apply {:?} to {}",
                        step,
                        value.type_name()
                    )))
                }
            };
        }

        Ok(current)
    }

    fn set_value(&mut self, path: &AttributePath, new_value: Dynamic) -> Result<()> {
        let Some((last, parents)) = path.steps.split_last() else {
            self.value = new_value;
            return Ok(());
        };

        // For non-empty paths, ensure we have a map at the root
        if !matches!(self.value, Dynamic::Map(_) | Dynamic::List(_)) {
            self.value = Dynamic::Map(HashMap::new());
        }

        let mut current = &mut self.value;
        for (idx, step) in parents.iter().enumerate() {
            current = match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name))
                | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => {
                    let slot = m.entry(name.clone()).or_insert(Dynamic::Null);
                    if slot.is_null() {
                        // Determine what to insert based on next step
                        *slot = match path.steps.get(idx + 1) {
                            Some(AttributePathStep::ElementKeyInt(_)) => Dynamic::List(Vec::new()),
                            _ => Dynamic::Map(HashMap::new()),
                        };
                    }
                    slot
                }
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(i)) => {
                    let len = l.len();
                    usize::try_from(*i)
                        .ok()
                        .and_then(|i| l.get_mut(i))
                        .ok_or_else(|| {
                            TfplugError::InvalidPath(format!(
                                "list index {} out of bounds (len {})",
                                i, len
                            ))
                        })?
                }
                (value, step) => {
                    return Err(TfplugError::InvalidPath(format!(
                        "cannot apply {:?} to {}",
                        step,
                        value.type_name()
                    )))
                }
            };
        }

        match (current, last) {
            (Dynamic::Map(m), AttributePathStep::AttributeName(name))
            | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => {
                m.insert(name.clone(), new_value);
                Ok(())
            }
            (Dynamic::List(l), AttributePathStep::ElementKeyInt(i)) => {
                let len = l.len();
                match usize::try_from(*i) {
                    Ok(i) if i < len => {
                        l[i] = new_value;
                        Ok(())
                    }
                    Ok(i) if i == len => {
                        l.push(new_value);
                        Ok(())
                    }
                    _ => Err(TfplugError::InvalidPath(format!(
                        "list index {} out of bounds (len {})",
                        i, len
                    ))),
                }
            }
            (value, step) => Err(TfplugError::InvalidPath(format!(
                "cannot apply {:?} to {}",
                step,
                value.type_name()
            ))),
        }
    }
}

fn type_mismatch(expected: &str, actual: &Dynamic) -> TfplugError {
    TfplugError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}

/// AttributePath represents a path to an attribute within a DynamicValue
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePath {
    pub steps: Vec<AttributePathStep>,
}

impl AttributePath {
    pub fn new(name: &str) -> Self {
        Self {
            steps: vec![AttributePathStep::AttributeName(name.to_string())],
        }
    }

    pub fn root() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.steps
            .push(AttributePathStep::AttributeName(name.to_string()));
        self
    }

    pub fn index(mut self, idx: i64) -> Self {
        self.steps.push(AttributePathStep::ElementKeyInt(idx));
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.steps
            .push(AttributePathStep::ElementKeyString(key.to_string()));
        self
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                AttributePathStep::AttributeName(name) if i == 0 => write!(f, "{}", name)?,
                AttributePathStep::AttributeName(name) => write!(f, ".{}", name)?,
                AttributePathStep::ElementKeyString(key) => write!(f, "[{:?}]", key)?,
                AttributePathStep::ElementKeyInt(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

/// Individual step in an AttributePath
#[derive(Debug, Clone, PartialEq)]
pub enum AttributePathStep {
    /// Access attribute by name in object/map
    AttributeName(String),
    /// Access element by string key (for maps)
    ElementKeyString(String),
    /// Access element by integer index (for lists)
    ElementKeyInt(i64),
}

/// Diagnostic represents a warning or error from the provider
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    pub detail: String,
    pub attribute: Option<AttributePath>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, path: AttributePath) -> Self {
        self.attribute = Some(path);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticSeverity {
    Invalid,
    Error,
    Warning,
}

/// Convenience checks over a list of diagnostics
pub trait Diagnostics {
    fn has_errors(&self) -> bool;
}

impl Diagnostics for [Diagnostic] {
    fn has_errors(&self) -> bool {
        self.iter().any(Diagnostic::is_error)
    }
}

/// Config represents configuration values
pub type Config = DynamicValue;

/// State represents resource state values
pub type State = DynamicValue;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_value_string_access() {
        let mut dv = DynamicValue::object();
        dv.set_string(&AttributePath::new("name"), "test".to_string())
            .unwrap();

        let result = dv.get_string(&AttributePath::new("name")).unwrap();
        assert_eq!(result, "test");
    }

    #[test]
    fn dynamic_value_nested_access() {
        let mut dv = DynamicValue::object();
        let path = AttributePath::new("config").attribute("endpoint");
        dv.set_string(&path, "https://example.com".to_string())
            .unwrap();

        let result = dv.get_string(&path).unwrap();
        assert_eq!(result, "https://example.com");
    }

    #[test]
    fn dynamic_value_list_append_and_index() {
        let mut dv = DynamicValue::object();
        dv.set_list(&AttributePath::new("owners"), vec![])
            .unwrap();
        dv.set(&AttributePath::new("owners").index(0), 7i64).unwrap();
        dv.set(&AttributePath::new("owners").index(1), 9i64).unwrap();

        assert_eq!(dv.get_i64(&AttributePath::new("owners").index(1)).unwrap(), 9);
        assert!(dv.set(&AttributePath::new("owners").index(5), 1i64).is_err());
    }

    #[test]
    fn optional_accessors_treat_missing_and_null_as_none() {
        let mut dv = DynamicValue::object();
        dv.set_null(&AttributePath::new("description")).unwrap();
        dv.set_null(&AttributePath::new("value")).unwrap();

        assert_eq!(
            dv.get_optional_string(&AttributePath::new("description"))
                .unwrap(),
            None
        );
        assert_eq!(
            dv.get_optional_string(&AttributePath::new("missing"))
                .unwrap(),
            None
        );
        assert_eq!(
            dv.get_optional_bool(&AttributePath::new("value").attribute("enabled"))
                .unwrap(),
            None
        );
    }

    #[test]
    fn optional_accessors_reject_wrong_type() {
        let mut dv = DynamicValue::object();
        dv.set_bool(&AttributePath::new("description"), true)
            .unwrap();

        let err = dv
            .get_optional_string(&AttributePath::new("description"))
            .unwrap_err();
        assert!(matches!(err, TfplugError::TypeMismatch { .. }));
    }

    #[test]
    fn number_parse_canonicalizes() {
        assert_eq!(Number::parse("007").unwrap().as_str(), "7");
        assert_eq!(Number::parse("+3.50").unwrap().as_str(), "3.5");
        assert_eq!(Number::parse("-0.000").unwrap().as_str(), "0");
        assert_eq!(Number::parse("10.").unwrap(), Number::from_i64(10));
        assert_eq!(Number::from_f64(10.0).unwrap(), Number::from_i64(10));
        assert!(Number::parse("1e3").is_err());
        assert!(Number::parse(".").is_err());
        assert!(Number::parse("").is_err());
        assert!(Number::from_f64(f64::NAN).is_err());
    }

    #[test]
    fn number_i64_conversion_is_exact() {
        let big = Number::from_i64(i64::MAX);
        assert_eq!(big.as_i64().unwrap(), i64::MAX);

        let min = Number::from_i64(i64::MIN);
        assert_eq!(min.as_i64().unwrap(), i64::MIN);

        let too_big = Number::parse("9223372036854775808").unwrap();
        assert!(matches!(
            too_big.as_i64(),
            Err(TfplugError::NumberOutOfRange { .. })
        ));

        let fractional = Number::parse("1.5").unwrap();
        assert!(matches!(
            fractional.as_i64(),
            Err(TfplugError::InvalidNumber(_))
        ));
    }

    #[test]
    fn json_round_trip_preserves_integers() {
        let json = br#"{"id": 9007199254740993, "ratio": 0.25, "name": null}"#;
        let dv = DynamicValue::decode_json(json).unwrap();

        assert_eq!(
            dv.get_i64(&AttributePath::new("id")).unwrap(),
            9_007_199_254_740_993
        );
        assert_eq!(
            dv.get_number(&AttributePath::new("ratio")).unwrap().as_str(),
            "0.25"
        );

        let encoded = dv.encode_json().unwrap();
        let decoded = DynamicValue::decode_json(&encoded).unwrap();
        assert_eq!(decoded, dv);
    }

    #[test]
    fn attribute_path_display() {
        let path = AttributePath::new("multivariate_options")
            .index(2)
            .attribute("type");
        assert_eq!(path.to_string(), "multivariate_options[2].type");
    }

    #[test]
    fn diagnostics_has_errors() {
        let diags = vec![Diagnostic::warning("w", "")];
        assert!(!diags.has_errors());

        let diags = vec![Diagnostic::warning("w", ""), Diagnostic::error("e", "")];
        assert!(diags.has_errors());
    }
}
