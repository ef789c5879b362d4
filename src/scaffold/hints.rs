//! Value and assertion heuristics.
//!
//! A parameter's declared type wins when it maps clearly; otherwise the words
//! of its name are matched against an ordered hint table. The first matching
//! hint decides both the sample value and the edge-case value.

use crate::detect::lexical::name_words;
use crate::extract::{Parameter, Routine};

/// What a parameter most likely holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueHint {
    Identifier,
    Name,
    Email,
    Password,
    Numeric,
    Date,
    Boolean,
    Collection,
    Mapping,
    /// Declared with a type the table does not know; only a default fits.
    Object,
    Text,
}

/// What the basic case asserts about the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionShape {
    Numeric,
    Text,
    Collection,
    Mapping,
    NotAbsent,
    NoReturn,
}

const IDENTIFIER_WORDS: &[&str] = &["id", "key", "uuid", "guid"];
const NUMERIC_WORDS: &[&str] = &[
    "age", "count", "num", "number", "amount", "total", "size", "index", "qty", "quantity",
];
const DATE_WORDS: &[&str] = &["date", "time", "timestamp", "birthday"];
const BOOLEAN_PREFIXES: &[&str] = &["is", "has", "can", "should"];
const BOOLEAN_WORDS: &[&str] = &["flag", "bool", "enabled"];
const COLLECTION_WORDS: &[&str] = &["list", "array", "items"];
const MAPPING_WORDS: &[&str] = &["dict", "map", "config", "options", "obj", "settings"];

const NUMERIC_TYPES: &[&str] = &[
    "int", "integer", "long", "short", "byte", "double", "float", "decimal", "size_t",
    "unsigned", "uint", "ulong", "int32_t", "int64_t", "uint32_t", "uint64_t",
];
const TEXT_TYPES: &[&str] = &["string", "str"];
const BOOLEAN_TYPES: &[&str] = &["bool", "boolean"];
const COLLECTION_TYPES: &[&str] = &[
    "list", "array", "vector", "set", "hashset", "arraylist", "collection", "ienumerable",
    "ilist", "icollection", "iterable", "tuple", "sequence",
];
const MAPPING_TYPES: &[&str] = &[
    "dict", "map", "hashmap", "treemap", "dictionary", "idictionary", "unordered_map", "mapping",
];
const DATE_TYPES: &[&str] = &["date", "datetime", "localdate", "localdatetime", "instant"];

/// Lowercase base name of a declared type: generics, namespaces, pointer and
/// reference markers and nullability stripped. `[]` becomes `array`.
pub fn base_type(declared: &str) -> String {
    let declared = declared.trim().trim_start_matches("const ").trim();
    if declared.ends_with("[]") {
        return "array".to_string();
    }
    let head = declared.split('<').next().unwrap_or(declared);
    let head = head
        .trim_start_matches('?')
        .trim_end_matches(['*', '&', '?', ' ']);
    let head = head.rsplit([':', '.', '\\']).next().unwrap_or(head);
    head.to_lowercase()
}

fn hint_from_type(declared: &str) -> Option<ValueHint> {
    let base = base_type(declared);
    let base = base.as_str();
    if NUMERIC_TYPES.contains(&base) {
        Some(ValueHint::Numeric)
    } else if BOOLEAN_TYPES.contains(&base) {
        Some(ValueHint::Boolean)
    } else if COLLECTION_TYPES.contains(&base) {
        Some(ValueHint::Collection)
    } else if MAPPING_TYPES.contains(&base) {
        Some(ValueHint::Mapping)
    } else if DATE_TYPES.contains(&base) {
        Some(ValueHint::Date)
    } else {
        None
    }
}

fn hint_from_name(name: &str) -> ValueHint {
    let words = name_words(name);
    let any = |set: &[&str]| words.iter().any(|w| set.contains(&w.as_str()));
    let any_suffix = |suffix: &str| words.iter().any(|w| w.ends_with(suffix));

    if any(IDENTIFIER_WORDS) {
        ValueHint::Identifier
    } else if any_suffix("name") {
        ValueHint::Name
    } else if any_suffix("email") || any_suffix("mail") {
        ValueHint::Email
    } else if any_suffix("password") || any(&["pwd", "pass"]) {
        ValueHint::Password
    } else if any(NUMERIC_WORDS) {
        ValueHint::Numeric
    } else if any(DATE_WORDS) {
        ValueHint::Date
    } else if words
        .first()
        .is_some_and(|w| BOOLEAN_PREFIXES.contains(&w.as_str()))
        || any(BOOLEAN_WORDS)
    {
        ValueHint::Boolean
    } else if any(COLLECTION_WORDS) {
        ValueHint::Collection
    } else if any(MAPPING_WORDS) {
        ValueHint::Mapping
    } else {
        ValueHint::Text
    }
}

/// Hint for one parameter.
pub fn hint_for(param: &Parameter) -> ValueHint {
    let by_name = hint_from_name(&param.name);
    let Some(declared) = param.type_hint.as_deref() else {
        return by_name;
    };
    if let Some(by_type) = hint_from_type(declared) {
        return by_type;
    }
    let base = base_type(declared);
    if TEXT_TYPES.contains(&base.as_str()) {
        // A string can hold any of the textual hints.
        return match by_name {
            ValueHint::Identifier
            | ValueHint::Name
            | ValueHint::Email
            | ValueHint::Password
            | ValueHint::Date => by_name,
            _ => ValueHint::Text,
        };
    }
    // Dynamic annotations say nothing about the value.
    if matches!(base.as_str(), "any" | "mixed" | "object" | "var" | "auto") {
        return by_name;
    }
    ValueHint::Object
}

/// Shape implied by a declared return type alone.
pub fn declared_shape(return_kind: Option<&str>) -> Option<AssertionShape> {
    let declared = return_kind?;
    let base = base_type(declared);
    let base = base.as_str();
    if matches!(base, "void" | "none") {
        Some(AssertionShape::NoReturn)
    } else if NUMERIC_TYPES.contains(&base) {
        Some(AssertionShape::Numeric)
    } else if TEXT_TYPES.contains(&base) {
        Some(AssertionShape::Text)
    } else if COLLECTION_TYPES.contains(&base) {
        Some(AssertionShape::Collection)
    } else if MAPPING_TYPES.contains(&base) {
        Some(AssertionShape::Mapping)
    } else {
        None
    }
}

/// Assertion shape for a routine: declared return type first, then the
/// keywords found in its body.
pub fn assertion_for(routine: &Routine) -> AssertionShape {
    if let Some(shape) = declared_shape(routine.return_kind.as_deref()) {
        return shape;
    }
    if !routine.returns_value() {
        return AssertionShape::NoReturn;
    }
    let body = routine.body.as_str();
    let has = |keywords: &[&str]| keywords.iter().any(|k| body.contains(k));
    if has(&["sum", "add", "total", "calculate"]) {
        AssertionShape::Numeric
    } else if has(&["name", "email", "format", "concat"]) {
        AssertionShape::Text
    } else if has(&["array", "list", "filter", "map"]) {
        AssertionShape::Collection
    } else if has(&["object", "json", "data", "dict"]) {
        AssertionShape::Mapping
    } else {
        AssertionShape::NotAbsent
    }
}
