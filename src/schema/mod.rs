//
//  bitbucket-provider
//  schema/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Resource Descriptors
//!
//! A [`Schema`] declares the fields a resource or data source accepts: their
//! type, whether the user must, may, or cannot set them, whether a change forces
//! the object to be recreated, and which values are allowed.
//!
//! Configuration arrives as JSON. [`Schema::validate`] checks it against the
//! declared fields, fills in defaults, and returns the normalized document that
//! is then decoded into the resource's typed model.
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_provider::schema::{Field, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::new(vec![
//!     Field::string("name").required(),
//!     Field::string("scm").optional().default_value(json!("git")).one_of(&["git", "hg"]),
//!     Field::string("uuid").computed(),
//! ]);
//!
//! let config = schema.validate(&json!({"name": "demo"})).unwrap();
//! assert_eq!(config["scm"], "git");
//! ```

use regex::Regex;
use serde_json::{Map, Value};

use crate::api::common::{ProviderError, Result};

/// The value type of a field.
#[derive(Debug, Clone)]
pub enum FieldType {
    String,
    Bool,
    Int,
    /// Unordered set of strings, encoded as a JSON array.
    StringSet,
    /// String-to-string map, encoded as a JSON object.
    StringMap,
    /// A single nested block, encoded as a JSON object.
    Block(Vec<Field>),
    /// A list of nested blocks, encoded as a JSON array of objects.
    BlockList { fields: Vec<Field>, max_items: Option<usize> },
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::StringSet => "set(string)",
            Self::StringMap => "map(string)",
            Self::Block(_) => "block",
            Self::BlockList { .. } => "list(block)",
        }
    }
}

/// Who supplies a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Required,
    Optional,
    /// Set by the remote only.
    Computed,
    /// User may set it; otherwise the remote fills it in.
    OptionalComputed,
}

impl Cardinality {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Optional => "optional",
            Self::Computed => "computed",
            Self::OptionalComputed => "optional+computed",
        }
    }

    fn user_settable(&self) -> bool {
        !matches!(self, Self::Computed)
    }

    fn remote_owned(&self) -> bool {
        matches!(self, Self::Computed | Self::OptionalComputed)
    }
}

/// One declared field.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldType,
    pub cardinality: Cardinality,
    pub force_new: bool,
    pub sensitive: bool,
    pub default: Option<Value>,
    pub allowed: Option<Vec<&'static str>>,
    pub pattern: Option<Regex>,
    pub description: &'static str,
}

impl Field {
    fn new(name: &'static str, kind: FieldType) -> Self {
        Self {
            name,
            kind,
            cardinality: Cardinality::Optional,
            force_new: false,
            sensitive: false,
            default: None,
            allowed: None,
            pattern: None,
            description: "",
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn bool(name: &'static str) -> Self {
        Self::new(name, FieldType::Bool)
    }

    pub fn int(name: &'static str) -> Self {
        Self::new(name, FieldType::Int)
    }

    pub fn string_set(name: &'static str) -> Self {
        Self::new(name, FieldType::StringSet)
    }

    pub fn string_map(name: &'static str) -> Self {
        Self::new(name, FieldType::StringMap)
    }

    pub fn block(name: &'static str, fields: Vec<Field>) -> Self {
        Self::new(name, FieldType::Block(fields))
    }

    pub fn block_list(name: &'static str, fields: Vec<Field>, max_items: Option<usize>) -> Self {
        Self::new(name, FieldType::BlockList { fields, max_items })
    }

    pub fn required(mut self) -> Self {
        self.cardinality = Cardinality::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.cardinality = Cardinality::Optional;
        self
    }

    pub fn computed(mut self) -> Self {
        self.cardinality = Cardinality::Computed;
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.cardinality = Cardinality::OptionalComputed;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Restricts string values (or set elements) to `values`.
    pub fn one_of(mut self, values: &[&'static str]) -> Self {
        self.allowed = Some(values.to_vec());
        self
    }

    pub fn matching(mut self, pattern: &Regex) -> Self {
        self.pattern = Some(pattern.clone());
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    fn check_string(&self, path: &str, s: &str) -> Result<()> {
        if let Some(allowed) = &self.allowed {
            if !allowed.contains(&s) {
                return Err(ProviderError::Validation(format!(
                    "{path}: expected one of {allowed:?}, got {s:?}"
                )));
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(s) {
                return Err(ProviderError::Validation(format!(
                    "{path}: {s:?} does not match {}",
                    pattern.as_str()
                )));
            }
        }
        Ok(())
    }

    fn check_value(&self, path: &str, value: &Value) -> Result<Value> {
        let mismatch = || {
            ProviderError::Validation(format!("{path}: expected {}", self.kind.name()))
        };

        match &self.kind {
            FieldType::String => {
                let s = value.as_str().ok_or_else(mismatch)?;
                self.check_string(path, s)?;
                Ok(value.clone())
            }
            FieldType::Bool => value.as_bool().map(Value::Bool).ok_or_else(mismatch),
            FieldType::Int => {
                value.as_i64().ok_or_else(mismatch)?;
                Ok(value.clone())
            }
            FieldType::StringSet => {
                let items = value.as_array().ok_or_else(mismatch)?;
                let mut out: Vec<Value> = Vec::with_capacity(items.len());
                for item in items {
                    let s = item.as_str().ok_or_else(mismatch)?;
                    self.check_string(path, s)?;
                    if !out.contains(item) {
                        out.push(item.clone());
                    }
                }
                Ok(Value::Array(out))
            }
            FieldType::StringMap => {
                let map = value.as_object().ok_or_else(mismatch)?;
                if map.values().any(|v| !v.is_string()) {
                    return Err(mismatch());
                }
                Ok(value.clone())
            }
            FieldType::Block(fields) => {
                let object = value.as_object().ok_or_else(mismatch)?;
                validate_object(fields, object, path)
            }
            FieldType::BlockList { fields, max_items } => {
                let items = value.as_array().ok_or_else(mismatch)?;
                if let Some(max) = max_items {
                    if items.len() > *max {
                        return Err(ProviderError::Validation(format!(
                            "{path}: at most {max} blocks allowed, got {}",
                            items.len()
                        )));
                    }
                }
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let item_path = format!("{path}[{i}]");
                        let object = item.as_object().ok_or_else(mismatch)?;
                        validate_object(fields, object, &item_path)
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            }
        }
    }
}

fn validate_object(fields: &[Field], object: &Map<String, Value>, prefix: &str) -> Result<Value> {
    let join = |name: &str| {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        }
    };

    for key in object.keys() {
        if !fields.iter().any(|f| f.name == key) {
            return Err(ProviderError::Validation(format!(
                "{}: unsupported argument",
                join(key)
            )));
        }
    }

    let mut out = Map::new();
    for field in fields {
        let path = join(field.name);
        match object.get(field.name).filter(|v| !v.is_null()) {
            Some(value) => {
                if !field.cardinality.user_settable() {
                    return Err(ProviderError::Validation(format!(
                        "{path}: value is computed and cannot be set"
                    )));
                }
                out.insert(field.name.to_string(), field.check_value(&path, value)?);
            }
            None => {
                if field.cardinality == Cardinality::Required {
                    return Err(ProviderError::Validation(format!(
                        "{path}: required argument is missing"
                    )));
                }
                if let Some(default) = &field.default {
                    out.insert(field.name.to_string(), default.clone());
                }
            }
        }
    }
    Ok(Value::Object(out))
}

/// The declared field set of one resource or data source.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validates user configuration and applies defaults.
    ///
    /// # Errors
    ///
    /// [`ProviderError::Validation`] naming the offending field when the
    /// document is not an object, contains an unknown or computed-only field,
    /// misses a required field, or holds a value of the wrong type or outside
    /// the allowed set.
    pub fn validate(&self, config: &Value) -> Result<Value> {
        let object = config.as_object().ok_or_else(|| {
            ProviderError::Validation("configuration must be a JSON object".to_string())
        })?;
        validate_object(&self.fields, object, "")
    }

    /// Builds the planned attributes for an update.
    ///
    /// Fields present in `config` take the configured value. Remote-owned
    /// fields the user left unset keep their prior value; every other unset
    /// field is cleared.
    pub fn plan_update(&self, prior: &Value, config: &Value) -> Value {
        let mut out = Map::new();
        for field in &self.fields {
            if let Some(v) = config.get(field.name).filter(|v| !v.is_null()) {
                out.insert(field.name.to_string(), v.clone());
            } else if field.cardinality.remote_owned() {
                if let Some(v) = prior.get(field.name).filter(|v| !v.is_null()) {
                    out.insert(field.name.to_string(), v.clone());
                }
            }
        }
        Value::Object(out)
    }

    /// Names of force-new fields whose planned value differs from the prior one.
    pub fn requires_replacement(&self, prior: &Value, planned: &Value) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.force_new)
            .filter(|f| {
                let new = planned.get(f.name).filter(|v| !v.is_null());
                let old = prior.get(f.name).filter(|v| !v.is_null());
                match (old, new) {
                    (_, None) if f.cardinality.remote_owned() => false,
                    (old, new) => !same_value(&f.kind, old, new),
                }
            })
            .map(|f| f.name.to_string())
            .collect()
    }
}

// Sets compare without regard to order.
fn same_value(kind: &FieldType, a: Option<&Value>, b: Option<&Value>) -> bool {
    match (kind, a, b) {
        (FieldType::StringSet, Some(Value::Array(a)), Some(Value::Array(b))) => {
            a.len() == b.len() && a.iter().all(|x| b.contains(x))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repo_schema() -> Schema {
        Schema::new(vec![
            Field::string("owner").required().force_new(),
            Field::string("name").required(),
            Field::string("slug").optional_computed(),
            Field::string("scm")
                .optional()
                .default_value(json!("git"))
                .one_of(&["git", "hg"]),
            Field::bool("is_private").optional().default_value(json!(true)),
            Field::string_set("events").optional(),
            Field::string("uuid").computed(),
            Field::block(
                "target",
                vec![Field::string("ref_name").required()],
            ),
        ])
    }

    #[test]
    fn test_defaults_are_applied() {
        let out = repo_schema()
            .validate(&json!({"owner": "acme", "name": "demo"}))
            .unwrap();
        assert_eq!(out["scm"], "git");
        assert_eq!(out["is_private"], true);
        assert!(out.get("slug").is_none());
    }

    #[test]
    fn test_missing_required_is_rejected() {
        let err = repo_schema().validate(&json!({"owner": "acme"})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: name: required argument is missing"
        );
    }

    #[test]
    fn test_enumeration_is_enforced() {
        let err = repo_schema()
            .validate(&json!({"owner": "a", "name": "b", "scm": "svn"}))
            .unwrap_err();
        assert!(err.to_string().contains("scm"));
    }

    #[test]
    fn test_computed_and_unknown_fields_are_rejected() {
        let schema = repo_schema();
        assert!(schema
            .validate(&json!({"owner": "a", "name": "b", "uuid": "{x}"}))
            .is_err());
        assert!(schema
            .validate(&json!({"owner": "a", "name": "b", "colour": "red"}))
            .is_err());
    }

    #[test]
    fn test_nested_block_paths_are_reported() {
        let err = repo_schema()
            .validate(&json!({"owner": "a", "name": "b", "target": {}}))
            .unwrap_err();
        assert!(err.to_string().contains("target.ref_name"));
    }

    #[test]
    fn test_sets_are_deduplicated() {
        let out = repo_schema()
            .validate(&json!({"owner": "a", "name": "b", "events": ["x", "x", "y"]}))
            .unwrap();
        assert_eq!(out["events"], json!(["x", "y"]));
    }

    #[test]
    fn test_plan_update_keeps_computed_values() {
        let schema = repo_schema();
        let prior = json!({"owner": "a", "name": "b", "uuid": "{1}", "slug": "b"});
        let config = schema.validate(&json!({"owner": "a", "name": "c"})).unwrap();
        let planned = schema.plan_update(&prior, &config);
        assert_eq!(planned["uuid"], "{1}");
        assert_eq!(planned["slug"], "b");
        assert_eq!(planned["name"], "c");
    }

    #[test]
    fn test_force_new_changes_are_reported() {
        let schema = repo_schema();
        let prior = json!({"owner": "a", "name": "b"});
        assert_eq!(
            schema.requires_replacement(&prior, &json!({"owner": "z", "name": "b"})),
            vec!["owner".to_string()]
        );
        assert!(schema
            .requires_replacement(&prior, &json!({"owner": "a", "name": "c"}))
            .is_empty());
    }
}
