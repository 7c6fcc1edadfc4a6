//! State document decoding and normalization.
//!
//! Terraform state files come in two shapes:
//!
//! ```text
//! Flat:    { "resources": [ { "type": str, ...fields }, ... ] }
//! Legacy:  { "modules": [ { "resources": { "<key>": { "type": str, ...fields } } } ] }
//! ```
//!
//! Both top-level fields are optional. A document with neither is valid and
//! simply holds no resources.

use crate::error::{Error, Result};
use crate::types::{ModuleScope, ResourceRecord};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};

/// Which shape a document has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Top-level `resources` sequence
    Flat,
    /// Top-level `modules` sequence
    Legacy,
    /// Neither field present
    Empty,
}

/// A decoded state document.
#[derive(Debug, Clone, Deserialize)]
pub struct StateDocument {
    /// Flat resource sequence
    #[serde(default)]
    resources: Option<Vec<Value>>,
    /// Legacy module sequence
    #[serde(default)]
    modules: Option<Vec<Value>>,
    #[serde(skip)]
    path: PathBuf,
}

/// A legacy module body.
#[derive(Debug, Deserialize)]
struct LegacyModule {
    #[serde(default)]
    resources: Map<String, Value>,
}

/// Records extracted from a legacy document.
#[derive(Debug, Default)]
pub struct LegacyResources {
    /// Accepted records, in document order
    pub records: Vec<ResourceRecord>,
    /// Why each rejected entry was rejected
    pub rejected: Vec<String>,
    /// Resources present in modules that were not read
    pub ignored: usize,
}

impl StateDocument {
    /// Read and decode a state file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(path, &bytes)
    }

    /// Decode state from raw bytes.
    pub fn from_slice(path: &Path, bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes).map_err(|source| Error::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_value(path, value)
    }

    /// Interpret already-decoded JSON.
    ///
    /// Fails with a format error unless the top level is an object whose
    /// `resources`/`modules` fields, when present, are arrays.
    pub fn from_value(path: &Path, value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::format(
                path,
                format!("top level is {}, expected an object", json_kind(&value)),
            ));
        }

        let mut doc: Self =
            serde_json::from_value(value).map_err(|e| Error::format(path, e.to_string()))?;
        doc.path = path.to_path_buf();
        Ok(doc)
    }

    /// The file this document was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Which shape this document has. Flat wins when both fields are present.
    pub fn variant(&self) -> Variant {
        if self.resources.is_some() {
            Variant::Flat
        } else if self.modules.is_some() {
            Variant::Legacy
        } else {
            Variant::Empty
        }
    }

    /// Whether the document carries a legacy module sequence.
    pub fn has_modules(&self) -> bool {
        self.modules.is_some()
    }

    /// Normalize the flat `resources` sequence.
    ///
    /// Order is preserved. Every entry must be an object with string `type`
    /// and `name` fields; the first entry that is not fails the whole document.
    pub fn flat_records(&self) -> Result<Vec<ResourceRecord>> {
        let Some(entries) = &self.resources else {
            return Ok(Vec::new());
        };

        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                flat_record(entry).map_err(|message| {
                    Error::format(&self.path, format!("resources[{index}]: {message}"))
                })
            })
            .collect()
    }

    /// Normalize the legacy `modules` sequence.
    ///
    /// Entries without a usable key or type are rejected individually.
    pub fn legacy_records(&self, scope: ModuleScope) -> Result<LegacyResources> {
        let mut out = LegacyResources::default();
        let Some(modules) = &self.modules else {
            return Ok(out);
        };

        for (index, module) in modules.iter().enumerate() {
            // Non-object modules carry nothing we can read.
            if !module.is_object() {
                continue;
            }
            // Later modules are only counted, never parsed.
            if index > 0 && scope == ModuleScope::First {
                out.ignored += module
                    .get("resources")
                    .and_then(Value::as_object)
                    .map_or(0, Map::len);
                continue;
            }

            let module: LegacyModule = serde_json::from_value(module.clone())
                .map_err(|e| Error::format(&self.path, format!("modules[{index}]: {e}")))?;

            for (key, body) in module.resources {
                match legacy_record(&key, body) {
                    Ok(record) => out.records.push(record),
                    Err(message) => out.rejected.push(format!("modules[{index}]: {message}")),
                }
            }
        }

        Ok(out)
    }
}

/// Build a record from a flat entry.
fn flat_record(entry: &Value) -> std::result::Result<ResourceRecord, String> {
    let Value::Object(body) = entry else {
        return Err(format!("entry is {}, expected an object", json_kind(entry)));
    };

    let resource_type = non_empty_str(body, "type").ok_or("missing `type`")?;
    let name = non_empty_str(body, "name").ok_or("missing `name`")?;

    let mut key = String::new();
    if let Some(module) = non_empty_str(body, "module") {
        key.push_str(module);
        key.push('.');
    }
    if body.get("mode").and_then(Value::as_str) == Some("data") {
        key.push_str("data.");
    }
    key.push_str(resource_type);
    key.push('.');
    key.push_str(name);

    Ok(ResourceRecord::new(key, resource_type, body.clone()))
}

/// Build a record from a legacy `key: body` entry.
fn legacy_record(key: &str, body: Value) -> std::result::Result<ResourceRecord, String> {
    if key.trim().is_empty() {
        return Err("entry has an empty key".to_string());
    }
    let body = match body {
        Value::Object(body) => body,
        other => {
            return Err(format!(
                "`{key}` is {}, expected an object",
                json_kind(&other)
            ));
        }
    };

    let resource_type = non_empty_str(&body, "type")
        .map(str::to_string)
        .or_else(|| type_from_key(key))
        .ok_or_else(|| format!("`{key}` has no `type` and none can be derived from its key"))?;

    Ok(ResourceRecord::new(key, resource_type, body))
}

/// Derive the resource type from a legacy address (`type.name`, `data.type.name`).
fn type_from_key(key: &str) -> Option<String> {
    let key = key.strip_prefix("data.").unwrap_or(key);
    let (resource_type, rest) = key.split_once('.')?;
    if resource_type.is_empty() || rest.is_empty() {
        return None;
    }
    Some(resource_type.to_string())
}

fn non_empty_str<'a>(body: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Render records back into a single-module legacy document.
pub fn render_legacy(records: &[ResourceRecord]) -> Value {
    let resources: Map<String, Value> = records
        .iter()
        .map(|r| (r.key.clone(), r.body()))
        .collect();
    json!({
        "version": 3,
        "modules": [{ "path": ["root"], "resources": resources }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn doc(value: Value) -> StateDocument {
        StateDocument::from_value(Path::new("test.tfstate"), value).unwrap()
    }

    #[test]
    fn test_flat_preserves_entries_and_order() {
        let d = doc(json!({
            "version": 4,
            "resources": [
                {"type": "aws_instance", "name": "web", "mode": "managed"},
                {"type": "aws_ami", "name": "ubuntu", "mode": "data"},
                {"type": "aws_s3_bucket", "name": "logs", "module": "module.storage"},
            ]
        }));
        assert_eq!(d.variant(), Variant::Flat);

        let records = d.flat_records().unwrap();
        let keys: Vec<_> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "aws_instance.web",
                "data.aws_ami.ubuntu",
                "module.storage.aws_s3_bucket.logs"
            ]
        );
        assert_eq!(records[0].resource_type, "aws_instance");
        assert_eq!(
            records[0].body(),
            json!({"type": "aws_instance", "name": "web", "mode": "managed"})
        );
    }

    #[test]
    fn test_flat_missing_field_is_format_error() {
        let d = doc(json!({"resources": [{"name": "web"}]}));
        let err = d.flat_records().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Format);
        assert!(err.to_string().contains("resources[0]: missing `type`"));

        let d = doc(json!({"resources": [{"type": "aws_instance"}]}));
        assert!(d.flat_records().is_err());

        let d = doc(json!({"resources": ["aws_instance.web"]}));
        assert!(d.flat_records().is_err());
    }

    #[test]
    fn test_empty_document_has_no_records() {
        let d = doc(json!({"version": 4, "serial": 1}));
        assert_eq!(d.variant(), Variant::Empty);
        assert!(d.flat_records().unwrap().is_empty());
        assert!(d.legacy_records(ModuleScope::First).unwrap().records.is_empty());
    }

    #[test]
    fn test_top_level_not_object() {
        let err = StateDocument::from_value(Path::new("x"), json!([1, 2])).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Format);
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_wrong_field_type_is_format_error() {
        let err = StateDocument::from_value(Path::new("x"), json!({"resources": {}})).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Format);
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = StateDocument::from_slice(Path::new("bad.tfstate"), b"{\"modules\": [").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Decode);
        assert_eq!(err.path(), Some(Path::new("bad.tfstate")));
    }

    #[test]
    fn test_legacy_first_module_only() {
        let d = doc(json!({
            "modules": [
                {"path": ["root"], "resources": {
                    "aws_instance.web": {"type": "aws_instance", "primary": {"id": "i-1"}},
                    "aws_eip.ip": {"primary": {"id": "eip-1"}}
                }},
                {"path": ["root", "child"], "resources": {
                    "aws_vpc.main": {"type": "aws_vpc"}
                }}
            ]
        }));
        assert_eq!(d.variant(), Variant::Legacy);

        let out = d.legacy_records(ModuleScope::First).unwrap();
        let keys: Vec<_> = out.records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["aws_instance.web", "aws_eip.ip"]);
        // type derived from the key when the body has none
        assert_eq!(out.records[1].resource_type, "aws_eip");
        assert_eq!(out.ignored, 1);

        let all = d.legacy_records(ModuleScope::All).unwrap();
        assert_eq!(all.records.len(), 3);
        assert_eq!(all.ignored, 0);
    }

    #[test]
    fn test_malformed_later_module_does_not_drop_first() {
        let d = doc(json!({
            "modules": [
                {"resources": {"aws_instance.web": {"type": "aws_instance"}}},
                {"resources": []},
                {"resources": {"aws_vpc.a": {}, "aws_vpc.b": {}}}
            ]
        }));
        let out = d.legacy_records(ModuleScope::First).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].key, "aws_instance.web");
        assert_eq!(out.ignored, 2);

        // Reading every module still reports the malformed one.
        assert!(d.legacy_records(ModuleScope::All).is_err());
    }

    #[test]
    fn test_metadata_fields_are_opaque() {
        let d = doc(json!({
            "version": "4",
            "terraform_version": 1,
            "resources": [{"type": "aws_instance", "name": "web"}]
        }));
        assert_eq!(d.flat_records().unwrap().len(), 1);
    }

    #[test]
    fn test_legacy_non_object_first_module() {
        let d = doc(json!({"modules": ["root"]}));
        let out = d.legacy_records(ModuleScope::First).unwrap();
        assert!(out.records.is_empty());
        assert!(out.rejected.is_empty());
    }

    #[test]
    fn test_legacy_rejects_unusable_entries() {
        let d = doc(json!({
            "modules": [{"resources": {
                "": {"type": "aws_instance"},
                "noseparator": {"primary": {}},
                "aws_iam_role.r": "not-an-object",
                "data.aws_caller_identity.me": {"primary": {}}
            }}]
        }));
        let out = d.legacy_records(ModuleScope::First).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].resource_type, "aws_caller_identity");
        assert_eq!(out.rejected.len(), 3);
        assert!(out.rejected.iter().any(|m| m.contains("empty key")));
    }

    #[test]
    fn test_legacy_renormalize_is_idempotent() {
        let d = doc(json!({
            "modules": [{"resources": {
                "aws_instance.web": {"type": "aws_instance", "primary": {"id": "i-1"}},
                "aws_s3_bucket.logs": {"type": "aws_s3_bucket", "primary": {"id": "logs"}}
            }}]
        }));
        let first = d.legacy_records(ModuleScope::First).unwrap().records;

        let again = doc(render_legacy(&first))
            .legacy_records(ModuleScope::First)
            .unwrap()
            .records;

        let as_set = |records: &[ResourceRecord]| -> BTreeSet<String> {
            records
                .iter()
                .map(|r| serde_json::to_string(r).unwrap())
                .collect()
        };
        assert_eq!(as_set(&first), as_set(&again));
    }

    #[test]
    fn test_type_from_key() {
        assert_eq!(type_from_key("aws_instance.web").as_deref(), Some("aws_instance"));
        assert_eq!(type_from_key("data.aws_ami.x").as_deref(), Some("aws_ami"));
        assert_eq!(type_from_key("aws_instance"), None);
        assert_eq!(type_from_key(".web"), None);
    }
}
