//! Normalises a raw alert payload into a typed [`mitigation_common::Alert`].
//!
//! The parser walks a static translation table (source JSON path → target
//! attribute → expected JSON shape) rather than introspecting the input —
//! see spec §9's "dynamic type-introspecting alert parser" re-architecture
//! note. A translated field that is simply absent is skipped; one whose
//! value has the wrong JSON shape fails the whole alert with
//! [`InvalidAlertError`].

use mitigation_common::Alert;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid alert: field '{path}' expected {expected}, found {found}")]
pub struct InvalidAlertError {
    pub path: String,
    pub expected: &'static str,
    pub found: &'static str,
}

#[derive(Clone, Copy)]
enum Shape {
    Str,
    StrList,
    Int,
}

struct Translation {
    path: &'static [&'static str],
    field: Field,
    shape: Shape,
}

#[derive(Clone, Copy)]
enum Field {
    RuleId,
    RuleDescription,
    RuleMitreIds,
    FileHash,
    FilePath,
    FilePermAfter,
    AgentId,
    AgentIp,
    DstIp,
    SrcPort,
    DstPort,
    Pid,
}

const TRANSLATIONS: &[Translation] = &[
    Translation { path: &["rule", "id"], field: Field::RuleId, shape: Shape::Str },
    Translation {
        path: &["rule", "description"],
        field: Field::RuleDescription,
        shape: Shape::Str,
    },
    Translation {
        path: &["rule", "mitre", "id"],
        field: Field::RuleMitreIds,
        shape: Shape::StrList,
    },
    Translation {
        path: &["syscheck", "sha1_after"],
        field: Field::FileHash,
        shape: Shape::Str,
    },
    Translation { path: &["syscheck", "path"], field: Field::FilePath, shape: Shape::Str },
    Translation {
        path: &["syscheck", "perm_after"],
        field: Field::FilePermAfter,
        shape: Shape::Str,
    },
    Translation { path: &["agent", "id"], field: Field::AgentId, shape: Shape::Str },
    Translation { path: &["agent", "ip"], field: Field::AgentIp, shape: Shape::Str },
    Translation { path: &["data", "dst_ip"], field: Field::DstIp, shape: Shape::Str },
    Translation { path: &["data", "src_port"], field: Field::SrcPort, shape: Shape::Int },
    Translation { path: &["data", "dst_port"], field: Field::DstPort, shape: Shape::Int },
    Translation { path: &["data", "pid"], field: Field::Pid, shape: Shape::Int },
];

/// Parse a raw JSON alert payload into a typed [`Alert`].
///
/// Unknown fields are ignored. A translated field present with an unexpected
/// JSON shape fails the whole alert (see scenario 5 in spec §8).
pub fn parse(raw: &Value) -> Result<Alert, InvalidAlertError> {
    let mut alert = Alert::empty(raw.clone());
    for t in TRANSLATIONS {
        if let Some(value) = navigate(raw, t.path)? {
            apply(&mut alert, t.field, t.shape, t.path, value)?;
        }
    }
    Ok(alert)
}

/// Walks `path` from `root`. Returns `Ok(None)` if any segment is simply
/// absent (the optional-branch case), and `Err` if an intermediate value
/// exists but isn't an object (the shape-mismatch case).
fn navigate<'a>(root: &'a Value, path: &[&str]) -> Result<Option<&'a Value>, InvalidAlertError> {
    let mut cur = root;
    for (i, seg) in path.iter().enumerate() {
        match cur {
            Value::Object(map) => match map.get(*seg) {
                Some(v) => cur = v,
                None => return Ok(None),
            },
            Value::Null => return Ok(None),
            other => {
                return Err(InvalidAlertError {
                    path: path[..i].join("."),
                    expected: "object",
                    found: type_name(other),
                })
            }
        }
    }
    Ok(Some(cur))
}

fn apply(
    alert: &mut Alert,
    field: Field,
    shape: Shape,
    path: &[&str],
    value: &Value,
) -> Result<(), InvalidAlertError> {
    let path_str = || path.join(".");
    match shape {
        Shape::Str => {
            let s = value.as_str().ok_or_else(|| InvalidAlertError {
                path: path_str(),
                expected: "string",
                found: type_name(value),
            })?;
            set_str(alert, field, s.to_string());
        }
        Shape::Int => {
            let i = value.as_i64().ok_or_else(|| InvalidAlertError {
                path: path_str(),
                expected: "integer",
                found: type_name(value),
            })?;
            set_int(alert, field, i);
        }
        Shape::StrList => {
            let arr = value.as_array().ok_or_else(|| InvalidAlertError {
                path: path_str(),
                expected: "array of strings",
                found: type_name(value),
            })?;
            let mut out = Vec::with_capacity(arr.len());
            for item in arr {
                let s = item.as_str().ok_or_else(|| InvalidAlertError {
                    path: path_str(),
                    expected: "array of strings",
                    found: type_name(item),
                })?;
                out.push(s.to_string());
            }
            if let Field::RuleMitreIds = field {
                alert.rule_mitre_ids = out;
            }
        }
    }
    Ok(())
}

fn set_str(alert: &mut Alert, field: Field, s: String) {
    match field {
        Field::RuleId => alert.rule_id = Some(s),
        Field::RuleDescription => alert.rule_description = Some(s),
        Field::FileHash => alert.file_hash = Some(s),
        Field::FilePath => alert.file_path = Some(s),
        Field::FilePermAfter => alert.file_perm_after = Some(s),
        Field::AgentId => alert.agent_id = Some(s),
        Field::AgentIp => alert.agent_ip = Some(s),
        Field::DstIp => alert.dst_ip = Some(s),
        _ => unreachable!("string setter called for non-string field"),
    }
}

fn set_int(alert: &mut Alert, field: Field, i: i64) {
    match field {
        Field::SrcPort => alert.src_port = Some(i),
        Field::DstPort => alert.dst_port = Some(i),
        Field::Pid => alert.pid = Some(i),
        _ => unreachable!("integer setter called for non-integer field"),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_alert() {
        let raw = json!({
            "rule": {"id": "r1", "description": "desc", "mitre": {"id": ["T1204.002"]}},
            "agent": {"id": "a1", "ip": "10.0.0.1"},
            "syscheck": {"sha1_after": "abc123", "path": "/etc/passwd", "perm_after": "0644"},
            "data": {"dst_ip": "10.0.0.2", "src_port": 1234, "dst_port": 443, "pid": 99}
        });
        let alert = parse(&raw).unwrap();
        assert_eq!(alert.rule_id.as_deref(), Some("r1"));
        assert_eq!(alert.rule_mitre_ids, vec!["T1204.002".to_string()]);
        assert_eq!(alert.agent_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(alert.file_hash.as_deref(), Some("abc123"));
        assert_eq!(alert.dst_port, Some(443));
    }

    #[test]
    fn missing_optional_branches_are_skipped() {
        let raw = json!({"rule": {"id": "r1", "mitre": {"id": []}}});
        let alert = parse(&raw).unwrap();
        assert!(alert.agent_ip.is_none());
        assert!(alert.file_hash.is_none());
        assert!(alert.rule_mitre_ids.is_empty());
    }

    #[test]
    fn wrong_shape_on_present_field_is_rejected() {
        let raw = json!({"syscheck": "not-a-dict"});
        let err = parse(&raw).unwrap_err();
        assert_eq!(err.path, "syscheck");
    }

    #[test]
    fn non_string_port_is_rejected() {
        let raw = json!({"data": {"src_port": "not-a-number"}});
        assert!(parse(&raw).is_err());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let raw = json!({"something": {"else": true}, "rule": {"id": "r1"}});
        let alert = parse(&raw).unwrap();
        assert_eq!(alert.rule_id.as_deref(), Some("r1"));
    }
}
