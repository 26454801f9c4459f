//! Stable on-disk serialisation rules (spec §4.4): lists of primitives are
//! space-separated strings, maps are JSON-encoded, `probability_history` is
//! a space-separated decimal sequence, check-kinds are their integer codes.

use std::collections::{HashMap, HashSet};

use mitigation_common::{ArgBinding, CheckKind, Primitive};

pub fn encode_str_list(items: &[String]) -> String {
    items.join(" ")
}

pub fn decode_str_list(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

pub fn encode_id_list(ids: &[i64]) -> String {
    ids.iter().map(i64::to_string).collect::<Vec<_>>().join(" ")
}

pub fn decode_id_list(s: &str) -> Vec<i64> {
    s.split_whitespace().filter_map(|tok| tok.parse().ok()).collect()
}

pub fn encode_probability_history(history: &[f64]) -> String {
    history.iter().map(f64::to_string).collect::<Vec<_>>().join(" ")
}

pub fn decode_probability_history(s: &str) -> Vec<f64> {
    s.split_whitespace().filter_map(|tok| tok.parse().ok()).collect()
}

pub fn encode_checks(checks: &HashSet<CheckKind>) -> String {
    checks.iter().map(|c| c.as_code().to_string()).collect::<Vec<_>>().join(" ")
}

pub fn decode_checks(s: &str) -> HashSet<CheckKind> {
    s.split_whitespace()
        .filter_map(|tok| tok.parse::<i32>().ok())
        .filter_map(CheckKind::from_code)
        .collect()
}

pub fn encode_params(params: &HashMap<String, Primitive>) -> String {
    serde_json::to_string(params).unwrap_or_else(|_| "{}".to_string())
}

pub fn decode_params(s: &str) -> HashMap<String, Primitive> {
    serde_json::from_str(s).unwrap_or_default()
}

pub fn encode_args(args: &HashMap<String, ArgBinding>) -> String {
    serde_json::to_string(args).unwrap_or_else(|_| "{}".to_string())
}

pub fn decode_args(s: &str) -> HashMap<String, ArgBinding> {
    serde_json::from_str(s).unwrap_or_default()
}
