use serde::{Deserialize, Serialize};

/// A constant or alert-derived value bound into a query or an actuator
/// request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl Primitive {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::String(s) => Some(s),
            _ => None,
        }
    }

    /// Render as the space-separated-list-friendly string form used by the
    /// state store's serialisation rules.
    pub fn to_storage_string(&self) -> String {
        match self {
            Primitive::String(s) => s.clone(),
            Primitive::Integer(i) => i.to_string(),
            Primitive::Float(f) => f.to_string(),
            Primitive::Bool(b) => b.to_string(),
        }
    }
}

impl From<&Primitive> for serde_json::Value {
    fn from(p: &Primitive) -> Self {
        match p {
            Primitive::String(s) => serde_json::Value::String(s.clone()),
            Primitive::Integer(i) => serde_json::Value::from(*i),
            Primitive::Float(f) => serde_json::Value::from(*f),
            Primitive::Bool(b) => serde_json::Value::from(*b),
        }
    }
}

/// A condition/workflow `args` binding: either a single alert attribute name,
/// or an ordered list of names where the first present one wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgBinding {
    Single(String),
    FirstOf(Vec<String>),
}

impl ArgBinding {
    /// Candidate alert attribute names in lookup order.
    pub fn candidates(&self) -> &[String] {
        match self {
            ArgBinding::Single(name) => std::slice::from_ref(name),
            ArgBinding::FirstOf(names) => names,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_binding_has_one_candidate() {
        let b = ArgBinding::Single("agent_ip".into());
        assert_eq!(b.candidates(), &["agent_ip".to_string()]);
    }

    #[test]
    fn primitive_storage_string_round_trips_numbers() {
        assert_eq!(Primitive::Integer(42).to_storage_string(), "42");
        assert_eq!(Primitive::Bool(true).to_storage_string(), "true");
    }
}
