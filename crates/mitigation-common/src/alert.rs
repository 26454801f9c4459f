use serde::{Deserialize, Serialize};

use crate::node::AttackNode;
use crate::primitive::Primitive;

/// A raw alert payload normalised into flat, typed attribute slots.
///
/// `raw` is kept for duplicate-attack detection (§4.4): two alerts are the
/// same instance iff their raw JSON trees compare equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub rule_id: Option<String>,
    pub rule_description: Option<String>,
    pub rule_mitre_ids: Vec<String>,
    pub file_hash: Option<String>,
    pub file_path: Option<String>,
    pub file_perm_after: Option<String>,
    pub agent_id: Option<String>,
    pub agent_ip: Option<String>,
    pub dst_ip: Option<String>,
    pub src_port: Option<i64>,
    pub dst_port: Option<i64>,
    pub pid: Option<i64>,
    pub raw: serde_json::Value,
}

impl Alert {
    pub fn empty(raw: serde_json::Value) -> Self {
        Alert {
            rule_id: None,
            rule_description: None,
            rule_mitre_ids: Vec::new(),
            file_hash: None,
            file_path: None,
            file_perm_after: None,
            agent_id: None,
            agent_ip: None,
            dst_ip: None,
            src_port: None,
            dst_port: None,
            pid: None,
            raw,
        }
    }

    /// MITRE technique identifiers carried by this alert, or empty.
    pub fn techniques(&self) -> &[String] {
        &self.rule_mitre_ids
    }

    /// True iff `node.technique` is one of this alert's techniques.
    pub fn triggers(&self, node: &AttackNode) -> bool {
        self.rule_mitre_ids.iter().any(|t| t == &node.technique)
    }

    /// Look up a translated attribute by its target name, as used by the
    /// condition/workflow `args` binding algorithm (§4.2).
    pub fn attribute(&self, name: &str) -> Option<Primitive> {
        match name {
            "rule_id" => self.rule_id.clone().map(Primitive::String),
            "rule_description" => self.rule_description.clone().map(Primitive::String),
            "rule_mitre_ids" => {
                if self.rule_mitre_ids.is_empty() {
                    None
                } else {
                    Some(Primitive::String(self.rule_mitre_ids.join(" ")))
                }
            }
            "file_hash" => self.file_hash.clone().map(Primitive::String),
            "file_path" => self.file_path.clone().map(Primitive::String),
            "file_perm_after" => self.file_perm_after.clone().map(Primitive::String),
            "agent_id" => self.agent_id.clone().map(Primitive::String),
            "agent_ip" => self.agent_ip.clone().map(Primitive::String),
            "dst_ip" => self.dst_ip.clone().map(Primitive::String),
            "src_port" => self.src_port.map(Primitive::Integer),
            "dst_port" => self.dst_port.map(Primitive::Integer),
            "pid" => self.pid.map(Primitive::Integer),
            _ => None,
        }
    }
}
