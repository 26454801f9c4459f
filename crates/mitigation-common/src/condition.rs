use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::primitive::{ArgBinding, Primitive};

/// A row/parameter predicate applied to an ISIM query result set.
///
/// Stored on disk as the integer codes below (see `as_code`/`from_code`),
/// per the state store's serialisation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckKind {
    AllParamsInAllRows,
    AllParamsInAnyRow,
    AnyParamInAllRows,
    AnyParamInAnyRow,
    AnyResult,
}

impl CheckKind {
    pub fn as_code(self) -> i32 {
        match self {
            CheckKind::AllParamsInAllRows => 0,
            CheckKind::AllParamsInAnyRow => 1,
            CheckKind::AnyParamInAllRows => 2,
            CheckKind::AnyParamInAnyRow => 3,
            CheckKind::AnyResult => 4,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(CheckKind::AllParamsInAllRows),
            1 => Some(CheckKind::AllParamsInAnyRow),
            2 => Some(CheckKind::AnyParamInAllRows),
            3 => Some(CheckKind::AnyParamInAnyRow),
            4 => Some(CheckKind::AnyResult),
            _ => None,
        }
    }
}

/// A predicate evaluable against an alert and the ISIM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Constants bound by name into the query.
    pub params: HashMap<String, Primitive>,
    /// Names to be looked up in the parsed alert.
    pub args: HashMap<String, ArgBinding>,
    /// Opaque parameterised query string passed to the ISIM.
    pub query: String,
    pub checks: HashSet<CheckKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_kind_codes_round_trip() {
        for kind in [
            CheckKind::AllParamsInAllRows,
            CheckKind::AllParamsInAnyRow,
            CheckKind::AnyParamInAllRows,
            CheckKind::AnyParamInAnyRow,
            CheckKind::AnyResult,
        ] {
            assert_eq!(CheckKind::from_code(kind.as_code()), Some(kind));
        }
        assert_eq!(CheckKind::from_code(99), None);
    }
}
