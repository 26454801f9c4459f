use std::collections::HashMap;

use mitigation_common::{Alert, CheckKind, Condition, Primitive};

use crate::isim::{IsimClient, IsimRow};

/// Binds a condition's (or workflow's) `args`/`params` into a single
/// parameter map for an alert, per §4.2:
///
/// - `args[key]` a string: looked up as `alert.<name>`.
/// - `args[key]` a list: first present alert attribute wins.
/// - any required `args` entry resolving to nothing makes the whole
///   parameter set *incomplete* (`None`).
/// - the result is `params` merged with the alert-derived values, with
///   `args` winning on key collision.
pub fn bind_parameters(
    args: &HashMap<String, mitigation_common::ArgBinding>,
    params: &HashMap<String, Primitive>,
    alert: &Alert,
) -> Option<HashMap<String, Primitive>> {
    let mut bound = params.clone();
    for (key, binding) in args {
        let value = binding
            .candidates()
            .iter()
            .find_map(|name| alert.attribute(name));
        match value {
            Some(v) => {
                bound.insert(key.clone(), v);
            }
            None => return None,
        }
    }
    Some(bound)
}

fn row_matches_param(row: &IsimRow, key: &str, value: &Primitive) -> bool {
    row.get(key) == Some(value)
}

fn evaluate_check(kind: CheckKind, params: &HashMap<String, Primitive>, rows: &[IsimRow]) -> bool {
    match kind {
        CheckKind::AnyResult => !rows.is_empty(),
        CheckKind::AllParamsInAllRows => rows
            .iter()
            .all(|row| params.iter().all(|(k, v)| row_matches_param(row, k, v))),
        CheckKind::AllParamsInAnyRow => rows
            .iter()
            .any(|row| params.iter().all(|(k, v)| row_matches_param(row, k, v))),
        CheckKind::AnyParamInAllRows => rows
            .iter()
            .all(|row| params.iter().any(|(k, v)| row_matches_param(row, k, v))),
        CheckKind::AnyParamInAnyRow => rows
            .iter()
            .any(|row| params.iter().any(|(k, v)| row_matches_param(row, k, v))),
    }
}

/// Evaluates a condition against an alert, querying the ISIM if and only if
/// the parameter binding is complete.
///
/// Per the failure semantics (spec §7): an unreachable ISIM or a query error
/// is treated as "condition not met", not propagated.
pub async fn is_met(condition: &Condition, alert: &Alert, isim: &dyn IsimClient) -> bool {
    let Some(bound) = bind_parameters(&condition.args, &condition.params, alert) else {
        return false;
    };
    let rows = match isim.query(&condition.query, &bound).await {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(condition_id = condition.id, error = %err, "ISIM query failed, treating condition as not met");
            return false;
        }
    };
    condition
        .checks
        .iter()
        .all(|kind| evaluate_check(*kind, &bound, &rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitigation_common::ArgBinding;
    use std::collections::HashSet;

    fn condition_with(
        params: HashMap<String, Primitive>,
        args: HashMap<String, ArgBinding>,
        checks: HashSet<CheckKind>,
    ) -> Condition {
        Condition {
            id: 1,
            name: "test".into(),
            description: String::new(),
            params,
            args,
            query: "MATCH (n) RETURN n".into(),
            checks,
        }
    }

    #[test]
    fn bind_parameters_is_none_when_required_arg_missing() {
        let mut args = HashMap::new();
        args.insert("ip".to_string(), ArgBinding::Single("agent_ip".into()));
        let alert = Alert::empty(serde_json::json!({}));
        assert!(bind_parameters(&args, &HashMap::new(), &alert).is_none());
    }

    #[test]
    fn bind_parameters_args_win_on_collision() {
        let mut args = HashMap::new();
        args.insert("ip".to_string(), ArgBinding::Single("agent_ip".into()));
        let mut params = HashMap::new();
        params.insert("ip".to_string(), Primitive::String("0.0.0.0".into()));
        let mut alert = Alert::empty(serde_json::json!({}));
        alert.agent_ip = Some("10.0.0.1".into());
        let bound = bind_parameters(&args, &params, &alert).unwrap();
        assert_eq!(bound.get("ip"), Some(&Primitive::String("10.0.0.1".into())));
    }

    #[test]
    fn bind_parameters_first_of_picks_first_present() {
        let mut args = HashMap::new();
        args.insert(
            "host".to_string(),
            ArgBinding::FirstOf(vec!["dst_ip".into(), "agent_ip".into()]),
        );
        let mut alert = Alert::empty(serde_json::json!({}));
        alert.agent_ip = Some("10.0.0.1".into());
        let bound = bind_parameters(&args, &HashMap::new(), &alert).unwrap();
        assert_eq!(bound.get("host"), Some(&Primitive::String("10.0.0.1".into())));
    }

    fn row(pairs: &[(&str, Primitive)]) -> IsimRow {
        pairs.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[tokio::test]
    async fn incomplete_binding_never_queries_isim() {
        struct PanicOnQuery;
        #[async_trait::async_trait]
        impl IsimClient for PanicOnQuery {
            async fn query(
                &self,
                _q: &str,
                _p: &HashMap<String, Primitive>,
            ) -> Result<Vec<IsimRow>, crate::isim::IsimQueryError> {
                panic!("ISIM must not be queried when parameter binding is incomplete");
            }
        }
        let mut args = HashMap::new();
        args.insert("ip".to_string(), ArgBinding::Single("agent_ip".into()));
        let condition = condition_with(HashMap::new(), args, HashSet::from([CheckKind::AnyResult]));
        let alert = Alert::empty(serde_json::json!({}));
        assert!(!is_met(&condition, &alert, &PanicOnQuery).await);
    }

    #[tokio::test]
    async fn any_result_check() {
        let condition = condition_with(
            HashMap::new(),
            HashMap::new(),
            HashSet::from([CheckKind::AnyResult]),
        );
        let alert = Alert::empty(serde_json::json!({}));
        let empty = crate::isim::MockIsimClient::with_rows(vec![]);
        assert!(!is_met(&condition, &alert, &empty).await);
        let non_empty = crate::isim::MockIsimClient::with_rows(vec![row(&[])]);
        assert!(is_met(&condition, &alert, &non_empty).await);
    }

    #[tokio::test]
    async fn all_params_in_all_rows() {
        let mut params = HashMap::new();
        params.insert("ip".to_string(), Primitive::String("10.0.0.1".into()));
        let condition = condition_with(
            params,
            HashMap::new(),
            HashSet::from([CheckKind::AllParamsInAllRows]),
        );
        let alert = Alert::empty(serde_json::json!({}));
        let matching = crate::isim::MockIsimClient::with_rows(vec![
            row(&[("ip", Primitive::String("10.0.0.1".into()))]),
            row(&[("ip", Primitive::String("10.0.0.1".into()))]),
        ]);
        assert!(is_met(&condition, &alert, &matching).await);

        let partial = crate::isim::MockIsimClient::with_rows(vec![
            row(&[("ip", Primitive::String("10.0.0.1".into()))]),
            row(&[("ip", Primitive::String("10.0.0.2".into()))]),
        ]);
        assert!(!is_met(&condition, &alert, &partial).await);
    }
}
