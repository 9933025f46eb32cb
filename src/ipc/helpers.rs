use crate::calc::SummaryFilters;
use crate::ipc::error::err;
use crate::ipc::types::Request;
use serde_json::json;

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn optional_str(req: &Request, key: &str) -> Result<Option<String>, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v.as_str().map(|s| Some(s.to_string())).ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be a string", key),
                None,
            )
        }),
    }
}

/// `filters` is optional; `{"types": null}` and a missing key both mean all
/// assignment types.
pub fn parse_filters(req: &Request) -> Result<SummaryFilters, serde_json::Value> {
    match req.params.get("filters") {
        None => Ok(SummaryFilters::default()),
        Some(v) if v.is_null() => Ok(SummaryFilters::default()),
        Some(v) if !v.is_object() => Err(err(
            &req.id,
            "bad_params",
            "filters must be an object",
            None,
        )),
        Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
            err(
                &req.id,
                "bad_params",
                format!("invalid filters: {e}"),
                Some(json!({ "filters": v })),
            )
        }),
    }
}

/// Optional roster selection; `None` means the whole roster.
pub fn parse_student_ids(req: &Request) -> Result<Option<Vec<String>>, serde_json::Value> {
    let raw = match req.params.get("studentIds") {
        None => return Ok(None),
        Some(v) if v.is_null() => return Ok(None),
        Some(v) => v,
    };
    let Some(arr) = raw.as_array() else {
        return Err(err(
            &req.id,
            "bad_params",
            "studentIds must be an array of strings",
            None,
        ));
    };
    let mut out = Vec::with_capacity(arr.len());
    for v in arr {
        let Some(id) = v.as_str() else {
            return Err(err(
                &req.id,
                "bad_params",
                "studentIds must contain only strings",
                None,
            ));
        };
        out.push(id.trim().to_string());
    }
    Ok(Some(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssignmentType;

    fn req(params: serde_json::Value) -> Request {
        Request {
            id: "t".to_string(),
            method: "test".to_string(),
            params,
        }
    }

    fn code(v: &serde_json::Value) -> &str {
        v.get("error")
            .and_then(|e| e.get("code"))
            .and_then(|c| c.as_str())
            .unwrap_or("")
    }

    #[test]
    fn required_str_rejects_blank() {
        let r = req(json!({ "studentId": "  " }));
        let e = required_str(&r, "studentId").unwrap_err();
        assert_eq!(code(&e), "bad_params");
        let r = req(json!({ "studentId": " s1 " }));
        assert_eq!(required_str(&r, "studentId").expect("present"), "s1");
    }

    #[test]
    fn filters_parse_types() {
        let r = req(json!({ "filters": { "types": ["quiz", "extra_credit"] } }));
        let f = parse_filters(&r).expect("filters");
        assert_eq!(
            f.types,
            Some(vec![AssignmentType::Quiz, AssignmentType::ExtraCredit])
        );

        let r = req(json!({ "filters": { "types": null } }));
        assert_eq!(parse_filters(&r).expect("filters").types, None);

        let r = req(json!({ "filters": { "types": ["essay"] } }));
        assert_eq!(code(&parse_filters(&r).unwrap_err()), "bad_params");

        let r = req(json!({ "filters": "ALL" }));
        assert_eq!(code(&parse_filters(&r).unwrap_err()), "bad_params");
    }

    #[test]
    fn student_ids_must_be_strings() {
        let r = req(json!({}));
        assert_eq!(parse_student_ids(&r).expect("none"), None);
        let r = req(json!({ "studentIds": ["a", "b"] }));
        assert_eq!(
            parse_student_ids(&r).expect("ids"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        let r = req(json!({ "studentIds": [1] }));
        assert_eq!(code(&parse_student_ids(&r).unwrap_err()), "bad_params");
    }
}
