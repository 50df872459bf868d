use crate::ipc::error::{err, ok, roster_err};
use crate::ipc::types::{AppState, Request};
use crate::roster::{build_record, StudentEntry, SUBJECT_COUNT};
use serde_json::json;

/// Reads a text-field param. The UI submits every field, so an absent one
/// is the same as an empty box; anything but a string is a malformed
/// request.
fn text_field(params: &serde_json::Value, key: &str) -> Result<String, serde_json::Value> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(json!({ "param": key })),
    }
}

/// Mark and total values arrive either as JSON numbers or as the raw
/// text-field strings the UI holds; both normalize to the raw string the
/// validation layer parses.
fn entry_value(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::Null => Some(String::new()),
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn entry_from_params(params: &serde_json::Value) -> Result<StudentEntry, (String, Option<serde_json::Value>)> {
    let bad = |msg: &str, details: Option<serde_json::Value>| (msg.to_string(), details);

    let name = text_field(params, "name")
        .map_err(|d| bad("params.name must be a string", Some(d)))?;
    let enrollment_number = text_field(params, "enrollmentNumber")
        .map_err(|d| bad("params.enrollmentNumber must be a string", Some(d)))?;

    let use_total_marks = match params.get("useTotalMarks") {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::Bool(b)) => *b,
        Some(_) => return Err(bad("params.useTotalMarks must be a boolean", None)),
    };

    let total_marks = match params.get("totalMarks") {
        None => String::new(),
        Some(v) => entry_value(v)
            .ok_or_else(|| bad("params.totalMarks must be a number or string", None))?,
    };

    let marks = match params.get("marks") {
        // Absent marks read as an empty entry form.
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::Array(items)) => {
            if !use_total_marks && items.len() != SUBJECT_COUNT {
                return Err(bad(
                    "params.marks must have one entry per subject",
                    Some(json!({ "expected": SUBJECT_COUNT, "got": items.len() })),
                ));
            }
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let Some(v) = entry_value(item) else {
                    return Err(bad("params.marks entries must be numbers or strings", None));
                };
                out.push(v);
            }
            out
        }
        Some(_) => return Err(bad("params.marks must be an array", None)),
    };

    Ok(StudentEntry {
        name,
        enrollment_number,
        use_total_marks,
        total_marks,
        marks,
    })
}

fn handle_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let entry = match entry_from_params(&req.params) {
        Ok(v) => v,
        Err((message, details)) => return err(&req.id, "bad_params", message, details),
    };

    let record = match build_record(&entry) {
        Ok(v) => v,
        Err(e) => return roster_err(&req.id, e),
    };

    log::debug!(
        "roster.add {} ({}) total {}",
        record.name,
        record.enrollment_number,
        record.total_marks
    );
    state.students.push(record.clone());
    state.schedule_recompute();
    ok(
        &req.id,
        json!({ "student": record, "studentCount": state.students.len() }),
    )
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "students": state.students,
            "sortOrder": state.sort_order.as_str(),
            "studentCount": state.students.len(),
        }),
    )
}

fn handle_toggle_sort(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.sort_order = state.sort_order.toggled();
    state.schedule_recompute();
    ok(&req.id, json!({ "sortOrder": state.sort_order.as_str() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.add" => Some(handle_add(state, req)),
        "roster.list" => Some(handle_list(state, req)),
        "roster.toggleSort" => Some(handle_toggle_sort(state, req)),
        _ => None,
    }
}
