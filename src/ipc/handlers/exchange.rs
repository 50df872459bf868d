use crate::exchange::{export_csv, parse_roster_csv, ParsedRosterRow, DEFAULT_EXPORT_FILE};
use crate::ipc::error::{err, ok, roster_err};
use crate::ipc::types::{AppState, Request};
use crate::roster::RosterError;
use serde_json::json;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn handle_export_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match req.params.get("outPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        // The UI's fixed download name.
        _ => DEFAULT_EXPORT_FILE.to_string(),
    };

    // Nothing to export: report, produce no file.
    let csv = match export_csv(&state.students) {
        Ok(v) => v,
        Err(e) => return roster_err(&req.id, e),
    };

    let out = PathBuf::from(&out_path);
    if let Some(parent) = out.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            return err(
                &req.id,
                "io_failed",
                e.to_string(),
                Some(json!({ "path": out_path })),
            );
        }
    }
    if let Err(e) = std::fs::write(&out, csv) {
        return err(
            &req.id,
            "io_failed",
            e.to_string(),
            Some(json!({ "path": out_path })),
        );
    }

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    log::debug!("exported {} rows to {}", state.students.len(), out_path);
    ok(
        &req.id,
        json!({
            "rowsExported": state.students.len(),
            "path": out_path,
            "exportedAt": exported_at,
        }),
    )
}

/// Import input is either pasted text or a file path, exactly one.
fn read_import_text(req: &Request) -> Result<String, serde_json::Value> {
    let text = req.params.get("text").and_then(|v| v.as_str());
    let in_path = req
        .params
        .get("inPath")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (text, in_path) {
        (Some(_), Some(_)) => Err(err(
            &req.id,
            "bad_params",
            "pass either text or inPath, not both",
            None,
        )),
        (Some(t), None) => Ok(t.to_string()),
        (None, Some(path)) => {
            let bytes = match std::fs::read(path) {
                Ok(b) => b,
                Err(e) => {
                    return Err(err(
                        &req.id,
                        "io_failed",
                        e.to_string(),
                        Some(json!({ "path": path })),
                    ))
                }
            };
            String::from_utf8(bytes).map_err(|_| {
                roster_err(
                    &req.id,
                    RosterError::import("file is not valid UTF-8 text"),
                )
            })
        }
        (None, None) => Err(err(&req.id, "bad_params", "missing text or inPath", None)),
    }
}

fn handle_import_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let text = match read_import_text(req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    // Parse fully before touching state; a failed import leaves the prior
    // roster untouched.
    let rows = match parse_roster_csv(&text) {
        Ok(v) => v,
        Err(e) => return roster_err(&req.id, e),
    };

    let rows_parsed = rows.len();
    state.students = rows.into_iter().map(ParsedRosterRow::into_record).collect();
    state.schedule_recompute();
    log::debug!("imported {} rows, roster replaced", rows_parsed);
    ok(
        &req.id,
        json!({
            "rowsParsed": rows_parsed,
            "studentCount": state.students.len(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "exchange.exportCsv" => Some(handle_export_csv(state, req)),
        "exchange.importCsv" => Some(handle_import_csv(state, req)),
        _ => None,
    }
}
