use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_rankmasterd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rankmasterd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn expect_ok(resp: &serde_json::Value) -> &serde_json::Value {
    assert_eq!(
        resp.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "expected success, got {}",
        resp
    );
    resp.get("result").expect("result")
}

/// Longer than the 200ms debounce window, with headroom for scheduler
/// jitter.
fn settle() {
    std::thread::sleep(Duration::from_millis(450));
}

#[test]
fn add_rank_and_toggle_end_to_end() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    let result = expect_ok(&health);
    assert_eq!(result["studentCount"], 0);
    assert_eq!(result["sortOrder"], "desc");
    assert_eq!(result["recomputeCount"], 0);
    assert_eq!(result["pendingRecompute"], false);

    // Mark values may arrive as JSON numbers or raw text-field strings.
    let added = request(
        &mut stdin,
        &mut reader,
        "2",
        "roster.add",
        json!({
            "name": "Alice",
            "enrollmentNumber": "E1",
            "marks": [80, 90, 70, 60, 100]
        }),
    );
    let result = expect_ok(&added);
    assert_eq!(result["student"]["name"], "Alice");
    assert_eq!(result["student"]["totalMarks"], 400.0);
    assert_eq!(result["student"]["percentage"], 80.0);
    assert_eq!(result["student"]["rank"], 0);
    assert_eq!(result["studentCount"], 1);

    let added = request(
        &mut stdin,
        &mut reader,
        "3",
        "roster.add",
        json!({
            "name": "Bob",
            "enrollmentNumber": "E2",
            "marks": ["50", "50", "50", "50", "50"]
        }),
    );
    let result = expect_ok(&added);
    assert_eq!(result["student"]["totalMarks"], 250.0);
    assert_eq!(result["student"]["percentage"], 50.0);

    let added = request(
        &mut stdin,
        &mut reader,
        "4",
        "roster.add",
        json!({
            "name": "Chad",
            "enrollmentNumber": "E3",
            "useTotalMarks": true,
            "totalMarks": "87.5"
        }),
    );
    let result = expect_ok(&added);
    assert_eq!(result["student"]["totalMarks"], 87.5);
    assert_eq!(result["student"]["percentage"], 87.5);
    assert_eq!(result["student"]["marks"], json!([]));

    settle();
    let listed = request(&mut stdin, &mut reader, "5", "roster.list", json!({}));
    let result = expect_ok(&listed);
    assert_eq!(result["sortOrder"], "desc");
    let students = result["students"].as_array().expect("students array");
    let names: Vec<&str> = students.iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Alice", "Bob", "Chad"]);
    let ranks: Vec<u64> = students.iter().map(|s| s["rank"].as_u64().unwrap()).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
    // Per-subject detail survives for manually entered records.
    assert_eq!(students[0]["marks"], json!([80.0, 90.0, 70.0, 60.0, 100.0]));

    let toggled = request(&mut stdin, &mut reader, "6", "roster.toggleSort", json!({}));
    assert_eq!(expect_ok(&toggled)["sortOrder"], "asc");

    settle();
    let listed = request(&mut stdin, &mut reader, "7", "roster.list", json!({}));
    let result = expect_ok(&listed);
    let students = result["students"].as_array().expect("students array");
    let names: Vec<&str> = students.iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Chad", "Bob", "Alice"]);
    let ranks: Vec<u64> = students.iter().map(|s| s["rank"].as_u64().unwrap()).collect();
    assert_eq!(ranks, vec![1, 2, 3]);

    // Two toggles are a no-op pair.
    let toggled = request(&mut stdin, &mut reader, "8", "roster.toggleSort", json!({}));
    assert_eq!(expect_ok(&toggled)["sortOrder"], "desc");

    settle();
    let health = request(&mut stdin, &mut reader, "9", "health", json!({}));
    let result = expect_ok(&health);
    assert_eq!(result["studentCount"], 3);
    assert!(result["recomputeCount"].as_u64().unwrap() >= 3);
    assert_eq!(result["pendingRecompute"], false);

    drop(stdin);
    let _ = child.wait();
}
