use crate::roster::{RosterError, StudentRecord};

/// Fixed column vocabulary shared by export and import. Import matches
/// header names case-sensitively against these.
pub const COL_NAME: &str = "Name";
pub const COL_ENROLLMENT: &str = "Enrollment Number";
pub const COL_TOTAL_MARKS: &str = "Total Marks";
pub const COL_PERCENTAGE: &str = "Percentage";
pub const COL_RANK: &str = "Rank";

pub const CSV_HEADER: &str = "Name,Enrollment Number,Total Marks,Percentage,Rank";

pub const DEFAULT_EXPORT_FILE: &str = "rank_list.csv";

/// Minimal numeric rendering: integral values print without a fractional
/// part (`400`, not `400.0`), matching what the UI shows in the table.
fn format_number(v: f64) -> String {
    v.to_string()
}

/// Builds the CSV document: header line, then one row per record in
/// collection order. Fields are comma-joined with no quoting or escaping;
/// a field containing the delimiter corrupts its row. Known limitation of
/// the format, kept as-is.
pub fn export_csv(students: &[StudentRecord]) -> Result<String, RosterError> {
    if students.is_empty() {
        return Err(RosterError::new(
            "empty_roster",
            "No data to export! Please add student data to the table.",
        ));
    }
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for s in students {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            s.name,
            s.enrollment_number,
            format_number(s.total_marks),
            format_number(s.percentage),
            s.rank
        ));
    }
    Ok(csv)
}

/// One imported row after defaulting, before it becomes a record. Numeric
/// fields are trusted as-is; nothing is re-validated or re-derived.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRosterRow {
    pub name: String,
    pub enrollment_number: String,
    pub total_marks: f64,
    pub percentage: f64,
    pub rank: u32,
}

impl ParsedRosterRow {
    /// The flat format does not round-trip per-subject detail, so `marks`
    /// is always empty on imported records.
    pub fn into_record(self) -> StudentRecord {
        StudentRecord {
            name: self.name,
            enrollment_number: self.enrollment_number,
            marks: Vec::new(),
            total_marks: self.total_marks,
            percentage: self.percentage,
            rank: self.rank,
        }
    }
}

/// Splits one line into fields. Fields may be double-quoted with `""`
/// escapes; the delimiter is ignored inside quotes.
fn parse_delimited_record(line: &str, delimiter: char) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut in_quotes = false;
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0usize;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '"' {
            if in_quotes && i + 1 < chars.len() && chars[i + 1] == '"' {
                buf.push('"');
                i += 2;
                continue;
            }
            in_quotes = !in_quotes;
            i += 1;
            continue;
        }
        if ch == delimiter && !in_quotes {
            out.push(buf);
            buf = String::new();
            i += 1;
            continue;
        }
        buf.push(ch);
        i += 1;
    }
    out.push(buf);
    out
}

/// Picks the delimiter that splits the header line widest: comma, tab, or
/// semicolon, comma winning ties. Mirrors the tolerant sheet reader the UI
/// used for its paste target.
fn sniff_delimiter(header_line: &str) -> char {
    let mut best = ',';
    let mut best_count = header_line.matches(',').count();
    for cand in ['\t', ';'] {
        let count = header_line.matches(cand).count();
        if count > best_count {
            best = cand;
            best_count = count;
        }
    }
    best
}

fn contains_control_bytes(text: &str) -> bool {
    text.chars()
        .any(|c| c.is_control() && c != '\n' && c != '\r' && c != '\t')
}

fn parse_number_field(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn parse_rank_field(raw: Option<&str>) -> u32 {
    let v = parse_number_field(raw);
    if v <= 0.0 {
        0
    } else {
        v as u32
    }
}

/// Parses pasted or file-read delimited text into typed rows. The first
/// non-empty line must be a header naming at least one known column;
/// columns may appear in any order and unknown ones are skipped. Data rows
/// default field by field (blank text stays empty, unparseable numbers
/// become 0) rather than failing.
///
/// Fails only when the input is not tabular text at all: empty input,
/// control bytes (binary garbage), or a header naming no known column.
pub fn parse_roster_csv(text: &str) -> Result<Vec<ParsedRosterRow>, RosterError> {
    if text.trim().is_empty() {
        return Err(RosterError::import("no data to import"));
    }
    if contains_control_bytes(text) {
        return Err(RosterError::import("input is not tabular text"));
    }

    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let Some(header_line) = lines.next() else {
        return Err(RosterError::import("no data to import"));
    };
    let delimiter = sniff_delimiter(header_line);
    let header = parse_delimited_record(header_line, delimiter);

    let col_of = |name: &str| header.iter().position(|h| h.trim() == name);
    let name_col = col_of(COL_NAME);
    let enrollment_col = col_of(COL_ENROLLMENT);
    let total_col = col_of(COL_TOTAL_MARKS);
    let percentage_col = col_of(COL_PERCENTAGE);
    let rank_col = col_of(COL_RANK);
    if [name_col, enrollment_col, total_col, percentage_col, rank_col]
        .iter()
        .all(Option::is_none)
    {
        return Err(RosterError::import("header row not recognized"));
    }

    let mut rows = Vec::new();
    for line in lines {
        let fields = parse_delimited_record(line, delimiter);
        let text_field = |col: Option<usize>| {
            col.and_then(|i| fields.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        let num_field = |col: Option<usize>| col.and_then(|i| fields.get(i)).map(String::as_str);
        rows.push(ParsedRosterRow {
            name: text_field(name_col),
            enrollment_number: text_field(enrollment_col),
            total_marks: parse_number_field(num_field(total_col)),
            percentage: parse_number_field(num_field(percentage_col)),
            rank: parse_rank_field(num_field(rank_col)),
        });
    }
    Ok(rows)
}
