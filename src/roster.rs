use serde::Serialize;
use std::cmp::Ordering;

/// Fixed number of per-subject mark fields on the entry form.
pub const SUBJECT_COUNT: usize = 5;

/// Each subject is scored out of 100.
pub const FULL_MARKS_PER_SUBJECT: f64 = 100.0;

/// Half-up 2-decimal rounding used for derived percentages:
/// `Int(100*x + 0.5) / 100`
pub fn round_off_2_decimals(x: f64) -> f64 {
    ((100.0 * x) + 0.5).floor() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl RosterError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Entry-time failure; the user corrects the form and retries.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_failed", message)
    }

    /// Parse-time failure; the prior roster is left untouched.
    pub fn import(message: impl Into<String>) -> Self {
        Self::new("import_failed", message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub name: String,
    pub enrollment_number: String,
    pub marks: Vec<f64>,
    pub total_marks: f64,
    pub percentage: f64,
    /// 0 until the next recompute assigns a dense 1-based rank.
    pub rank: u32,
}

/// Raw entry-form fields as the UI submits them. Mark values are the
/// text-field contents; an absent field is the empty string.
#[derive(Debug, Clone, Default)]
pub struct StudentEntry {
    pub name: String,
    pub enrollment_number: String,
    pub use_total_marks: bool,
    pub total_marks: String,
    pub marks: Vec<String>,
}

fn parse_entry_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Validates an entry and derives `total_marks` and `percentage`. The new
/// record is unranked (`rank == 0`) until the debounced recompute runs.
pub fn build_record(entry: &StudentEntry) -> Result<StudentRecord, RosterError> {
    let name = entry.name.trim();
    let enrollment_number = entry.enrollment_number.trim();
    if name.is_empty() || enrollment_number.is_empty() {
        return Err(RosterError::validation(
            "Name and Enrollment Number are required.",
        ));
    }

    let (marks, total_marks) = if entry.use_total_marks {
        if entry.total_marks.trim().is_empty() {
            return Err(RosterError::validation("Total Marks are required."));
        }
        let Some(total) = parse_entry_number(&entry.total_marks) else {
            return Err(RosterError::validation("Total Marks must be a number."));
        };
        (Vec::new(), total)
    } else {
        // Emptiness is reported before numeric garbage, across all slots.
        let has_empty = (0..SUBJECT_COUNT)
            .any(|i| entry.marks.get(i).map(|s| s.trim().is_empty()).unwrap_or(true));
        if has_empty {
            return Err(RosterError::validation("Please fill in all the marks."));
        }
        let mut marks = Vec::with_capacity(SUBJECT_COUNT);
        for raw in entry.marks.iter().take(SUBJECT_COUNT) {
            let Some(v) = parse_entry_number(raw) else {
                return Err(RosterError::validation("Marks must be numbers."));
            };
            marks.push(v);
        }
        let total = marks.iter().sum();
        (marks, total)
    };

    let max_marks = if entry.use_total_marks {
        // TODO: confirm with product whether total-marks entries should scale
        // against a real exam maximum instead of a flat 100.
        100.0
    } else {
        SUBJECT_COUNT as f64 * FULL_MARKS_PER_SUBJECT
    };

    Ok(StudentRecord {
        name: name.to_string(),
        enrollment_number: enrollment_number.to_string(),
        marks,
        total_marks,
        percentage: round_off_2_decimals(100.0 * total_marks / max_marks),
        rank: 0,
    })
}

/// Sorts by total marks in the given direction and assigns dense 1-based
/// ranks; ties keep their relative order (stable sort). The returned vector
/// replaces the collection wholesale, so presentation order always matches
/// the last ranking pass.
pub fn recompute_ranks(mut students: Vec<StudentRecord>, order: SortOrder) -> Vec<StudentRecord> {
    students.sort_by(|a, b| {
        let cmp = a
            .total_marks
            .partial_cmp(&b.total_marks)
            .unwrap_or(Ordering::Equal);
        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
    for (i, s) in students.iter_mut().enumerate() {
        s.rank = (i + 1) as u32;
    }
    students
}
