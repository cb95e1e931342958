use std::sync::LazyLock;

use log::{debug, info, warn};
use regex::Regex;

use crate::error::{Result, ResultError};
use crate::models::{Scraped, SubjectRecord};
use crate::utils::extract::{extract_between, find_after};

// Literal fragments of the board's result page. Adjust these when the page layout changes.
pub const GPA_LABEL: &str = "<td>GPA</td>";
pub const GPA_VALUE_CELL: &str = "<td class=\"cap_lt txt_bold\">";
pub const CODE_CELL: &str = "<td class=\"bg_grey\">";
pub const NAME_CELL: &str = "<td class=\"bg_grey cap_lt\">";
pub const VALUE_CELL: &str = "<td class=\"bg_grey cap_lt\">";
pub const CELL_END: &str = "</td>";

/// Upper bound on subjects read from a single page.
pub const MAX_SUBJECTS: usize = 20;

static LEADING_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t\r\n]*([+-]?\d+)").expect("valid integer pattern"));
static LEADING_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t\r\n]*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").expect("valid float pattern")
});
// "<marks>=<grade>", the grade being at most two characters and ending at the next tag.
static MARKS_GRADE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t\r\n]*([+-]?\d+)=[ \t\r\n]*([^\s<]{1,2})").expect("valid marks pattern"));

fn leading_int(s: &str) -> Option<u32> {
    LEADING_INT.captures(s)?.get(1)?.as_str().parse().ok()
}

fn leading_float(s: &str) -> Option<f64> {
    LEADING_FLOAT.captures(s)?.get(1)?.as_str().parse().ok()
}

fn marks_and_grade(s: &str) -> Option<(u32, String)> {
    let caps = MARKS_GRADE.captures(s)?;
    let marks = caps.get(1)?.as_str().parse().ok()?;
    Some((marks, caps.get(2)?.as_str().to_string()))
}

// Reads the GPA cell that follows the GPA label, 0.0 when absent.
pub fn parse_gpa(html: &str) -> f64 {
    let gpa = find_after(html, 0, GPA_LABEL)
        .and_then(|label_end| find_after(html, label_end, GPA_VALUE_CELL))
        .and_then(|value_at| leading_float(&html[value_at..]));
    match gpa {
        Some(gpa) => gpa,
        None => {
            debug!("No GPA cell found, defaulting to 0.0");
            0.0
        }
    }
}

// Parses one subject row starting at `from`; returns the record and where the next scan starts.
fn parse_subject(html: &str, from: usize) -> Option<(SubjectRecord, usize)> {
    let code_at = find_after(html, from, CODE_CELL)?;
    let code = leading_int(&html[code_at..])?;

    let name = extract_between(&html[code_at..], NAME_CELL, CELL_END).ok()?;
    let name_at = find_after(html, code_at, NAME_CELL)?;

    let value_at = find_after(html, name_at, VALUE_CELL)?;
    let Some((marks, grade)) = marks_and_grade(&html[value_at..]) else {
        debug!("Subject {} has no marks/grade cell, stopping", code);
        return None;
    };

    let next = find_after(html, value_at, CELL_END).unwrap_or(html.len());
    Some((SubjectRecord::new(code, name, marks, grade), next))
}

// Collects subject rows in page order, up to MAX_SUBJECTS.
pub fn parse_subjects(html: &str) -> Vec<SubjectRecord> {
    let mut subjects = Vec::new();
    let mut cursor = 0;
    while let Some((subject, next)) = parse_subject(html, cursor) {
        debug!("Parsed subject {} {:?}: {}={}", subject.code, subject.name, subject.marks, subject.grade);
        subjects.push(subject);
        cursor = next;
        if subjects.len() == MAX_SUBJECTS {
            warn!("Reached the limit of {} subjects, ignoring the rest of the page", MAX_SUBJECTS);
            break;
        }
    }
    subjects
}

// Extracts the GPA and the subject list from a result page.
pub fn parse_result(html: &str) -> Result<Scraped> {
    let gpa = parse_gpa(html);
    let subjects = parse_subjects(html);
    if subjects.is_empty() {
        return Err(ResultError::NoSubjectsFound);
    }
    info!("Parsed {} subjects, GPA {:.2}", subjects.len(), gpa);
    Ok(Scraped { gpa, subjects })
}
