use std::fmt::Write as _;
use std::io::{self, Write};
use std::time::Duration;

use serde::Serialize;

use crate::models::{ResultReport, StudentQuery, SubjectRecord};
use crate::utils::terminal::type_text;

pub const NAME_WIDTH: usize = 45;
const BANNER_RULE: &str = "=============================================";
const TITLE: &str = "SSC Examination Result";
pub const SIGNATURE: [&str; 4] = [
    "Sincerely,",
    "House Representative (MAR)",
    "IT Club",
    "Adamjee Cantonment College",
];

// Cuts or pads a subject name to exactly `width` characters.
fn fit(name: &str, width: usize) -> String {
    let cut: String = name.chars().take(width).collect();
    format!("{cut:<width$}")
}

fn table_rule() -> String {
    // code, name, marks, grade, point, percentage columns plus separators
    "-".repeat(6 + 1 + NAME_WIDTH + 1 + 7 + 1 + 5 + 1 + 5 + 1 + 7)
}

pub fn render_table(subjects: &[SubjectRecord]) -> String {
    let mut table = String::new();
    let rule = table_rule();
    let _ = writeln!(
        table,
        "{:<6} {} {:<7} {:<5} {:<5} {}",
        "Code",
        fit("Subject", NAME_WIDTH),
        "Marks",
        "Grade",
        "Point",
        "Percent"
    );
    let _ = writeln!(table, "{rule}");
    for s in subjects {
        let _ = writeln!(
            table,
            "{:<6} {} {:<7} {:<5} {:<5.2} {:>7}",
            s.code,
            fit(&s.name, NAME_WIDTH),
            s.marks,
            s.grade,
            s.grade_point(),
            format!("{:.2}%", s.percentage())
        );
    }
    let _ = writeln!(table, "{rule}");
    table
}

pub fn render_totals(report: &ResultReport) -> String {
    let mut totals = String::new();
    let _ = writeln!(totals, "Total Marks : {} / {}", report.total_marks(), report.total_full_marks());
    let _ = writeln!(totals, "Percentage  : {:.2}%", report.percentage());
    let _ = writeln!(totals, "Total GPA   : {:.2}", report.gpa);
    let _ = writeln!(totals, "{BANNER_RULE}");
    totals
}

#[derive(Serialize)]
struct SubjectView<'a> {
    #[serde(flatten)]
    subject: &'a SubjectRecord,
    percentage: f64,
    grade_point: f64,
}

#[derive(Serialize)]
struct ReportView<'a> {
    #[serde(flatten)]
    student: &'a StudentQuery,
    gpa: f64,
    subjects: Vec<SubjectView<'a>>,
    total_marks: u64,
    total_full_marks: u64,
    percentage: f64,
}

// Machine-readable form of the report, with the derived figures filled in.
pub fn render_json(report: &ResultReport) -> serde_json::Result<String> {
    let view = ReportView {
        student: &report.student,
        gpa: report.gpa,
        subjects: report
            .subjects
            .iter()
            .map(|subject| SubjectView {
                subject,
                percentage: subject.percentage(),
                grade_point: subject.grade_point(),
            })
            .collect(),
        total_marks: report.total_marks(),
        total_full_marks: report.total_full_marks(),
        percentage: report.percentage(),
    };
    serde_json::to_string_pretty(&view)
}

/// Terminal presentation: typed banner and signature around the result table.
pub struct Presenter {
    pub animate: bool,
    pub type_delay: Duration,
    pub student_name: Option<String>,
}

impl Presenter {
    fn delay(&self) -> Duration {
        if self.animate {
            self.type_delay
        } else {
            Duration::ZERO
        }
    }

    pub async fn banner<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{BANNER_RULE}")?;
        if let Some(name) = &self.student_name {
            type_text(out, &format!("Student Name : {name}\n"), self.delay()).await?;
        }
        type_text(out, &format!("{TITLE}\n"), self.delay()).await?;
        writeln!(out, "{BANNER_RULE}\n")?;
        out.flush()
    }

    pub fn report<W: Write>(&self, out: &mut W, report: &ResultReport) -> io::Result<()> {
        write!(out, "{}", render_table(&report.subjects))?;
        writeln!(out, "{}", render_totals(report))?;
        out.flush()
    }

    pub async fn signature<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for line in SIGNATURE {
            type_text(out, &format!("{line}\n"), self.delay()).await?;
        }
        writeln!(out, "\n{BANNER_RULE}")?;
        out.flush()
    }
}
