use serde::Serialize;

/// Subject codes graded out of 200 (Bangla, English).
pub const DOUBLE_PAPER_CODES: [u32; 2] = [101, 107];
/// Subject codes graded out of 50 (Physical Education, Career Education).
pub const HALF_PAPER_CODES: [u32; 2] = [147, 156];

// Full marks achievable for a subject, derived only from its code.
pub fn full_marks(code: u32) -> u32 {
    if DOUBLE_PAPER_CODES.contains(&code) {
        200
    } else if HALF_PAPER_CODES.contains(&code) {
        50
    } else {
        100
    }
}

// Physical Education and Career Education don't count towards the GPA.
pub fn is_optional(code: u32) -> bool {
    HALF_PAPER_CODES.contains(&code)
}

// Grade point for a subject. The 50-mark subjects use their own mark thresholds.
pub fn grade_point(marks: u32, full: u32, code: u32) -> f64 {
    if HALF_PAPER_CODES.contains(&code) {
        return match marks {
            40..=u32::MAX => 5.0,
            35..=39 => 4.0,
            30..=34 => 3.5,
            25..=29 => 3.0,
            20..=24 => 2.0,
            17..=19 => 1.0,
            _ => 0.0,
        };
    }
    let percent = percentage(u64::from(marks), u64::from(full));
    if percent >= 80.0 {
        5.0
    } else if percent >= 70.0 {
        4.0
    } else if percent >= 60.0 {
        3.5
    } else if percent >= 50.0 {
        3.0
    } else if percent >= 40.0 {
        2.0
    } else if percent >= 33.0 {
        1.0
    } else {
        0.0
    }
}

fn percentage(marks: u64, full: u64) -> f64 {
    if full == 0 {
        return 0.0;
    }
    marks as f64 * 100.0 / full as f64
}

/// Roll and registration numbers identifying one examinee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentQuery {
    pub roll: String,
    pub reg: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectRecord {
    pub code: u32,
    pub name: String,
    pub marks: u32,
    pub full_marks: u32,
    pub grade: String,
    pub optional: bool,
}

impl SubjectRecord {
    pub fn new(code: u32, name: String, marks: u32, grade: String) -> Self {
        SubjectRecord {
            code,
            name,
            marks,
            full_marks: full_marks(code),
            grade,
            optional: is_optional(code),
        }
    }

    pub fn percentage(&self) -> f64 {
        percentage(u64::from(self.marks), u64::from(self.full_marks))
    }

    pub fn grade_point(&self) -> f64 {
        grade_point(self.marks, self.full_marks, self.code)
    }
}

/// What the parser pulls out of one result page.
#[derive(Debug, Clone, PartialEq)]
pub struct Scraped {
    pub gpa: f64,
    pub subjects: Vec<SubjectRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultReport {
    pub student: StudentQuery,
    pub gpa: f64,
    pub subjects: Vec<SubjectRecord>,
}

impl ResultReport {
    pub fn new(student: StudentQuery, scraped: Scraped) -> Self {
        ResultReport {
            student,
            gpa: scraped.gpa,
            subjects: scraped.subjects,
        }
    }

    // Summed as u64: marks come straight from the page and are not bounded.
    pub fn total_marks(&self) -> u64 {
        self.subjects.iter().map(|s| u64::from(s.marks)).sum()
    }

    pub fn total_full_marks(&self) -> u64 {
        self.subjects.iter().map(|s| u64::from(s.full_marks)).sum()
    }

    pub fn percentage(&self) -> f64 {
        percentage(self.total_marks(), self.total_full_marks())
    }
}
