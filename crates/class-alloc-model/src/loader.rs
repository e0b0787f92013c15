// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::catalog::{Class, ClassCatalog};
use crate::err::{InvalidGradeError, LoadError, MissingHeaderError, RosterError};
use crate::student::{Roster, Student, SubmissionTime, DEFAULT_GRADE};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

/// Period index to class name, as read from an existing schedule file.
pub type PeriodMap = BTreeMap<usize, String>;

/// Per-student forced assignments consumed by the carry-over pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingSchedule(BTreeMap<String, PeriodMap>);

impl ExistingSchedule {
    #[inline]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[inline]
    pub fn insert(&mut self, student: impl Into<String>, periods: PeriodMap) {
        self.0.insert(student.into(), periods);
    }

    #[inline]
    pub fn get(&self, student: &str) -> Option<&PeriodMap> {
        self.0.get(student)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PeriodMap)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

const TIME_FORMAT: &str = "%m/%d/%y %I:%M %p";

/// Strips one trailing parenthetical descriptor: `"Archery (field)"` becomes
/// `"Archery"`. Anything without the `name (...)` shape passes through
/// trimmed.
fn strip_descriptor(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.ends_with(')') {
        if let Some(open) = trimmed.find('(') {
            let head = trimmed[..open].trim_end();
            if !head.is_empty() && open + 1 < trimmed.len() - 1 {
                return head;
            }
        }
    }
    trimmed
}

fn parse_submission(date: &str, time: &str) -> (SubmissionTime, Option<String>) {
    if date.is_empty() && time.is_empty() {
        return (SubmissionTime::Latest, None);
    }
    let combined = format!("{} {}", date, time);
    match NaiveDateTime::parse_from_str(&combined, TIME_FORMAT) {
        Ok(dt) => (SubmissionTime::At(dt.and_utc().timestamp()), None),
        Err(_) => (
            SubmissionTime::Latest,
            Some(format!(
                "Unparseable submission time {:?}, treating as latest",
                combined
            )),
        ),
    }
}

fn parse_grade(raw: &str, line: usize) -> Result<i32, RosterError> {
    if raw.is_empty() {
        return Ok(DEFAULT_GRADE);
    }
    raw.parse::<i32>()
        .map_err(|_| RosterError::from(InvalidGradeError::new(line, raw)))
}

/// Loads the class catalog from `classes.csv`-shaped data.
///
/// Column lookup is header-driven and case-insensitive: `class name`,
/// `location`, `mingrade`, `iscancelledwhenraining`, and `session 1` through
/// `session 9` (only sessions present in the header become periods).
/// Blank-named rows are skipped; blank or unparseable capacities read as 0.
pub fn load_catalog<R: Read>(reader: R) -> Result<ClassCatalog, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let header: BTreeMap<String, usize> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_lowercase(), i))
        .collect();

    let name_col = *header
        .get("class name")
        .ok_or_else(|| MissingHeaderError::new("class name"))?;
    let session_cols: Vec<usize> = (1..10)
        .filter_map(|i| header.get(&format!("session {i}")).copied())
        .collect();
    let location_col = header.get("location").copied();
    let min_grade_col = header.get("mingrade").copied();
    let rain_col = header.get("iscancelledwhenraining").copied();

    let field = |record: &csv::StringRecord, col: Option<usize>| -> String {
        col.and_then(|c| record.get(c))
            .unwrap_or("")
            .trim()
            .to_string()
    };

    let mut classes = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let name = field(&record, Some(name_col));
        if name.is_empty() {
            continue;
        }
        let capacities: Vec<usize> = session_cols
            .iter()
            .map(|&c| {
                record
                    .get(c)
                    .unwrap_or("")
                    .trim()
                    .parse::<usize>()
                    .unwrap_or(0)
            })
            .collect();
        let min_grade = field(&record, min_grade_col).parse::<i32>().unwrap_or(1);
        let location = field(&record, location_col);
        let cancelled = field(&record, rain_col) == "1";
        classes.push(Class::new(name, location, min_grade, cancelled, capacities));
    }

    Ok(ClassCatalog::from_classes(classes)?)
}

pub fn load_catalog_from_path(path: impl AsRef<Path>) -> Result<ClassCatalog, LoadError> {
    let file = std::fs::File::open(path)?;
    load_catalog(file)
}

/// Loads the student roster.
///
/// Every column whose header ends with `choice` contributes, in declared
/// order, one choice; choices are stripped of trailing parenthetical
/// descriptors, blank-filtered and deduplicated. Records with zero valid
/// choices are excluded. A present-but-unparseable grade is fatal; a blank
/// grade defaults. Duplicate names keep the record with more choices.
///
/// Returns the roster plus non-fatal ingestion warnings for the caller's
/// diagnostic stream.
pub fn load_roster<R: Read>(reader: R) -> Result<(Roster, Vec<String>), LoadError> {
    let mut warnings = Vec::new();
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let col = |name: &str| headers.iter().position(|h| h.trim() == name);
    let first_col = col("STUDENT First Name");
    let last_col = col("STUDENT Last Name");
    let grade_col = col("Grade");
    let teacher_col = col("Teacher");
    let date_col = col("Date Completed");
    let time_col = col("Time Completed");
    let choice_cols: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.trim().to_lowercase().ends_with("choice"))
        .map(|(i, _)| i)
        .collect();

    let mut by_name: BTreeMap<String, Student> = BTreeMap::new();
    for (index, record) in rdr.records().enumerate() {
        let record = record?;
        let line = index + 2; // line 1 is the header
        let get = |c: Option<usize>| c.and_then(|c| record.get(c)).unwrap_or("").trim();

        let grade = parse_grade(get(grade_col), line)?;
        let (submitted, warning) = parse_submission(get(date_col), get(time_col));
        if let Some(w) = warning {
            warnings.push(format!("Line {line}: {w}"));
        }

        let mut seen = BTreeSet::new();
        let choices: Vec<String> = choice_cols
            .iter()
            .map(|&c| strip_descriptor(record.get(c).unwrap_or("")).to_string())
            .filter(|c| !c.is_empty() && seen.insert(c.clone()))
            .collect();
        if choices.is_empty() {
            continue;
        }

        let student = Student::new(
            get(first_col),
            get(last_col),
            get(teacher_col),
            grade,
            submitted,
            choices,
        );
        match by_name.entry(student.name()) {
            std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(student);
            }
            std::collections::btree_map::Entry::Occupied(mut e) => {
                // Duplicate submission: keep whichever lists more choices.
                if e.get().choices().len() < student.choices().len() {
                    e.insert(student);
                }
            }
        }
    }

    Ok((by_name.into_values().collect(), warnings))
}

pub fn load_roster_from_path(
    path: impl AsRef<Path>,
) -> Result<(Roster, Vec<String>), LoadError> {
    let file = std::fs::File::open(path)?;
    load_roster(file)
}

/// Loads an existing schedule (normal or rain variant) in the
/// assignment-report shape: `Last Name`, `First Name`, `Grade`, `Teacher`
/// and one `Session N` column per period.
///
/// A row naming a student absent from the roster synthesizes a new Student
/// from that row alone: a forced schedule with no submitted preferences is
/// still placed. Returns the period-to-class mappings plus warnings.
pub fn load_existing_schedule<R: Read>(
    reader: R,
    roster: &mut Roster,
) -> Result<(ExistingSchedule, Vec<String>), LoadError> {
    let mut warnings = Vec::new();
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let col = |name: &str| headers.iter().position(|h| h.trim() == name);
    let first_col = col("First Name");
    let last_col = col("Last Name");
    let grade_col = col("Grade");
    let teacher_col = col("Teacher");
    let session_cols: Vec<(usize, usize)> = (1..10)
        .filter_map(|i| col(&format!("Session {i}")).map(|c| (i - 1, c)))
        .collect();

    let mut schedule = ExistingSchedule::new();
    for (index, record) in rdr.records().enumerate() {
        let record = record?;
        let line = index + 2;
        let get = |c: Option<usize>| c.and_then(|c| record.get(c)).unwrap_or("").trim();

        let name = format!("{} {}", get(first_col), get(last_col));
        let mut periods = PeriodMap::new();
        for &(period, c) in &session_cols {
            let class = record.get(c).unwrap_or("").trim();
            if !class.is_empty() {
                periods.insert(period, class.to_string());
            }
        }

        if !roster.contains_name(&name) {
            warnings.push(format!("Unable to find student {name}"));
            let grade = parse_grade(get(grade_col), line)?;
            roster.push(Student::new(
                get(first_col),
                get(last_col),
                get(teacher_col),
                grade,
                SubmissionTime::Latest,
                Vec::new(),
            ));
        }
        schedule.insert(name, periods);
    }

    Ok((schedule, warnings))
}

pub fn load_existing_schedule_from_path(
    path: impl AsRef<Path>,
    roster: &mut Roster,
) -> Result<(ExistingSchedule, Vec<String>), LoadError> {
    let file = std::fs::File::open(path)?;
    load_existing_schedule(file, roster)
}
