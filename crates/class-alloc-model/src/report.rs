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

use crate::catalog::ClassCatalog;
use crate::student::Roster;
use serde::Serialize;

/// Class name and location of one period cell in an assignment row. Empty
/// strings for an unassigned period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeriodCell {
    pub class: String,
    pub location: String,
}

/// One rendered student row of the assignment report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentRow {
    pub last_name: String,
    pub first_name: String,
    pub grade: i32,
    pub teacher: String,
    pub happiness: u32,
    pub num_classes: usize,
    pub periods: Vec<PeriodCell>,
}

/// One rendered class row of the class-size report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassSizeRow {
    pub name: String,
    pub seated: Vec<usize>,
    pub min_grade: i32,
}

/// Builds assignment rows in roster order.
pub fn assignment_rows(roster: &Roster, catalog: &ClassCatalog) -> Vec<AssignmentRow> {
    let num_periods = catalog.num_periods();
    roster
        .iter()
        .map(|student| {
            let periods = (0..num_periods)
                .map(|p| match student.assignment(p) {
                    Some(a) => PeriodCell {
                        class: a.class().to_string(),
                        location: catalog
                            .get(a.class())
                            .map(|c| c.location().to_string())
                            .unwrap_or_default(),
                    },
                    None => PeriodCell::default(),
                })
                .collect();
            AssignmentRow {
                last_name: student.last_name().to_string(),
                first_name: student.first_name().to_string(),
                grade: student.grade(),
                teacher: student.teacher().to_string(),
                happiness: student.happiness(num_periods),
                num_classes: student.assignments().len(),
                periods,
            }
        })
        .collect()
}

/// Builds class-size rows in catalog (name) order.
pub fn class_size_rows(catalog: &ClassCatalog) -> Vec<ClassSizeRow> {
    catalog
        .iter()
        .map(|class| ClassSizeRow {
            name: class.name().to_string(),
            seated: class.seated_counts(),
            min_grade: class.min_grade(),
        })
        .collect()
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Renders the assignment report as CSV.
pub fn render_assignments_csv(rows: &[AssignmentRow], num_periods: usize) -> String {
    let mut out = String::from("Last Name,First Name,Grade,Teacher,Happiness,NumClasses");
    for i in 1..=num_periods {
        out.push_str(&format!(",Session {i},Session {i} Location"));
    }
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{}",
            quote(&row.last_name),
            quote(&row.first_name),
            row.grade,
            quote(&row.teacher),
            row.happiness,
            row.num_classes
        ));
        for cell in &row.periods {
            out.push_str(&format!(",{},{}", quote(&cell.class), quote(&cell.location)));
        }
        out.push('\n');
    }
    out
}

/// Renders the class-size report as CSV.
pub fn render_class_sizes_csv(rows: &[ClassSizeRow], num_periods: usize) -> String {
    let mut out = String::from("Name");
    for i in 1..=num_periods {
        out.push_str(&format!(",Session {i}"));
    }
    out.push_str(",MinGrade\n");
    for row in rows {
        out.push_str(&quote(&row.name));
        for count in &row.seated {
            out.push_str(&format!(",{count}"));
        }
        out.push_str(&format!(",{}\n", row.min_grade));
    }
    out
}
