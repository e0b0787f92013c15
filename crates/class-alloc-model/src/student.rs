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

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

/// Grade assumed when a student record carries no grade at all.
pub const DEFAULT_GRADE: i32 = 2;

/// First-graders attend a shortened day: periods [3, 6) only.
pub const FIRST_GRADE_START: usize = 3;
pub const FIRST_GRADE_END: usize = 6;

/// When a submission timestamp is unparseable or missing it is treated as
/// the latest submission; `Latest` orders above every concrete timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubmissionTime {
    At(i64),
    Latest,
}

/// One period's class assignment, owned by its student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    class: String,
    locked: bool,
}

impl Assignment {
    #[inline]
    pub fn new(class: impl Into<String>, locked: bool) -> Self {
        Self {
            class: class.into(),
            locked,
        }
    }

    #[inline]
    pub fn class(&self) -> &str {
        &self.class
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

/// A student with ranked class choices and a (partial) period schedule.
///
/// `choices` is the working preference order the allocator consumes through
/// `cursor`; `original_choices` is the as-submitted order kept for the
/// happiness score. The cursor is per-attempt scratch state and is rewound
/// by `reset`, which also drops every unlocked assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    first_name: String,
    last_name: String,
    teacher: String,
    grade: i32,
    submitted: SubmissionTime,
    choices: Vec<String>,
    original_choices: Vec<String>,
    assignments: BTreeMap<usize, Assignment>,
    cursor: usize,
}

impl Student {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        teacher: impl Into<String>,
        grade: i32,
        submitted: SubmissionTime,
        choices: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut seen = BTreeSet::new();
        let choices: Vec<String> = choices
            .into_iter()
            .filter(|c| !c.trim().is_empty() && seen.insert(c.clone()))
            .collect();
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            teacher: teacher.into(),
            grade,
            submitted,
            original_choices: choices.clone(),
            choices,
            assignments: BTreeMap::new(),
            cursor: 0,
        }
    }

    #[inline]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[inline]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    #[inline]
    pub fn teacher(&self) -> &str {
        &self.teacher
    }

    #[inline]
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    #[inline]
    pub fn grade(&self) -> i32 {
        self.grade
    }

    #[inline]
    pub fn submitted(&self) -> SubmissionTime {
        self.submitted
    }

    /// Grade 1, or a homeroom-teacher string starting with '1'. Some rosters
    /// leave the grade column blank for first grade classes.
    #[inline]
    pub fn is_first_grade(&self) -> bool {
        self.grade == 1 || self.teacher.starts_with('1')
    }

    /// Period indices this student may attend.
    #[inline]
    pub fn allowed_periods(&self, num_periods: usize) -> Range<usize> {
        if self.is_first_grade() {
            FIRST_GRADE_START.min(num_periods)..FIRST_GRADE_END.min(num_periods)
        } else {
            0..num_periods
        }
    }

    /// How many assignments constitute a full schedule for this student.
    #[inline]
    pub fn required_assignments(&self, num_periods: usize) -> usize {
        self.allowed_periods(num_periods).len()
    }

    #[inline]
    pub fn is_missing_assignments(&self, num_periods: usize) -> bool {
        self.assignments.len() < self.required_assignments(num_periods)
    }

    #[inline]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[inline]
    pub fn original_choices(&self) -> &[String] {
        &self.original_choices
    }

    #[inline]
    pub fn has_unconsumed_choices(&self) -> bool {
        self.cursor < self.choices.len()
    }

    /// Consumes the next choice, advancing the scan cursor. The cursor only
    /// ever moves forward within one allocator pass.
    #[inline]
    pub fn pull_next_choice(&mut self) -> Option<String> {
        let choice = self.choices.get(self.cursor).cloned();
        if choice.is_some() {
            self.cursor += 1;
        }
        choice
    }

    #[inline]
    pub fn assignments(&self) -> &BTreeMap<usize, Assignment> {
        &self.assignments
    }

    #[inline]
    pub fn assignment(&self, period: usize) -> Option<&Assignment> {
        self.assignments.get(&period)
    }

    #[inline]
    pub fn assign(&mut self, period: usize, class: impl Into<String>, locked: bool) {
        self.assignments.insert(period, Assignment::new(class, locked));
    }

    #[inline]
    pub fn holds(&self, class: &str) -> bool {
        self.assignments.values().any(|a| a.class() == class)
    }

    #[inline]
    pub fn held_classes(&self) -> BTreeSet<&str> {
        self.assignments.values().map(|a| a.class()).collect()
    }

    /// Periods in `range` with no assignment yet.
    #[inline]
    pub fn free_periods_in(&self, range: Range<usize>) -> Vec<usize> {
        range.filter(|p| !self.assignments.contains_key(p)).collect()
    }

    /// Clears unlocked assignments and rewinds the scan cursor. Locked
    /// assignments persist across resets within one run.
    pub fn reset(&mut self) {
        self.assignments.retain(|_, a| a.is_locked());
        self.cursor = 0;
    }

    /// Drops every assignment, locked ones included. Used when re-seeding a
    /// student for an independent run.
    #[inline]
    pub fn clear_assignments(&mut self) {
        self.assignments.clear();
    }

    /// Removes choices naming classes the student already holds, so the
    /// allocator never re-offers a granted seat. Rewinds the cursor.
    pub fn remove_choices_already_assigned(&mut self) {
        let held: BTreeSet<String> = self
            .assignments
            .values()
            .map(|a| a.class().to_string())
            .collect();
        self.choices.retain(|c| !held.contains(c));
        self.cursor = 0;
    }

    /// Moves (or inserts) a class name to the front of the choice list,
    /// re-deduplicating while preserving order.
    pub fn push_front_choice(&mut self, class: impl Into<String>) {
        self.choices.insert(0, class.into());
        let mut seen = BTreeSet::new();
        self.choices.retain(|c| seen.insert(c.clone()));
    }

    /// Rank-weighted share of the originally declared choices the student
    /// actually received, as a percentage clamped to [0, 100].
    pub fn happiness(&self, num_periods: usize) -> u32 {
        let span = if self.is_first_grade() {
            FIRST_GRADE_END - FIRST_GRADE_START
        } else {
            num_periods
        };
        let max_score: i64 = (0..span as i64).map(|i| 10 - i).sum();
        if max_score <= 0 {
            return 0;
        }
        let held = self.held_classes();
        let len = self.original_choices.len() as i64;
        let score: i64 = self
            .original_choices
            .iter()
            .enumerate()
            .filter(|(_, c)| held.contains(c.as_str()))
            .map(|(i, _)| len - i as i64)
            .sum();
        ((score * 100 / max_score).clamp(0, 100)) as u32
    }
}

/// Ordered container of students.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster(Vec<Student>);

impl Roster {
    #[inline]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub fn push(&mut self, student: Student) {
        self.0.push(student);
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
    pub fn iter(&self) -> impl Iterator<Item = &Student> {
        self.0.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Student> {
        self.0.iter_mut()
    }

    #[inline]
    pub fn contains_name(&self, name: &str) -> bool {
        self.0.iter().any(|s| s.name() == name)
    }

    #[inline]
    pub fn get_by_name(&self, name: &str) -> Option<&Student> {
        self.0.iter().find(|s| s.name() == name)
    }

    /// Sorts by the priority key: grade descending, then submission time
    /// descending (later submission wins ties). The sort is stable, so equal
    /// keys keep their relative order.
    #[inline]
    pub fn sort_by_priority(&mut self) {
        self.0.sort_by(|a, b| {
            b.grade()
                .cmp(&a.grade())
                .then_with(|| b.submitted().cmp(&a.submitted()))
        });
    }

    /// Students with an incomplete schedule.
    #[inline]
    pub fn count_missing(&self, num_periods: usize) -> usize {
        self.0
            .iter()
            .filter(|s| s.is_missing_assignments(num_periods))
            .count()
    }
}

impl FromIterator<Student> for Roster {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Student>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
