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

use class_alloc_model::catalog::ClassCatalog;
use class_alloc_model::student::Roster;

/// Biases still-unserved students toward reachable capacity between restart
/// attempts.
///
/// For each open period of each student missing a full schedule: the
/// earliest declared choice that is offered with spare capacity in that
/// period of `base` and is not already held gets moved to the front of the
/// choice list. Choices are never removed, only reordered; the pick is
/// deterministic for a fixed input.
pub fn rebalance_choices(roster: &mut Roster, base: &ClassCatalog) {
    let num_periods = base.num_periods();
    for student in roster
        .iter_mut()
        .filter(|s| s.is_missing_assignments(num_periods))
    {
        for period in student.allowed_periods(num_periods) {
            if student.assignment(period).is_some() {
                continue;
            }
            let pick = student
                .choices()
                .iter()
                .find(|c| {
                    !student.holds(c)
                        && base.get(c).map(|class| class.is_open_in(period)).unwrap_or(false)
                })
                .cloned();
            if let Some(class) = pick {
                student.push_front_choice(class);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use class_alloc_model::catalog::Class;
    use class_alloc_model::student::{Student, SubmissionTime};

    fn catalog() -> ClassCatalog {
        ClassCatalog::from_classes(vec![
            Class::new("Archery", "", 1, false, [1, 0]),
            Class::new("Chess", "", 1, false, [0, 1]),
            Class::new("Knots", "", 1, false, [0, 0]),
        ])
        .expect("valid catalog")
    }

    fn student(choices: &[&str]) -> Student {
        Student::new(
            "Test",
            "Student",
            "",
            3,
            SubmissionTime::At(0),
            choices.iter().map(|c| c.to_string()),
        )
    }

    #[test]
    fn test_fronts_earliest_declared_choice_open_in_period() {
        // Period 0 is open only for Archery; Chess is declared earlier but
        // only offered in period 1.
        let mut roster: Roster =
            vec![student(&["Chess", "Archery"])].into_iter().collect();
        rebalance_choices(&mut roster, &catalog());
        let s = roster.iter().next().expect("one student");
        // Period 0 fronts Archery; period 1 then fronts Chess back above it.
        assert_eq!(s.choices(), &["Chess", "Archery"]);
    }

    #[test]
    fn test_unoffered_class_is_never_a_candidate() {
        // Knots has capacity 0 everywhere and must never be fronted.
        let mut roster: Roster =
            vec![student(&["Knots", "Archery"])].into_iter().collect();
        rebalance_choices(&mut roster, &catalog());
        let s = roster.iter().next().expect("one student");
        assert_eq!(s.choices()[0], "Archery");
    }

    #[test]
    fn test_no_op_when_intersection_empty() {
        let mut roster: Roster = vec![student(&["Knots"])].into_iter().collect();
        rebalance_choices(&mut roster, &catalog());
        let s = roster.iter().next().expect("one student");
        assert_eq!(s.choices(), &["Knots"]);
    }

    #[test]
    fn test_skips_students_with_full_schedule() {
        let mut full = student(&["Chess", "Archery"]);
        full.assign(0, "Archery", false);
        full.assign(1, "Chess", false);
        let mut roster: Roster = vec![full].into_iter().collect();
        rebalance_choices(&mut roster, &catalog());
        let s = roster.iter().next().expect("one student");
        assert_eq!(s.choices(), &["Chess", "Archery"]);
    }

    #[test]
    fn test_held_class_is_not_fronted_again() {
        let mut half = student(&["Archery", "Chess"]);
        half.assign(0, "Archery", false);
        let mut roster: Roster = vec![half].into_iter().collect();
        rebalance_choices(&mut roster, &catalog());
        let s = roster.iter().next().expect("one student");
        // Open period 1: Archery is held, so Chess is the pick.
        assert_eq!(s.choices(), &["Chess", "Archery"]);
    }

    #[test]
    fn test_never_removes_choices() {
        let mut roster: Roster =
            vec![student(&["Chess", "Archery", "Knots"])].into_iter().collect();
        rebalance_choices(&mut roster, &catalog());
        let s = roster.iter().next().expect("one student");
        assert_eq!(s.choices().len(), 3);
    }
}
