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

use crate::diag::DiagnosticLog;
use class_alloc_model::catalog::ClassCatalog;
use class_alloc_model::student::Roster;

/// One preference-consuming assignment pass.
///
/// Runs K rounds, K = the longest choice list in the roster. The roster is
/// sorted once by the priority key (grade descending, then submission time
/// descending) before round 1 and never re-sorted. Per round each student
/// gains at most one new seat: choices are pulled through the scan cursor
/// until one seats, or until no choice reachable for the student's allowed
/// period range remains. Seating picks the first free allowed period in
/// ascending index order.
pub fn run_pass(roster: &mut Roster, catalog: &mut ClassCatalog, diag: &mut DiagnosticLog) {
    let rounds = roster.iter().map(|s| s.choices().len()).max().unwrap_or(0);
    let num_periods = catalog.num_periods();
    roster.sort_by_priority();

    for _ in 0..rounds {
        for student in roster.iter_mut() {
            let name = student.name();
            let allowed = student.allowed_periods(num_periods);
            loop {
                let free = student.free_periods_in(allowed.clone());
                if free.is_empty() {
                    break;
                }
                let Some(choice) = student.pull_next_choice() else {
                    break;
                };
                if choice.trim().is_empty() {
                    diag.warn(format!("Unknown class: {choice:?} chosen by {name}"));
                    continue;
                }
                match catalog.get_mut(&choice) {
                    None => diag.warn(format!("Unknown class: {choice} chosen by {name}")),
                    Some(class) => {
                        if let Some(period) = class.seat_first_free(&name, free) {
                            student.assign(period, choice, false);
                            break;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use class_alloc_model::catalog::Class;
    use class_alloc_model::student::{Student, SubmissionTime};

    fn student(first: &str, grade: i32, time: i64, choices: &[&str]) -> Student {
        Student::new(
            first,
            "Test",
            "",
            grade,
            SubmissionTime::At(time),
            choices.iter().map(|c| c.to_string()),
        )
    }

    fn one_period_catalog(capacities: &[(&str, usize)]) -> ClassCatalog {
        ClassCatalog::from_classes(
            capacities
                .iter()
                .map(|(name, cap)| Class::new(*name, "", 1, false, [*cap])),
        )
        .expect("valid catalog")
    }

    #[test]
    fn test_higher_grade_wins_contested_seat() {
        // Two classes with one period of capacity 1 each; both students want
        // [A, B]; the higher grade must get A and push the other to B.
        let mut catalog = one_period_catalog(&[("A", 1), ("B", 1)]);
        let mut roster: Roster = vec![
            student("lower", 2, 0, &["A", "B"]),
            student("higher", 5, 0, &["A", "B"]),
        ]
        .into_iter()
        .collect();
        let mut diag = DiagnosticLog::new();

        run_pass(&mut roster, &mut catalog, &mut diag);

        let higher = roster.get_by_name("higher Test").expect("student");
        let lower = roster.get_by_name("lower Test").expect("student");
        assert_eq!(higher.assignment(0).map(|a| a.class()), Some("A"));
        assert_eq!(lower.assignment(0).map(|a| a.class()), Some("B"));
    }

    #[test]
    fn test_later_submission_wins_grade_tie() {
        let mut catalog = one_period_catalog(&[("A", 1), ("B", 1)]);
        let mut roster: Roster = vec![
            student("early", 3, 10, &["A", "B"]),
            student("late", 3, 20, &["A", "B"]),
        ]
        .into_iter()
        .collect();
        let mut diag = DiagnosticLog::new();

        run_pass(&mut roster, &mut catalog, &mut diag);

        let late = roster.get_by_name("late Test").expect("student");
        assert_eq!(late.assignment(0).map(|a| a.class()), Some("A"));
    }

    #[test]
    fn test_at_most_one_new_seat_per_round() {
        // Four periods, four distinct choices: after one pass every student
        // has one seat per round it could win, never two in the same round.
        let catalog = ClassCatalog::from_classes(vec![
            Class::new("A", "", 1, false, [1, 1, 1, 1]),
            Class::new("B", "", 1, false, [1, 1, 1, 1]),
        ])
        .expect("valid catalog");
        let mut c = catalog.clone();
        let mut roster: Roster =
            vec![student("solo", 3, 0, &["A", "B"])].into_iter().collect();
        let mut diag = DiagnosticLog::new();

        run_pass(&mut roster, &mut c, &mut diag);

        // Two rounds (longest choice list is 2) => exactly two seats.
        let solo = roster.get_by_name("solo Test").expect("student");
        assert_eq!(solo.assignments().len(), 2);
    }

    #[test]
    fn test_unknown_class_is_logged_and_cursor_moves_on() {
        let mut catalog = one_period_catalog(&[("B", 1)]);
        let mut roster: Roster =
            vec![student("solo", 3, 0, &["Missing", "B"])].into_iter().collect();
        let mut diag = DiagnosticLog::new();

        run_pass(&mut roster, &mut catalog, &mut diag);

        let solo = roster.get_by_name("solo Test").expect("student");
        assert_eq!(solo.assignment(0).map(|a| a.class()), Some("B"));
        assert!(diag.lines().iter().any(|l| l.contains("Missing")));
    }

    #[test]
    fn test_first_grader_never_seated_before_period_three() {
        let catalog = ClassCatalog::from_classes(vec![Class::new(
            "A",
            "",
            1,
            false,
            [5, 5, 5, 5, 5, 5],
        )])
        .expect("valid catalog");
        let mut c = catalog.clone();
        let mut roster: Roster =
            vec![student("first", 1, 0, &["A"])].into_iter().collect();
        let mut diag = DiagnosticLog::new();

        run_pass(&mut roster, &mut c, &mut diag);

        let first = roster.get_by_name("first Test").expect("student");
        assert_eq!(first.assignments().len(), 1);
        for (&period, _) in first.assignments() {
            assert!((3..6).contains(&period));
        }
        for early in 0..3 {
            assert_eq!(
                c.get("A").and_then(|cl| cl.period(early)).map(|p| p.seated()),
                Some(0)
            );
        }
    }

    #[test]
    fn test_capacity_never_exceeded_under_contention() {
        let mut catalog = one_period_catalog(&[("A", 2)]);
        let mut roster: Roster = (0..10)
            .map(|i| student(&format!("s{i}"), 3, i, &["A"]))
            .collect();
        let mut diag = DiagnosticLog::new();

        run_pass(&mut roster, &mut catalog, &mut diag);

        let seated = catalog
            .get("A")
            .and_then(|c| c.period(0))
            .map(|p| p.seated())
            .unwrap_or(usize::MAX);
        assert_eq!(seated, 2);
    }

    #[test]
    fn test_full_student_stops_consuming_choices() {
        // One period only; after winning it the student must not burn
        // further choices in later rounds.
        let mut catalog = one_period_catalog(&[("A", 1), ("B", 1)]);
        let mut roster: Roster =
            vec![student("solo", 3, 0, &["A", "B", "B", "B"])].into_iter().collect();
        let mut diag = DiagnosticLog::new();

        run_pass(&mut roster, &mut catalog, &mut diag);

        let solo = roster.get_by_name("solo Test").expect("student");
        assert_eq!(solo.assignments().len(), 1);
        // B still has its seat free: the full student never reached for it.
        assert!(catalog.get("B").map(|c| c.is_open_in(0)).unwrap_or(false));
    }
}
