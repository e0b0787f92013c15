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

use crate::carryover;
use crate::diag::DiagnosticLog;
use class_alloc_model::catalog::ClassCatalog;
use class_alloc_model::loader::PeriodMap;
use class_alloc_model::student::{Roster, Student};

/// Derives the rain-day catalog from the normal one: every seat cleared and
/// every class cancelled when raining closed (capacity 0, so it is never
/// offered).
pub fn derive_rain_catalog(normal: &ClassCatalog) -> ClassCatalog {
    let mut catalog = normal.clone();
    catalog.clear_all_seats();
    for class in catalog.iter_mut() {
        if class.is_cancelled_when_raining() {
            class.close_all_periods();
        }
    }
    catalog
}

/// The normal-run seats of a student that survive a rain day, as a
/// carry-over mapping: assignments in classes not cancelled when raining.
pub fn rain_safe_seats(student: &Student, normal: &ClassCatalog) -> PeriodMap {
    student
        .assignments()
        .iter()
        .filter(|(_, a)| {
            normal
                .get(a.class())
                .map(|c| !c.is_cancelled_when_raining())
                .unwrap_or(false)
        })
        .map(|(&period, a)| (period, a.class().to_string()))
        .collect()
}

/// Lock-seeds the rain roster from the best normal run.
///
/// Each student keeps only its rain-safe seats: those are re-seated in the
/// rain catalog through the carry-over pass (capacity rechecked, seats
/// locked); everything else is cleared and reopened for reassignment.
pub fn seed_rain_roster(
    best_roster: &Roster,
    normal: &ClassCatalog,
    rain_catalog: &mut ClassCatalog,
    diag: &mut DiagnosticLog,
) -> Roster {
    best_roster
        .iter()
        .map(|student| {
            let safe = rain_safe_seats(student, normal);
            let mut seeded = student.clone();
            seeded.clear_assignments();
            carryover::force_assign(&mut seeded, &safe, rain_catalog, diag);
            seeded
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use class_alloc_model::catalog::Class;
    use class_alloc_model::student::{Student, SubmissionTime};

    fn normal_catalog() -> ClassCatalog {
        ClassCatalog::from_classes(vec![
            Class::new("Archery", "Field", 1, true, [1, 1]),
            Class::new("Chess", "Library", 1, false, [2, 2]),
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
    fn test_derived_catalog_closes_cancelled_classes() {
        let rain = derive_rain_catalog(&normal_catalog());
        let archery = rain.get("Archery").expect("still listed");
        assert!(!archery.is_open_in(0));
        assert!(!archery.is_open_in(1));
        assert!(rain.get("Chess").map(|c| c.is_open_in(0)).unwrap_or(false));
    }

    #[test]
    fn test_derived_catalog_clears_all_seats() {
        let mut normal = normal_catalog();
        assert!(normal
            .get_mut("Chess")
            .and_then(|c| c.period_mut(0))
            .map(|p| p.force_add("locked kid"))
            .unwrap_or(false));
        let rain = derive_rain_catalog(&normal);
        assert_eq!(
            rain.get("Chess").and_then(|c| c.period(0)).map(|p| p.seated()),
            Some(0)
        );
    }

    #[test]
    fn test_rain_safe_seats_exclude_cancelled_classes() {
        let mut s = student(&["Archery", "Chess"]);
        s.assign(0, "Archery", true);
        s.assign(1, "Chess", false);
        let safe = rain_safe_seats(&s, &normal_catalog());
        assert_eq!(safe.get(&0), None);
        assert_eq!(safe.get(&1).map(String::as_str), Some("Chess"));
    }

    #[test]
    fn test_locked_seat_in_cancelled_class_does_not_carry() {
        // A locked normal seat in a rain-cancelled class must not survive
        // into the rain snapshot; the period reopens for reassignment.
        let normal = normal_catalog();
        let mut s = student(&[]);
        s.assign(0, "Archery", true);
        let roster: Roster = vec![s].into_iter().collect();

        let mut rain_catalog = derive_rain_catalog(&normal);
        let mut diag = DiagnosticLog::new();
        let seeded = seed_rain_roster(&roster, &normal, &mut rain_catalog, &mut diag);

        let s = seeded.get_by_name("Test Student").expect("student");
        assert!(s.assignment(0).is_none());
        assert_eq!(
            rain_catalog
                .get("Archery")
                .and_then(|c| c.period(0))
                .map(|p| p.seated()),
            Some(0)
        );
    }

    #[test]
    fn test_seeding_relocks_safe_seats_in_rain_catalog() {
        let normal = normal_catalog();
        let mut s = student(&["Chess"]);
        // An unlocked normal seat in an indoor class is preserved and comes
        // back locked.
        s.assign(1, "Chess", false);
        let roster: Roster = vec![s].into_iter().collect();

        let mut rain_catalog = derive_rain_catalog(&normal);
        let mut diag = DiagnosticLog::new();
        let seeded = seed_rain_roster(&roster, &normal, &mut rain_catalog, &mut diag);

        let s = seeded.get_by_name("Test Student").expect("student");
        let a = s.assignment(1).expect("seat preserved");
        assert!(a.is_locked());
        assert_eq!(a.class(), "Chess");
        assert_eq!(
            rain_catalog
                .get("Chess")
                .and_then(|c| c.period(1))
                .map(|p| p.seated()),
            Some(1)
        );
        // The granted class is pruned from the choice list.
        assert!(s.choices().is_empty());
    }

    #[test]
    fn test_seeding_rechecks_capacity() {
        let normal = normal_catalog();
        let make = |first: &str| {
            let mut s = Student::new(
                first,
                "Kid",
                "",
                3,
                SubmissionTime::At(0),
                vec!["Chess".to_string()],
            );
            s.assign(0, "Chess", false);
            s
        };
        let roster: Roster = vec![make("a"), make("b"), make("c")].into_iter().collect();

        let mut rain_catalog = derive_rain_catalog(&normal);
        let mut diag = DiagnosticLog::new();
        let seeded = seed_rain_roster(&roster, &normal, &mut rain_catalog, &mut diag);

        // Chess period 0 holds two; the third carry-over is rejected.
        assert_eq!(
            rain_catalog
                .get("Chess")
                .and_then(|c| c.period(0))
                .map(|p| p.seated()),
            Some(2)
        );
        let carried = seeded.iter().filter(|s| s.assignment(0).is_some()).count();
        assert_eq!(carried, 2);
        assert!(diag.lines().iter().any(|l| l.contains("No capacity left")));
    }
}
