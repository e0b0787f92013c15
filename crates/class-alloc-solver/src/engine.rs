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
use crate::fill;
use crate::rain;
use crate::restart::{self, DEFAULT_ATTEMPTS};
use class_alloc_model::catalog::ClassCatalog;
use class_alloc_model::loader::ExistingSchedule;
use class_alloc_model::report::{self, AssignmentRow, ClassSizeRow};
use class_alloc_model::student::Roster;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Engine knobs. `seed` feeds the hole filler's RNG, so a fixed seed makes
/// whole runs reproducible.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub attempts: usize,
    pub fill_holes: bool,
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            fill_holes: false,
            seed: 0,
        }
    }
}

/// Everything a caller gets back from one engine run.
#[derive(Debug, Clone)]
pub struct ScheduleOutcome {
    assignments: Vec<AssignmentRow>,
    class_sizes: Vec<ClassSizeRow>,
    rain_assignments: Vec<AssignmentRow>,
    rain_class_sizes: Vec<ClassSizeRow>,
    missing: usize,
    num_periods: usize,
    rain_num_periods: usize,
    log: String,
}

impl ScheduleOutcome {
    #[inline]
    pub fn assignments(&self) -> &[AssignmentRow] {
        &self.assignments
    }

    #[inline]
    pub fn class_sizes(&self) -> &[ClassSizeRow] {
        &self.class_sizes
    }

    #[inline]
    pub fn rain_assignments(&self) -> &[AssignmentRow] {
        &self.rain_assignments
    }

    #[inline]
    pub fn rain_class_sizes(&self) -> &[ClassSizeRow] {
        &self.rain_class_sizes
    }

    /// Students without a complete normal schedule, counted before any hole
    /// filling.
    #[inline]
    pub fn missing(&self) -> usize {
        self.missing
    }

    #[inline]
    pub fn log(&self) -> &str {
        &self.log
    }

    pub fn assignments_csv(&self) -> String {
        report::render_assignments_csv(&self.assignments, self.num_periods)
    }

    pub fn class_sizes_csv(&self) -> String {
        report::render_class_sizes_csv(&self.class_sizes, self.num_periods)
    }

    pub fn rain_assignments_csv(&self) -> String {
        report::render_assignments_csv(&self.rain_assignments, self.rain_num_periods)
    }

    pub fn rain_class_sizes_csv(&self) -> String {
        report::render_class_sizes_csv(&self.rain_class_sizes, self.rain_num_periods)
    }
}

/// Top-level allocation engine.
///
/// Runs the normal pipeline (carry-over, restart loop, optional hole
/// filler) and then the rain pipeline as a second, explicitly parameterized
/// invocation seeded with the rain-safe seats of the best normal run, or
/// with the supplied rain catalog/schedule when one is given.
#[derive(Debug, Clone)]
pub struct SchedulingEngine {
    catalog: ClassCatalog,
    roster: Roster,
    rain_catalog: Option<ClassCatalog>,
    existing: Option<ExistingSchedule>,
    existing_rain: Option<ExistingSchedule>,
    config: EngineConfig,
}

impl SchedulingEngine {
    #[inline]
    pub fn new(catalog: ClassCatalog, roster: Roster) -> Self {
        Self {
            catalog,
            roster,
            rain_catalog: None,
            existing: None,
            existing_rain: None,
            config: EngineConfig::default(),
        }
    }

    /// Explicit rain-day catalog; derived from the normal one when absent.
    #[inline]
    pub fn with_rain_catalog(mut self, catalog: ClassCatalog) -> Self {
        self.rain_catalog = Some(catalog);
        self
    }

    /// Pre-existing normal schedule, force-seated before allocation.
    #[inline]
    pub fn with_existing_schedule(mut self, schedule: ExistingSchedule) -> Self {
        self.existing = Some(schedule);
        self
    }

    /// Pre-existing rain schedule; when present the rain run starts from
    /// the pristine roster plus these seats instead of the normal result.
    #[inline]
    pub fn with_existing_rain_schedule(mut self, schedule: ExistingSchedule) -> Self {
        self.existing_rain = Some(schedule);
        self
    }

    #[inline]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Carries ingestion warnings into the run's diagnostic report.
    pub fn solve_with_warnings(self, warnings: Vec<String>) -> ScheduleOutcome {
        let mut diag = DiagnosticLog::new();
        diag.extend_warnings(warnings);
        self.solve_into(diag)
    }

    pub fn solve(self) -> ScheduleOutcome {
        self.solve_into(DiagnosticLog::new())
    }

    fn solve_into(self, mut diag: DiagnosticLog) -> ScheduleOutcome {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        // Normal run.
        diag.note("Running Normal Schedule");
        let mut normal_catalog = self.catalog.clone();
        let mut normal_roster = self.roster.clone();
        if let Some(existing) = &self.existing {
            for student in normal_roster.iter_mut() {
                if let Some(periods) = existing.get(&student.name()) {
                    carryover::force_assign(student, periods, &mut normal_catalog, &mut diag);
                }
            }
        }

        let best = restart::run_restarts(
            &normal_roster,
            &normal_catalog,
            self.config.attempts,
            &mut diag,
        );
        let (mut best_roster, mut best_catalog, missing) = best.into_parts();
        diag.note(format!(
            "{missing} students don't have full schedules{}",
            if self.config.fill_holes {
                ", have assigned random classes."
            } else {
                "."
            }
        ));
        if self.config.fill_holes {
            fill::fill_holes(&mut best_roster, &mut best_catalog, &mut rng, &mut diag);
        }

        let assignments = report::assignment_rows(&best_roster, &best_catalog);
        let class_sizes = report::class_size_rows(&best_catalog);

        // Rain run: independent pipeline with a different locked-seat seed.
        diag.note("Running Rain Schedule");
        let mut rain_catalog = match &self.rain_catalog {
            Some(catalog) => catalog.clone(),
            None => rain::derive_rain_catalog(&self.catalog),
        };
        let rain_roster = match &self.existing_rain {
            Some(schedule) => {
                let mut roster = self.roster.clone();
                for student in roster.iter_mut() {
                    if let Some(periods) = schedule.get(&student.name()) {
                        carryover::force_assign(student, periods, &mut rain_catalog, &mut diag);
                    }
                }
                roster
            }
            None => rain::seed_rain_roster(&best_roster, &self.catalog, &mut rain_catalog, &mut diag),
        };

        let rain_best = restart::run_restarts(
            &rain_roster,
            &rain_catalog,
            self.config.attempts,
            &mut diag,
        );
        let (mut rain_roster, mut rain_catalog, rain_missing) = rain_best.into_parts();
        diag.note(format!(
            "{rain_missing} students don't have full rain schedules."
        ));
        if self.config.fill_holes {
            fill::fill_holes(&mut rain_roster, &mut rain_catalog, &mut rng, &mut diag);
        }

        ScheduleOutcome {
            num_periods: best_catalog.num_periods(),
            rain_num_periods: rain_catalog.num_periods(),
            assignments,
            class_sizes,
            rain_assignments: report::assignment_rows(&rain_roster, &rain_catalog),
            rain_class_sizes: report::class_size_rows(&rain_catalog),
            missing,
            log: diag.into_report(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use class_alloc_model::catalog::Class;
    use class_alloc_model::loader::PeriodMap;
    use class_alloc_model::student::{Student, SubmissionTime};

    fn catalog() -> ClassCatalog {
        ClassCatalog::from_classes(vec![
            Class::new("Archery", "Field", 1, true, [2, 2]),
            Class::new("Chess", "Library", 1, false, [2, 2]),
            Class::new("Knots", "Hall", 1, false, [2, 2]),
        ])
        .expect("valid catalog")
    }

    fn student(first: &str, grade: i32, time: i64, choices: &[&str]) -> Student {
        Student::new(
            first,
            "Kid",
            "",
            grade,
            SubmissionTime::At(time),
            choices.iter().map(|c| c.to_string()),
        )
    }

    fn roster() -> Roster {
        vec![
            student("a", 5, 0, &["Archery", "Chess", "Knots"]),
            student("b", 4, 1, &["Archery", "Knots", "Chess"]),
            student("c", 3, 2, &["Chess", "Archery", "Knots"]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_solve_produces_complete_outcome() {
        let outcome = SchedulingEngine::new(catalog(), roster())
            .with_config(EngineConfig {
                attempts: 10,
                ..EngineConfig::default()
            })
            .solve();

        assert_eq!(outcome.missing(), 0);
        assert_eq!(outcome.assignments().len(), 3);
        assert_eq!(outcome.class_sizes().len(), 3);
        assert_eq!(outcome.rain_assignments().len(), 3);
        assert_eq!(outcome.rain_class_sizes().len(), 3);
        assert!(outcome.log().contains("Running Normal Schedule"));
        assert!(outcome.log().contains("Running Rain Schedule"));

        // Every student received both periods.
        for row in outcome.assignments() {
            assert_eq!(row.num_classes, 2);
        }
    }

    #[test]
    fn test_rain_run_never_uses_cancelled_classes() {
        let outcome = SchedulingEngine::new(catalog(), roster())
            .with_config(EngineConfig {
                attempts: 10,
                ..EngineConfig::default()
            })
            .solve();

        for row in outcome.rain_assignments() {
            for cell in &row.periods {
                assert_ne!(cell.class, "Archery");
            }
        }
        let archery = outcome
            .rain_class_sizes()
            .iter()
            .find(|r| r.name == "Archery")
            .expect("cancelled class still reported");
        assert!(archery.seated.iter().all(|&n| n == 0));
    }

    #[test]
    fn test_existing_schedule_is_carried_and_locked() {
        let mut existing = ExistingSchedule::new();
        let periods: PeriodMap = [(0, "Knots".to_string())].into_iter().collect();
        existing.insert("c Kid", periods);

        let outcome = SchedulingEngine::new(catalog(), roster())
            .with_existing_schedule(existing)
            .with_config(EngineConfig {
                attempts: 5,
                ..EngineConfig::default()
            })
            .solve();

        let c_row = outcome
            .assignments()
            .iter()
            .find(|r| r.first_name == "c")
            .expect("student c present");
        assert_eq!(c_row.periods[0].class, "Knots");
    }

    #[test]
    fn test_fill_holes_completes_choice_poor_students() {
        // One declared choice, two periods: only the hole filler can close
        // the second period.
        let roster: Roster = vec![student("solo", 3, 0, &["Chess"])].into_iter().collect();
        let outcome = SchedulingEngine::new(catalog(), roster)
            .with_config(EngineConfig {
                attempts: 3,
                fill_holes: true,
                seed: 1,
            })
            .solve();

        // The missing count reports the pre-fill state.
        assert_eq!(outcome.missing(), 1);
        let row = &outcome.assignments()[0];
        assert_eq!(row.num_classes, 2);
        assert!(outcome.log().contains("Randomly adding"));
    }

    #[test]
    fn test_identical_inputs_and_seed_are_bit_identical() {
        let run = || {
            SchedulingEngine::new(catalog(), roster())
                .with_config(EngineConfig {
                    attempts: 10,
                    fill_holes: true,
                    seed: 99,
                })
                .solve()
        };
        let a = run();
        let b = run();
        assert_eq!(a.assignments_csv(), b.assignments_csv());
        assert_eq!(a.class_sizes_csv(), b.class_sizes_csv());
        assert_eq!(a.rain_assignments_csv(), b.rain_assignments_csv());
        assert_eq!(a.rain_class_sizes_csv(), b.rain_class_sizes_csv());
        assert_eq!(a.log(), b.log());
    }

    #[test]
    fn test_explicit_rain_schedule_starts_from_pristine_roster() {
        let mut rain_existing = ExistingSchedule::new();
        let periods: PeriodMap = [(1, "Knots".to_string())].into_iter().collect();
        rain_existing.insert("a Kid", periods);

        let outcome = SchedulingEngine::new(catalog(), roster())
            .with_existing_rain_schedule(rain_existing)
            .with_config(EngineConfig {
                attempts: 5,
                ..EngineConfig::default()
            })
            .solve();

        let a_row = outcome
            .rain_assignments()
            .iter()
            .find(|r| r.first_name == "a")
            .expect("student a present");
        assert_eq!(a_row.periods[1].class, "Knots");
    }

    #[test]
    fn test_outcome_csv_round_matches_row_count() {
        let outcome = SchedulingEngine::new(catalog(), roster())
            .with_config(EngineConfig {
                attempts: 2,
                ..EngineConfig::default()
            })
            .solve();
        // Header plus one line per row.
        assert_eq!(
            outcome.assignments_csv().lines().count(),
            outcome.assignments().len() + 1
        );
        assert_eq!(
            outcome.class_sizes_csv().lines().count(),
            outcome.class_sizes().len() + 1
        );
    }
}
