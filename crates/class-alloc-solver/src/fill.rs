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
use rand::seq::SliceRandom;
use rand::Rng;

/// Best-effort random fallback for permanently unplaced students.
///
/// Runs once after the restart loop. Every hole of a still-missing student
/// is offered a uniformly random class with spare capacity in that period,
/// excluding classes the student already holds. The seat is added unlocked,
/// indistinguishable from a normally won one. Dead ends are logged, never
/// errors. The random source is injected so callers can pin it.
pub fn fill_holes<R: Rng>(
    roster: &mut Roster,
    catalog: &mut ClassCatalog,
    rng: &mut R,
    diag: &mut DiagnosticLog,
) {
    let num_periods = catalog.num_periods();
    for student in roster
        .iter_mut()
        .filter(|s| s.is_missing_assignments(num_periods))
    {
        let name = student.name();
        for period in student.allowed_periods(num_periods) {
            if student.assignment(period).is_some() {
                continue;
            }
            let candidates: Vec<String> = catalog
                .open_classes_in(period)
                .filter(|c| !student.holds(c))
                .map(str::to_string)
                .collect();
            let Some(pick) = candidates.choose(rng) else {
                diag.warn(format!(
                    "Out of classes for period {} for {name}",
                    period + 1
                ));
                continue;
            };
            let seated = catalog
                .get_mut(pick)
                .and_then(|c| c.period_mut(period))
                .map(|p| p.add(&name))
                .unwrap_or(false);
            if seated {
                diag.note(format!("Randomly adding {name} to class {pick}"));
                student.assign(period, pick.clone(), false);
            } else {
                diag.warn(format!("Tried to add {name} to {pick} but it's full?"));
            }
        }
    }
}
