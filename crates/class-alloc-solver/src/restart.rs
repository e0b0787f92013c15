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

use crate::allocator;
use crate::diag::DiagnosticLog;
use crate::rebalance;
use class_alloc_model::catalog::ClassCatalog;
use class_alloc_model::student::Roster;

/// Attempt budget of the hill-climbing loop. Fixed, not convergence-based.
pub const DEFAULT_ATTEMPTS: usize = 100;

/// The best roster/catalog pair found by the restart loop.
#[derive(Debug, Clone)]
pub struct RunSnapshot {
    roster: Roster,
    catalog: ClassCatalog,
    missing: usize,
}

impl RunSnapshot {
    #[inline]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[inline]
    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    /// Students without a complete schedule in this snapshot.
    #[inline]
    pub fn missing(&self) -> usize {
        self.missing
    }

    #[inline]
    pub fn into_parts(self) -> (Roster, ClassCatalog, usize) {
        (self.roster, self.catalog, self.missing)
    }
}

/// Runs the allocator `attempts` times over deep copies, keeping the best
/// result.
///
/// Every attempt starts from a fresh copy of `base_catalog` (locked seats
/// retained, unlocked cleared) and a reset of the persistent working roster.
/// An attempt that strictly lowers the missing count becomes the new best;
/// on ties the earlier attempt wins. Between attempts the rebalancer
/// reorders the choices of still-unserved students; that reordering is the
/// only state carried from one attempt to the next.
pub fn run_restarts(
    base_roster: &Roster,
    base_catalog: &ClassCatalog,
    attempts: usize,
    diag: &mut DiagnosticLog,
) -> RunSnapshot {
    let num_periods = base_catalog.num_periods();
    let mut working = base_roster.clone();
    let mut best: Option<RunSnapshot> = None;

    for attempt in 0..attempts.max(1) {
        let mut catalog = base_catalog.clone();
        catalog.clear_unlocked_seats();
        for student in working.iter_mut() {
            student.reset();
        }

        allocator::run_pass(&mut working, &mut catalog, diag);

        let missing = working.count_missing(num_periods);
        if best.as_ref().map(|b| missing < b.missing).unwrap_or(true) {
            tracing::debug!(attempt, missing, "new best attempt");
            best = Some(RunSnapshot {
                roster: working.clone(),
                catalog: catalog.clone(),
                missing,
            });
        }

        rebalance::rebalance_choices(&mut working, base_catalog);
    }

    // attempts.max(1) guarantees at least one snapshot.
    match best {
        Some(best) => best,
        None => RunSnapshot {
            roster: base_roster.clone(),
            catalog: base_catalog.clone(),
            missing: base_roster.count_missing(num_periods),
        },
    }
}
