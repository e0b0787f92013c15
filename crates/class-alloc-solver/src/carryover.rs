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
use class_alloc_model::loader::PeriodMap;
use class_alloc_model::student::Student;

/// Forces pre-existing seats onto a student before any heuristic allocation.
///
/// For each period in the student's allowed range with a prior class name:
/// resolve the class, force-add with the capacity check intact, and on
/// success record a locked assignment. Unresolvable classes and full periods
/// are logged and skipped. Afterwards the granted class names are pruned
/// from the student's choice list so the allocator never re-offers a seat
/// the student already holds.
pub fn force_assign(
    student: &mut Student,
    periods: &PeriodMap,
    catalog: &mut ClassCatalog,
    diag: &mut DiagnosticLog,
) {
    let name = student.name();
    for period in student.allowed_periods(catalog.num_periods()) {
        let Some(class_name) = periods.get(&period) else {
            continue;
        };
        if class_name.trim().is_empty() || student.assignment(period).is_some() {
            continue;
        }
        match catalog.get_mut(class_name) {
            None => diag.warn(format!("Could not find class: {class_name} for {name}")),
            Some(class) => {
                let seated = class
                    .period_mut(period)
                    .map(|p| p.force_add(&name))
                    .unwrap_or(false);
                if seated {
                    student.assign(period, class_name.clone(), true);
                } else {
                    diag.warn(format!(
                        "No capacity left in {class_name} period {} for {name}",
                        period + 1
                    ));
                }
            }
        }
    }
    student.remove_choices_already_assigned();
}
