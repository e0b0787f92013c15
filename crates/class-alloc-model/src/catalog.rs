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

use crate::err::{CatalogError, EmptyCatalogError, PeriodCountMismatchError};
use std::collections::BTreeMap;

/// One seated (student, locked) record inside a period.
///
/// A locked seat survives the per-attempt reset; an unlocked seat is won by
/// the allocator (or the hole filler) and is cleared before the next attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    student: String,
    locked: bool,
}

impl Seat {
    #[inline]
    pub fn new(student: impl Into<String>, locked: bool) -> Self {
        Self {
            student: student.into(),
            locked,
        }
    }

    #[inline]
    pub fn student(&self) -> &str {
        &self.student
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

/// One timetabled session slot of a class. Capacity 0 means the class is not
/// offered in that period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    capacity: usize,
    seats: Vec<Seat>,
}

impl Period {
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seats: Vec::new(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn seated(&self) -> usize {
        self.seats.len()
    }

    #[inline]
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    #[inline]
    pub fn is_offered(&self) -> bool {
        self.capacity > 0
    }

    #[inline]
    pub fn has_space(&self) -> bool {
        self.seats.len() < self.capacity
    }

    /// Seats a student without locking. Fails when the period is full or not
    /// offered.
    #[inline]
    pub fn add(&mut self, student: &str) -> bool {
        if self.has_space() {
            self.seats.push(Seat::new(student, false));
            true
        } else {
            false
        }
    }

    /// Seats a student and locks the seat. Capacity is still checked: a
    /// forced seat never overbooks a period.
    #[inline]
    pub fn force_add(&mut self, student: &str) -> bool {
        if self.has_space() {
            self.seats.push(Seat::new(student, true));
            true
        } else {
            false
        }
    }

    /// Removes every unlocked seat; locked seats stay.
    #[inline]
    pub fn clear_unlocked(&mut self) {
        self.seats.retain(|s| s.locked);
    }

    #[inline]
    pub fn clear(&mut self) {
        self.seats.clear();
    }

    /// Marks the period as not offered and drops its seats.
    #[inline]
    pub fn close(&mut self) {
        self.capacity = 0;
        self.seats.clear();
    }
}

/// A class with its per-period capacities and seated students.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    name: String,
    location: String,
    min_grade: i32,
    cancelled_when_raining: bool,
    periods: Vec<Period>,
}

impl Class {
    #[inline]
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        min_grade: i32,
        cancelled_when_raining: bool,
        capacities: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            min_grade,
            cancelled_when_raining,
            periods: capacities.into_iter().map(Period::new).collect(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[inline]
    pub fn min_grade(&self) -> i32 {
        self.min_grade
    }

    #[inline]
    pub fn is_cancelled_when_raining(&self) -> bool {
        self.cancelled_when_raining
    }

    #[inline]
    pub fn num_periods(&self) -> usize {
        self.periods.len()
    }

    #[inline]
    pub fn period(&self, index: usize) -> Option<&Period> {
        self.periods.get(index)
    }

    #[inline]
    pub fn period_mut(&mut self, index: usize) -> Option<&mut Period> {
        self.periods.get_mut(index)
    }

    #[inline]
    pub fn iter_periods(&self) -> impl Iterator<Item = &Period> {
        self.periods.iter()
    }

    /// Offered in that period and with at least one free seat.
    #[inline]
    pub fn is_open_in(&self, index: usize) -> bool {
        self.periods
            .get(index)
            .map(|p| p.is_offered() && p.has_space())
            .unwrap_or(false)
    }

    /// Seats the student in the first of the given periods with spare
    /// capacity and returns its index.
    pub fn seat_first_free(
        &mut self,
        student: &str,
        periods: impl IntoIterator<Item = usize>,
    ) -> Option<usize> {
        for index in periods {
            if let Some(period) = self.periods.get_mut(index) {
                if period.add(student) {
                    return Some(index);
                }
            }
        }
        None
    }

    #[inline]
    pub fn clear_unlocked_seats(&mut self) {
        for p in &mut self.periods {
            p.clear_unlocked();
        }
    }

    #[inline]
    pub fn clear_all_seats(&mut self) {
        for p in &mut self.periods {
            p.clear();
        }
    }

    /// Marks every period of the class as not offered.
    #[inline]
    pub fn close_all_periods(&mut self) {
        for p in &mut self.periods {
            p.close();
        }
    }

    #[inline]
    pub fn seated_counts(&self) -> Vec<usize> {
        self.periods.iter().map(|p| p.seated()).collect()
    }
}

/// Name-keyed, ordered container of classes.
///
/// The ordering (`BTreeMap`) matters: every place the engine iterates the
/// catalog has to be deterministic for a fixed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCatalog {
    classes: BTreeMap<String, Class>,
    num_periods: usize,
}

impl ClassCatalog {
    /// Builds a catalog, validating that every class declares the same
    /// period count. An empty catalog is rejected.
    pub fn from_classes(classes: impl IntoIterator<Item = Class>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        let mut num_periods: Option<usize> = None;
        for class in classes {
            match num_periods {
                None => num_periods = Some(class.num_periods()),
                Some(expected) if expected != class.num_periods() => {
                    return Err(CatalogError::from(PeriodCountMismatchError::new(
                        class.name().to_string(),
                        expected,
                        class.num_periods(),
                    )));
                }
                Some(_) => {}
            }
            map.insert(class.name().to_string(), class);
        }
        match num_periods {
            None => Err(CatalogError::from(EmptyCatalogError)),
            Some(num_periods) => Ok(Self {
                classes: map,
                num_periods,
            }),
        }
    }

    #[inline]
    pub fn num_periods(&self) -> usize {
        self.num_periods
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Class> {
        self.classes.get(name)
    }

    #[inline]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Class> {
        self.classes.get_mut(name)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Class> {
        self.classes.values()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Class> {
        self.classes.values_mut()
    }

    /// Names of classes with a free seat in the given period, in name order.
    #[inline]
    pub fn open_classes_in(&self, period: usize) -> impl Iterator<Item = &str> {
        self.classes
            .values()
            .filter(move |c| c.is_open_in(period))
            .map(|c| c.name())
    }

    #[inline]
    pub fn clear_unlocked_seats(&mut self) {
        for class in self.classes.values_mut() {
            class.clear_unlocked_seats();
        }
    }

    #[inline]
    pub fn clear_all_seats(&mut self) {
        for class in self.classes.values_mut() {
            class.clear_all_seats();
        }
    }
}
