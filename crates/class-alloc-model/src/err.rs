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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmptyCatalogError;

impl std::fmt::Display for EmptyCatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "The class catalog is empty.")
    }
}

impl std::error::Error for EmptyCatalogError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeriodCountMismatchError {
    class: String,
    expected: usize,
    found: usize,
}

impl PeriodCountMismatchError {
    pub fn new(class: String, expected: usize, found: usize) -> Self {
        Self {
            class,
            expected,
            found,
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn found(&self) -> usize {
        self.found
    }
}

impl std::fmt::Display for PeriodCountMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Class {} declares {} periods, expected {}",
            self.class, self.found, self.expected
        )
    }
}

impl std::error::Error for PeriodCountMismatchError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogError {
    Empty(EmptyCatalogError),
    PeriodCountMismatch(PeriodCountMismatchError),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Empty(e) => write!(f, "{}", e),
            CatalogError::PeriodCountMismatch(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<EmptyCatalogError> for CatalogError {
    fn from(err: EmptyCatalogError) -> Self {
        CatalogError::Empty(err)
    }
}

impl From<PeriodCountMismatchError> for CatalogError {
    fn from(err: PeriodCountMismatchError) -> Self {
        CatalogError::PeriodCountMismatch(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvalidGradeError {
    line: usize,
    value: String,
}

impl InvalidGradeError {
    pub fn new(line: usize, value: impl Into<String>) -> Self {
        Self {
            line,
            value: value.into(),
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for InvalidGradeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unparseable grade {:?} on student record at line {}",
            self.value, self.line
        )
    }
}

impl std::error::Error for InvalidGradeError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RosterError {
    InvalidGrade(InvalidGradeError),
}

impl std::fmt::Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterError::InvalidGrade(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RosterError {}

impl From<InvalidGradeError> for RosterError {
    fn from(err: InvalidGradeError) -> Self {
        RosterError::InvalidGrade(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MissingHeaderError {
    column: String,
}

impl MissingHeaderError {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl std::fmt::Display for MissingHeaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Required column {:?} is missing from the header", self.column)
    }
}

impl std::error::Error for MissingHeaderError {}

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingHeader(MissingHeaderError),
    Catalog(CatalogError),
    Roster(RosterError),
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for LoadError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<MissingHeaderError> for LoadError {
    fn from(e: MissingHeaderError) -> Self {
        Self::MissingHeader(e)
    }
}

impl From<CatalogError> for LoadError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

impl From<RosterError> for LoadError {
    fn from(e: RosterError) -> Self {
        Self::Roster(e)
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use LoadError::*;
        match self {
            Io(e) => write!(f, "I/O error: {e}"),
            Csv(e) => write!(f, "CSV error: {e}"),
            MissingHeader(e) => write!(f, "header error: {e}"),
            Catalog(e) => write!(f, "catalog error: {e}"),
            Roster(e) => write!(f, "roster error: {e}"),
        }
    }
}

impl std::error::Error for LoadError {}
