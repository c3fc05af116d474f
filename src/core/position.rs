//! Source Positions
//!
//! Row/column coordinates shared by tokens, diagnostics and line elements,
//! plus the [`ShiftRanges`] trait used when lines move after an edit.

/// A zero-based `(row, column)` coordinate.
///
/// `column` counts Unicode scalar values (`char`s) from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// A half-open range (`start..end`). Ranges produced by the parser never
/// span more than one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end, "range start must not follow its end");
        Self { start, end }
    }

    /// Range covering columns `start..end` of a single row.
    pub fn on_row(row: usize, start: usize, end: usize) -> Self {
        Self::new(Position::new(row, start), Position::new(row, end))
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `position` lies inside the range. The end column is included
    /// so a cursor placed right after a token still hits it.
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    pub fn len(&self) -> usize {
        self.end.column.saturating_sub(self.start.column)
    }
}

/// Moves every row embedded in a value by `delta`.
///
/// Implemented for every type that carries a [`Range`], so adding a field to a
/// line element without shifting it is a compile error rather than a stale
/// range after the next edit.
pub trait ShiftRanges {
    fn shift_rows(&mut self, delta: isize);
}

impl ShiftRanges for Position {
    fn shift_rows(&mut self, delta: isize) {
        self.row = self.row.saturating_add_signed(delta);
    }
}

impl ShiftRanges for Range {
    fn shift_rows(&mut self, delta: isize) {
        self.start.shift_rows(delta);
        self.end.shift_rows(delta);
    }
}

impl<T: ShiftRanges> ShiftRanges for Option<T> {
    fn shift_rows(&mut self, delta: isize) {
        if let Some(inner) = self {
            inner.shift_rows(delta);
        }
    }
}

impl<T: ShiftRanges> ShiftRanges for Vec<T> {
    fn shift_rows(&mut self, delta: isize) {
        for item in self.iter_mut() {
            item.shift_rows(delta);
        }
    }
}
