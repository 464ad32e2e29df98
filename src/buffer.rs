//! Mutable working buffer consumed destructively by the parser
//!
//! Positions are byte offsets. The parser only searches for ASCII characters,
//! so every position it obtains from this type lies on a char boundary.

/// Owned, mutable copy of the text being parsed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkBuffer {
    text: String,
}

impl WorkBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Position of the first occurrence of `ch`
    pub fn find_first(&self, ch: char) -> Option<usize> {
        self.text.find(ch)
    }

    /// Position of the last occurrence of `ch`
    pub fn find_last(&self, ch: char) -> Option<usize> {
        self.text.rfind(ch)
    }

    /// Position of the first occurrence of `ch` at or after `start`
    pub fn find_from(&self, ch: char, start: usize) -> Option<usize> {
        self.text
            .get(start..)
            .and_then(|rest| rest.find(ch))
            .map(|pos| start + pos)
    }

    /// Borrow the half-open range `[start, end)`
    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        if start > end {
            return None;
        }
        self.text.get(start..end)
    }

    /// Remove the half-open range `[start, end)` and return the removed text.
    ///
    /// Returns `None` and leaves the buffer untouched when the range is out
    /// of bounds or splits a character.
    pub fn erase_range(&mut self, start: usize, end: usize) -> Option<String> {
        self.slice(start, end)?;
        Some(self.text.drain(start..end).collect())
    }

    /// Drop leading whitespace, returning how many bytes were removed
    pub fn skip_whitespace(&mut self) -> usize {
        let skipped = self.text.len() - self.text.trim_start().len();
        self.text.drain(..skipped);
        skipped
    }
}
