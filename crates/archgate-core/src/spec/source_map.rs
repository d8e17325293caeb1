//! Byte offset to line/column translation for the spec document.

use std::ops::Range;
use std::path::{Path, PathBuf};

use toml::Spanned;

use crate::types::{Referable, Reference};

/// Maps byte offsets of one document onto 1-based [`Reference`]s.
#[derive(Debug)]
pub struct SourceMap<'a> {
    path: PathBuf,
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> SourceMap<'a> {
    /// Indexes the line starts of `text`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, text: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            path: path.into(),
            text,
            line_starts,
        }
    }

    /// Returns the document path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reference to the first character of the document.
    #[must_use]
    pub fn start(&self) -> Reference {
        Reference::new(self.path.clone(), 1, 1)
    }

    /// Converts a byte offset into a reference. Columns count characters.
    #[must_use]
    pub fn reference(&self, offset: usize) -> Reference {
        let offset = offset.min(self.text.len());
        let index = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let line_start = self.line_starts[index];
        let column = self
            .text
            .get(line_start..offset)
            .map_or(offset - line_start, |s| s.chars().count())
            + 1;
        Reference::new(self.path.clone(), index + 1, column)
    }

    /// Reference of the start of `span`.
    #[must_use]
    pub fn span_reference(&self, span: &Range<usize>) -> Reference {
        self.reference(span.start)
    }

    /// Unwraps a spanned value into a [`Referable`].
    #[must_use]
    pub fn referable<T>(&self, spanned: Spanned<T>) -> Referable<T> {
        let reference = self.span_reference(&spanned.span());
        Referable::new(spanned.into_inner(), reference)
    }

    /// Unwraps an optional spanned value, falling back to `default` at the
    /// document start.
    #[must_use]
    pub fn referable_or<T>(&self, spanned: Option<Spanned<T>>, default: T) -> Referable<T> {
        spanned.map_or_else(
            || Referable::new(default, self.start()),
            |s| self.referable(s),
        )
    }

    /// Unwraps a list of spanned values.
    #[must_use]
    pub fn referables<T>(&self, spanned: Vec<Spanned<T>>) -> Vec<Referable<T>> {
        spanned.into_iter().map(|s| self.referable(s)).collect()
    }
}
