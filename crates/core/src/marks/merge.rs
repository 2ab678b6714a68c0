//! Combine several marks of the same kind into one

use super::Mark;
use crate::error::{Error, Result};

impl Mark {
    /// Combine with a later mark: positional arguments are appended, keywords of `later` win.
    pub fn combined_with(&self, later: &Mark) -> Result<Mark> {
        if self.name != later.name {
            return Err(Error::InvalidAnnotation(format!(
                "cannot merge a '{}' mark with a '{}' mark",
                self.name, later.name
            )));
        }

        let mut merged = self.clone();
        merged.args.extend(later.args.iter().cloned());
        merged
            .kwargs
            .extend(later.kwargs.iter().map(|(key, value)| (key.clone(), value.clone())));
        Ok(merged)
    }
}

/// Merge marks in declaration order into a single mark
pub fn merge_marks(marks: &[Mark]) -> Result<Mark> {
    let (first, rest) = marks
        .split_first()
        .ok_or_else(|| Error::InvalidAnnotation("no marks to merge".to_string()))?;

    rest.iter()
        .try_fold(first.clone(), |merged, mark| merged.combined_with(mark))
}
