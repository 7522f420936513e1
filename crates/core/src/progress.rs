//! Pure completion metrics over the section/item tree.

use crate::model::{Checklist, Section};

/// Aggregated completion view of a checklist, useful for display and for the
/// completion banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Total number of items across all sections.
    pub total: usize,
    /// Number of items whose completed flag is set.
    pub completed: usize,
    /// Integer percentage, `round(100 * completed / total)`, 0 when empty.
    pub percent: u8,
    /// True only when percent is 100 and at least one item exists; an empty
    /// checklist must never read as complete.
    pub is_complete: bool,
}

impl Progress {
    /// Builds metrics from raw counts.
    #[must_use]
    pub fn from_counts(completed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            // Integer round-half-up; counts stay far below u64 range.
            let completed = completed as u64;
            let total = total as u64;
            u8::try_from((completed * 200 + total) / (total * 2)).unwrap_or(100)
        };

        Self {
            total,
            completed,
            percent,
            is_complete: total > 0 && percent == 100,
        }
    }

    /// Aggregates over every section of a checklist.
    #[must_use]
    pub fn of_checklist(checklist: &Checklist) -> Self {
        let total = checklist.sections().iter().map(Section::item_count).sum();
        let completed = checklist
            .sections()
            .iter()
            .map(Section::completed_count)
            .sum();
        Self::from_counts(completed, total)
    }

    /// Aggregates over a single section, as if it were a one-section
    /// checklist.
    #[must_use]
    pub fn of_section(section: &Section) -> Self {
        Self::from_counts(section.completed_count(), section.item_count())
    }

    /// Items still left to tick.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }
}
