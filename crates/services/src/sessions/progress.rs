/// Aggregated view of session progress, useful for UI.
///
/// Progress counts cards that were shown, answered or skipped alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub seen: usize,
    pub total: usize,
    pub remaining: usize,
    pub is_active: bool,
    pub is_complete: bool,
}

impl SessionProgress {
    #[must_use]
    pub(crate) fn new(seen: usize, total: usize, is_active: bool) -> Self {
        Self {
            seen,
            total,
            remaining: total.saturating_sub(seen),
            is_active,
            is_complete: seen >= total,
        }
    }
}
