/// Per-session answer counters. Reset only when a new session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub correct: u32,
    pub incorrect: u32,
    pub skipped: u32,
}

impl SessionStats {
    /// Cards that received an answer (correct or incorrect).
    #[must_use]
    pub fn answered(&self) -> u32 {
        self.correct.saturating_add(self.incorrect)
    }

    fn bump(counter: &mut u32) {
        *counter = counter.saturating_add(1);
    }

    pub fn record_correct(&mut self) {
        Self::bump(&mut self.correct);
    }

    pub fn record_incorrect(&mut self) {
        Self::bump(&mut self.incorrect);
    }

    pub fn record_skip(&mut self) {
        Self::bump(&mut self.skipped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let mut stats = SessionStats::default();
        stats.record_correct();
        stats.record_correct();
        stats.record_incorrect();
        stats.record_skip();

        assert_eq!(
            stats,
            SessionStats {
                correct: 2,
                incorrect: 1,
                skipped: 1
            }
        );
        assert_eq!(stats.answered(), 3);
    }
}
