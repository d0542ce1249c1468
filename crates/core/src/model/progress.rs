use serde::Serialize;

/// Solved/total counts for a list, with a rounded percentage.
///
/// Always derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Progress {
    solved: u32,
    total: u32,
    percentage: u8,
}

impl Progress {
    /// Builds progress from counts. `solved` is clamped to `total`; an empty
    /// total yields 0%.
    #[must_use]
    pub fn from_counts(solved: u32, total: u32) -> Self {
        let solved = solved.min(total);
        let percentage = if total == 0 {
            0
        } else {
            // round half up: (200s + t) / 2t == round(100s / t)
            let (s, t) = (u64::from(solved), u64::from(total));
            u8::try_from((200 * s + t) / (2 * t)).unwrap_or(100)
        };
        Self {
            solved,
            total,
            percentage,
        }
    }

    #[must_use]
    pub fn solved(&self) -> u32 {
        self.solved
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.solved == self.total
    }
}
