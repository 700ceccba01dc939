//! Monotone progress bookkeeping for one transfer.

/// Display total used while the server has not announced a length.
///
/// Purely a presentation affordance so progress bars have something to
/// divide by; it carries no meaning about the real size.
pub const UNKNOWN_TOTAL_DISPLAY_CEILING: u64 = 10_000_000;

/// Folds transport progress reports into observer-facing values.
///
/// `read` never decreases. Once a real total has been seen it replaces the
/// ceiling and never decreases either.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTracker {
    read: u64,
    total: u64,
    total_known: bool,
}

impl ProgressTracker {
    /// Fresh tracker for a new transfer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            read: 0,
            total: 0,
            total_known: false,
        }
    }

    /// Apply a progress report; returns the resulting `(read, total)`.
    pub fn apply(&mut self, read: u64, total: Option<u64>) -> (u64, u64) {
        self.read = self.read.max(read);
        self.total = match (total, self.total_known) {
            (Some(t), true) => self.total.max(t),
            (Some(t), false) => {
                self.total_known = true;
                t
            }
            (None, true) => self.total,
            (None, false) => UNKNOWN_TOTAL_DISPLAY_CEILING,
        };
        (self.read, self.total)
    }

    /// Bytes read so far.
    #[must_use]
    pub const fn read(&self) -> u64 {
        self.read
    }

    /// Current display total.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }
}
