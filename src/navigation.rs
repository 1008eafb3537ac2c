/// Result of moving the cursor forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(usize),
    /// Already on the last card (or nothing to show)
    Terminal,
}

/// Index of the current card within the active set.
///
/// Always in `[0, max(0, len - 1)]` for the length it was last clamped to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
}

impl Cursor {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    pub fn clamp(&mut self, len: usize) {
        self.index = self.index.min(len.saturating_sub(1));
    }

    pub fn advance(&mut self, len: usize) -> Advance {
        if self.index + 1 >= len {
            return Advance::Terminal;
        }
        self.index += 1;
        Advance::Moved(self.index)
    }

    pub fn retreat(&mut self) {
        if self.index > 0 {
            self.index -= 1;
        }
    }
}
