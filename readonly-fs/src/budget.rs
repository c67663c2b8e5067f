//! Per-call output ledger shared by glob, grep and view.
//!
//! Producers ask [`OutputBudget::try_charge`] before committing each unit (a path, a matched
//! line, a line appended to a view). A refused unit is never emitted and the caller marks its
//! result truncated. Budgets are created per call and passed by `&mut`, never shared.

/// Size ledger for one call. Units are UTF-8 bytes of rendered result text.
#[derive(Debug)]
pub struct OutputBudget {
    limit: usize,
    consumed: usize,
    exhausted: bool,
}

impl OutputBudget {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            consumed: 0,
            exhausted: false,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.consumed)
    }

    /// True once a charge has been refused or the limit is fully used.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted || self.consumed >= self.limit
    }

    /// Commits `cost` units and returns `true` if they fit within the limit.
    ///
    /// Otherwise nothing is committed, the budget becomes exhausted and every later charge
    /// is refused as well, so output is always a prefix of what would have been produced.
    pub fn try_charge(&mut self, cost: usize) -> bool {
        if self.is_exhausted() {
            self.exhausted = true;
            return false;
        }
        match self.consumed.checked_add(cost) {
            Some(total) if total <= self.limit => {
                self.consumed = total;
                true
            }
            _ => {
                self.exhausted = true;
                false
            }
        }
    }
}
