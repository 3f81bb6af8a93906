//! Branch label allocation.

use super::Label;

/// Hands out labels in increasing order.
///
/// One allocator serves a whole compilation unit, so labels never repeat
/// across methods.
#[derive(Debug, Default)]
pub struct LabelAllocator {
    next: u32,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh label.
    pub fn next_label(&mut self) -> Label {
        let label = Label::new(self.next);
        self.next += 1;
        label
    }

    /// Number of labels allocated so far.
    pub fn allocated(&self) -> u32 {
        self.next
    }
}
