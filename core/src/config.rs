use crate::PointerOrder;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Quiet period before a title or search keystroke turns into a lookup.
    pub debounce: Duration,
    pub pointer_order: PointerOrder,
}

impl Default for Config {
    fn default() -> Self {
        Self { debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS), pointer_order: PointerOrder::Stored }
    }
}
