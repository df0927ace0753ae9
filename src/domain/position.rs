//! Position state of the single-instrument simulator.

use chrono::NaiveDateTime;

/// A filled long entry awaiting an exit.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub entry_index: usize,
}

impl OpenPosition {
    /// Adverse move from entry to `price` as a fraction of the entry price.
    /// Positive when the price is below entry.
    pub fn adverse_move(&self, price: f64) -> f64 {
        (self.entry_price - price) / self.entry_price
    }

    /// `(entry - price) / entry >= ratio`. Favourable moves never trigger.
    pub fn stop_loss_triggered(&self, price: f64, stop_loss_ratio: f64) -> bool {
        self.adverse_move(price) >= stop_loss_ratio
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long(OpenPosition),
}
