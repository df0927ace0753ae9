//! Price data access port trait.

use crate::domain::bar::Bar;
use crate::domain::error::GorkError;

pub trait DataPort {
    /// Every bar of the source, sorted ascending by timestamp.
    fn load_bars(&self) -> Result<Vec<Bar>, GorkError>;

    /// Human-readable origin of the data, used in messages.
    fn describe(&self) -> String;
}
