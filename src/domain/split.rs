//! Chronological train / validation / test split of a price series.

use std::fmt;
use std::str::FromStr;

use super::bar::Bar;
use super::error::GorkError;

pub const DEFAULT_TRAIN_RATIO: f64 = 0.6;
pub const DEFAULT_VALIDATION_RATIO: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Train,
    Validation,
    Test,
    All,
}

impl FromStr for Segment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "train" => Ok(Segment::Train),
            "validation" | "val" => Ok(Segment::Validation),
            "test" => Ok(Segment::Test),
            "all" => Ok(Segment::All),
            other => Err(format!(
                "unknown segment '{other}' (expected train, validation, test or all)"
            )),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Segment::Train => "train",
            Segment::Validation => "validation",
            Segment::Test => "test",
            Segment::All => "all",
        };
        f.write_str(name)
    }
}

/// Contiguous, ordered slices that together cover the whole series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataSplit<'a> {
    pub all: &'a [Bar],
    pub train: &'a [Bar],
    pub validation: &'a [Bar],
    pub test: &'a [Bar],
}

impl<'a> DataSplit<'a> {
    pub fn segment(&self, segment: Segment) -> &'a [Bar] {
        match segment {
            Segment::Train => self.train,
            Segment::Validation => self.validation,
            Segment::Test => self.test,
            Segment::All => self.all,
        }
    }
}

/// `train_end = floor(len * train_ratio)`,
/// `validation_end = floor(len * (train_ratio + validation_ratio))`.
pub fn split_bars(
    bars: &[Bar],
    train_ratio: f64,
    validation_ratio: f64,
) -> Result<DataSplit<'_>, GorkError> {
    validate_ratios(train_ratio, validation_ratio)?;

    let len = bars.len();
    let train_end = ((len as f64 * train_ratio) as usize).min(len);
    let validation_end = ((len as f64 * (train_ratio + validation_ratio)) as usize)
        .clamp(train_end, len);

    Ok(DataSplit {
        all: bars,
        train: &bars[..train_end],
        validation: &bars[train_end..validation_end],
        test: &bars[validation_end..],
    })
}

pub fn validate_ratios(train_ratio: f64, validation_ratio: f64) -> Result<(), GorkError> {
    for (name, ratio) in [("train_ratio", train_ratio), ("validation_ratio", validation_ratio)] {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(GorkError::InvalidParameter {
                reason: format!("{name} must be between 0 and 1, got {ratio}"),
            });
        }
    }
    if train_ratio + validation_ratio > 1.0 {
        return Err(GorkError::InvalidParameter {
            reason: format!(
                "train_ratio + validation_ratio must not exceed 1, got {}",
                train_ratio + validation_ratio
            ),
        });
    }
    Ok(())
}
