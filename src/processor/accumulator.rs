use std::collections::HashMap;

use crate::processor::{AggregateValue, ProcessorError};

/// Running state of one average before finalization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningAverage {
    pub total: i64,
    pub count: u64,
}

impl RunningAverage {
    /// Mean rounded half away from zero to three decimal places.
    ///
    /// `count` is at least 1 for every running average an [`Accumulator`]
    /// creates.
    pub fn resolve(&self) -> f64 {
        let average = self.total as f64 / self.count as f64;
        round_millis(average)
    }
}

pub fn round_millis(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Per-group (or global) label -> value map.
///
/// Counts and sums live in `values` as integers from the first row on.
/// Averages accumulate in `running` and move into `values` as floats when
/// [`Accumulator::finalize_averages`] runs, so a label is never in both maps
/// at once after finalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    values: HashMap<String, AggregateValue>,
    running: HashMap<String, RunningAverage>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one to the counter under `label`, starting at 1.
    pub fn increment(&mut self, label: &str) -> Result<(), ProcessorError> {
        self.add(label, 1)
    }

    /// Adds `amount` to the integer under `label`, starting at `amount`.
    pub fn add(&mut self, label: &str, amount: i64) -> Result<(), ProcessorError> {
        match self.values.get_mut(label) {
            None => {
                self.values
                    .insert(label.to_string(), AggregateValue::Int(amount));
            }
            Some(AggregateValue::Int(current)) => {
                *current = current
                    .checked_add(amount)
                    .ok_or_else(|| ProcessorError::Overflow {
                        label: label.to_string(),
                    })?;
            }
            Some(AggregateValue::Float(_)) => {
                return Err(ProcessorError::Inconsistent(label.to_string()));
            }
        }
        Ok(())
    }

    /// Folds `value` into the running average under `label`.
    pub fn add_to_average(&mut self, label: &str, value: i64) -> Result<(), ProcessorError> {
        let running = self.running.entry(label.to_string()).or_default();
        running.total = running
            .total
            .checked_add(value)
            .ok_or_else(|| ProcessorError::Overflow {
                label: label.to_string(),
            })?;
        running.count += 1;
        Ok(())
    }

    /// Resolves every running average into a float under its bare label.
    ///
    /// Consumes the running state, so calling it again is a no-op.
    pub fn finalize_averages(&mut self) {
        for (label, running) in std::mem::take(&mut self.running) {
            self.values
                .insert(label, AggregateValue::Float(running.resolve()));
        }
    }

    pub fn has_pending_averages(&self) -> bool {
        !self.running.is_empty()
    }

    pub fn running(&self, label: &str) -> Option<RunningAverage> {
        self.running.get(label).copied()
    }

    /// Finalized value under `label`, if any row produced one.
    ///
    /// Fails if `label` still holds an unfinalized average.
    pub fn get(&self, label: &str) -> Result<Option<AggregateValue>, ProcessorError> {
        if self.running.contains_key(label) {
            return Err(ProcessorError::Inconsistent(label.to_string()));
        }
        Ok(self.values.get(label).copied())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.running.is_empty()
    }

    /// All finalized values. Fails if any average is still running.
    pub fn into_values(self) -> Result<HashMap<String, AggregateValue>, ProcessorError> {
        if let Some(label) = self.running.keys().next() {
            return Err(ProcessorError::Inconsistent(label.clone()));
        }
        Ok(self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_and_add() {
        let mut acc = Accumulator::new();
        acc.increment("count").unwrap();
        acc.increment("count").unwrap();
        acc.add("total", 10).unwrap();
        acc.add("total", -3).unwrap();
        assert_eq!(acc.get("count").unwrap(), Some(AggregateValue::Int(2)));
        assert_eq!(acc.get("total").unwrap(), Some(AggregateValue::Int(7)));
        assert_eq!(acc.get("other").unwrap(), None);
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut acc = Accumulator::new();
        acc.add("total", i64::MAX).unwrap();
        let err = acc.add("total", 1).unwrap_err();
        assert!(matches!(err, ProcessorError::Overflow { ref label } if label == "total"));
    }

    #[test]
    fn test_average_rounds_to_three_decimals() {
        let mut acc = Accumulator::new();
        for v in [1, 2, 4] {
            acc.add_to_average("avg", v).unwrap();
        }
        assert_eq!(
            acc.running("avg"),
            Some(RunningAverage { total: 7, count: 3 })
        );
        acc.finalize_averages();
        assert_eq!(acc.get("avg").unwrap(), Some(AggregateValue::Float(2.333)));
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(round_millis(0.0005), 0.001);
        assert_eq!(round_millis(-0.0005), -0.001);
        assert_eq!(
            RunningAverage {
                total: -5,
                count: 2
            }
            .resolve(),
            -2.5
        );
        assert_eq!(RunningAverage { total: 2, count: 3 }.resolve(), 0.667);
    }

    #[test]
    fn test_unfinalized_average_is_inconsistent() {
        let mut acc = Accumulator::new();
        acc.add_to_average("avg", 3).unwrap();
        assert!(acc.has_pending_averages());
        assert!(matches!(
            acc.get("avg"),
            Err(ProcessorError::Inconsistent(_))
        ));
        assert!(matches!(
            acc.clone().into_values(),
            Err(ProcessorError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut acc = Accumulator::new();
        acc.add_to_average("avg", 10).unwrap();
        acc.add_to_average("avg", 20).unwrap();
        acc.increment("n").unwrap();
        acc.finalize_averages();
        let once = acc.clone();
        acc.finalize_averages();
        assert_eq!(acc, once);
        assert!(!acc.has_pending_averages());

        let values = acc.into_values().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["avg"], AggregateValue::Float(15.0));
    }

    #[test]
    fn test_average_label_does_not_collide_with_suffixed_label() {
        let mut acc = Accumulator::new();
        acc.increment("avg_total").unwrap();
        acc.add_to_average("avg", 4).unwrap();
        acc.finalize_averages();
        assert_eq!(acc.get("avg_total").unwrap(), Some(AggregateValue::Int(1)));
        assert_eq!(acc.get("avg").unwrap(), Some(AggregateValue::Float(4.0)));
    }
}
