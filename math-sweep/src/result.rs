//! Per-row outcomes of a sweep

use crate::container::{GridAxis, LabelledGrid};
use crate::error::Result;
use math_echo_scatter::{Scalar, ScatterError, TsEstimate};

/// Outcome of one row: an estimate, or the error that stands in for it
pub type RowOutcome = std::result::Result<TsEstimate, ScatterError>;

/// One outcome per run, in row order
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    outcomes: Vec<RowOutcome>,
}

impl ResultSet {
    pub(crate) fn new(outcomes: Vec<RowOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[RowOutcome] {
        &self.outcomes
    }

    pub fn get(&self, index: usize) -> Option<&RowOutcome> {
        self.outcomes.get(index)
    }

    /// TS of every row, NaN where the row failed
    pub fn ts_values(&self) -> Vec<f64> {
        self.outcomes
            .iter()
            .map(|outcome| outcome.as_ref().map_or(f64::NAN, |estimate| estimate.ts))
            .collect()
    }

    /// Rows that failed, with their errors
    pub fn failures(&self) -> impl Iterator<Item = (usize, &ScatterError)> + '_ {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(index, outcome)| outcome.as_ref().err().map(|err| (index, err)))
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_err()).count()
    }

    /// Rows whose modal series stopped before meeting its tolerance
    pub fn unconverged_rows(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(index, outcome)| match outcome {
                Ok(estimate) if !estimate.is_converged() => Some(index),
                _ => None,
            })
            .collect()
    }

    /// TS values as table cells
    pub(crate) fn ts_column(&self) -> Vec<Scalar> {
        self.ts_values().into_iter().map(Scalar::from).collect()
    }

    /// Lay the TS values out over `axes`
    pub fn to_grid(&self, axes: &[GridAxis]) -> Result<LabelledGrid> {
        LabelledGrid::new(axes.to_vec(), self.ts_values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use math_echo_scatter::TruncationReport;

    fn results() -> ResultSet {
        let unconverged = TruncationReport {
            order: 403,
            converged: false,
            tail_ratio: 3e-3,
        };
        ResultSet::new(vec![
            Ok(TsEstimate::new(-40.0)),
            Err(ScatterError::OutOfDomain {
                model: "hp".to_string(),
                reason: "ka = 25 is above the validated maximum of 20".to_string(),
            }),
            Ok(TsEstimate::with_truncation(-50.0, unconverged)),
        ])
    }

    #[test]
    fn test_markers_and_reports() {
        let results = results();
        let ts = results.ts_values();
        assert_eq!(ts[0], -40.0);
        assert!(ts[1].is_nan());
        assert_eq!(results.failure_count(), 1);
        let (index, err) = results.failures().next().unwrap();
        assert_eq!(index, 1);
        assert!(err.is_domain_error());
        assert_eq!(results.unconverged_rows(), vec![2]);
    }

    #[test]
    fn test_grid_layout() {
        let axes = vec![GridAxis {
            name: "f".to_string(),
            values: vec![Scalar::from(1.0), Scalar::from(2.0), Scalar::from(3.0)],
        }];
        let grid = results().to_grid(&axes).unwrap();
        assert_eq!(grid.get(&[2]), Some(-50.0));
        assert!(results().to_grid(&axes[..0]).is_err());
    }
}
