//! Expansion of parameter sets into runs
//!
//! Sequence-valued parameters span a Cartesian product. Parameters nest in
//! the caller's insertion order: the first is outermost and the last varies
//! fastest, which is the row-major layout of the matching
//! [`LabelledGrid`](crate::LabelledGrid).

use crate::container::{GridAxis, ParameterTable};
use crate::error::Result;
use math_echo_scatter::{ModelParameters, RunRow, ScatteringModel, SharedParameters};
use std::sync::Arc;

/// The runs of one sweep, with the shared inputs they all point to
#[derive(Debug, Clone)]
pub struct Batch {
    rows: Vec<RunRow>,
    axes: Vec<GridAxis>,
    shared: Arc<SharedParameters>,
}

impl Batch {
    pub fn rows(&self) -> &[RunRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Axes of the sequence-valued parameters (empty for tables)
    pub fn axes(&self) -> &[GridAxis] {
        &self.axes
    }

    pub fn shared(&self) -> &Arc<SharedParameters> {
        &self.shared
    }
}

/// Validates parameter sets against a model and expands them
#[derive(Debug, Clone, Copy)]
pub struct ParameterSpace<'a> {
    model: &'a dyn ScatteringModel,
}

impl<'a> ParameterSpace<'a> {
    pub fn new(model: &'a dyn ScatteringModel) -> Self {
        Self { model }
    }

    /// Validate `params` and expand them into their full Cartesian product
    ///
    /// Every error is a configuration error and no row is produced.
    pub fn expand(
        &self,
        params: &ModelParameters,
        shared: impl Into<Arc<SharedParameters>>,
    ) -> Result<Batch> {
        let shared = shared.into();
        self.model.validate_parameters(params, &shared)?;
        let axes = params
            .iter()
            .filter(|(_, value)| !value.is_scalar())
            .map(|(name, value)| GridAxis {
                name: name.to_string(),
                values: value.values().to_vec(),
            })
            .collect();
        Ok(Batch {
            rows: cartesian_rows(params, &shared),
            axes,
            shared,
        })
    }

    /// Validate a table column-wise and turn each of its rows into a run
    pub fn expand_table(
        &self,
        table: &ParameterTable,
        shared: impl Into<Arc<SharedParameters>>,
    ) -> Result<Batch> {
        let shared = shared.into();
        table.validate()?;
        self.model
            .validate_parameters(&table.as_parameters(), &shared)?;
        let rows = (0..table.len())
            .map(|index| RunRow::new(index, table.row_values(index), Arc::clone(&shared)))
            .collect();
        Ok(Batch {
            rows,
            axes: Vec::new(),
            shared,
        })
    }
}

/// Cartesian product of `params`, last parameter fastest
///
/// No validation is done. With no parameters there is a single empty row.
pub fn cartesian_rows(params: &ModelParameters, shared: &Arc<SharedParameters>) -> Vec<RunRow> {
    let lengths: Vec<usize> = params.iter().map(|(_, value)| value.len()).collect();
    let total: usize = lengths.iter().product();

    (0..total)
        .map(|index| {
            let mut remainder = index;
            let mut picks = vec![0; lengths.len()];
            for (pick, &length) in picks.iter_mut().zip(&lengths).rev() {
                *pick = remainder % length;
                remainder /= length;
            }
            let values = params
                .iter()
                .zip(&picks)
                .map(|((name, value), &pick)| (name.to_string(), value.values()[pick].clone()))
                .collect();
            RunRow::new(index, values, Arc::clone(shared))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use math_echo_scatter::{Scalar, model_by_name};

    #[test]
    fn test_row_major_order() {
        let params = ModelParameters::new()
            .with("a", vec![1.0, 2.0])
            .with("b", 5.0)
            .with("c", vec!["x", "y", "z"]);
        let rows = cartesian_rows(&params, &Arc::new(SharedParameters::new()));
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[1].get("c"), Some(&Scalar::from("y")));
        assert_eq!(rows[3].get("a"), Some(&Scalar::from(2.0)));
        assert_eq!(rows[3].get("c"), Some(&Scalar::from("x")));
        assert!(rows.iter().all(|row| row.get("b") == Some(&Scalar::from(5.0))));
        assert_eq!(rows[5].index(), 5);
        let names: Vec<&String> = rows[0].values().keys().collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_shared_inputs_are_not_copied() {
        let shared = Arc::new(SharedParameters::new().with("weights", vec![1.0, 2.0]));
        let params = ModelParameters::new().with("a", vec![1.0, 2.0, 3.0]);
        let rows = cartesian_rows(&params, &shared);
        assert!(rows.iter().all(|row| Arc::ptr_eq(row.shared_handle(), &shared)));
        assert_eq!(Arc::strong_count(&shared), 4);
    }

    #[test]
    fn test_expand_validates_first() {
        let model = model_by_name("mss").unwrap();
        let space = ParameterSpace::new(model.as_ref());
        let params = ModelParameters::new()
            .with("medium_c", 1477.4)
            .with("medium_rho", 1026.8)
            .with("a", vec![0.01, 0.02])
            .with("f", vec![38_000.0, 120_000.0])
            .with("boundary_type", "fixed rigid");
        let batch = space.expand(&params, SharedParameters::new()).unwrap();
        assert_eq!(batch.len(), 4);
        let axes: Vec<&str> = batch.axes().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(axes, ["a", "f"]);

        let unknown = params.clone().with("colour", "red");
        let err = space.expand(&unknown, SharedParameters::new()).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_table_rows_are_not_producted() {
        let model = model_by_name("mss").unwrap();
        let mut table = ParameterTable::new(["medium_c", "medium_rho", "a", "f", "boundary_type"]);
        for a in [0.01, 0.02, 0.03] {
            table
                .push_row(vec![
                    Scalar::from(1477.4),
                    Scalar::from(1026.8),
                    Scalar::from(a),
                    Scalar::from(38_000.0),
                    Scalar::from("fixed rigid"),
                ])
                .unwrap();
        }
        let batch = ParameterSpace::new(model.as_ref())
            .expand_table(&table, SharedParameters::new())
            .unwrap();
        assert_eq!(batch.len(), 3);
        assert!(batch.axes().is_empty());
        assert_eq!(batch.rows()[2].get("a"), Some(&Scalar::from(0.03)));
    }
}
