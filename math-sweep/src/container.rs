//! Caller-facing containers: tables and labelled grids
//!
//! A [`ParameterTable`] is not expanded; each of its rows is one run. A
//! [`LabelledGrid`] carries one axis per sequence-valued parameter and the
//! target strength of every combination, laid out row-major in axis order.

use crate::error::{Result, SweepError};
use indexmap::IndexMap;
use math_echo_scatter::{ModelParameters, ParamValue, Scalar};
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

/// Name of the column appended by a table sweep
pub const TS_COLUMN: &str = "ts";

/// Runs given row by row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterTable {
    columns: Vec<String>,
    rows: Vec<Vec<Scalar>>,
}

impl ParameterTable {
    /// An empty table with the given column names
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, which must have one value per column
    pub fn push_row(&mut self, row: Vec<Scalar>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(SweepError::container(format!(
                "row has {} values for {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Builder form of [`push_row`](Self::push_row)
    pub fn with_row(mut self, row: Vec<Scalar>) -> Result<Self> {
        self.push_row(row)?;
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Scalar>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Check column names and row widths
    ///
    /// Deserialised tables skip [`push_row`](Self::push_row), so the
    /// dispatcher calls this before using one.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        if let Some(duplicate) = self.columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(SweepError::container(format!(
                "column '{duplicate}' appears twice"
            )));
        }
        if let Some((index, row)) = self
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.columns.len())
        {
            return Err(SweepError::container(format!(
                "row {index} has {} values for {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        Ok(())
    }

    /// Every column as a sequence, for column-wise validation
    pub(crate) fn as_parameters(&self) -> ModelParameters {
        self.columns
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let values: Vec<Scalar> = self.rows.iter().map(|row| row[index].clone()).collect();
                (name.clone(), ParamValue::from(values))
            })
            .collect()
    }

    /// Named values of row `index`
    pub(crate) fn row_values(&self, index: usize) -> IndexMap<String, Scalar> {
        self.columns
            .iter()
            .cloned()
            .zip(self.rows[index].iter().cloned())
            .collect()
    }

    /// A copy of the table with one more column
    ///
    /// An existing column of the same name is replaced.
    pub fn with_column(&self, name: &str, values: Vec<Scalar>) -> Result<Self> {
        if values.len() != self.rows.len() {
            return Err(SweepError::container(format!(
                "column '{name}' has {} values for {} rows",
                values.len(),
                self.rows.len()
            )));
        }
        let mut table = self.clone();
        match table.columns.iter().position(|c| c == name) {
            Some(index) => {
                for (row, value) in table.rows.iter_mut().zip(values) {
                    row[index] = value;
                }
            }
            None => {
                table.columns.push(name.to_string());
                for (row, value) in table.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(table)
    }
}

/// One labelled axis of a grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAxis {
    pub name: String,
    pub values: Vec<Scalar>,
}

/// Target strengths over the Cartesian product of some axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledGrid {
    axes: Vec<GridAxis>,
    data: ArrayD<f64>,
}

impl LabelledGrid {
    /// A grid from its axes and row-major data
    pub fn new(axes: Vec<GridAxis>, data: Vec<f64>) -> Result<Self> {
        let shape: Vec<usize> = axes.iter().map(|axis| axis.values.len()).collect();
        let data = ArrayD::from_shape_vec(IxDyn(&shape), data)
            .map_err(|e| SweepError::container(format!("grid data does not fit its axes: {e}")))?;
        Ok(Self { axes, data })
    }

    pub fn axes(&self) -> &[GridAxis] {
        &self.axes
    }

    pub fn axis(&self, name: &str) -> Option<&GridAxis> {
        self.axes.iter().find(|axis| axis.name == name)
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Value at one index per axis
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        self.data.get(IxDyn(index)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ParameterTable {
        ParameterTable::new(["a", "boundary_type"])
            .with_row(vec![Scalar::from(0.01), Scalar::from("fixed rigid")])
            .unwrap()
            .with_row(vec![Scalar::from(0.02), Scalar::from("pressure release")])
            .unwrap()
    }

    #[test]
    fn test_table_rows_and_columns() {
        let table = table();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("a").unwrap()[1], &Scalar::from(0.02));
        assert!(table.column("f").is_none());

        let mut ragged = table.clone();
        assert!(ragged.push_row(vec![Scalar::from(0.03)]).is_err());

        let params = table.as_parameters();
        assert_eq!(params.get("a").unwrap().len(), 2);
        assert_eq!(table.row_values(1)["boundary_type"], Scalar::from("pressure release"));
    }

    #[test]
    fn test_with_column_leaves_input_untouched() {
        let table = table();
        let with_ts = table
            .with_column(TS_COLUMN, vec![Scalar::from(-40.0), Scalar::from(-41.0)])
            .unwrap();
        assert_eq!(table.columns().len(), 2);
        assert_eq!(with_ts.columns(), &["a", "boundary_type", "ts"]);
        assert_eq!(with_ts.rows()[1][2], Scalar::from(-41.0));
        assert!(table.with_column(TS_COLUMN, vec![]).is_err());
    }

    #[test]
    fn test_deserialised_table_is_checked() {
        let json = r#"{"columns": ["a", "a"], "rows": [[1.0, 2.0]]}"#;
        let table: ParameterTable = serde_json::from_str(json).unwrap();
        assert!(table.validate().is_err());

        let json = r#"{"columns": ["a", "f"], "rows": [[1.0]]}"#;
        let table: ParameterTable = serde_json::from_str(json).unwrap();
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_grid_shape() {
        let axes = vec![
            GridAxis {
                name: "a".to_string(),
                values: vec![Scalar::from(0.01), Scalar::from(0.02)],
            },
            GridAxis {
                name: "f".to_string(),
                values: vec![Scalar::from(1.0), Scalar::from(2.0), Scalar::from(3.0)],
            },
        ];
        let grid = LabelledGrid::new(axes.clone(), (0..6).map(f64::from).collect()).unwrap();
        assert_eq!(grid.shape(), &[2, 3]);
        assert_eq!(grid.get(&[1, 0]), Some(3.0));
        assert_eq!(grid.axis("f").unwrap().values.len(), 3);
        assert!(LabelledGrid::new(axes, vec![0.0; 5]).is_err());
    }
}
