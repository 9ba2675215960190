//! Batch dispatch of expanded runs
//!
//! The dispatcher solves every row of a [`Batch`] and shapes the target
//! strengths like the caller's input. Rows are written into a pre-sized
//! buffer by position, so sequential and parallel runs give the same output.

use crate::container::{LabelledGrid, ParameterTable, TS_COLUMN};
use crate::error::Result;
use crate::progress::{Progress, ProgressObserver};
use crate::result::{ResultSet, RowOutcome};
use crate::space::{Batch, ParameterSpace};
use math_echo_scatter::{ModelParameters, ScatteringModel, SharedParameters, TsEstimate};
use math_echo_solvers::{ParallelConfig, WorkerPool, fill_chunks_sequential};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Rows per chunk when none is configured
const DEFAULT_CHUNK_SIZE: usize = 16;

/// Caller input, in one of the supported container shapes
#[derive(Debug, Clone, PartialEq)]
pub enum SweepInput {
    /// Scalars and sequences; sequences are producted
    Parameters(ModelParameters),
    /// One run per table row
    Table(ParameterTable),
    /// Like `Parameters`, but the output keeps one axis per sequence
    Grid(ModelParameters),
}

/// Target strengths shaped like the input
#[derive(Debug, Clone, PartialEq)]
pub enum SweepOutput {
    /// Every parameter was a scalar
    Scalar(f64),
    /// TS in row order
    Series(Vec<f64>),
    /// The input table with a `ts` column
    Table(ParameterTable),
    Grid(LabelledGrid),
}

impl SweepOutput {
    /// TS values in row order
    pub fn ts_values(&self) -> Vec<f64> {
        match self {
            Self::Scalar(ts) => vec![*ts],
            Self::Series(values) => values.clone(),
            Self::Table(table) => table
                .column(TS_COLUMN)
                .map(|column| {
                    column
                        .into_iter()
                        .map(|value| value.as_number().unwrap_or(f64::NAN))
                        .collect()
                })
                .unwrap_or_default(),
            Self::Grid(grid) => grid.data().iter().copied().collect(),
        }
    }
}

/// Shaped output together with the per-row outcomes behind it
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub results: ResultSet,
    pub output: SweepOutput,
}

/// Runs batches sequentially or on a dedicated worker pool
pub struct Dispatcher {
    pool: Option<WorkerPool>,
    chunk_size: usize,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pool", &self.pool)
            .field("chunk_size", &self.chunk_size)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::sequential()
    }
}

impl Dispatcher {
    /// Single worker on the calling thread
    pub fn sequential() -> Self {
        Self {
            pool: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            observer: None,
        }
    }

    /// A pool of `workers` threads (None = one per core)
    pub fn parallel(workers: Option<usize>) -> Result<Self> {
        Ok(Self {
            pool: Some(WorkerPool::new(workers)?),
            ..Self::sequential()
        })
    }

    pub fn from_config(config: &ParallelConfig) -> Result<Self> {
        let dispatcher = if config.enabled {
            Self::parallel(config.num_threads)?
        } else {
            Self::sequential()
        };
        Ok(dispatcher.with_chunk_size(config.chunk_size))
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    pub fn num_workers(&self) -> usize {
        self.pool.as_ref().map_or(1, WorkerPool::num_threads)
    }

    /// Solve every row of `batch`
    ///
    /// Per-row failures are kept in place and never stop the batch.
    pub fn solve_batch(&self, model: &dyn ScatteringModel, batch: &Batch) -> ResultSet {
        let rows = batch.rows();
        let total = rows.len();
        let name = model.info().name;
        let start = Instant::now();
        log::info!(
            "Solving {} rows with '{}' ({} worker(s), chunk size {})",
            total,
            name,
            self.num_workers(),
            self.chunk_size
        );

        let completed = AtomicUsize::new(0);
        let solve_chunk = |offset: usize, chunk: &mut [RowOutcome]| {
            for (slot, row) in chunk.iter_mut().zip(&rows[offset..]) {
                *slot = model.solve_single(row);
            }
            let done = completed.fetch_add(chunk.len(), Ordering::Relaxed) + chunk.len();
            log::debug!("Rows {}..{} done", offset, offset + chunk.len());
            if let Some(observer) = &self.observer {
                observer.on_progress(Progress {
                    completed: done,
                    total,
                });
            }
        };

        let mut outcomes: Vec<RowOutcome> = vec![Ok(TsEstimate::new(f64::NAN)); total];
        match &self.pool {
            Some(pool) => pool.fill_chunks(&mut outcomes, self.chunk_size, solve_chunk),
            None => fill_chunks_sequential(&mut outcomes, self.chunk_size, solve_chunk),
        }

        let results = ResultSet::new(outcomes);
        for (index, err) in results.failures() {
            log::warn!("Row {} failed: {}", index, err);
        }
        for index in results.unconverged_rows() {
            if let Some(Ok(TsEstimate {
                truncation: Some(report),
                ..
            })) = results.get(index)
            {
                log::warn!(
                    "Row {} stopped at order {} with tail ratio {:.2e}",
                    index,
                    report.order,
                    report.tail_ratio
                );
            }
        }
        log::info!(
            "Solved {} rows in {:.3} s ({} failed)",
            total,
            start.elapsed().as_secs_f64(),
            results.failure_count()
        );
        results
    }

    /// Validate, expand and solve a parameter mapping
    pub fn run(
        &self,
        model: &dyn ScatteringModel,
        params: &ModelParameters,
        shared: impl Into<Arc<SharedParameters>>,
    ) -> Result<ResultSet> {
        let batch = ParameterSpace::new(model).expand(params, shared)?;
        Ok(self.solve_batch(model, &batch))
    }

    /// Solve `input` and shape the output like it
    ///
    /// Configuration errors abort before any row is solved.
    pub fn dispatch(
        &self,
        model: &dyn ScatteringModel,
        input: &SweepInput,
        shared: impl Into<Arc<SharedParameters>>,
    ) -> Result<SweepResult> {
        let space = ParameterSpace::new(model);
        let (results, output) = match input {
            SweepInput::Parameters(params) => {
                let batch = space.expand(params, shared)?;
                let results = self.solve_batch(model, &batch);
                let ts = results.ts_values();
                let output = if batch.axes().is_empty() && ts.len() == 1 {
                    SweepOutput::Scalar(ts[0])
                } else {
                    SweepOutput::Series(ts)
                };
                (results, output)
            }
            SweepInput::Table(table) => {
                let batch = space.expand_table(table, shared)?;
                let results = self.solve_batch(model, &batch);
                let output = SweepOutput::Table(table.with_column(TS_COLUMN, results.ts_column())?);
                (results, output)
            }
            SweepInput::Grid(params) => {
                let batch = space.expand(params, shared)?;
                let results = self.solve_batch(model, &batch);
                let output = SweepOutput::Grid(results.to_grid(batch.axes())?);
                (results, output)
            }
        };
        Ok(SweepResult { results, output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use math_echo_scatter::model_by_name;

    fn rigid_sphere() -> ModelParameters {
        ModelParameters::new()
            .with("medium_c", 1477.4)
            .with("medium_rho", 1026.8)
            .with("a", 0.01)
            .with("f", 38_000.0)
            .with("boundary_type", "fixed rigid")
    }

    #[test]
    fn test_scalar_input_gives_scalar() {
        let model = model_by_name("mss").unwrap();
        let result = Dispatcher::sequential()
            .dispatch(
                model.as_ref(),
                &SweepInput::Parameters(rigid_sphere()),
                SharedParameters::new(),
            )
            .unwrap();
        match result.output {
            SweepOutput::Scalar(ts) => assert_abs_diff_eq!(ts, -49.088, epsilon = 1e-3),
            other => panic!("expected a scalar, got {other:?}"),
        }
        assert_eq!(result.results.len(), 1);
    }

    #[test]
    fn test_grid_keeps_axes() {
        let model = model_by_name("mss").unwrap();
        let params = rigid_sphere()
            .with("a", vec![0.01, 0.02])
            .with("f", vec![12_000.0, 38_000.0, 70_000.0]);
        let result = Dispatcher::sequential()
            .dispatch(model.as_ref(), &SweepInput::Grid(params), SharedParameters::new())
            .unwrap();
        let SweepOutput::Grid(grid) = &result.output else {
            panic!("expected a grid");
        };
        assert_eq!(grid.shape(), &[2, 3]);
        assert_eq!(grid.axes()[1].name, "f");
        assert_eq!(result.output.ts_values(), result.results.ts_values());
        assert_abs_diff_eq!(grid.get(&[0, 1]).unwrap(), -49.088, epsilon = 1e-3);
    }

    #[test]
    fn test_chunk_size_is_at_least_one() {
        let dispatcher = Dispatcher::sequential().with_chunk_size(0);
        assert_eq!(dispatcher.chunk_size, 1);
        assert!(!dispatcher.is_parallel());
        assert_eq!(dispatcher.num_workers(), 1);
    }
}
