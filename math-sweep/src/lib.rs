//! Parameter sweeps over target strength models
//!
//! A sweep validates a parameter set against one model, expands every
//! sequence-valued parameter into the Cartesian product of runs, solves the
//! runs sequentially or on a worker pool, and returns the target strengths
//! shaped like the input (scalar, series, table or labelled grid).
//!
//! Errors in the parameters abort the sweep before anything is solved. A run
//! that is outside its model's domain, or that fails numerically, leaves a NaN
//! in the output and its error in the [`ResultSet`].
//!
//! # Example
//!
//! ```
//! use math_echo_scatter::{ModelParameters, SharedParameters, model_by_name};
//! use math_echo_sweep::{Dispatcher, SweepInput, SweepOutput};
//!
//! let model = model_by_name("mss").unwrap();
//! let params = ModelParameters::new()
//!     .with("medium_c", 1477.4)
//!     .with("medium_rho", 1026.8)
//!     .with("a", vec![0.01, 0.02])
//!     .with("f", vec![38_000.0, 120_000.0])
//!     .with("boundary_type", "fixed rigid");
//!
//! let result = Dispatcher::sequential()
//!     .dispatch(model.as_ref(), &SweepInput::Grid(params), SharedParameters::new())
//!     .unwrap();
//! let SweepOutput::Grid(grid) = result.output else { unreachable!() };
//! assert_eq!(grid.shape(), &[2, 2]);
//! ```

pub mod config;
pub mod container;
pub mod dispatch;
pub mod error;
pub mod progress;
pub mod result;
pub mod space;

pub use config::{ExecutionConfig, ExecutionMode, OutputLayout, SweepConfig, TruncationConfig};
pub use container::{GridAxis, LabelledGrid, ParameterTable, TS_COLUMN};
pub use dispatch::{Dispatcher, SweepInput, SweepOutput, SweepResult};
pub use error::{Result, SweepError};
pub use progress::{ChannelObserver, Progress, ProgressObserver};
pub use result::{ResultSet, RowOutcome};
pub use space::{Batch, ParameterSpace, cartesian_rows};
