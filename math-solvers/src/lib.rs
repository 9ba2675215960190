//! Dense linear solvers for modal scattering systems
//!
//! Interface conditions of layered spheres, shells and coupled spheroidal
//! expansions produce small dense systems, one per mode. This crate solves
//! them with equilibrated LU factorization, or Givens QR when a system is
//! tall, and provides the chunked worker pool used to evaluate independent
//! runs in parallel.
//!
//! # Example
//!
//! ```
//! use math_echo_solvers::lu_solve;
//! use ndarray::array;
//! use num_complex::Complex64;
//!
//! let a = array![
//!     [Complex64::new(2.0, 0.0), Complex64::new(0.0, 1.0)],
//!     [Complex64::new(0.0, -1.0), Complex64::new(3.0, 0.0)],
//! ];
//! let b = array![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
//! let x = lu_solve(&a, &b).unwrap();
//! assert!((a.dot(&x)[0] - b[0]).norm() < 1e-12);
//! ```

pub mod direct;
pub mod parallel;
pub mod traits;

pub use direct::{
    LuError, LuFactorization, LuOptions, PivotPolicy, lu_factorize, lu_factorize_with, lu_solve,
    lu_solve_with, qr_least_squares,
};
pub use parallel::{
    ParallelConfig, ParallelError, WorkerPool, fill_chunks_sequential, is_parallel_available,
};
pub use traits::ComplexField;
