//! Direct solvers for linear systems
//!
//! - [`lu_solve`]: LU decomposition with partial pivoting and column equilibration
//! - [`qr_least_squares`]: Givens QR for tall least-squares systems

mod lu;
mod qr;

pub use lu::{
    LuError, LuFactorization, LuOptions, PivotPolicy, lu_factorize, lu_factorize_with, lu_solve,
    lu_solve_with,
};
pub use qr::qr_least_squares;
