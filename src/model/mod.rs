//! Optimization model layer.
//!
//! - [`expr`]: linear expressions over variable handles
//! - [`constraint`]: variable, row and indicator records, plus violations
//! - [`model`]: the in-memory [`Model`] implementing
//!   [`OptimizationModel`](crate::core::traits::OptimizationModel)
//! - [`lp_format`]: LP file export
//! - [`solution`]: candidate assignments checked by [`Model::check_solution`]

pub mod constraint;
pub mod expr;
pub mod lp_format;
pub mod model;
pub mod solution;

pub use constraint::{IndicatorConstraint, LinearConstraint, Variable, Violation};
pub use expr::LinExpr;
pub use model::Model;
pub use solution::Solution;
