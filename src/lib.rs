//! # treemip
//!
//! Embed trained regression trees, random forests and gradient boosting
//! regressors into mixed-integer optimization models.
//!
//! An encoder takes a trained predictor together with input and output
//! decision variables that already live in a model, and adds binary
//! node-activation variables plus linear and indicator constraints so that,
//! in every feasible solution, the output variables equal the predictor's
//! prediction for the input variables. The prediction function can then be
//! optimized jointly with the rest of the model.
//!
//! ## Quick Start
//!
//! ```rust
//! use treemip::{
//!     add_predictor_constr, EncoderConfig, Model, OptimizationModel, Predictor,
//!     PredictorConstraints, Tree, TreeNode, VarType,
//! };
//!
//! # fn main() -> treemip::Result<()> {
//! // x[0] <= 0.5 predicts 1.0, otherwise 4.0
//! let tree = Tree::new(vec![
//!     TreeNode::split(0, 0.5, 1, 2),
//!     TreeNode::leaf(1.0),
//!     TreeNode::leaf(4.0),
//! ])?;
//!
//! let mut model = Model::new("example");
//! let input = model.add_vars((3, 1), 0.0, 1.0, VarType::Continuous, "x");
//! let constr = add_predictor_constr(
//!     &mut model,
//!     &Predictor::from(tree),
//!     &input,
//!     None,
//!     &EncoderConfig::default(),
//! )?;
//!
//! assert_eq!(constr.output().dim(), (3, 1));
//! let mut lp = Vec::new();
//! model.write_lp(&mut lp)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Layout
//!
//! - [`model`]: the in-memory optimization model, LP export and solution checking
//! - [`tree`] and [`ensemble`]: trained predictors
//! - [`encoding`]: the encoders
//! - [`config`]: encoder configuration
//! - [`io`]: predictor documents

#![warn(missing_docs)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Optimization model module
pub mod model;

// Tree module
pub mod tree;

// Ensemble module
pub mod ensemble;

// Encoder module
pub mod encoding;

// Predictor file module
pub mod io;

// Re-export core functionality for convenience
pub use core::{
    constants::*,
    error::{Result, TreeMipError},
    traits::*,
    types::*,
};

pub use config::{EncoderConfig, EncoderConfigBuilder, ThresholdScaling};

pub use model::{LinExpr, Model, Solution, Violation};

pub use tree::{Tree, TreeArrays, TreeNode};

pub use ensemble::{Combination, EnsembleMember, Predictor, TreeEnsemble};

pub use encoding::{
    add_decision_tree_constr, add_gradient_boosting_constr, add_predictor_constr,
    add_random_forest_constr, add_tree_ensemble_constr, DecisionTreeConstr,
    GradientBoostingConstr, ModelStats, PredictorConstr, RandomForestConstr, TreeEnsembleConstr,
};

pub use io::{load_predictor, save_predictor, PredictorFile};

// Version information
pub use core::constants::TREEMIP_VERSION as VERSION;

/// Initialize the library.
///
/// Installs an `env_logger` logger (level from `RUST_LOG`, `info` by
/// default) unless one is already set. Encoders work without it.
///
/// ```rust
/// fn main() -> treemip::Result<()> {
///     treemip::init()?;
///     Ok(())
/// }
/// ```
pub fn init() -> Result<()> {
    core::initialize_core()
}

/// Check if the library has been initialized.
pub fn is_initialized() -> bool {
    core::is_core_initialized()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_initialization() {
        assert!(init().is_ok());
        assert!(is_initialized());
    }

    #[test]
    fn test_version_info() {
        assert!(!VERSION.is_empty());
    }
}
