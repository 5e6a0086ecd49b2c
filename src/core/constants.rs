//! Default values for encoder configuration and model checks.

use crate::core::types::FloatPrecision;

/// Default margin added to the right-branch comparison `x >= t + eps`.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Default lower bound on the per-node scale when magnitude scaling is on.
pub const DEFAULT_MIN_SCALE: f64 = 1.0;

/// Default precision thresholds are rounded to.
pub const DEFAULT_FLOAT_PRECISION: FloatPrecision = FloatPrecision::F64;

/// Default name prefix for single-tree encoders.
pub const DEFAULT_TREE_NAME: &str = "tree";

/// Default name prefix for random forest encoders.
pub const DEFAULT_FOREST_NAME: &str = "rf";

/// Default name prefix for gradient boosting encoders.
pub const DEFAULT_BOOSTING_NAME: &str = "gbt";

/// Default feasibility tolerance used by [`Model::check_solution`](crate::model::Model::check_solution).
pub const DEFAULT_FEASIBILITY_TOLERANCE: f64 = 1e-9;

/// Environment variable overriding the branch margin.
pub const ENV_EPSILON: &str = "TREEMIP_EPSILON";

/// Environment variable overriding the threshold precision.
pub const ENV_FLOAT_PRECISION: &str = "TREEMIP_FLOAT_PRECISION";

/// Environment variable enabling magnitude scaling with the given minimum scale.
pub const ENV_MIN_SCALE: &str = "TREEMIP_MIN_SCALE";

/// Crate version string.
pub const TREEMIP_VERSION: &str = env!("CARGO_PKG_VERSION");
