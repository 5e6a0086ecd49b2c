//! Core data types shared by the tree, model and encoding layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Feature index type for identifying input columns.
pub type FeatureIndex = usize;

/// Tree node identifier type.
pub type NodeIndex = usize;

/// Handle to a variable of an optimization model.
///
/// Handles are dense indices assigned in creation order, so the first
/// variable added to a model is `VarId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VarId(pub usize);

impl VarId {
    /// Position of the variable in its model.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarType {
    /// Real-valued variable
    Continuous,
    /// 0/1 variable
    Binary,
    /// Integer-valued variable
    Integer,
}

impl Default for VarType {
    fn default() -> Self {
        VarType::Continuous
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::Continuous => write!(f, "continuous"),
            VarType::Binary => write!(f, "binary"),
            VarType::Integer => write!(f, "integer"),
        }
    }
}

/// Comparison sense of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    /// `expr <= rhs`
    Le,
    /// `expr >= rhs`
    Ge,
    /// `expr == rhs`
    Eq,
}

impl Sense {
    /// Operator as written in LP files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sense::Le => "<=",
            Sense::Ge => ">=",
            Sense::Eq => "=",
        }
    }

    /// Whether `lhs (sense) rhs` holds within `tolerance`.
    pub fn holds(&self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Sense::Le => lhs <= rhs + tolerance,
            Sense::Ge => lhs >= rhs - tolerance,
            Sense::Eq => (lhs - rhs).abs() <= tolerance,
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the model objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveSense {
    /// Minimize the objective
    Minimize,
    /// Maximize the objective
    Maximize,
}

impl Default for ObjectiveSense {
    fn default() -> Self {
        ObjectiveSense::Minimize
    }
}

/// Numeric precision split thresholds are rounded to before encoding.
///
/// `F64` keeps the stored threshold, so the encoding routes exactly like
/// [`Tree::predict`](crate::tree::Tree::predict). `F32` is for models whose
/// learner compared `float32` feature values; native `f64` evaluation can
/// then disagree near the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatPrecision {
    /// Round thresholds to single precision
    F32,
    /// Keep thresholds in double precision
    F64,
}

impl FloatPrecision {
    /// Round `value` to this precision.
    pub fn round(&self, value: f64) -> f64 {
        match self {
            FloatPrecision::F32 => value as f32 as f64,
            FloatPrecision::F64 => value,
        }
    }
}

impl Default for FloatPrecision {
    fn default() -> Self {
        FloatPrecision::F64
    }
}

impl fmt::Display for FloatPrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloatPrecision::F32 => write!(f, "f32"),
            FloatPrecision::F64 => write!(f, "f64"),
        }
    }
}

impl std::str::FromStr for FloatPrecision {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "f32" | "float32" => Ok(FloatPrecision::F32),
            "f64" | "float64" => Ok(FloatPrecision::F64),
            other => Err(format!("unknown float precision '{}'", other)),
        }
    }
}
