//! Model-addition statistics and the text tables printed from them.

use std::fmt;
use std::io::{self, Write};
use std::ops::{Add, Sub};

/// Counts of variables and constraints, either for a whole model or for
/// the part of it an encoder added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelStats {
    /// Variables
    pub variables: usize,
    /// Linear constraints
    pub linear_constraints: usize,
    /// Quadratic constraints
    pub quadratic_constraints: usize,
    /// General constraints (indicators)
    pub general_constraints: usize,
}

impl ModelStats {
    /// Additions between two snapshots of the same model.
    pub fn added_since(&self, before: &ModelStats) -> ModelStats {
        *self - *before
    }

    /// Total constraints of all classes.
    pub fn total_constraints(&self) -> usize {
        self.linear_constraints + self.quadratic_constraints + self.general_constraints
    }
}

impl Sub for ModelStats {
    type Output = ModelStats;

    fn sub(self, rhs: ModelStats) -> ModelStats {
        ModelStats {
            variables: self.variables.saturating_sub(rhs.variables),
            linear_constraints: self.linear_constraints.saturating_sub(rhs.linear_constraints),
            quadratic_constraints: self
                .quadratic_constraints
                .saturating_sub(rhs.quadratic_constraints),
            general_constraints: self
                .general_constraints
                .saturating_sub(rhs.general_constraints),
        }
    }
}

impl Add for ModelStats {
    type Output = ModelStats;

    fn add(self, rhs: ModelStats) -> ModelStats {
        ModelStats {
            variables: self.variables + rhs.variables,
            linear_constraints: self.linear_constraints + rhs.linear_constraints,
            quadratic_constraints: self.quadratic_constraints + rhs.quadratic_constraints,
            general_constraints: self.general_constraints + rhs.general_constraints,
        }
    }
}

impl fmt::Display for ModelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} variables, {} linear, {} quadratic, {} general constraints",
            self.variables,
            self.linear_constraints,
            self.quadratic_constraints,
            self.general_constraints
        )
    }
}

/// Write the multi-line summary of one encoder.
pub fn write_summary(
    out: &mut dyn Write,
    name: &str,
    input_shape: (usize, usize),
    output_shape: (usize, usize),
    stats: &ModelStats,
) -> io::Result<()> {
    writeln!(out, "Model for {}:", name)?;
    writeln!(out, "{} variables", stats.variables)?;
    writeln!(out, "{} constraints", stats.linear_constraints)?;
    if stats.quadratic_constraints > 0 {
        writeln!(out, "{} quadratic constraints", stats.quadratic_constraints)?;
    }
    writeln!(out, "{} general constraints", stats.general_constraints)?;
    writeln!(out, "Input has shape ({}, {})", input_shape.0, input_shape.1)?;
    writeln!(out, "Output has shape ({}, {})", output_shape.0, output_shape.1)
}

fn header_line() -> String {
    format!(
        "{:13} {:>14} {:>12} {:^38}",
        "Estimator", "Output Shape", "Variables", "Constraints"
    )
}

/// Write the estimator table header (rule, titles, constraint classes, rule).
pub fn write_stats_header(out: &mut dyn Write) -> io::Result<()> {
    let header = header_line();
    writeln!(out, "{}", "-".repeat(header.len()))?;
    writeln!(out, "{}", header)?;
    writeln!(
        out,
        "{} {:>12} {:>12} {:>12}",
        " ".repeat(41),
        "Linear",
        "Quadratic",
        "General"
    )?;
    writeln!(out, "{}", "=".repeat(header.len()))
}

/// Write the closing rule of the estimator table.
pub fn write_stats_footer(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", "-".repeat(header_line().len()))
}

/// Write one table row.
pub fn write_stats_row(
    out: &mut dyn Write,
    name: &str,
    shape: (usize, usize),
    stats: &ModelStats,
) -> io::Result<()> {
    let shape = format!("({}, {})", shape.0, shape.1);
    writeln!(
        out,
        "{:13} {:>14} {:>12} {:>12} {:>12} {:>12}",
        name,
        shape,
        stats.variables,
        stats.linear_constraints,
        stats.quadratic_constraints,
        stats.general_constraints
    )
}
