//! LP file export.
//!
//! Writes the CPLEX/Gurobi LP dialect: objective, `Subject To` with linear
//! rows and indicator rows (`b = 1 -> expr <= rhs`), `Bounds`, `Binaries`,
//! `Generals`, `End`. Names are sanitized and made unique, since encoders
//! reuse prefixes such as `node` across trees.

use crate::core::types::{ObjectiveSense, VarType};
use crate::model::expr::LinExpr;
use crate::model::model::Model;
use std::collections::HashSet;
use std::io::{self, Write};

/// Write `model` to `out` in LP format.
pub fn write_lp<W: Write>(model: &Model, out: &mut W) -> io::Result<()> {
    let var_names = unique_names(model.variables().iter().map(|v| v.name.as_str()), "x");
    let row_names = unique_names(
        model
            .linear_constraints()
            .iter()
            .map(|c| c.name.as_str())
            .chain(model.indicator_constraints().iter().map(|c| c.name.as_str())),
        "c",
    );

    writeln!(out, "\\ Model {}", model.name())?;
    match model.objective_sense() {
        ObjectiveSense::Minimize => writeln!(out, "Minimize")?,
        ObjectiveSense::Maximize => writeln!(out, "Maximize")?,
    }
    writeln!(out, " obj: {}", format_expr(model.objective(), &var_names))?;

    writeln!(out, "Subject To")?;
    let mut rows = row_names.iter();
    for constraint in model.linear_constraints() {
        let name = rows.next().map(String::as_str).unwrap_or("c");
        writeln!(
            out,
            " {}: {} {} {}",
            name,
            format_expr(&constraint.expr, &var_names),
            constraint.sense,
            format_number(constraint.rhs)
        )?;
    }
    for constraint in model.indicator_constraints() {
        let name = rows.next().map(String::as_str).unwrap_or("c");
        writeln!(
            out,
            " {}: {} = {} -> {} {} {}",
            name,
            var_names[constraint.binary.index()],
            if constraint.active_value { 1 } else { 0 },
            format_expr(&constraint.expr, &var_names),
            constraint.sense,
            format_number(constraint.rhs)
        )?;
    }

    writeln!(out, "Bounds")?;
    for (variable, name) in model.variables().iter().zip(&var_names) {
        let default_bounds = match variable.vtype {
            VarType::Binary => variable.lb == 0.0 && variable.ub == 1.0,
            _ => variable.lb == 0.0 && variable.ub == f64::INFINITY,
        };
        if default_bounds {
            continue;
        }
        if variable.lb == f64::NEG_INFINITY && variable.ub == f64::INFINITY {
            writeln!(out, " {} free", name)?;
        } else if variable.lb == variable.ub {
            writeln!(out, " {} = {}", name, format_number(variable.lb))?;
        } else {
            writeln!(
                out,
                " {} <= {} <= {}",
                format_number(variable.lb),
                name,
                format_number(variable.ub)
            )?;
        }
    }

    let binaries: Vec<&str> = model
        .variables()
        .iter()
        .zip(&var_names)
        .filter(|(v, _)| v.vtype == VarType::Binary)
        .map(|(_, n)| n.as_str())
        .collect();
    if !binaries.is_empty() {
        writeln!(out, "Binaries")?;
        write_name_block(out, &binaries)?;
    }

    let generals: Vec<&str> = model
        .variables()
        .iter()
        .zip(&var_names)
        .filter(|(v, _)| v.vtype == VarType::Integer)
        .map(|(_, n)| n.as_str())
        .collect();
    if !generals.is_empty() {
        writeln!(out, "Generals")?;
        write_name_block(out, &generals)?;
    }

    writeln!(out, "End")
}

fn write_name_block<W: Write>(out: &mut W, names: &[&str]) -> io::Result<()> {
    for chunk in names.chunks(8) {
        writeln!(out, " {}", chunk.join(" "))?;
    }
    Ok(())
}

fn format_expr(expr: &LinExpr, names: &[String]) -> String {
    let mut text = String::new();
    for (var, coeff) in expr.terms() {
        let name = &names[var.index()];
        if text.is_empty() {
            if coeff < 0.0 {
                text.push_str("- ");
            }
        } else if coeff < 0.0 {
            text.push_str(" - ");
        } else {
            text.push_str(" + ");
        }
        let magnitude = coeff.abs();
        if magnitude != 1.0 {
            text.push_str(&format_number(magnitude));
            text.push(' ');
        }
        text.push_str(name);
    }
    if text.is_empty() {
        text.push_str("0");
    }
    text
}

fn format_number(value: f64) -> String {
    if value == f64::INFINITY {
        "+infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-infinity".to_string()
    } else {
        format!("{}", value)
    }
}

/// Sanitize names for the LP grammar and suffix duplicates with their position.
fn unique_names<'a, I>(names: I, fallback: &str) -> Vec<String>
where
    I: Iterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    names
        .enumerate()
        .map(|(index, raw)| {
            let mut name: String = raw
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || "_[],.#".contains(c) {
                        c
                    } else {
                        '_'
                    }
                })
                .collect();
            if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
                name = format!("{}{}", fallback, name);
            }
            if !seen.insert(name.clone()) {
                name = format!("{}#{}", name, index);
                seen.insert(name.clone());
            }
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::OptimizationModel;
    use crate::core::types::Sense;

    fn render(model: &Model) -> String {
        let mut buffer = Vec::new();
        write_lp(model, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_write_lp_sections() {
        let mut model = Model::new("demo");
        let x = model.add_var("x", f64::NEG_INFINITY, f64::INFINITY, VarType::Continuous);
        let y = model.add_var("y", -1.0, 2.5, VarType::Continuous);
        let b = model.add_var("b", 0.0, 1.0, VarType::Binary);
        model
            .set_objective(LinExpr::from(x) + LinExpr::term(y, 2.0), ObjectiveSense::Maximize)
            .unwrap();
        model
            .add_linear("row", LinExpr::from(x) - LinExpr::from(y), Sense::Le, 1.0)
            .unwrap();
        model
            .add_indicator("ind", b, true, LinExpr::from(x), Sense::Ge, 0.5)
            .unwrap();

        let text = render(&model);
        assert!(text.starts_with("\\ Model demo\nMaximize\n obj: x + 2 y\n"));
        assert!(text.contains(" row: x - y <= 1\n"));
        assert!(text.contains(" ind: b = 1 -> x >= 0.5\n"));
        assert!(text.contains(" x free\n"));
        assert!(text.contains(" -1 <= y <= 2.5\n"));
        assert!(text.contains("Binaries\n b\n"));
        assert!(!text.contains("Generals"));
        assert!(text.ends_with("End\n"));
    }

    #[test]
    fn test_duplicate_names_made_unique() {
        let names = unique_names(["node[0,0]", "node[0,0]", "a b", "1x"].into_iter(), "x");
        assert_eq!(names, vec!["node[0,0]", "node[0,0]#1", "a_b", "x1x"]);
    }

    #[test]
    fn test_fixed_and_infinite_bounds() {
        let mut model = Model::new("bounds");
        let x = model.add_var("x", 0.0, f64::INFINITY, VarType::Continuous);
        model.add_var("y", f64::NEG_INFINITY, 3.0, VarType::Continuous);
        model.fix(x, 2.0).unwrap();
        let text = render(&model);
        assert!(text.contains(" x = 2\n"));
        assert!(text.contains(" -infinity <= y <= 3\n"));
    }
}
