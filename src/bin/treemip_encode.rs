//! Encode a predictor document into an LP file.
//!
//! The generated model has `examples x features` bounded input variables,
//! the predictor constraints, and the objective of maximizing the sum of
//! the predicted outputs.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use treemip::{
    add_predictor_constr, load_predictor, EncoderConfig, LinExpr, Model, ObjectiveSense,
    OptimizationModel, PredictorConstraints, VarType,
};

/// Arguments of `treemip-encode`
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "treemip-encode", version, about = "Encode a trained tree predictor as MIP constraints")]
struct EncodeArgs {
    /// Predictor document (JSON)
    predictor: PathBuf,

    /// LP file to write
    output: PathBuf,

    /// Encoder configuration (.json or .toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of examples to encode
    #[arg(long, default_value_t = 1)]
    examples: usize,

    /// Lower bound of every input variable
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    lb: f64,

    /// Upper bound of every input variable
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    ub: f64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = EncodeArgs::parse();

    anyhow::ensure!(args.examples > 0, "--examples must be at least 1");
    anyhow::ensure!(
        args.lb <= args.ub,
        "--lb ({}) must not exceed --ub ({})",
        args.lb,
        args.ub
    );

    let mut config = match &args.config {
        Some(path) => EncoderConfig::load_from_file(path)
            .with_context(|| format!("reading configuration {}", path.display()))?,
        None => EncoderConfig::default(),
    };
    config.apply_environment_overrides()?;

    let predictor = load_predictor(&args.predictor)
        .with_context(|| format!("reading predictor {}", args.predictor.display()))?;

    let mut model = Model::new(
        args.predictor
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("treemip"),
    );
    let features = predictor.n_features_required().max(1);
    let input = model.add_vars(
        (args.examples, features),
        args.lb,
        args.ub,
        VarType::Continuous,
        "x",
    );
    let constr = add_predictor_constr(&mut model, &predictor, &input, None, &config)?;

    let objective = LinExpr::sum(constr.output().iter().copied());
    model.set_objective(objective, ObjectiveSense::Maximize)?;
    model
        .save_lp(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    constr.print_stats(&mut out, false)?;
    Ok(())
}
