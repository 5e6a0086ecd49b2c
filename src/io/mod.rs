//! Reading and writing trained predictors.

pub mod predictor_file;

pub use predictor_file::{load_predictor, save_predictor, PredictorFile};
