//! Core infrastructure for treemip.
//!
//! - [`types`]: variable handles, constraint senses, index aliases
//! - [`constants`]: encoder defaults and environment variable names
//! - [`error`]: the crate error type
//! - [`traits`]: the solver seam and the encoder record interface
//!
//! ```rust
//! use treemip::core::{
//!     constants::DEFAULT_EPSILON,
//!     error::{Result, TreeMipError},
//!     types::{Sense, VarType},
//! };
//!
//! assert!(Sense::Le.holds(1.0, 1.0, 0.0));
//! assert!(DEFAULT_EPSILON > 0.0);
//! # let _ = VarType::Binary;
//! # Ok::<(), TreeMipError>(())
//! ```

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use constants::*;
pub use error::{Result, TreeMipError};
pub use traits::*;
pub use types::*;

use std::sync::atomic::{AtomicBool, Ordering};

static CORE_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Set up logging. Safe to call more than once.
pub fn initialize_core() -> Result<()> {
    if CORE_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    // Another logger may already be installed by the host application
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    log::debug!("treemip {} initialized", TREEMIP_VERSION);
    Ok(())
}

/// Whether [`initialize_core`] has run.
pub fn is_core_initialized() -> bool {
    CORE_INITIALIZED.load(Ordering::SeqCst)
}
