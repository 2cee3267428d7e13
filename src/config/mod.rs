//! Configuration for burstarr
//!
//! This module handles:
//! - Sweep settings (burstarr.toml): seeds, folds, burst sizes
//! - Input/output directory layout
//! - Per-source text encodings
//! - Scoring model hyperparameters

mod sweep_config;

pub use sweep_config::{
    load_config, EncodingConfig, PathConfig, SweepConfig, CONFIG_FILE_NAME, SEED_ENV_VAR,
};
