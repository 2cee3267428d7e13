//! burstarr - content-burst adversarials for automated answer scoring
//!
//! Builds noun-frequency "content bursts" from tagged prompt texts, trains
//! an answer-scoring model per (language, prompt), and measures the
//! Adversarial Rejection Rate: how often that model scores a burst 0.

pub mod burst;
pub mod cli;
pub mod config;
pub mod encoding;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod io;
pub mod models;
pub mod scoring;
pub mod sweep;
pub mod tagging;

pub use error::{ArrError, ArrResult};
