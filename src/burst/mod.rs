//! Content-burst adversarial generation
//!
//! Pipeline: tagged tokens → [`NounFrequencyTable`] → [`BurstGenerator`]
//! → ordered corpus of [`GeneratedBurst`](crate::models::GeneratedBurst).
//!
//! Every generator carries its own seed, so combinations generated in
//! parallel never share an RNG stream.

mod frequency;
mod generator;

pub use frequency::{NounEntry, NounFrequencyTable};
pub use generator::{
    generate, generate_burst_dataset, BurstGenerator, DEFAULT_BURST_AMOUNT,
    DEFAULT_MAX_REJECTIONS, DEFAULT_TARGET_LENGTH,
};
