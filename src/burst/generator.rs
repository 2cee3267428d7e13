//! Content-burst generator
//!
//! A burst starts from a uniformly drawn noun, then appends nouns drawn
//! with replacement in proportion to their frequency until the sentence
//! reaches the target length. Single-character draws are rejected and
//! redrawn. The last token may overshoot the target.

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use super::NounFrequencyTable;
use crate::error::{ArrError, ArrResult};
use crate::models::GeneratedBurst;

/// Default target sentence length in characters
pub const DEFAULT_TARGET_LENGTH: usize = 44;

/// Default number of bursts per corpus
pub const DEFAULT_BURST_AMOUNT: usize = 1000;

/// Consecutive single-character draws tolerated for one token position
pub const DEFAULT_MAX_REJECTIONS: usize = 10_000;

/// Seeded burst generator. Owns its RNG stream exclusively.
#[derive(Debug, Clone)]
pub struct BurstGenerator {
    rng: ChaCha8Rng,
    target_length: usize,
    max_rejections: usize,
}

impl BurstGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            target_length: DEFAULT_TARGET_LENGTH,
            max_rejections: DEFAULT_MAX_REJECTIONS,
        }
    }

    pub fn with_target_length(mut self, target_length: usize) -> Self {
        self.target_length = target_length;
        self
    }

    pub fn with_max_rejections(mut self, max_rejections: usize) -> Self {
        self.max_rejections = max_rejections.max(1);
        self
    }

    pub fn target_length(&self) -> usize {
        self.target_length
    }

    /// Generate one burst sentence.
    pub fn generate(&mut self, table: &NounFrequencyTable) -> ArrResult<String> {
        let sampler = Sampler::new(table)?;
        self.draw_sentence(&sampler)
    }

    /// Generate `count` bursts in order, all from this generator's stream.
    pub fn generate_dataset(
        &mut self,
        table: &NounFrequencyTable,
        count: usize,
        source_prompt_id: &str,
    ) -> ArrResult<Vec<GeneratedBurst>> {
        let sampler = Sampler::new(table)?;
        let mut bursts = Vec::with_capacity(count);

        for _ in 0..count {
            let text = self.draw_sentence(&sampler)?;
            bursts.push(GeneratedBurst {
                text,
                source_prompt_id: source_prompt_id.to_string(),
            });
        }

        info!(
            prompt = source_prompt_id,
            bursts = bursts.len(),
            vocabulary = table.len(),
            target_length = self.target_length,
            "generated burst corpus"
        );
        Ok(bursts)
    }

    fn draw_sentence(&mut self, sampler: &Sampler<'_>) -> ArrResult<String> {
        let nouns = sampler.table.entries();

        // Sentence position one is uniform over the key set, not weighted
        let start = &nouns[self.rng.random_range(0..nouns.len())].noun;
        let mut sentence = start.clone();
        let mut length = start.chars().count();

        if length < self.target_length && !sampler.table.has_multi_char_noun() {
            return Err(ArrError::GenerationStalled { attempts: 0 });
        }

        while length < self.target_length {
            let noun = self.draw_multi_char(sampler)?;
            sentence.push(' ');
            sentence.push_str(noun);
            length += 1 + noun.chars().count();
        }

        Ok(sentence)
    }

    fn draw_multi_char<'t>(&mut self, sampler: &Sampler<'t>) -> ArrResult<&'t str> {
        for _ in 0..self.max_rejections {
            let noun = sampler.table.entries()[sampler.weights.sample(&mut self.rng)]
                .noun
                .as_str();
            if noun.chars().count() > 1 {
                return Ok(noun);
            }
        }
        debug!(attempts = self.max_rejections, "single-character draws exhausted");
        Err(ArrError::GenerationStalled {
            attempts: self.max_rejections,
        })
    }
}

/// Frequency-proportional index over one table.
struct Sampler<'t> {
    table: &'t NounFrequencyTable,
    weights: WeightedIndex<f64>,
}

impl<'t> Sampler<'t> {
    fn new(table: &'t NounFrequencyTable) -> ArrResult<Self> {
        if table.is_empty() {
            return Err(ArrError::EmptyVocabulary);
        }
        let weights = WeightedIndex::new(table.entries().iter().map(|e| e.frequency))
            .map_err(|_| ArrError::EmptyVocabulary)?;
        Ok(Self { table, weights })
    }
}

/// Generate a single burst with a fresh generator seeded by `seed`.
pub fn generate(table: &NounFrequencyTable, target_length: usize, seed: u64) -> ArrResult<String> {
    BurstGenerator::new(seed)
        .with_target_length(target_length)
        .generate(table)
}

/// Generate an ordered corpus of `count` bursts from one seeded stream.
pub fn generate_burst_dataset(
    table: &NounFrequencyTable,
    count: usize,
    target_length: usize,
    seed: u64,
    source_prompt_id: &str,
) -> ArrResult<Vec<GeneratedBurst>> {
    BurstGenerator::new(seed)
        .with_target_length(target_length)
        .generate_dataset(table, count, source_prompt_id)
}
