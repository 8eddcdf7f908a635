//! Prefix-tagged entity IDs.
//!
//! The prefix only makes IDs readable in logs; nothing parses it back.

use uuid::Uuid;

pub const SECTION_PREFIX: &str = "s-";
pub const PARAGRAPH_PREFIX: &str = "p-";
pub const SENTENCE_PREFIX: &str = "sn-";

/// Sequential ID generator scoped to one engine
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    /// Generator with a random seed, unique across engines and reloads
    pub fn new() -> Self {
        Self::from_seed(Uuid::new_v4().simple().to_string())
    }

    /// Generator with a fixed seed; the same seed yields the same IDs
    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    pub fn section_id(&mut self) -> String {
        self.next_with(SECTION_PREFIX)
    }

    pub fn paragraph_id(&mut self) -> String {
        self.next_with(PARAGRAPH_PREFIX)
    }

    pub fn sentence_id(&mut self) -> String {
        self.next_with(SENTENCE_PREFIX)
    }

    /// Next section ID for which `taken` is false
    pub fn unused_section_id(&mut self, taken: impl Fn(&str) -> bool) -> String {
        self.next_unused(SECTION_PREFIX, taken)
    }

    /// Next paragraph ID for which `taken` is false
    pub fn unused_paragraph_id(&mut self, taken: impl Fn(&str) -> bool) -> String {
        self.next_unused(PARAGRAPH_PREFIX, taken)
    }

    /// Next sentence ID for which `taken` is false
    pub fn unused_sentence_id(&mut self, taken: impl Fn(&str) -> bool) -> String {
        self.next_unused(SENTENCE_PREFIX, taken)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    fn next_with(&mut self, prefix: &str) -> String {
        self.count += 1;
        format!("{}{}-{}", prefix, self.seed, self.count)
    }

    // A document loaded from disk may already hold IDs minted from this seed
    fn next_unused(&mut self, prefix: &str, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let id = self.next_with(prefix);
            if !taken(&id) {
                return id;
            }
            tracing::trace!(id = %id, "Skipping generated ID already in use");
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
