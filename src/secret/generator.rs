//! Constrained secret value generator.
//!
//! A `GeneratorConfig` describes which character classes may appear in a
//! generated value, how many characters each enabled class must contribute
//! at minimum, and the total length. `generate` draws the required minimums
//! first, fills the remainder from the union of enabled pools, and shuffles
//! the result.
//!
//! All randomness comes from `rand::rng()`, a ChaCha-based CSPRNG seeded
//! from the operating system.

use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use crate::errors::{ProviderError, Result};

/// Default total length of a generated value.
pub const DEFAULT_LENGTH: u32 = 64;

/// Longest value the generator will produce.
pub const MAX_LENGTH: u32 = 128;

/// Inclusive range accepted for every `min_*` count.
pub const MIN_COUNT_RANGE: std::ops::RangeInclusive<u32> = 1..=9;

/// Characters dropped from every pool when `avoid_ambiguous` is set.
pub const AMBIGUOUS: &[char] = &['I', 'O', 'l', '0', '1'];

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const NUMBERS: &str = "0123456789";
const SPECIAL: &str = "!@#$%^&*";

/// The four character classes a generated value can draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Lowercase,
    Uppercase,
    Numbers,
    Special,
}

impl CharClass {
    pub const ALL: [CharClass; 4] = [
        CharClass::Lowercase,
        CharClass::Uppercase,
        CharClass::Numbers,
        CharClass::Special,
    ];

    /// Attribute name of the flag enabling this class.
    pub fn enabled_attribute(self) -> &'static str {
        match self {
            CharClass::Lowercase => "lowercase",
            CharClass::Uppercase => "uppercase",
            CharClass::Numbers => "numbers",
            CharClass::Special => "special",
        }
    }

    /// Attribute name of the `min_*` knob for this class.
    pub fn min_attribute(self) -> &'static str {
        match self {
            CharClass::Lowercase => "min_lowercase",
            CharClass::Uppercase => "min_uppercase",
            CharClass::Numbers => "min_number",
            CharClass::Special => "min_special",
        }
    }

    fn charset(self) -> &'static str {
        match self {
            CharClass::Lowercase => LOWERCASE,
            CharClass::Uppercase => UPPERCASE,
            CharClass::Numbers => NUMBERS,
            CharClass::Special => SPECIAL,
        }
    }

    /// Characters available for this class.
    pub fn pool(self, avoid_ambiguous: bool) -> Vec<char> {
        self.charset()
            .chars()
            .filter(|c| !(avoid_ambiguous && AMBIGUOUS.contains(c)))
            .collect()
    }

    /// Returns `true` if `c` belongs to this class (ignoring ambiguity rules).
    pub fn contains(self, c: char) -> bool {
        self.charset().contains(c)
    }
}

/// Constraints for synthesizing a secret value.
///
/// Equality is structural: two configs are equal only if every knob
/// matches, which is what update-time drift detection relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_length")]
    pub length: u32,

    #[serde(default)]
    pub avoid_ambiguous: bool,

    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_min")]
    pub min_lowercase: u32,

    #[serde(default = "default_true")]
    pub uppercase: bool,
    #[serde(default = "default_min")]
    pub min_uppercase: u32,

    #[serde(default = "default_true")]
    pub numbers: bool,
    #[serde(default = "default_min")]
    pub min_number: u32,

    #[serde(default)]
    pub special: bool,
    #[serde(default = "default_min")]
    pub min_special: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_length() -> u32 {
    DEFAULT_LENGTH
}

fn default_true() -> bool {
    true
}

fn default_min() -> u32 {
    1
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            avoid_ambiguous: false,
            lowercase: true,
            min_lowercase: default_min(),
            uppercase: true,
            min_uppercase: default_min(),
            numbers: true,
            min_number: default_min(),
            special: false,
            min_special: default_min(),
        }
    }
}

impl GeneratorConfig {
    pub fn is_enabled(&self, class: CharClass) -> bool {
        match class {
            CharClass::Lowercase => self.lowercase,
            CharClass::Uppercase => self.uppercase,
            CharClass::Numbers => self.numbers,
            CharClass::Special => self.special,
        }
    }

    pub fn minimum(&self, class: CharClass) -> u32 {
        match class {
            CharClass::Lowercase => self.min_lowercase,
            CharClass::Uppercase => self.min_uppercase,
            CharClass::Numbers => self.min_number,
            CharClass::Special => self.min_special,
        }
    }

    /// Sum of all four `min_*` counts, enabled or not.
    pub fn minimum_total(&self) -> u32 {
        CharClass::ALL.iter().map(|c| self.minimum(*c)).sum()
    }

    /// Check every constraint without generating anything.
    ///
    /// `length` must lie between the sum of all four minimums and
    /// `MAX_LENGTH`. Every minimum must lie in 1..=9 and at least one
    /// class must be enabled.
    pub fn validate(&self) -> Result<()> {
        if self.length > MAX_LENGTH {
            return Err(ProviderError::InvalidConstraint(format!(
                "length ({}) must be at most {MAX_LENGTH}",
                self.length
            )));
        }

        for class in CharClass::ALL {
            let min = self.minimum(class);
            if !MIN_COUNT_RANGE.contains(&min) {
                return Err(ProviderError::InvalidConstraint(format!(
                    "{} must be between {} and {}, got {min}",
                    class.min_attribute(),
                    MIN_COUNT_RANGE.start(),
                    MIN_COUNT_RANGE.end()
                )));
            }
        }

        if !CharClass::ALL.iter().any(|c| self.is_enabled(*c)) {
            return Err(ProviderError::InvalidConstraint(
                "at least one of lowercase, uppercase, numbers or special must be enabled".into(),
            ));
        }

        let total = self.minimum_total();
        if self.length < total {
            return Err(ProviderError::InvalidConstraint(format!(
                "length ({}) must be at least the sum of min_lowercase ({}), min_uppercase ({}), min_number ({}) and min_special ({}), which is {total}",
                self.length, self.min_lowercase, self.min_uppercase, self.min_number, self.min_special
            )));
        }

        Ok(())
    }
}

/// Generate a value satisfying `config`.
pub fn generate(config: &GeneratorConfig) -> Result<String> {
    config.validate()?;

    let mut rng = rand::rng();
    let length = config.length as usize;
    let mut chars: Vec<char> = Vec::with_capacity(length);
    let mut union: Vec<char> = Vec::new();

    for class in CharClass::ALL {
        if !config.is_enabled(class) {
            continue;
        }
        let pool = class.pool(config.avoid_ambiguous);
        for _ in 0..config.minimum(class) {
            // Pools are static and never empty, even with ambiguity filtering.
            if let Some(c) = pool.choose(&mut rng) {
                chars.push(*c);
            }
        }
        union.extend(pool);
    }

    while chars.len() < length {
        match union.choose(&mut rng) {
            Some(c) => chars.push(*c),
            None => {
                return Err(ProviderError::InvalidConstraint(
                    "no characters available to generate from".into(),
                ))
            }
        }
    }

    chars.shuffle(&mut rng);
    Ok(chars.into_iter().collect())
}
