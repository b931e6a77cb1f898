//! Synthetic value generation for the replacement strategy.
//!
//! The replacer swaps each detected span for a value obtained from a
//! [`ValueGenerator`]. The built-in [`FakeDataGenerator`] draws
//! French-flavored synthetic data from a seeded RNG: same seed, same
//! sequence, across runs. Callers can plug their own generator through the
//! trait; a failing custom generator aborts the whole `replace` call.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::EntityKind;

/// Seed used when no explicit seed is configured.
pub const DEFAULT_SEED: u64 = 123;

/// Error surfaced by a value generator.
#[derive(Debug, thiserror::Error)]
#[error("value generation failed for {kind}: {reason}")]
pub struct GeneratorError {
    /// Kind the generator was asked for.
    pub kind: EntityKind,
    /// Generator-specific description.
    pub reason: String,
}

/// Per-kind synthetic value source.
///
/// `generate` takes `&mut self` so implementations can advance an internal
/// RNG or counter between calls.
pub trait ValueGenerator {
    /// Produce a synthetic value for `kind`.
    fn generate(&mut self, kind: EntityKind) -> Result<String, GeneratorError>;
}

const FIRST_NAMES: &[&str] = &[
    "Camille", "Lucas", "Emma", "Hugo", "Jeanne", "Louis", "Manon", "Jules", "Alice", "Nathan",
    "Margaux", "Antoine", "Clara", "Paul", "Juliette", "Arthur",
];

const LAST_NAMES: &[&str] = &[
    "Martin", "Bernard", "Dubois", "Thomas", "Robert", "Richard", "Petit", "Durand", "Leroy",
    "Moreau", "Simon", "Laurent", "Lefebvre", "Roux", "Fournier", "Girard",
];

const CITIES: &[&str] = &[
    "Lyon", "Marseille", "Toulouse", "Nantes", "Bordeaux", "Lille", "Rennes", "Reims", "Dijon",
    "Angers", "Grenoble", "Tours",
];

const STREET_KINDS: &[&str] = &["rue", "avenue", "boulevard", "chemin", "place", "impasse"];

const STREET_NAMES: &[&str] = &[
    "de la Gare", "Victor Hugo", "des Lilas", "de la Paix", "Saint-Michel", "du Moulin",
    "Jean Jaures", "de Verdun", "des Tilleuls", "Pasteur",
];

const ORG_SUFFIXES: &[&str] = &["SA", "SARL", "et Fils", "Groupe", "SAS", "et Associes"];

const MISC_WORDS: &[&str] = &[
    "soleil", "riviere", "montagne", "liberte", "horizon", "jardin", "papillon", "etoile",
    "moulin", "cascade", "prairie", "aurore",
];

const EMAIL_DOMAINS: &[&str] = &[
    "example.com", "exemple.fr", "courriel.net", "messagerie.fr", "boite-mail.org",
];

/// Seeded generator of French-flavored synthetic PII.
///
/// Values per kind: person full name, city, street address, `DD-MM-YYYY`
/// date, organization name, capitalized word sequence for Misc, French phone
/// number, ASCII email. The mapping from kind to production is an exhaustive
/// `match`, so a new `EntityKind` variant fails compilation here rather than
/// at run time.
pub struct FakeDataGenerator {
    rng: StdRng,
}

impl FakeDataGenerator {
    /// Create a generator with an explicit seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick<'a>(&mut self, pool: &'a [&'a str]) -> &'a str {
        pool[self.rng.gen_range(0..pool.len())]
    }

    fn person(&mut self) -> String {
        format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES))
    }

    fn city(&mut self) -> String {
        self.pick(CITIES).to_string()
    }

    fn address(&mut self) -> String {
        format!(
            "{} {} {}, {}",
            self.rng.gen_range(1..200),
            self.pick(STREET_KINDS),
            self.pick(STREET_NAMES),
            self.pick(CITIES)
        )
    }

    fn date(&mut self) -> String {
        // Day capped at 28 so any month is valid.
        format!(
            "{:02}-{:02}-{}",
            self.rng.gen_range(1..=28),
            self.rng.gen_range(1..=12),
            self.rng.gen_range(1950..=2020)
        )
    }

    fn org(&mut self) -> String {
        format!("{} {}", self.pick(LAST_NAMES), self.pick(ORG_SUFFIXES))
    }

    fn misc(&mut self) -> String {
        let words: Vec<String> = (0..3)
            .map(|_| capitalize(self.pick(MISC_WORDS)))
            .collect();
        words.join(" ")
    }

    fn phone(&mut self) -> String {
        let mut number = format!("0{}", self.rng.gen_range(1..=9));
        for _ in 0..4 {
            number.push_str(&format!(" {:02}", self.rng.gen_range(0..100)));
        }
        number
    }

    fn email(&mut self) -> String {
        format!(
            "{}.{}@{}",
            self.pick(FIRST_NAMES).to_lowercase(),
            self.pick(LAST_NAMES).to_lowercase(),
            self.pick(EMAIL_DOMAINS)
        )
    }
}

impl Default for FakeDataGenerator {
    fn default() -> Self {
        Self::seeded(DEFAULT_SEED)
    }
}

impl ValueGenerator for FakeDataGenerator {
    fn generate(&mut self, kind: EntityKind) -> Result<String, GeneratorError> {
        let value = match kind {
            EntityKind::Address => self.address(),
            EntityKind::Person => self.person(),
            EntityKind::Location => self.city(),
            EntityKind::Date => self.date(),
            EntityKind::Org => self.org(),
            EntityKind::Misc => self.misc(),
            EntityKind::Phone => self.phone(),
            EntityKind::Email => self.email(),
        };
        Ok(value)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = FakeDataGenerator::seeded(42);
        let mut b = FakeDataGenerator::seeded(42);
        for kind in EntityKind::ALL {
            assert_eq!(a.generate(kind).unwrap(), b.generate(kind).unwrap());
        }
    }

    #[test]
    fn test_sequence_advances_between_calls() {
        let mut gen = FakeDataGenerator::seeded(7);
        let values: Vec<String> = (0..8)
            .map(|_| gen.generate(EntityKind::Person).unwrap())
            .collect();
        // Not all identical: the RNG state moves forward.
        assert!(values.iter().any(|v| v != &values[0]));
    }

    #[test]
    fn test_date_format() {
        let mut gen = FakeDataGenerator::seeded(1);
        for _ in 0..20 {
            let date = gen.generate(EntityKind::Date).unwrap();
            let parts: Vec<&str> = date.split('-').collect();
            assert_eq!(parts.len(), 3, "bad date {date}");
            assert_eq!(parts[0].len(), 2);
            assert_eq!(parts[1].len(), 2);
            assert_eq!(parts[2].len(), 4);
        }
    }

    #[test]
    fn test_phone_shape() {
        let mut gen = FakeDataGenerator::seeded(1);
        let phone = gen.generate(EntityKind::Phone).unwrap();
        assert_eq!(phone.len(), 14);
        assert!(phone.starts_with('0'));
    }

    #[test]
    fn test_email_shape() {
        let mut gen = FakeDataGenerator::seeded(1);
        let email = gen.generate(EntityKind::Email).unwrap();
        assert!(email.contains('@'));
        assert!(email.is_ascii());
    }

    #[test]
    fn test_misc_words_capitalized() {
        let mut gen = FakeDataGenerator::seeded(1);
        let misc = gen.generate(EntityKind::Misc).unwrap();
        for word in misc.split(' ') {
            assert!(word.chars().next().unwrap().is_uppercase());
        }
    }
}
