//! Bot mode selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Selects which external solver handles the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BotMode {
    /// Equivalent fractions drills.
    EquivalentFractions,
    /// Factors and primes drills.
    FactorsPrimes,
}

impl BotMode {
    /// All known modes.
    pub const ALL: [BotMode; 2] = [BotMode::EquivalentFractions, BotMode::FactorsPrimes];

    /// Wire/storage name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            BotMode::EquivalentFractions => "equivalent-fractions",
            BotMode::FactorsPrimes => "factors-primes",
        }
    }

    /// Short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            BotMode::EquivalentFractions => "Fractions",
            BotMode::FactorsPrimes => "Factors",
        }
    }
}

impl fmt::Display for BotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BotMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equivalent-fractions" | "fractions" => Ok(BotMode::EquivalentFractions),
            "factors-primes" | "factors" => Ok(BotMode::FactorsPrimes),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_serialize() {
        let json = serde_json::to_string(&BotMode::EquivalentFractions).unwrap();
        assert_eq!(json, "\"equivalent-fractions\"");
        let mode: BotMode = serde_json::from_str("\"factors-primes\"").unwrap();
        assert_eq!(mode, BotMode::FactorsPrimes);
    }

    #[test]
    fn test_mode_from_str_accepts_short_names() {
        assert_eq!("fractions".parse::<BotMode>().unwrap(), BotMode::EquivalentFractions);
        assert_eq!("factors".parse::<BotMode>().unwrap(), BotMode::FactorsPrimes);
        assert!("algebra".parse::<BotMode>().is_err());
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(BotMode::EquivalentFractions.label(), "Fractions");
        assert_eq!(BotMode::FactorsPrimes.label(), "Factors");
        assert_eq!(BotMode::FactorsPrimes.to_string(), "factors-primes");
    }
}
