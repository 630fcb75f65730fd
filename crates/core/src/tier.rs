//! Subscription tiers and their generation quotas.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Subscription plan level. Stored as lowercase text in `users.subscription_tier`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Basic,
    Premium,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Free, Tier::Basic, Tier::Premium];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Basic => "basic",
            Tier::Premium => "premium",
        }
    }

    /// Complete generations allowed per period. `None` means unlimited.
    pub fn generation_quota(self) -> Option<i32> {
        match self {
            Tier::Free => Some(3),
            Tier::Basic => Some(20),
            Tier::Premium => None,
        }
    }

    /// Counter value to store when a user is moved onto this tier.
    /// Unlimited tiers store 0 and are never decremented.
    pub fn initial_remaining(self) -> i32 {
        self.generation_quota().unwrap_or(0)
    }

    pub fn is_unlimited(self) -> bool {
        self.generation_quota().is_none()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid tier '{s}'. Must be one of: free, basic, premium"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotas() {
        assert_eq!(Tier::Free.generation_quota(), Some(3));
        assert_eq!(Tier::Basic.generation_quota(), Some(20));
        assert!(Tier::Premium.is_unlimited());
        assert_eq!(Tier::Premium.initial_remaining(), 0);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Basic".parse::<Tier>().unwrap(), Tier::Basic);
        assert_eq!(" premium ".parse::<Tier>().unwrap(), Tier::Premium);
        assert!("gold".parse::<Tier>().is_err());
    }

    #[test]
    fn round_trips_through_display() {
        for tier in Tier::ALL {
            assert_eq!(tier.to_string().parse::<Tier>().unwrap(), tier);
        }
    }
}
