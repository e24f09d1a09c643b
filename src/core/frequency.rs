//! K-line frequency selection.
//!
//! The protocol addresses bar endpoints with numeric categories 0..=11.
//! Two of them are aliases (4 and 9 are both daily, 7 and 8 both minute
//! resolution); parsing accepts either id and normalizes.

use serde::{Deserialize, Serialize};

use crate::utils::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Min1,
    Min5,
    Min15,
    Min30,
    Hour1,
    Day,
    Week,
    Month,
    Quarter,
    Year,
    /// Minute-resolution tick category (wire id 7).
    Tick,
}

impl Frequency {
    /// Wire category understood by the bar endpoints.
    pub fn category(&self) -> u16 {
        match self {
            Frequency::Min5 => 0,
            Frequency::Min15 => 1,
            Frequency::Min30 => 2,
            Frequency::Hour1 => 3,
            Frequency::Week => 5,
            Frequency::Month => 6,
            Frequency::Tick => 7,
            Frequency::Min1 => 8,
            Frequency::Day => 9,
            Frequency::Quarter => 10,
            Frequency::Year => 11,
        }
    }

    /// Accepts any of the protocol's 0..=11 ids, normalizing aliases.
    pub fn from_category(id: u16) -> Result<Frequency> {
        match id {
            0 => Ok(Frequency::Min5),
            1 => Ok(Frequency::Min15),
            2 => Ok(Frequency::Min30),
            3 => Ok(Frequency::Hour1),
            4 | 9 => Ok(Frequency::Day),
            5 => Ok(Frequency::Week),
            6 => Ok(Frequency::Month),
            7 => Ok(Frequency::Tick),
            8 => Ok(Frequency::Min1),
            10 => Ok(Frequency::Quarter),
            11 => Ok(Frequency::Year),
            _ => Err(Error::Validation(format!("invalid frequency id: {}", id))),
        }
    }

    /// Parse a mnemonic (`"day"`, `"5m"`, ...) or a numeric id.
    pub fn parse(s: &str) -> Result<Frequency> {
        if let Ok(id) = s.parse::<u16>() {
            return Frequency::from_category(id);
        }

        match s.to_lowercase().as_str() {
            "1m" | "1min" => Ok(Frequency::Min1),
            "5m" | "5min" => Ok(Frequency::Min5),
            "15m" | "15min" => Ok(Frequency::Min15),
            "30m" | "30min" => Ok(Frequency::Min30),
            "1h" | "hour" => Ok(Frequency::Hour1),
            "day" | "d" | "days" => Ok(Frequency::Day),
            "week" | "w" => Ok(Frequency::Week),
            "mon" | "month" => Ok(Frequency::Month),
            "quarter" | "q" => Ok(Frequency::Quarter),
            "year" | "y" => Ok(Frequency::Year),
            "tick" => Ok(Frequency::Tick),
            _ => Err(Error::Validation(format!("invalid frequency: {}", s))),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Frequency::Min1 => "1m",
            Frequency::Min5 => "5m",
            Frequency::Min15 => "15m",
            Frequency::Min30 => "30m",
            Frequency::Hour1 => "1h",
            Frequency::Day => "day",
            Frequency::Week => "week",
            Frequency::Month => "month",
            Frequency::Quarter => "quarter",
            Frequency::Year => "year",
            Frequency::Tick => "tick",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Frequency::parse(s).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonic_parsing() {
        assert_eq!(Frequency::parse("day").unwrap(), Frequency::Day);
        assert_eq!(Frequency::parse("5m").unwrap(), Frequency::Min5);
        assert_eq!(Frequency::parse("w").unwrap(), Frequency::Week);
        assert!(Frequency::parse("fortnight").is_err());
    }

    #[test]
    fn test_numeric_aliases() {
        assert_eq!(Frequency::parse("4").unwrap(), Frequency::Day);
        assert_eq!(Frequency::parse("9").unwrap(), Frequency::Day);
        assert_eq!(Frequency::parse("8").unwrap(), Frequency::Min1);
        assert!(Frequency::parse("12").is_err());
    }

    #[test]
    fn test_category_round_trip() {
        for freq in [
            Frequency::Min1,
            Frequency::Min5,
            Frequency::Hour1,
            Frequency::Day,
            Frequency::Year,
        ] {
            assert_eq!(Frequency::from_category(freq.category()).unwrap(), freq);
        }
    }
}
