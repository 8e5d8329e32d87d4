//! Mobile-money destination types
//!
//! Withdrawals pay out to a mobile-money account. Provider and number are
//! validated at construction time so malformed destinations never reach the
//! database.

use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// Supported mobile-money providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobileProvider {
    Mtn,
    Airtel,
}

impl MobileProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mtn => "mtn",
            Self::Airtel => "airtel",
        }
    }
}

impl fmt::Display for MobileProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MobileProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mtn" => Ok(Self::Mtn),
            "airtel" => Ok(Self::Airtel),
            other => Err(DomainError::InvalidMobileProvider(other.to_string())),
        }
    }
}

/// A validated mobile-money phone number in international format,
/// e.g. `+256772000000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Minimum/maximum digits after the leading `+`.
    const MIN_DIGITS: usize = 9;
    const MAX_DIGITS: usize = 15;

    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        let digits = match value.strip_prefix('+') {
            Some(rest) => rest,
            None => return Err(DomainError::InvalidMobileNumber(value)),
        };

        if digits.len() < Self::MIN_DIGITS
            || digits.len() > Self::MAX_DIGITS
            || !digits.chars().all(|c| c.is_ascii_digit())
        {
            return Err(DomainError::InvalidMobileNumber(value));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("mtn".parse::<MobileProvider>().unwrap(), MobileProvider::Mtn);
        assert_eq!(
            "Airtel".parse::<MobileProvider>().unwrap(),
            MobileProvider::Airtel
        );
    }

    #[test]
    fn test_provider_unknown_rejected() {
        let result = "vodafone".parse::<MobileProvider>();
        assert!(matches!(
            result,
            Err(DomainError::InvalidMobileProvider(_))
        ));
    }

    #[test]
    fn test_number_valid() {
        let number = MobileNumber::new("+256772000000").unwrap();
        assert_eq!(number.as_str(), "+256772000000");
    }

    #[test]
    fn test_number_missing_plus_rejected() {
        assert!(MobileNumber::new("256772000000").is_err());
    }

    #[test]
    fn test_number_too_short_rejected() {
        assert!(MobileNumber::new("+25677").is_err());
    }

    #[test]
    fn test_number_non_digit_rejected() {
        assert!(MobileNumber::new("+25677200000a").is_err());
    }

    #[test]
    fn test_number_too_long_rejected() {
        assert!(MobileNumber::new("+2567720000001234567").is_err());
    }
}
