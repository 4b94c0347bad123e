// Signal Domain Model

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, Result};

/// Signal strength in dBm (RSSI). More negative is weaker.
pub type Strength = i32;

/// Frequency band class of a radio
///
/// Serialized as the integer band class (`2`, `5`, `6`) so consumers can
/// compare it with the numbers they display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Band {
    Ghz2_4,
    Ghz5,
    Ghz6,
}

impl Band {
    /// Band class number used on the wire
    pub fn class(self) -> u8 {
        match self {
            Band::Ghz2_4 => 2,
            Band::Ghz5 => 5,
            Band::Ghz6 => 6,
        }
    }

    /// Map an operating frequency in MHz to its band
    pub fn from_mhz(mhz: u32) -> Option<Self> {
        match mhz {
            2400..=2500 => Some(Band::Ghz2_4),
            4900..=5900 => Some(Band::Ghz5),
            5925..=7125 => Some(Band::Ghz6),
            _ => None,
        }
    }

    /// Map a channel number to its band (channels 1-14 are 2.4 GHz)
    ///
    /// 6 GHz channel numbers overlap the 5 GHz ones, so scanners that only
    /// report a channel are classified as 2.4 or 5 GHz.
    pub fn from_channel(channel: u32) -> Option<Self> {
        match channel {
            1..=14 => Some(Band::Ghz2_4),
            32..=177 => Some(Band::Ghz5),
            _ => None,
        }
    }
}

impl From<Band> for u8 {
    fn from(band: Band) -> Self {
        band.class()
    }
}

impl TryFrom<u8> for Band {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            2 => Ok(Band::Ghz2_4),
            5 => Ok(Band::Ghz5),
            6 => Ok(Band::Ghz6),
            other => Err(DomainError::UnknownBand(other.to_string())),
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Band::Ghz2_4 => write!(f, "2.4 GHz"),
            Band::Ghz5 => write!(f, "5 GHz"),
            Band::Ghz6 => write!(f, "6 GHz"),
        }
    }
}

impl std::str::FromStr for Band {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "2" | "2.4" | "2.4ghz" | "2.4 ghz" => Ok(Band::Ghz2_4),
            "5" | "5ghz" | "5 ghz" => Ok(Band::Ghz5),
            "6" | "6ghz" | "6 ghz" => Ok(Band::Ghz6),
            _ => Err(DomainError::UnknownBand(s.to_string())),
        }
    }
}

/// One observation of one access point at one instant
///
/// Built fresh from scanner output on every poll and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub mac: String,
    pub ssid: String,
    pub frequency: Band,
    pub strength: Strength,
}

impl Signal {
    /// Create a signal without validating the strength
    ///
    /// Use [`Signal::try_new`] for values coming from outside the process.
    pub fn new(
        mac: impl Into<String>,
        ssid: impl Into<String>,
        frequency: Band,
        strength: Strength,
    ) -> Self {
        Self {
            mac: mac.into(),
            ssid: ssid.into(),
            frequency,
            strength,
        }
    }

    /// Create a signal, rejecting a positive RSSI
    pub fn try_new(
        mac: impl Into<String>,
        ssid: impl Into<String>,
        frequency: Band,
        strength: Strength,
    ) -> Result<Self> {
        if strength > 0 {
            return Err(DomainError::InvalidStrength(strength));
        }
        Ok(Self::new(mac, ssid, frequency, strength))
    }

    /// Convert a 0-100 link quality percentage to dBm
    ///
    /// Same linear mapping NetworkManager and the Windows WLAN API use:
    /// 0% = -100 dBm, 100% = -50 dBm.
    pub fn dbm_from_quality(quality: u8) -> Strength {
        i32::from(quality.min(100)) / 2 - 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_from_mhz() {
        assert_eq!(Band::from_mhz(2437), Some(Band::Ghz2_4));
        assert_eq!(Band::from_mhz(5180), Some(Band::Ghz5));
        assert_eq!(Band::from_mhz(5955), Some(Band::Ghz6));
        assert_eq!(Band::from_mhz(900), None);
    }

    #[test]
    fn test_band_from_channel() {
        assert_eq!(Band::from_channel(6), Some(Band::Ghz2_4));
        assert_eq!(Band::from_channel(149), Some(Band::Ghz5));
        assert_eq!(Band::from_channel(0), None);
    }

    #[test]
    fn test_band_serializes_as_class_number() {
        let json = serde_json::to_string(&Band::Ghz5).unwrap();
        assert_eq!(json, "5");

        let band: Band = serde_json::from_str("2").unwrap();
        assert_eq!(band, Band::Ghz2_4);

        assert!(serde_json::from_str::<Band>("3").is_err());
    }

    #[test]
    fn test_band_from_str() {
        assert_eq!("2.4".parse::<Band>().unwrap(), Band::Ghz2_4);
        assert_eq!("5".parse::<Band>().unwrap(), Band::Ghz5);
        assert!("7".parse::<Band>().is_err());
    }

    #[test]
    fn test_try_new_rejects_positive_strength() {
        assert!(Signal::try_new("mac1", "ssid1", Band::Ghz5, 0).is_ok());
        assert_eq!(
            Signal::try_new("mac1", "ssid1", Band::Ghz5, 3),
            Err(DomainError::InvalidStrength(3))
        );
    }

    #[test]
    fn test_dbm_from_quality() {
        assert_eq!(Signal::dbm_from_quality(0), -100);
        assert_eq!(Signal::dbm_from_quality(70), -65);
        assert_eq!(Signal::dbm_from_quality(100), -50);
        assert_eq!(Signal::dbm_from_quality(255), -50);
    }
}
