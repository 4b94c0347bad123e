// Reading Domain Model

use serde::{Deserialize, Serialize};

use crate::domain::signal::{Band, Signal, Strength};

/// Reading ID (assigned by the caller, monotonic per survey session)
pub type ReadingId = u64;

/// Position on the floor plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Select the representative strength for a network
///
/// Filters by `ssid`, then by `frequency` when given. With a `mac` the result
/// is that radio's strength; without one it is the strongest remaining radio,
/// since repeaters and mesh nodes share one SSID.
///
/// A mac is expected to appear at most once per ssid/frequency. If a scan
/// reported it twice, the strongest duplicate wins; use
/// [`Reading::duplicate_radios`] to detect that case.
pub fn strongest(
    signals: &[Signal],
    ssid: &str,
    frequency: Option<Band>,
    mac: Option<&str>,
) -> Option<Strength> {
    signals
        .iter()
        .filter(|s| s.ssid == ssid)
        .filter(|s| frequency.map_or(true, |f| s.frequency == f))
        .filter(|s| mac.map_or(true, |m| s.mac == m))
        .map(|s| s.strength)
        .max()
}

/// Distinct SSIDs in first-seen order
pub(crate) fn distinct_ssids(signals: &[Signal]) -> Vec<&str> {
    let mut ssids: Vec<&str> = Vec::new();
    for signal in signals {
        if !ssids.contains(&signal.ssid.as_str()) {
            ssids.push(&signal.ssid);
        }
    }
    ssids
}

/// Signals captured at one surveyed point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: ReadingId,
    pub point: Point,
    pub signals: Vec<Signal>,
}

impl Reading {
    pub fn new(id: ReadingId, point: Point, signals: Vec<Signal>) -> Self {
        Self { id, point, signals }
    }

    /// Strength for a network at this point, or `None` when nothing matches
    ///
    /// See [`strongest`] for the selection rules.
    pub fn signal_for(
        &self,
        ssid: &str,
        frequency: Option<Band>,
        mac: Option<&str>,
    ) -> Option<Strength> {
        strongest(&self.signals, ssid, frequency, mac)
    }

    /// Network names seen at this point
    pub fn ssids(&self) -> Vec<&str> {
        distinct_ssids(&self.signals)
    }

    /// Radios (ssid, frequency, mac) reported more than once in this reading
    pub fn duplicate_radios(&self) -> Vec<(&str, Band, &str)> {
        let mut seen: Vec<(&str, Band, &str)> = Vec::new();
        let mut duplicates: Vec<(&str, Band, &str)> = Vec::new();

        for signal in &self.signals {
            let key = (signal.ssid.as_str(), signal.frequency, signal.mac.as_str());
            if seen.contains(&key) {
                if !duplicates.contains(&key) {
                    duplicates.push(key);
                }
            } else {
                seen.push(key);
            }
        }

        duplicates
    }
}
