// netsh scanner (Windows)
//
// `netsh wlan show networks mode=bssid` prints one block per network with a
// nested block per radio:
//
//   SSID 1 : HomeNet
//       Network type            : Infrastructure
//       BSSID 1                 : aa:bb:cc:dd:ee:01
//            Signal             : 70%
//            Channel            : 36
//
// Keys this parser does not need (authentication, rates, ...) are skipped.

use surveyor_core::domain::{Band, Signal};
use surveyor_core::port::{CommandSpec, ParseError, ScanParser};

use super::ensure_terminated;

pub fn scan_command() -> CommandSpec {
    CommandSpec::new("netsh", ["wlan", "show", "networks", "mode=bssid"])
}

/// Radio block being collected
struct PendingRadio {
    line: usize,
    ssid: String,
    mac: String,
    quality: Option<u8>,
    channel: Option<u32>,
    band: Option<Band>,
}

impl PendingRadio {
    fn finish(self) -> Result<Signal, ParseError> {
        let Some(quality) = self.quality else {
            return Err(ParseError::MalformedLine {
                line: self.line,
                reason: format!("BSSID {} has no Signal entry", self.mac),
            });
        };

        // Newer builds print the band explicitly; older ones only the channel
        let Some(band) = self.band.or_else(|| self.channel.and_then(Band::from_channel)) else {
            return Err(ParseError::MalformedLine {
                line: self.line,
                reason: format!("BSSID {} has no usable Channel entry", self.mac),
            });
        };

        Signal::try_new(self.mac, self.ssid, band, Signal::dbm_from_quality(quality)).map_err(
            |source| ParseError::Domain {
                line: self.line,
                source,
            },
        )
    }
}

/// Parser for `netsh wlan show networks mode=bssid`
pub struct NetshParser;

impl ScanParser for NetshParser {
    fn parse(&self, output: &str) -> Result<Vec<Signal>, ParseError> {
        ensure_terminated(output)?;
        let mut signals = Vec::new();
        let mut ssid: Option<String> = None;
        let mut pending: Option<PendingRadio> = None;

        for (index, line) in output.lines().enumerate() {
            let line_no = index + 1;
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            let invalid = |field: &'static str| ParseError::InvalidField {
                line: line_no,
                field,
                value: value.to_string(),
            };

            if key.starts_with("BSSID") {
                if let Some(radio) = pending.take() {
                    signals.push(radio.finish()?);
                }
                let Some(ssid) = ssid.clone() else {
                    return Err(ParseError::MalformedLine {
                        line: line_no,
                        reason: "BSSID outside of an SSID block".to_string(),
                    });
                };
                pending = Some(PendingRadio {
                    line: line_no,
                    ssid,
                    mac: value.to_string(),
                    quality: None,
                    channel: None,
                    band: None,
                });
            } else if key.starts_with("SSID") {
                if let Some(radio) = pending.take() {
                    signals.push(radio.finish()?);
                }
                ssid = Some(value.to_string());
            } else if let Some(radio) = pending.as_mut() {
                match key {
                    "Signal" => {
                        let quality = value
                            .trim_end_matches('%')
                            .trim()
                            .parse::<u8>()
                            .ok()
                            .filter(|q| *q <= 100)
                            .ok_or_else(|| invalid("signal"))?;
                        radio.quality = Some(quality);
                    }
                    "Channel" => {
                        radio.channel = Some(value.parse().map_err(|_| invalid("channel"))?);
                    }
                    "Band" => {
                        radio.band = Some(value.parse().map_err(|_| invalid("band"))?);
                    }
                    _ => {}
                }
            }
        }

        if let Some(radio) = pending.take() {
            signals.push(radio.finish()?);
        }

        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "
Interface name : Wi-Fi
There are 2 networks currently visible.

SSID 1 : HomeNet
    Network type            : Infrastructure
    Authentication          : WPA2-Personal
    Encryption              : CCMP
    BSSID 1                 : aa:bb:cc:dd:ee:01
         Signal             : 70%
         Radio type         : 802.11ac
         Band               : 5 GHz
         Channel            : 36
         Basic rates (Mbps) : 6 12 24
    BSSID 2                 : aa:bb:cc:dd:ee:02
         Signal             : 90%
         Radio type         : 802.11n
         Channel            : 6

SSID 2 :
    Network type            : Infrastructure
    BSSID 1                 : aa:bb:cc:dd:ee:03
         Signal             : 10%
         Channel            : 11
";

    #[test]
    fn test_parse_listing() {
        let signals = NetshParser.parse(OUTPUT).unwrap();

        assert_eq!(
            signals,
            vec![
                Signal::new("aa:bb:cc:dd:ee:01", "HomeNet", Band::Ghz5, -65),
                Signal::new("aa:bb:cc:dd:ee:02", "HomeNet", Band::Ghz2_4, -55),
                Signal::new("aa:bb:cc:dd:ee:03", "", Band::Ghz2_4, -95),
            ]
        );
    }

    #[test]
    fn test_no_networks() {
        let output = "\nInterface name : Wi-Fi\nThere are 0 networks currently visible.\n";
        assert!(NetshParser.parse(output).unwrap().is_empty());
    }

    #[test]
    fn test_radio_without_signal() {
        let output = "SSID 1 : Net\n    BSSID 1 : aa:bb:cc:dd:ee:01\n    Channel : 6\n";
        let err = NetshParser.parse(output).unwrap_err();
        assert!(matches!(err, ParseError::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn test_bssid_before_ssid() {
        let err = NetshParser
            .parse("    BSSID 1 : aa:bb:cc:dd:ee:01\n")
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn test_invalid_signal_value() {
        let output = "SSID 1 : Net\n    BSSID 1 : aa:bb:cc:dd:ee:01\n    Signal : lots\n";
        let err = NetshParser.parse(output).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidField {
                line: 3,
                field: "signal",
                ..
            }
        ));
    }

    #[test]
    fn test_cut_off_block_is_rejected() {
        let cut = "SSID 1 : Net\r\n    BSSID 1 : aa:bb:cc:dd:ee:01\r\n         Signal : 7";
        let err = NetshParser.parse(cut).unwrap_err();
        assert!(matches!(err, ParseError::MalformedLine { line: 3, .. }));
    }

    #[test]
    fn test_crlf_output() {
        let output = "SSID 1 : Net\r\n    BSSID 1 : aa:bb:cc:dd:ee:01\r\n    Signal : 70%\r\n    Channel : 6\r\n";
        let signals = NetshParser.parse(output).unwrap();
        assert_eq!(signals, vec![Signal::new("aa:bb:cc:dd:ee:01", "Net", Band::Ghz2_4, -65)]);
    }
}
