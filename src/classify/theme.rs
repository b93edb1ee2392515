// Theme labels assigned to accepted posts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The five buckets an accepted post can land in.
///
/// Serialized as the display label, which is what the `theme` column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    #[serde(rename = "Wiring & Power")]
    WiringAndPower,
    #[serde(rename = "Communication")]
    Communication,
    #[serde(rename = "Analog & Sensors")]
    AnalogAndSensors,
    #[serde(rename = "Build / Compile Errors")]
    BuildCompileErrors,
    #[serde(rename = "General Beginner Help")]
    GeneralBeginnerHelp,
}

impl Theme {
    /// Every theme, in the order the canonical decision list checks them.
    pub const ALL: [Theme; 5] = [
        Theme::WiringAndPower,
        Theme::Communication,
        Theme::AnalogAndSensors,
        Theme::BuildCompileErrors,
        Theme::GeneralBeginnerHelp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::WiringAndPower => "Wiring & Power",
            Theme::Communication => "Communication",
            Theme::AnalogAndSensors => "Analog & Sensors",
            Theme::BuildCompileErrors => "Build / Compile Errors",
            Theme::GeneralBeginnerHelp => "General Beginner Help",
        }
    }

    /// The variant name, handy for CLI arguments.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Theme::WiringAndPower => "WiringAndPower",
            Theme::Communication => "Communication",
            Theme::AnalogAndSensors => "AnalogAndSensors",
            Theme::BuildCompileErrors => "BuildCompileErrors",
            Theme::GeneralBeginnerHelp => "GeneralBeginnerHelp",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    /// Accepts the display label or the variant name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Theme::ALL
            .into_iter()
            .find(|t| {
                t.as_str().eq_ignore_ascii_case(wanted)
                    || t.variant_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| anyhow::anyhow!("Unknown theme: {wanted}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_round_trips_through_from_str() {
        for theme in Theme::ALL {
            assert_eq!(theme.as_str().parse::<Theme>().unwrap(), theme);
            assert_eq!(theme.variant_name().parse::<Theme>().unwrap(), theme);
        }
    }

    #[test]
    fn from_str_ignores_case() {
        assert_eq!(
            "wiringandpower".parse::<Theme>().unwrap(),
            Theme::WiringAndPower
        );
        assert_eq!(
            "build / compile errors".parse::<Theme>().unwrap(),
            Theme::BuildCompileErrors
        );
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert!("Robotics".parse::<Theme>().is_err());
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&Theme::AnalogAndSensors).unwrap();
        assert_eq!(json, r#""Analog & Sensors""#);
    }
}
