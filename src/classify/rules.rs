// Rule lists for the classifier, kept as data.
//
// The decision algorithm in `classifier.rs` walks these lists in order and
// never hardcodes a phrase itself. Two variants exist: CANONICAL drives every
// pipeline, LEGACY_SCRAPER is the narrower set the first scraper shipped with
// and is only used by `embedhelp audit` to show where the two disagree.

use super::theme::Theme;

/// One step of the theme decision list: any member matches → `theme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeRule {
    pub theme: Theme,
    pub terms: &'static [&'static str],
}

/// A complete, ordered rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSet {
    pub name: &'static str,
    /// Showcase/announcement markers. Any hit rejects.
    pub bad_phrases: &'static [&'static str],
    /// At least one must be present.
    pub help_signals: &'static [&'static str],
    /// At least one must be present.
    pub keywords: &'static [&'static str],
    /// Checked top to bottom. The fallback theme is applied when none match.
    pub theme_rules: &'static [ThemeRule],
    pub fallback_theme: Theme,
}

const POWER_TERMS: &[&str] = &["power", "voltage", "battery", "5v", "3.3v"];
const COMMUNICATION_TERMS: &[&str] = &["i2c", "spi", "uart", "serial", "can"];
const BUILD_TERMS: &[&str] = &["error", "compile", "upload", "flash"];

impl RuleSet {
    pub const CANONICAL: RuleSet = RuleSet {
        name: "canonical",
        bad_phrases: &[
            "i made",
            "huge update",
            "update to my",
            "project update",
            "showcase",
            "tutorial",
            "built this",
            "my journey",
        ],
        // "why" is deliberately broad.
        help_signals: &[
            "help",
            "not working",
            "doesn't work",
            "doesnt work",
            "cant",
            "can't",
            "error",
            "problem",
            "beginner",
            "newbie",
            "how do i",
            "why",
            "confused",
            "issue",
            "fail",
            "unable",
        ],
        keywords: &[
            "arduino",
            "esp32",
            "stm32",
            "microcontroller",
            "embedded",
            "gpio",
            "i2c",
            "spi",
            "uart",
            "serial",
            "firmware",
            "sensor",
            "adc",
            "pwm",
            "breadboard",
        ],
        theme_rules: &[
            ThemeRule {
                theme: Theme::WiringAndPower,
                terms: POWER_TERMS,
            },
            ThemeRule {
                theme: Theme::Communication,
                terms: COMMUNICATION_TERMS,
            },
            ThemeRule {
                theme: Theme::AnalogAndSensors,
                terms: &["sensor", "adc", "analog", "voltage divider"],
            },
            ThemeRule {
                theme: Theme::BuildCompileErrors,
                terms: BUILD_TERMS,
            },
        ],
        fallback_theme: Theme::GeneralBeginnerHelp,
    };

    pub const LEGACY_SCRAPER: RuleSet = RuleSet {
        name: "legacy-scraper",
        bad_phrases: &["i made", "huge update", "showcase", "tutorial", "built this"],
        help_signals: &[
            "help",
            "not working",
            "error",
            "problem",
            "beginner",
            "issue",
        ],
        keywords: &[
            "arduino",
            "esp32",
            "stm32",
            "microcontroller",
            "embedded",
            "uart",
            "i2c",
            "spi",
        ],
        // Build errors are checked before analog here.
        theme_rules: &[
            ThemeRule {
                theme: Theme::WiringAndPower,
                terms: POWER_TERMS,
            },
            ThemeRule {
                theme: Theme::Communication,
                terms: COMMUNICATION_TERMS,
            },
            ThemeRule {
                theme: Theme::BuildCompileErrors,
                terms: BUILD_TERMS,
            },
            ThemeRule {
                theme: Theme::AnalogAndSensors,
                terms: &["sensor", "adc", "analog"],
            },
        ],
        fallback_theme: Theme::GeneralBeginnerHelp,
    };
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::CANONICAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_subset(narrow: &[&str], broad: &[&str]) -> bool {
        narrow.iter().all(|term| broad.contains(term))
    }

    #[test]
    fn canonical_list_sizes() {
        let rules = RuleSet::CANONICAL;
        assert_eq!(rules.bad_phrases.len(), 8);
        assert_eq!(rules.help_signals.len(), 16);
        assert_eq!(rules.keywords.len(), 15);
        assert_eq!(rules.theme_rules.len(), 4);
    }

    #[test]
    fn legacy_lists_are_subsets_of_canonical() {
        let legacy = RuleSet::LEGACY_SCRAPER;
        let canonical = RuleSet::CANONICAL;
        assert!(is_subset(legacy.bad_phrases, canonical.bad_phrases));
        assert!(is_subset(legacy.help_signals, canonical.help_signals));
        assert!(is_subset(legacy.keywords, canonical.keywords));
    }

    #[test]
    fn canonical_theme_order_is_fixed() {
        let order: Vec<Theme> = RuleSet::CANONICAL
            .theme_rules
            .iter()
            .map(|r| r.theme)
            .collect();
        assert_eq!(
            order,
            vec![
                Theme::WiringAndPower,
                Theme::Communication,
                Theme::AnalogAndSensors,
                Theme::BuildCompileErrors,
            ]
        );
    }

    #[test]
    fn why_is_a_help_signal() {
        assert!(RuleSet::CANONICAL.help_signals.contains(&"why"));
    }

    #[test]
    fn default_is_canonical() {
        assert_eq!(RuleSet::default(), RuleSet::CANONICAL);
    }
}
