// Unit tests for normalization, filtering and theme assignment.
//
// Every check goes through the public API with hand-built Posts; no
// network, database or filesystem access.

use embedhelp::classify::{
    self, normalize, Classifier, Decision, Rejection, RuleSet, Theme,
};
use embedhelp::post::Post;

fn post(title: &str, selftext: &str) -> Post {
    Post {
        subreddit: "arduino".to_string(),
        title: title.to_string(),
        selftext: selftext.to_string(),
        score: 12,
        num_comments: 4,
        url: format!("https://reddit.com/r/arduino/comments/{}", title.len()),
    }
}

fn titled(title: &str) -> Post {
    post(title, "")
}

// ============================================================
// normalize
// ============================================================

#[test]
fn normalize_is_idempotent() {
    let samples = [
        "",
        " ",
        "Help!  My   Arduino",
        "\tLeading and trailing\n",
        "UART\r\nI2C\u{00A0}SPI",
        "ÄÖÜ µC über",
        "already normalized text",
    ];
    for sample in samples {
        let once = normalize(sample);
        assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
    }
}

#[test]
fn normalize_ignores_case_and_spacing() {
    assert_eq!(normalize("A   B"), normalize("a b"));
    assert_eq!(normalize("A\t\nB"), "a b");
}

#[test]
fn normalize_keeps_edges() {
    assert_eq!(normalize("  Help  "), " help ");
}

#[test]
fn normalize_empty_is_empty() {
    assert_eq!(normalize(""), "");
}

// ============================================================
// Filter stage
// ============================================================

#[test]
fn bad_phrase_rejects_despite_help_and_keyword() {
    let p = titled("I made an Arduino robot, help needed with wiring");
    assert!(!classify::matches(&p));
    assert_eq!(
        Classifier::canonical().evaluate(&p),
        Decision::Rejected(Rejection::BadPhrase("i made"))
    );
}

#[test]
fn keyword_without_help_signal_rejected() {
    assert!(!classify::matches(&titled("ESP32 project roundup")));
}

#[test]
fn help_signal_without_keyword_rejected() {
    assert!(!classify::matches(&titled("My code doesn't work, help")));
}

#[test]
fn help_request_with_keyword_accepted() {
    assert!(classify::matches(&post("Help! My Arduino UART isn't working", "")));
}

#[test]
fn empty_post_rejected_for_missing_help_signal() {
    assert_eq!(
        Classifier::canonical().evaluate(&post("", "")),
        Decision::Rejected(Rejection::NoHelpSignal)
    );
}

#[test]
fn signals_found_in_body() {
    let p = post("Arduino Nano clone", "Doesnt work after reset");
    assert!(classify::matches(&p));
}

#[test]
fn bad_phrase_spanning_title_and_body_rejects() {
    // Title and body are joined with one space before matching.
    let p = post("Arduino help, look what i", "made today");
    assert!(!classify::matches(&p));
}

#[test]
fn collapsed_whitespace_lets_multiword_signal_match() {
    let p = titled("Arduino   NOT\n\nWORKING");
    assert!(classify::matches(&p));
}

#[test]
fn why_alone_counts_as_help() {
    assert!(classify::matches(&titled("Why is my STM32 so fast")));
}

#[test]
fn substring_matches_inside_longer_words() {
    // "serialization" contains "serial" even though it isn't a separate word.
    let p = titled("Help with serialization on my board");
    assert!(classify::matches(&p));
    assert_eq!(classify::assign_theme(&p), Theme::Communication);
}

// ============================================================
// Theme stage
// ============================================================

#[test]
fn power_group_wins_over_build_group() {
    let p = titled("Help, ESP32 voltage error");
    assert!(classify::matches(&p));
    assert_eq!(classify::assign_theme(&p), Theme::WiringAndPower);
}

#[test]
fn fallback_theme_when_no_group_matches() {
    let p = titled("Help, my microcontroller project has an issue, beginner here");
    assert!(classify::matches(&p));
    assert_eq!(classify::assign_theme(&p), Theme::GeneralBeginnerHelp);
}

#[test]
fn can_inside_words_means_communication() {
    let p = titled("Help, Arduino won't wake from deep sleep, can anyone check?");
    assert_eq!(classify::assign_theme(&p), Theme::Communication);
}

#[test]
fn analog_checked_before_build_errors() {
    let p = titled("Help, sensor upload keeps failing on my Arduino");
    assert_eq!(classify::assign_theme(&p), Theme::AnalogAndSensors);
}

#[test]
fn build_errors_theme() {
    let p = titled("Arduino compile problem on Linux");
    assert!(classify::matches(&p));
    assert_eq!(classify::assign_theme(&p), Theme::BuildCompileErrors);
}

#[test]
fn theme_defined_for_rejected_posts() {
    let p = titled("I made a 5V supply");
    assert!(!classify::matches(&p));
    assert_eq!(classify::assign_theme(&p), Theme::WiringAndPower);
}

#[test]
fn classify_combines_both_stages() {
    let c = Classifier::canonical();
    assert_eq!(
        c.classify(&titled("Help! My Arduino UART isn't working")),
        Some(Theme::Communication)
    );
    assert_eq!(c.classify(&titled("ESP32 project roundup")), None);
}

// ============================================================
// Determinism and rule-set variants
// ============================================================

#[test]
fn repeated_calls_agree() {
    let c = Classifier::canonical();
    let posts = [
        titled("Help! My Arduino UART isn't working"),
        titled("ESP32 project roundup"),
        post("Beginner", "Breadboard wiring confused me"),
    ];
    for p in &posts {
        assert_eq!(c.matches(p), c.matches(p));
        assert_eq!(c.assign_theme(p), c.assign_theme(p));
        assert_eq!(c.evaluate(p), c.evaluate(p));
    }
}

#[test]
fn legacy_rules_are_narrower() {
    let p = titled("Newbie here, ESP32 keeps rebooting");
    assert!(Classifier::canonical().matches(&p));
    assert_eq!(
        Classifier::new(RuleSet::LEGACY_SCRAPER).evaluate(&p),
        Decision::Rejected(Rejection::NoHelpSignal)
    );
}

#[test]
fn theme_labels_parse_back() {
    for theme in Theme::ALL {
        assert_eq!(theme.to_string().parse::<Theme>().unwrap(), theme);
    }
    assert!("Robotics".parse::<Theme>().is_err());
}
