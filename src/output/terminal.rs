// Colored terminal output for scrape progress, batch results and reports.
//
// main.rs and the pipelines call these; nothing here touches the database
// or the network.

use colored::{ColoredString, Colorize};

use crate::classify::{Decision, Theme};
use crate::db::models::{ThemeCount, ThemedPost};
use crate::pipeline::batch::{BatchOutcome, Divergence, RejectionTally};
use crate::pipeline::scrape::ScrapeSummary;
use crate::post::Post;

/// Title width used in per-post lines.
const TITLE_WIDTH: usize = 50;

/// One line per stored post during a scrape.
pub fn display_saved(theme: Theme, title: &str) {
    println!("{}", post_line("Saved".green(), theme, title));
}

/// Dry-run counterpart of `display_saved`.
pub fn display_would_save(theme: Theme, title: &str) {
    println!("{}", post_line("Would save".yellow(), theme, title));
}

/// `  <label> [<theme>]: <title>`, with "..." only when the title is cut.
fn post_line(label: ColoredString, theme: Theme, title: &str) -> String {
    format!(
        "  {} [{}]: {}",
        label,
        colorize_theme(theme),
        super::truncate_chars(title, TITLE_WIDTH)
    )
}

pub fn display_scrape_summary(summary: &ScrapeSummary, dry_run: bool) {
    println!("\n{}", "=== Scrape Summary ===".bold());
    println!(
        "  Fetched {} posts, {} new since last run",
        summary.fetched, summary.fresh
    );
    if dry_run {
        println!(
            "  {} matched (dry run, nothing written)",
            summary.accepted.to_string().bold()
        );
    } else {
        println!(
            "  {} matched, {} saved",
            summary.accepted.to_string().bold(),
            summary.saved.to_string().green()
        );
        let failed_writes = summary.accepted - summary.saved;
        if failed_writes > 0 {
            println!("  {} {} writes failed", "!".bright_red(), failed_writes);
        }
    }
    display_rejections(&summary.rejected);
    if !summary.failed_subreddits.is_empty() {
        println!(
            "  {} could not fetch: r/{}",
            "!".bright_red(),
            summary.failed_subreddits.join(", r/")
        );
    }
}

/// Summary of a CSV classification run.
pub fn display_batch_summary(outcome: &BatchOutcome) {
    let total = outcome.accepted.len() + outcome.rejected.total();
    println!(
        "\n{}",
        format!(
            "=== Classified {} posts: {} accepted ===",
            total,
            outcome.accepted.len()
        )
        .bold()
    );
    display_rejections(&outcome.rejected);

    let mut counts = std::collections::HashMap::new();
    for post in &outcome.accepted {
        *counts.entry(post.theme).or_insert(0) += 1;
    }
    display_theme_counts(&ThemeCount::tally(&counts));
}

fn display_rejections(rejected: &RejectionTally) {
    if rejected.total() == 0 {
        return;
    }
    println!(
        "  Rejected {}: {} showcase, {} no help signal, {} no keyword",
        rejected.total(),
        rejected.bad_phrase,
        rejected.no_help_signal,
        rejected.no_keyword
    );
}

/// Per-theme counts as a small bar chart.
pub fn display_theme_counts(counts: &[ThemeCount]) {
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0);
    println!();
    for entry in counts {
        let width = if max > 0 {
            ((entry.count * 30) / max) as usize
        } else {
            0
        };
        println!(
            "  {:<24} {:>5}  {}",
            colorize_theme(entry.theme),
            entry.count,
            "#".repeat(width).dimmed()
        );
    }
    println!();
}

/// Table of themed posts, newest first as given.
pub fn display_themed_posts(posts: &[ThemedPost]) {
    if posts.is_empty() {
        println!("No posts stored yet. Run `embedhelp scrape` first.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Help Posts ({}) ===", posts.len()).bold()
    );
    println!();
    println!(
        "  {:<24} {:<12} {:>5} {:>5}  {}",
        "Theme".dimmed(),
        "Subreddit".dimmed(),
        "Score".dimmed(),
        "Cmts".dimmed(),
        "Title".dimmed(),
    );
    println!("  {}", "-".repeat(100).dimmed());

    for themed in posts {
        let post = &themed.post;
        println!(
            "  {:<24} r/{:<10} {:>5} {:>5}  {}",
            colorize_theme(themed.theme),
            post.subreddit,
            post.score,
            post.num_comments,
            super::truncate_chars(&post.title, 60),
        );
        if !post.url.is_empty() {
            println!("  {:<24} {}", "", post.url.dimmed());
        }
    }
    println!();
}

/// `classify --explain`: the deciding rule for every post.
pub fn display_decisions(posts: &[Post], decisions: &[Decision]) {
    println!();
    for (post, decision) in posts.iter().zip(decisions) {
        let verdict = match decision {
            Decision::Accepted { .. } => decision.to_string().green(),
            Decision::Rejected(_) => decision.to_string().dimmed(),
        };
        println!(
            "  {:<52} {}",
            super::truncate_chars(&post.title, TITLE_WIDTH),
            verdict
        );
    }
    println!();
}

/// Posts on which two rule sets disagree.
pub fn display_divergences(
    divergences: &[Divergence],
    total: usize,
    primary_name: &str,
    other_name: &str,
) {
    if divergences.is_empty() {
        println!(
            "{} {} and {} agree on all {} posts.",
            "✓".green(),
            primary_name,
            other_name,
            total
        );
        return;
    }

    println!(
        "\n{}",
        format!(
            "=== {} of {} posts diverge ({} vs {}) ===",
            divergences.len(),
            total,
            primary_name,
            other_name
        )
        .bold()
    );
    println!();
    for divergence in divergences {
        println!(
            "  {}",
            super::truncate_chars(&divergence.post.title, 80).bold()
        );
        println!("    {:<16} {}", primary_name, divergence.primary);
        println!("    {:<16} {}", other_name, divergence.other.to_string().yellow());
    }
    println!();
}

fn colorize_theme(theme: Theme) -> colored::ColoredString {
    let label = theme.as_str();
    match theme {
        Theme::WiringAndPower => label.red(),
        Theme::Communication => label.cyan(),
        Theme::AnalogAndSensors => label.magenta(),
        Theme::BuildCompileErrors => label.yellow(),
        Theme::GeneralBeginnerHelp => label.green(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_title_printed_whole_without_ellipsis() {
        let line = post_line("Saved".green(), Theme::Communication, "I2C scanner finds nothing");
        assert!(line.ends_with(": I2C scanner finds nothing"));
    }

    #[test]
    fn long_title_cut_at_width_with_ellipsis() {
        let title = "Help! ".repeat(20);
        let line = post_line("Would save".yellow(), Theme::GeneralBeginnerHelp, &title);
        let expected: String = title.chars().take(TITLE_WIDTH).collect();
        assert!(line.ends_with(&format!(": {expected}...")));
    }
}
