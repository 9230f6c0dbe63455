//! Human-readable progress lines for the terminal. Informative only — the
//! pipeline contract is the process exit code, not this output.

use colored::Colorize;
use std::time::Duration;

use crate::gate::DecisionPhrases;
use crate::source::FetchError;

pub fn banner(source: &str, interval: Duration, phrases: &DecisionPhrases) {
    println!("Polling {} every {}s for a decision", source, interval.as_secs());
    println!(
        "Update the flag file with '{}' or '{}' to proceed",
        phrases.approve(),
        phrases.decline()
    );
}

pub fn attempt(attempt: u32, elapsed: Duration) {
    println!();
    println!("Check #{} (elapsed: {:.1}s)", attempt, elapsed.as_secs_f64());
}

pub fn content(text: &str) {
    println!("Flag file content: '{}'", text);
}

pub fn waiting(phrases: &DecisionPhrases) {
    println!(
        "{} for a decision ('{}' or '{}', case insensitive)",
        "WAITING".yellow().bold(),
        phrases.approve(),
        phrases.decline()
    );
}

pub fn fetch_failed(err: &FetchError) {
    println!("{}: {}", "FETCH FAILED".red().bold(), err);
}

pub fn approved() {
    println!("Decision received: {}", "APPROVED".green().bold());
}

pub fn declined() {
    println!("Decision received: {}", "DECLINED".red().bold());
}

pub fn attempts_exhausted(max: u32) {
    println!(
        "{}: maximum attempts ({}) reached without a decision",
        "GIVING UP".red().bold(),
        max
    );
}

pub fn ceiling_reached(limit: Duration) {
    println!(
        "{}: maximum polling time ({}h) reached without a decision",
        "GIVING UP".red().bold(),
        limit.as_secs() / 3600
    );
}

pub fn outcome(approved: bool) {
    println!();
    if approved {
        println!("{} — continuing with the pipeline", "GATE PASSED".green().bold());
    } else {
        println!("{} — stopping the pipeline", "GATE FAILED".red().bold());
    }
}
