//! Terminal output for CLI commands.

use colored::Colorize;
use portico_nav::{FetchOutcome, QueryMap};
use portico_widgets::{FeeSummary, SummaryLine};

pub fn print_params(params: &QueryMap) {
	if params.is_empty() {
		println!("{}", "(no parameters)".dimmed());
		return;
	}
	for (key, value) in params {
		println!("{} = {}", key.bright_cyan(), value);
	}
}

pub fn print_address(address: &str) {
	eprintln!("{} {}", "Address:".bright_cyan(), address);
}

pub fn print_sub_tab(id: &str) {
	eprintln!("{} {}", "Sub-tab:".bright_cyan(), id.green());
}

pub fn print_redirect(location: &str) {
	eprintln!("{} {}", "Session expired, redirect to".yellow(), location.yellow().bold());
}

/// Message for outcomes that produced neither content nor a redirect.
pub fn describe_failure(outcome: FetchOutcome) -> String {
	match outcome.into_result() {
		Ok(_) => "View loaded".to_string(),
		Err(err) => err.to_string(),
	}
}

pub fn print_summary(summary: &FeeSummary) {
	println!("{}", "Registration Summary".bold());
	for line in &summary.lines {
		match line {
			SummaryLine::Registrant(name) => {
				println!();
				println!("{}", name.bold());
			}
			SummaryLine::CompDiscount => println!("  {}", line.to_string().green()),
			other => println!("  {}", other),
		}
	}
	println!();
	println!("{} ${}", "Registration Total:".bright_cyan().bold(), summary.total.to_string().bold());
}

#[cfg(test)]
mod tests {
	use super::*;
	use portico_nav::LoadError;
	use rstest::rstest;

	#[rstest]
	#[case(FetchOutcome::Superseded, "Load superseded by a newer request")]
	#[case(
		FetchOutcome::Failed(LoadError::LoadFailed { reason: "HTTP 500 Internal Server Error".into() }),
		"Load failed: HTTP 500 Internal Server Error"
	)]
	fn test_describe_failure(#[case] outcome: FetchOutcome, #[case] expected: &str) {
		assert_eq!(describe_failure(outcome), expected);
	}
}
