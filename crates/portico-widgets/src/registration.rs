//! Registration fee summary for event sign-up forms.
//!
//! The form is re-rendered on every input, so the summary is recomputed from
//! scratch each time from the current registrant blocks.

use crate::error::WidgetError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticket type that carries the registration fee.
pub const GENERAL_TICKET: &str = "general";

/// Fee charged per general ticket.
pub const REGISTRATION_FEE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// An event or housing option on a registrant block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOption {
	pub name: String,
	/// Cost as displayed on the form. Blank counts as zero.
	#[serde(default)]
	pub cost: String,
	#[serde(default)]
	pub checked: bool,
	/// Options hidden by form logic never count, even when checked.
	#[serde(default)]
	pub hidden: bool,
}

/// One registrant block of the form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Registrant {
	pub first_name: String,
	pub last_name: String,
	pub ticket_type: Option<String>,
	pub comp_ticket: bool,
	pub events: Vec<EventOption>,
	/// Whether the registrant answered yes to giving.
	pub gift: bool,
	/// Gift amount as typed; currency symbols and separators are ignored.
	pub gift_amount: String,
}

/// A line of the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryLine {
	Registrant(String),
	RegistrationFee,
	CompDiscount,
	Event(String),
	Gift(Decimal),
}

impl fmt::Display for SummaryLine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Registrant(name) => write!(f, "{}", name),
			Self::RegistrationFee => write!(f, "Registration Fee (${})", REGISTRATION_FEE),
			Self::CompDiscount => write!(f, "Comp Registration Fee"),
			Self::Event(name) => write!(f, "{}", name),
			Self::Gift(amount) => write!(f, "Gift: ${}", amount),
		}
	}
}

/// Summary lines and grand total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSummary {
	pub lines: Vec<SummaryLine>,
	pub total: Decimal,
}

impl FeeSummary {
	/// Builds the summary for all registrants.
	pub fn build(registrants: &[Registrant]) -> Result<Self, WidgetError> {
		let mut lines = Vec::new();
		let mut total = Decimal::ZERO;

		for registrant in registrants {
			lines.push(SummaryLine::Registrant(
				format!("{} {}", registrant.first_name, registrant.last_name)
					.trim()
					.to_string(),
			));

			if registrant.ticket_type.as_deref() == Some(GENERAL_TICKET) {
				total += REGISTRATION_FEE;
				lines.push(SummaryLine::RegistrationFee);
			}

			if registrant.comp_ticket {
				total -= REGISTRATION_FEE;
				lines.push(SummaryLine::CompDiscount);
			}

			for event in registrant.events.iter().filter(|e| e.checked && !e.hidden) {
				total += parse_cost(&event.name, &event.cost)?;
				lines.push(SummaryLine::Event(event.name.clone()));
			}

			if registrant.gift {
				let amount = parse_gift(&registrant.gift_amount)?;
				total += amount;
				lines.push(SummaryLine::Gift(amount));
			}
		}

		tracing::debug!(registrants = registrants.len(), total = %total, "Fee summary built");
		Ok(Self { lines, total })
	}

	/// Plain-text rendering, one line per entry followed by the total.
	pub fn render_text(&self) -> String {
		let mut text = String::from("Registration Summary\n");
		for line in &self.lines {
			if matches!(line, SummaryLine::Registrant(_)) {
				text.push('\n');
			}
			text.push_str(&line.to_string());
			text.push('\n');
		}
		text.push_str(&format!("\nRegistration Total: ${}\n", self.total));
		text
	}
}

fn parse_cost(field: &str, raw: &str) -> Result<Decimal, WidgetError> {
	let trimmed = raw.trim();
	if trimmed.is_empty() {
		return Ok(Decimal::ZERO);
	}
	Decimal::from_str(trimmed).map_err(|_| WidgetError::InvalidAmount {
		field: field.to_string(),
		value: raw.to_string(),
	})
}

/// Keeps digits, `.` and `-`, then takes the absolute value.
fn parse_gift(raw: &str) -> Result<Decimal, WidgetError> {
	let cleaned: String = raw
		.chars()
		.filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
		.collect();
	if cleaned.is_empty() {
		return Ok(Decimal::ZERO);
	}
	Decimal::from_str(&cleaned)
		.map(|amount| amount.abs())
		.map_err(|_| WidgetError::InvalidAmount {
			field: "gift".to_string(),
			value: raw.to_string(),
		})
}
