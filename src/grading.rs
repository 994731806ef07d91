use std::collections::HashMap;

use crate::types::{Id, Student};

pub const PASS_MARK: i64 = 40;
pub const MAX_MARK: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamStatus {
	Pending,
	Pass,
	Fail,
}

impl ExamStatus {
	pub fn classify(mark: Option<i64>) -> Self {
		match mark {
			None => ExamStatus::Pending,
			Some(mark) if mark >= PASS_MARK => ExamStatus::Pass,
			Some(_) => ExamStatus::Fail,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			ExamStatus::Pending => "Pending",
			ExamStatus::Pass => "Pass",
			ExamStatus::Fail => "Fail",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkError {
	NotANumber,
	OutOfRange(i64),
}

/// Blank means "no mark yet"; anything else must be a whole number in 0..=100.
pub fn parse_mark(text: &str) -> Result<Option<i64>, MarkError> {
	let text = text.trim();
	if text.is_empty() {
		return Ok(None);
	}
	let mark: i64 = text.parse().map_err(|_| MarkError::NotANumber)?;
	if !(0..=MAX_MARK).contains(&mark) {
		return Err(MarkError::OutOfRange(mark));
	}
	Ok(Some(mark))
}

/// Reads `mark_<studentId>` for every student on the roster.
///
/// Either every mark is valid and the whole roster comes back, or nothing does and
/// the caller gets one message per offending student.
pub fn parse_roster_marks(
	roster: &[Student],
	form: &HashMap<String, String>,
) -> Result<Vec<(Id, Option<i64>)>, Vec<String>> {
	let mut marks = Vec::with_capacity(roster.len());
	let mut errors = Vec::new();
	for student in roster {
		let text = form
			.get(&format!("mark_{}", student.id))
			.map(String::as_str)
			.unwrap_or("");
		match parse_mark(text) {
			Ok(mark) => marks.push((student.id, mark)),
			Err(MarkError::NotANumber) => {
				errors.push(format!("Mark for {} must be a whole number.", student.full_name))
			}
			Err(MarkError::OutOfRange(_)) => errors.push(format!(
				"Mark for {} must be between 0 and {MAX_MARK}.",
				student.full_name
			)),
		}
	}
	if errors.is_empty() {
		Ok(marks)
	} else {
		Err(errors)
	}
}
