use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::str::FromStr;

use crate::error::AppError;

pub type Id = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
	Student,
	Teacher,
}

impl Role {
	pub fn as_str(self) -> &'static str {
		match self {
			Role::Student => "student",
			Role::Teacher => "teacher",
		}
	}

	pub fn home(self) -> &'static str {
		match self {
			Role::Student => "/student/home",
			Role::Teacher => "/teacher/home",
		}
	}
}

impl FromStr for Role {
	type Err = AppError;

	fn from_str(role: &str) -> Result<Self, Self::Err> {
		match role {
			"student" => Ok(Role::Student),
			"teacher" => Ok(Role::Teacher),
			other => Err(AppError::BadRequest(format!("unknown role {other:?}"))),
		}
	}
}

#[derive(Debug, Clone)]
pub struct Account {
	pub id: Id,
	pub username: String,
	pub role: Role,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountQuery {
	pub id: Id,
	pub username: String,
	pub pass_salt: String,
	pub pass_hash: String,
	pub role: String,
}

impl Account {
	pub fn from_query(info: &AccountQuery) -> Option<Self> {
		Some(Account {
			id: info.id,
			username: info.username.clone(),
			role: info.role.parse().ok()?,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Module {
	pub id: Id,
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Student {
	pub id: Id,
	pub account_id: Option<Id>,
	pub full_name: String,
	pub student_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Teacher {
	pub id: Id,
	pub account_id: Id,
	pub full_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
	Present,
	Absent,
}

impl AttendanceStatus {
	pub fn code(self) -> &'static str {
		match self {
			AttendanceStatus::Present => "P",
			AttendanceStatus::Absent => "A",
		}
	}

	pub fn from_code(code: &str) -> Option<Self> {
		match code {
			"P" => Some(AttendanceStatus::Present),
			"A" => Some(AttendanceStatus::Absent),
			_ => None,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			AttendanceStatus::Present => "Present",
			AttendanceStatus::Absent => "Absent",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
	pub student_id: Id,
	pub module_id: Id,
	pub date: NaiveDate,
	pub status: AttendanceStatus,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttendanceRecordQuery {
	pub student_id: Id,
	pub module_id: Id,
	pub date: NaiveDate,
	pub status: String,
}

impl AttendanceRecord {
	// the CHECK constraint only admits 'P' and 'A'
	pub fn from_query(info: &AttendanceRecordQuery) -> Option<Self> {
		Some(AttendanceRecord {
			student_id: info.student_id,
			module_id: info.module_id,
			date: info.date,
			status: AttendanceStatus::from_code(&info.status)?,
		})
	}
}

/// An exam sitting. `time` is kept as the "HH:MM" text the teacher typed.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Exam {
	pub id: Id,
	pub title: String,
	pub date: NaiveDate,
	pub time: String,
	pub place: String,
	pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ExamResult {
	pub exam_id: Id,
	pub student_id: Id,
	pub mark: Option<i64>,
}

/// Validated exam fields, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExam {
	pub title: String,
	pub date: NaiveDate,
	pub time: String,
	pub place: String,
}

#[derive(Deserialize, Debug)]
pub struct FormLogin {
	#[serde(default)]
	pub username: String,
	#[serde(default)]
	pub password: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ExamForm {
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub date: String,
	#[serde(default)]
	pub time: String,
	#[serde(default)]
	pub place: String,
}

impl ExamForm {
	pub fn from_exam(exam: &Exam) -> Self {
		ExamForm {
			title: exam.title.clone(),
			date: exam.date.format("%Y-%m-%d").to_string(),
			time: exam.time.clone(),
			place: exam.place.clone(),
		}
	}

	/// Every field is required and the date must be `YYYY-MM-DD`.
	pub fn validate(&self) -> Result<NewExam, Vec<String>> {
		let mut errors = Vec::new();
		if self.title.trim().is_empty() {
			errors.push("Title is required.".to_string());
		}
		if self.date.trim().is_empty() {
			errors.push("Date is required.".to_string());
		}
		if self.time.trim().is_empty() {
			errors.push("Time is required.".to_string());
		}
		if self.place.trim().is_empty() {
			errors.push("Place is required.".to_string());
		}

		let date = if self.date.trim().is_empty() {
			None
		} else {
			match NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d") {
				Ok(date) => Some(date),
				Err(_) => {
					errors.push("Invalid date format.".to_string());
					None
				}
			}
		};

		match date {
			Some(date) if errors.is_empty() => Ok(NewExam {
				title: self.title.clone(),
				date,
				time: self.time.clone(),
				place: self.place.clone(),
			}),
			_ => Err(errors),
		}
	}
}

#[derive(Deserialize, Debug, Default)]
pub struct MonthParams {
	pub year: Option<i32>,
	pub month: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
pub struct AttendanceParams {
	pub date: Option<String>,
	pub module: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn form(title: &str, date: &str, time: &str, place: &str) -> ExamForm {
		ExamForm {
			title: title.into(),
			date: date.into(),
			time: time.into(),
			place: place.into(),
		}
	}

	#[test]
	fn complete_form_validates() {
		let exam = form("Algebra", "2025-06-02", "09:30", "Hall A").validate().unwrap();
		assert_eq!(exam.date, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
		assert_eq!(exam.time, "09:30");
	}

	#[test]
	fn empty_title_is_reported() {
		let errors = form("", "2025-06-02", "09:30", "Hall A").validate().unwrap_err();
		assert_eq!(errors, ["Title is required."]);
	}

	#[test]
	fn all_missing_fields_are_listed() {
		let errors = form("", "", " ", "").validate().unwrap_err();
		assert_eq!(errors, [
			"Title is required.",
			"Date is required.",
			"Time is required.",
			"Place is required.",
		]);
	}

	#[test]
	fn unparseable_date_is_reported() {
		let errors = form("Algebra", "02/06/2025", "09:30", "Hall A").validate().unwrap_err();
		assert_eq!(errors, ["Invalid date format."]);
		let errors = form("Algebra", "2025-02-30", "09:30", "Hall A").validate().unwrap_err();
		assert_eq!(errors, ["Invalid date format."]);
	}

	#[test]
	fn status_codes() {
		assert_eq!(AttendanceStatus::from_code("P"), Some(AttendanceStatus::Present));
		assert_eq!(AttendanceStatus::from_code("A"), Some(AttendanceStatus::Absent));
		assert_eq!(AttendanceStatus::from_code("X"), None);
		assert_eq!(AttendanceStatus::Absent.code(), "A");
	}

	#[test]
	fn roles_round_trip_through_text() {
		assert_eq!("teacher".parse::<Role>().ok(), Some(Role::Teacher));
		assert_eq!(Role::Student.as_str().parse::<Role>().ok(), Some(Role::Student));
		assert!(matches!("admin".parse::<Role>(), Err(AppError::BadRequest(_))));
	}
}
