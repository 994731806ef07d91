//! Weekly lesson table: module name -> weekday -> lesson start time.
//!
//! Loaded once at start-up and shared read-only behind an `Arc`.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::AppError;

pub const FUTURE_DATE_ERROR: &str = "You cannot manage attendance for a future date.";

type Week = [Option<String>; 7];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
	modules: BTreeMap<String, Week>,
}

/// Whether attendance may be taken for a module on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonCheck<'a> {
	FutureDate,
	NoLesson,
	Lesson { time: &'a str },
}

impl<'a> LessonCheck<'a> {
	pub fn has_lesson(&self) -> bool {
		matches!(self, LessonCheck::Lesson { .. })
	}

	pub fn error(&self) -> Option<&'static str> {
		match self {
			LessonCheck::FutureDate => Some(FUTURE_DATE_ERROR),
			_ => None,
		}
	}
}

impl Default for Schedule {
	fn default() -> Self {
		let mut schedule = Schedule { modules: BTreeMap::new() };
		schedule.insert("Math", &[(Weekday::Mon, "09:00"), (Weekday::Wed, "12:00"), (Weekday::Thu, "10:00"), (Weekday::Fri, "11:00")]);
		schedule.insert("English", &[(Weekday::Mon, "10:00"), (Weekday::Wed, "09:00"), (Weekday::Fri, "09:00")]);
		schedule.insert("History", &[(Weekday::Mon, "11:00"), (Weekday::Tue, "10:00"), (Weekday::Thu, "09:00"), (Weekday::Fri, "12:00")]);
		schedule.insert("Chemistry", &[(Weekday::Tue, "11:00"), (Weekday::Wed, "10:00")]);
		schedule
	}
}

impl Schedule {
	pub fn empty() -> Self {
		Schedule { modules: BTreeMap::new() }
	}

	pub fn with_lessons(mut self, module: &str, lessons: &[(Weekday, &str)]) -> Self {
		self.insert(module, lessons);
		self
	}

	fn insert(&mut self, module: &str, lessons: &[(Weekday, &str)]) {
		let week = self.modules.entry(module.to_string()).or_default();
		for (day, time) in lessons {
			week[day.num_days_from_monday() as usize] = Some(time.to_string());
		}
	}

	/// Parses `{"Math": {"0": "09:00", ...}, ...}` with weekday keys 0 (Monday) to 6 (Sunday).
	pub fn from_json(text: &str) -> Result<Self, AppError> {
		let raw: HashMap<String, HashMap<String, String>> = serde_json::from_str(text)
			.map_err(|e| AppError::Config(format!("schedule is not valid JSON: {e}")))?;

		let mut modules = BTreeMap::new();
		for (module, days) in raw {
			let mut week: Week = Default::default();
			for (day, time) in days {
				let index: usize = day
					.parse()
					.ok()
					.filter(|i| *i < 7)
					.ok_or_else(|| AppError::Config(format!("{module}: weekday {day:?} is not 0-6")))?;
				NaiveTime::parse_from_str(&time, "%H:%M")
					.map_err(|_| AppError::Config(format!("{module}: time {time:?} is not HH:MM")))?;
				week[index] = Some(time);
			}
			modules.insert(module, week);
		}
		Ok(Schedule { modules })
	}

	/// The table from `path`, or the built-in table when no path is configured.
	pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
		let Some(path) = path else {
			return Ok(Schedule::default());
		};
		let text = std::fs::read_to_string(path)
			.map_err(|e| AppError::Config(format!("can't read {}: {e}", path.display())))?;
		Schedule::from_json(&text)
	}

	pub fn module_names(&self) -> impl Iterator<Item = &str> {
		self.modules.keys().map(String::as_str)
	}

	pub fn lesson_time(&self, module: &str, weekday: Weekday) -> Option<&str> {
		self.modules
			.get(module)?
			.get(weekday.num_days_from_monday() as usize)?
			.as_deref()
	}

	/// (has lesson, start time) for `module` on `date`.
	pub fn resolve_lesson(&self, module: &str, date: NaiveDate) -> (bool, Option<&str>) {
		let time = self.lesson_time(module, date.weekday());
		(time.is_some(), time)
	}

	/// Dates after `today` are refused before the timetable is consulted.
	pub fn check_attendance_date(&self, module: &str, date: NaiveDate, today: NaiveDate) -> LessonCheck<'_> {
		if date > today {
			return LessonCheck::FutureDate;
		}
		match self.resolve_lesson(module, date) {
			(true, Some(time)) => LessonCheck::Lesson { time },
			_ => LessonCheck::NoLesson,
		}
	}
}
