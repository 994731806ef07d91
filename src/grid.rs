//! Module x business-day attendance matrix for one student and month.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::calendar::business_days_of_month;
use crate::error::AppError;
use crate::types::{AttendanceRecord, AttendanceStatus, Id, Module};

/// Row order on the student grid; other modules follow in their given order.
pub const MODULE_ORDER: [&str; 4] = ["Math", "English", "History", "Chemistry"];

/// A grid cell. `Unknown` means nothing was recorded, which is not the same as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStatus {
	Present,
	Absent,
	Unknown,
}

impl From<Option<AttendanceStatus>> for CellStatus {
	fn from(status: Option<AttendanceStatus>) -> Self {
		match status {
			Some(AttendanceStatus::Present) => CellStatus::Present,
			Some(AttendanceStatus::Absent) => CellStatus::Absent,
			None => CellStatus::Unknown,
		}
	}
}

impl CellStatus {
	pub fn symbol(self) -> &'static str {
		match self {
			CellStatus::Present => "P",
			CellStatus::Absent => "A",
			CellStatus::Unknown => "-",
		}
	}

	pub fn css_class(self) -> &'static str {
		match self {
			CellStatus::Present => "present",
			CellStatus::Absent => "absent",
			CellStatus::Unknown => "unknown",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
	pub date: NaiveDate,
	pub status: CellStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
	pub module: Module,
	pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceGrid {
	pub year: i32,
	pub month: u32,
	pub dates: Vec<NaiveDate>,
	pub rows: Vec<GridRow>,
}

/// Stable sort by position in [`MODULE_ORDER`].
pub fn order_modules(mut modules: Vec<Module>) -> Vec<Module> {
	modules.sort_by_key(|m| {
		MODULE_ORDER
			.iter()
			.position(|name| *name == m.name)
			.unwrap_or(MODULE_ORDER.len())
	});
	modules
}

/// `records` should be the student's records for the month; any others are ignored.
pub fn build_grid(
	year: i32,
	month: u32,
	modules: Vec<Module>,
	records: &[AttendanceRecord],
) -> Result<AttendanceGrid, AppError> {
	let dates = business_days_of_month(year, month)
		.ok_or_else(|| AppError::BadRequest(format!("{year}-{month} is not a valid month")))?;

	let lookup: HashMap<(Id, NaiveDate), AttendanceStatus> = records
		.iter()
		.map(|rec| ((rec.module_id, rec.date), rec.status))
		.collect();

	let rows = order_modules(modules)
		.into_iter()
		.map(|module| {
			let cells = dates
				.iter()
				.map(|date| GridCell {
					date: *date,
					status: lookup.get(&(module.id, *date)).copied().into(),
				})
				.collect();
			GridRow { module, cells }
		})
		.collect();

	Ok(AttendanceGrid { year, month, dates, rows })
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{Datelike, Weekday};

	fn module(id: Id, name: &str) -> Module {
		Module { id, name: name.to_string() }
	}

	fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	fn record(module_id: Id, date: NaiveDate, status: AttendanceStatus) -> AttendanceRecord {
		AttendanceRecord { student_id: 1, module_id, date, status }
	}

	#[test]
	fn preferred_modules_come_first() {
		let modules = vec![
			module(1, "Chemistry"),
			module(2, "Math"),
			module(3, "History"),
			module(4, "English"),
			module(5, "Art"),
		];
		let names: Vec<String> = order_modules(modules).into_iter().map(|m| m.name).collect();
		assert_eq!(names, ["Math", "English", "History", "Chemistry", "Art"]);
	}

	#[test]
	fn unlisted_modules_keep_their_order() {
		let modules = vec![module(1, "Music"), module(2, "Art"), module(3, "Math"), module(4, "Drama")];
		let names: Vec<String> = order_modules(modules).into_iter().map(|m| m.name).collect();
		assert_eq!(names, ["Math", "Music", "Art", "Drama"]);
	}

	#[test]
	fn missing_records_are_unknown_not_absent() {
		let monday = ymd(2025, 6, 2);
		let tuesday = ymd(2025, 6, 3);
		let records = [
			record(1, monday, AttendanceStatus::Present),
			record(1, tuesday, AttendanceStatus::Absent),
		];
		let grid = build_grid(2025, 6, vec![module(1, "Math"), module(2, "English")], &records).unwrap();

		let math = &grid.rows[0];
		assert_eq!(math.module.name, "Math");
		assert_eq!(math.cells[0], GridCell { date: monday, status: CellStatus::Present });
		assert_eq!(math.cells[1], GridCell { date: tuesday, status: CellStatus::Absent });
		assert_eq!(math.cells[2].status, CellStatus::Unknown);
		assert!(grid.rows[1].cells.iter().all(|c| c.status == CellStatus::Unknown));
	}

	#[test]
	fn rows_cover_business_days_only() {
		// a stray weekend record never shows up
		let saturday = ymd(2025, 6, 7);
		let records = [record(1, saturday, AttendanceStatus::Present)];
		let grid = build_grid(2025, 6, vec![module(1, "Math")], &records).unwrap();

		assert_eq!(grid.dates.len(), 21);
		for row in &grid.rows {
			assert_eq!(row.cells.len(), grid.dates.len());
			assert!(row.cells.iter().all(|c| !matches!(c.date.weekday(), Weekday::Sat | Weekday::Sun)));
			assert!(row.cells.iter().all(|c| c.status == CellStatus::Unknown));
		}
	}

	#[test]
	fn no_modules_gives_empty_rows() {
		let grid = build_grid(2024, 2, vec![], &[]).unwrap();
		assert!(grid.rows.is_empty());
		assert_eq!(grid.dates.last(), Some(&ymd(2024, 2, 29)));
	}

	#[test]
	fn invalid_month_is_a_bad_request() {
		assert!(matches!(build_grid(2025, 13, vec![], &[]), Err(AppError::BadRequest(_))));
	}
}
