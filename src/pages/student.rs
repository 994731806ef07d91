use axum::extract::{Query, State};
use chrono::Datelike;
use maud::{html, Markup};

use crate::app::AppState;
use crate::auth::StudentUser;
use crate::calendar::{month_name, neighbour_months, today};
use crate::error::AppResult;
use crate::grading::ExamStatus;
use crate::grid::{build_grid, AttendanceGrid};
use crate::pages::layout::page;
use crate::types::{AttendanceRecord, Exam, ExamResult, Module, MonthParams, Role};

pub async fn display_home(State(state): State<AppState>, user: StudentUser) -> AppResult<Markup> {
	let upcoming = Exam::upcoming(&state.db, today(), Some(3)).await?;
	Ok(page("Home", Some(Role::Student), html! {
		h1 { "Welcome, " (user.student.full_name) }
		p { "Student code: " (user.student.student_code) }
		h2 { "Upcoming exams" }
		@if upcoming.is_empty() {
			p.info { "No upcoming exams." }
		} @else {
			(exam_table(&upcoming))
		}
	}))
}

fn exam_table(exams: &[Exam]) -> Markup {
	html! {
		table {
			thead { tr { th { "Exam" } th { "Date" } th { "Time" } th { "Place" } } }
			tbody {
				@for exam in exams {
					tr {
						td { (exam.title) }
						td { (exam.date.format("%Y-%m-%d").to_string()) }
						td { (exam.time) }
						td { (exam.place) }
					}
				}
			}
		}
	}
}

pub async fn display_attendance(
	State(state): State<AppState>,
	user: StudentUser,
	Query(params): Query<MonthParams>,
) -> AppResult<Markup> {
	let now = today();
	let year = params.year.unwrap_or(now.year());
	let month = params.month.unwrap_or(now.month());

	let records = AttendanceRecord::for_student_month(&state.db, user.student.id, year, month).await?;
	let modules = Module::all(&state.db).await?;
	let grid = build_grid(year, month, modules, &records)?;
	tracing::debug!(student = user.student.id, year, month, records = records.len(), "attendance grid");

	Ok(page("Attendance", Some(Role::Student), html! {
		h1 { "Attendance for " (month_name(month)) " " (year) }
		(month_links(year, month))
		(grid_table(&grid))
		p.info { "P = present, A = absent, - = not recorded" }
	}))
}

fn month_links(year: i32, month: u32) -> Markup {
	let ((py, pm), (ny, nm)) = neighbour_months(year, month);
	html! {
		p {
			a href=(format!("/student/attendance?year={py}&month={pm}")) { "< " (month_name(pm)) " " (py) }
			" | "
			a href=(format!("/student/attendance?year={ny}&month={nm}")) { (month_name(nm)) " " (ny) " >" }
		}
	}
}

fn grid_table(grid: &AttendanceGrid) -> Markup {
	html! {
		@if grid.rows.is_empty() {
			p.info { "No modules yet." }
		} @else {
			table.grid {
				thead {
					tr {
						th { "Module" }
						@for date in &grid.dates {
							th title=(date.format("%A %Y-%m-%d").to_string()) {
								(date.format("%a").to_string()) br; (date.day())
							}
						}
					}
				}
				tbody {
					@for row in &grid.rows {
						tr {
							th { (row.module.name) }
							@for cell in &row.cells {
								td class=(cell.status.css_class()) { (cell.status.symbol()) }
							}
						}
					}
				}
			}
		}
	}
}

pub async fn display_marks(State(state): State<AppState>, user: StudentUser) -> AppResult<Markup> {
	let results = ExamResult::past_for_student(&state.db, user.student.id, today()).await?;
	Ok(page("Marks", Some(Role::Student), html! {
		h1 { "My marks" }
		@if results.is_empty() {
			p.info { "No marks yet." }
		} @else {
			table {
				thead { tr { th { "Exam" } th { "Date" } th { "Mark" } th { "Status" } } }
				tbody {
					@for (exam, mark) in &results {
						tr {
							td { (exam.title) }
							td { (exam.date.format("%Y-%m-%d").to_string()) }
							td {
								@if let Some(mark) = mark { (mark) } @else { "-" }
							}
							td { (ExamStatus::classify(*mark).label()) }
						}
					}
				}
			}
		}
	}))
}
