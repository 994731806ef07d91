use axum::{
	extract::{Query, State},
	response::{IntoResponse, Redirect, Response},
	Form,
};
use chrono::NaiveDate;
use maud::{html, Markup};
use std::collections::HashMap;

use crate::app::AppState;
use crate::auth::TeacherUser;
use crate::calendar::{parse_iso_date, today};
use crate::error::AppResult;
use crate::pages::layout::{error_list, page};
use crate::schedule::LessonCheck;
use crate::types::{AttendanceParams, AttendanceRecord, AttendanceStatus, Id, Module, Role, Student};

pub const DEFAULT_MODULE: &str = "Math";

/// Date and module picked on the page; an unreadable date falls back to `today`.
pub fn selection(params: &AttendanceParams, today: NaiveDate) -> (NaiveDate, String) {
	let date = params
		.date
		.as_deref()
		.and_then(parse_iso_date)
		.unwrap_or(today);
	let module = params
		.module
		.as_deref()
		.map(str::trim)
		.filter(|m| !m.is_empty())
		.unwrap_or(DEFAULT_MODULE)
		.to_string();
	(date, module)
}

pub fn attendance_url(date: NaiveDate, module: &str) -> String {
	format!(
		"/teacher/students?date={}&module={}",
		date.format("%Y-%m-%d"),
		urlencoding::encode(module)
	)
}

/// Reads `status_<studentId>` for every student on the roster.
///
/// A missing or blank field leaves that student alone. Any value other than
/// `P` or `A` rejects the whole submission.
pub fn parse_roster_statuses(
	roster: &[Student],
	form: &HashMap<String, String>,
) -> Result<Vec<(Id, AttendanceStatus)>, Vec<String>> {
	let mut statuses = Vec::new();
	let mut errors = Vec::new();
	for student in roster {
		let Some(code) = form.get(&format!("status_{}", student.id)).map(|c| c.trim()) else {
			continue;
		};
		if code.is_empty() {
			continue;
		}
		match AttendanceStatus::from_code(code) {
			Some(status) => statuses.push((student.id, status)),
			None => errors.push(format!("Status for {} must be Present or Absent.", student.full_name)),
		}
	}
	if errors.is_empty() {
		Ok(statuses)
	} else {
		Err(errors)
	}
}

struct AttendanceView<'a> {
	today: NaiveDate,
	date: NaiveDate,
	module: &'a str,
	modules: Vec<String>,
	check: LessonCheck<'a>,
	rows: Vec<(Student, Option<AttendanceStatus>)>,
	errors: Vec<String>,
}

fn render(view: AttendanceView<'_>) -> Markup {
	let action = attendance_url(view.date, view.module);
	page("Attendance", Some(Role::Teacher), html! {
		h1 { "Attendance" }
		form method="GET" action="/teacher/students" {
			label {
				"Date "
				input type="date" name="date" value=(view.date.format("%Y-%m-%d").to_string()) max=(view.today.format("%Y-%m-%d").to_string());
			}
			label {
				"Module "
				select name="module" {
					@for name in &view.modules {
						option value=(name) selected[name == view.module] { (name) }
					}
				}
			}
			button { "Show" }
		}
		@match view.check {
			LessonCheck::FutureDate => {
				p.error { (view.check.error().unwrap_or_default()) }
			},
			LessonCheck::NoLesson => {
				p.info {
					"There is no " (view.module) " lesson on "
					(view.date.format("%A %Y-%m-%d").to_string()) "."
				}
			},
			LessonCheck::Lesson { time } => {
				h2 { (view.module) " at " (time) " on " (view.date.format("%A %Y-%m-%d").to_string()) }
				(error_list(&view.errors))
				@if view.rows.is_empty() {
					p.info { "No students yet." }
				} @else {
					form method="POST" action=(action) {
						table {
							thead { tr { th { "Code" } th { "Student" } th { "Present" } th { "Absent" } } }
							tbody {
								@for (student, status) in &view.rows {
									@let field = format!("status_{}", student.id);
									tr {
										td { (student.student_code) }
										td { (student.full_name) }
										td { input type="radio" name=(field) value="P" checked[*status == Some(AttendanceStatus::Present)]; }
										td { input type="radio" name=(field) value="A" checked[*status == Some(AttendanceStatus::Absent)]; }
									}
								}
							}
						}
						button { "Save" }
					}
				}
			},
		}
	})
}

pub async fn display_attendance(
	State(state): State<AppState>,
	_user: TeacherUser,
	Query(params): Query<AttendanceParams>,
) -> AppResult<Markup> {
	let today = today();
	let (date, module) = selection(&params, today);
	let modules = Module::selectable_names(&state.db, &state.schedule).await?;
	let check = state.schedule.check_attendance_date(&module, date, today);

	let rows: Vec<(Student, Option<AttendanceStatus>)> = match check {
		LessonCheck::Lesson { .. } => {
			let selected = Module::ensure(&state.db, &module).await?;
			let statuses = AttendanceRecord::for_lesson(&state.db, selected.id, date).await?;
			Student::roster(&state.db)
				.await?
				.into_iter()
				.map(|s| {
					let status = statuses.get(&s.id).copied();
					(s, status)
				})
				.collect()
		}
		_ => Vec::new(),
	};

	Ok(render(AttendanceView {
		today,
		date,
		module: &module,
		modules,
		check,
		rows,
		errors: Vec::new(),
	}))
}

pub async fn perform_attendance(
	State(state): State<AppState>,
	user: TeacherUser,
	Query(params): Query<AttendanceParams>,
	Form(form): Form<HashMap<String, String>>,
) -> AppResult<Response> {
	let today = today();
	let (date, module) = selection(&params, today);
	let check = state.schedule.check_attendance_date(&module, date, today);

	if !check.has_lesson() {
		tracing::warn!(teacher = %user.account.username, %date, %module, "attendance refused: no lesson to mark");
		let modules = Module::selectable_names(&state.db, &state.schedule).await?;
		return Ok(render(AttendanceView {
			today,
			date,
			module: &module,
			modules,
			check,
			rows: Vec::new(),
			errors: Vec::new(),
		})
		.into_response());
	}

	let selected = Module::ensure(&state.db, &module).await?;
	let roster = Student::roster(&state.db).await?;
	match parse_roster_statuses(&roster, &form) {
		Ok(statuses) => {
			AttendanceRecord::upsert_roster(&state.db, selected.id, date, &statuses).await?;
			Ok(Redirect::to(&attendance_url(date, &module)).into_response())
		}
		Err(errors) => {
			tracing::warn!(teacher = %user.account.username, errors = errors.len(), "attendance submission rejected");
			let submitted = parse_lenient(&roster, &form);
			let modules = Module::selectable_names(&state.db, &state.schedule).await?;
			Ok(render(AttendanceView {
				today,
				date,
				module: &module,
				modules,
				check,
				rows: roster
					.into_iter()
					.map(|s| {
						let status = submitted.get(&s.id).copied();
						(s, status)
					})
					.collect(),
				errors,
			})
			.into_response())
		}
	}
}

// what the teacher ticked, for re-display after a rejected submission
fn parse_lenient(roster: &[Student], form: &HashMap<String, String>) -> HashMap<Id, AttendanceStatus> {
	roster
		.iter()
		.filter_map(|s| {
			let code = form.get(&format!("status_{}", s.id))?;
			Some((s.id, AttendanceStatus::from_code(code.trim())?))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	fn student(id: Id, name: &str) -> Student {
		Student {
			id,
			account_id: None,
			full_name: name.to_string(),
			student_code: format!("S{id:03}"),
		}
	}

	#[test]
	fn selection_defaults() {
		let today = ymd(2025, 6, 4);
		let params = AttendanceParams::default();
		assert_eq!(selection(&params, today), (today, "Math".to_string()));

		let params = AttendanceParams {
			date: Some("not a date".into()),
			module: Some("  ".into()),
		};
		assert_eq!(selection(&params, today), (today, "Math".to_string()));

		let params = AttendanceParams {
			date: Some("2025-06-03".into()),
			module: Some("History".into()),
		};
		assert_eq!(selection(&params, today), (ymd(2025, 6, 3), "History".to_string()));
	}

	#[test]
	fn urls_keep_date_and_module() {
		assert_eq!(attendance_url(ymd(2025, 6, 2), "Math"), "/teacher/students?date=2025-06-02&module=Math");
		assert_eq!(
			attendance_url(ymd(2025, 6, 2), "Art & Design"),
			"/teacher/students?date=2025-06-02&module=Art%20%26%20Design"
		);
	}

	#[test]
	fn statuses_skip_blank_fields() {
		let roster = [student(1, "Ada"), student(2, "Ben"), student(3, "Chen")];
		let form: HashMap<String, String> = [
			("status_1".to_string(), "P".to_string()),
			("status_3".to_string(), "A".to_string()),
			("status_9".to_string(), "P".to_string()),
		]
		.into();
		assert_eq!(
			parse_roster_statuses(&roster, &form),
			Ok(vec![(1, AttendanceStatus::Present), (3, AttendanceStatus::Absent)])
		);
	}

	#[test]
	fn unknown_status_rejects_everything() {
		let roster = [student(1, "Ada"), student(2, "Ben")];
		let form: HashMap<String, String> = [
			("status_1".to_string(), "P".to_string()),
			("status_2".to_string(), "late".to_string()),
		]
		.into();
		assert_eq!(
			parse_roster_statuses(&roster, &form),
			Err(vec!["Status for Ben must be Present or Absent.".to_string()])
		);
		let ticked = parse_lenient(&roster, &form);
		assert_eq!(ticked.len(), 1);
		assert_eq!(ticked[&1], AttendanceStatus::Present);
	}
}
