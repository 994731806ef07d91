use axum::{
	extract::{Path, State},
	response::{IntoResponse, Redirect, Response},
	Form,
};
use maud::{html, Markup};
use std::collections::HashMap;

use crate::app::AppState;
use crate::auth::TeacherUser;
use crate::calendar::today;
use crate::error::AppResult;
use crate::grading::{parse_roster_marks, ExamStatus, MAX_MARK};
use crate::pages::layout::{error_list, page};
use crate::types::{Exam, ExamForm, ExamResult, Id, Role, Student};

const EXAMS_PATH: &str = "/teacher/exam";

pub async fn display_home(user: TeacherUser) -> Markup {
	page("Home", Some(Role::Teacher), html! {
		h1 { "Welcome, " (user.teacher.full_name) }
		ul {
			li { a href="/teacher/students" { "Take attendance" } }
			li { a href=(EXAMS_PATH) { "Manage exams" } }
			li { a href="/teacher/exam/create" { "Schedule an exam" } }
		}
	})
}

fn exam_rows(exams: &[Exam]) -> Markup {
	html! {
		table {
			thead { tr { th { "Exam" } th { "Date" } th { "Time" } th { "Place" } th {} } }
			tbody {
				@for exam in exams {
					tr {
						td { (exam.title) }
						td { (exam.date.format("%Y-%m-%d").to_string()) }
						td { (exam.time) }
						td { (exam.place) }
						td {
							a href=(format!("/teacher/exam/update/{}", exam.id)) { "Edit" }
							" "
							a href=(format!("/teacher/exam/grade/{}", exam.id)) { "Grades" }
							" "
							form.inline method="POST" action=(format!("/teacher/exam/delete/{}", exam.id)) {
								button { "Delete" }
							}
						}
					}
				}
			}
		}
	}
}

pub async fn display_exams(State(state): State<AppState>, _user: TeacherUser) -> AppResult<Markup> {
	let today = today();
	let upcoming = Exam::upcoming(&state.db, today, None).await?;
	let past = Exam::past(&state.db, today).await?;

	Ok(page("Exams", Some(Role::Teacher), html! {
		h1 { "Exams" }
		p { a href="/teacher/exam/create" { "Schedule an exam" } }
		h2 { "Upcoming" }
		@if upcoming.is_empty() {
			p.info { "No upcoming exams." }
		} @else {
			(exam_rows(&upcoming))
		}
		h2 { "Past" }
		@if past.is_empty() {
			p.info { "No past exams." }
		} @else {
			(exam_rows(&past))
		}
	}))
}

fn exam_form(heading: &str, action: &str, form: &ExamForm, errors: &[String]) -> Markup {
	page(heading, Some(Role::Teacher), html! {
		h1 { (heading) }
		(error_list(errors))
		form method="POST" action=(action) {
			label { "Title " input type="text" name="title" value=(form.title); }
			label { "Date " input type="date" name="date" value=(form.date); }
			label { "Time " input type="time" name="time" value=(form.time); }
			label { "Place " input type="text" name="place" value=(form.place); }
			button { "Save" }
		}
		a href=(EXAMS_PATH) { "Back to exams" }
	})
}

pub async fn display_create(_user: TeacherUser) -> Markup {
	exam_form("Schedule an exam", "/teacher/exam/create", &ExamForm::default(), &[])
}

pub async fn perform_create(
	State(state): State<AppState>,
	user: TeacherUser,
	Form(form): Form<ExamForm>,
) -> AppResult<Response> {
	match form.validate() {
		Ok(exam) => {
			Exam::create(&state.db, &exam).await?;
			Ok(Redirect::to(EXAMS_PATH).into_response())
		}
		Err(errors) => {
			tracing::warn!(teacher = %user.account.username, ?errors, "exam form rejected");
			Ok(exam_form("Schedule an exam", "/teacher/exam/create", &form, &errors).into_response())
		}
	}
}

pub async fn display_update(
	State(state): State<AppState>,
	_user: TeacherUser,
	Path(id): Path<Id>,
) -> AppResult<Markup> {
	let exam = Exam::find(&state.db, id).await?;
	let action = format!("/teacher/exam/update/{id}");
	Ok(exam_form("Edit exam", &action, &ExamForm::from_exam(&exam), &[]))
}

pub async fn perform_update(
	State(state): State<AppState>,
	user: TeacherUser,
	Path(id): Path<Id>,
	Form(form): Form<ExamForm>,
) -> AppResult<Response> {
	Exam::find(&state.db, id).await?;
	match form.validate() {
		Ok(exam) => {
			Exam::update(&state.db, id, &exam).await?;
			Ok(Redirect::to(EXAMS_PATH).into_response())
		}
		Err(errors) => {
			tracing::warn!(teacher = %user.account.username, id, ?errors, "exam form rejected");
			let action = format!("/teacher/exam/update/{id}");
			Ok(exam_form("Edit exam", &action, &form, &errors).into_response())
		}
	}
}

pub async fn perform_delete(
	State(state): State<AppState>,
	_user: TeacherUser,
	Path(id): Path<Id>,
) -> AppResult<Redirect> {
	Exam::delete(&state.db, id).await?;
	Ok(Redirect::to(EXAMS_PATH))
}

struct GradeRow {
	student: Student,
	value: String,
	status: ExamStatus,
}

fn grade_form(exam: &Exam, rows: &[GradeRow], errors: &[String]) -> Markup {
	page("Grades", Some(Role::Teacher), html! {
		h1 { "Grades: " (exam.title) }
		p { (exam.date.format("%Y-%m-%d").to_string()) " " (exam.time) ", " (exam.place) }
		(error_list(errors))
		@if rows.is_empty() {
			p.info { "No students yet." }
		} @else {
			form method="POST" action=(format!("/teacher/exam/grade/{}", exam.id)) {
				table {
					thead { tr { th { "Code" } th { "Student" } th { "Mark" } th { "Status" } } }
					tbody {
						@for row in rows {
							tr {
								td { (row.student.student_code) }
								td { (row.student.full_name) }
								td {
									input type="number" min="0" max=(MAX_MARK)
										name=(format!("mark_{}", row.student.id)) value=(row.value);
								}
								td { (row.status.label()) }
							}
						}
					}
				}
				button { "Save" }
			}
		}
		a href=(EXAMS_PATH) { "Back to exams" }
	})
}

pub async fn display_grades(
	State(state): State<AppState>,
	_user: TeacherUser,
	Path(id): Path<Id>,
) -> AppResult<Markup> {
	let exam = Exam::find(&state.db, id).await?;
	let marks = ExamResult::for_exam(&state.db, id).await?;
	let rows: Vec<GradeRow> = Student::roster(&state.db)
		.await?
		.into_iter()
		.map(|student| {
			let mark = marks.get(&student.id).copied().flatten();
			GradeRow {
				student,
				value: mark.map(|m| m.to_string()).unwrap_or_default(),
				status: ExamStatus::classify(mark),
			}
		})
		.collect();
	Ok(grade_form(&exam, &rows, &[]))
}

pub async fn perform_grades(
	State(state): State<AppState>,
	user: TeacherUser,
	Path(id): Path<Id>,
	Form(form): Form<HashMap<String, String>>,
) -> AppResult<Response> {
	let exam = Exam::find(&state.db, id).await?;
	let roster = Student::roster(&state.db).await?;

	match parse_roster_marks(&roster, &form) {
		Ok(marks) => {
			ExamResult::upsert_roster(&state.db, exam.id, &marks).await?;
			Ok(Redirect::to(EXAMS_PATH).into_response())
		}
		Err(errors) => {
			tracing::warn!(teacher = %user.account.username, exam = id, ?errors, "grades rejected");
			let stored = ExamResult::for_exam(&state.db, id).await?;
			let rows: Vec<GradeRow> = roster
				.into_iter()
				.map(|student| {
					let value = form
						.get(&format!("mark_{}", student.id))
						.cloned()
						.unwrap_or_default();
					let status = ExamStatus::classify(stored.get(&student.id).copied().flatten());
					GradeRow { student, value, status }
				})
				.collect();
			Ok(grade_form(&exam, &rows, &errors).into_response())
		}
	}
}
