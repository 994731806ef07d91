use axum::{
	response::Redirect,
	routing::{get, post},
	Router,
};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::DEFAULT_STATIC_DIR;
use crate::pages::{login, student, teacher_attendance, teacher_exams};
use crate::schedule::Schedule;

#[derive(Clone)]
pub struct AppState {
	pub db: SqlitePool,
	pub schedule: Arc<Schedule>,
	pub static_dir: PathBuf,
}

impl AppState {
	pub fn new(db: SqlitePool, schedule: Schedule) -> Self {
		AppState {
			db,
			schedule: Arc::new(schedule),
			static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
		}
	}

	pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.static_dir = dir.into();
		self
	}
}

pub fn router(state: AppState) -> Router {
	let static_dir = state.static_dir.clone();
	tracing::debug!(dir = %static_dir.display(), "serving static files");

	Router::new()
		.route("/", get(|| async { Redirect::to("/login") }))
		.route("/login", get(login::display_login).post(login::perform_login))
		.route("/logout", post(login::perform_logout))
		.route("/student/home", get(student::display_home))
		.route("/student/attendance", get(student::display_attendance))
		.route("/student/marks", get(student::display_marks))
		.route("/teacher/home", get(teacher_exams::display_home))
		.route(
			"/teacher/students",
			get(teacher_attendance::display_attendance).post(teacher_attendance::perform_attendance),
		)
		.route("/teacher/exam", get(teacher_exams::display_exams))
		.route(
			"/teacher/exam/create",
			get(teacher_exams::display_create).post(teacher_exams::perform_create),
		)
		.route(
			"/teacher/exam/update/:id",
			get(teacher_exams::display_update).post(teacher_exams::perform_update),
		)
		.route("/teacher/exam/delete/:id", post(teacher_exams::perform_delete))
		.route(
			"/teacher/exam/grade/:id",
			get(teacher_exams::display_grades).post(teacher_exams::perform_grades),
		)
		.nest_service("/static", ServeDir::new(static_dir))
		.layer(CookieManagerLayer::new())
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}
