use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
};
use maud::html;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("{0} not found")]
	NotFound(&'static str),

	#[error("bad request: {0}")]
	BadRequest(String),

	#[error("configuration error: {0}")]
	Config(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
	pub fn status(&self) -> StatusCode {
		match self {
			AppError::NotFound(_) => StatusCode::NOT_FOUND,
			AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
			AppError::Database(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	// database details stay in the log
	fn public_message(&self) -> String {
		match self {
			AppError::Database(_) | AppError::Config(_) => "Something went wrong.".to_string(),
			other => other.to_string(),
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		let status = self.status();
		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		} else {
			tracing::debug!(error = %self, "request rejected");
		}
		let body = crate::pages::layout::page("Error", None, html! {
			h1 { (status.as_u16()) " " (status.canonical_reason().unwrap_or("Error")) }
			p.error { (self.public_message()) }
			a href="/login" { "Back to login" }
		});
		(status, body).into_response()
	}
}
