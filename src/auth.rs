//! Password hashing, session cookies and the role gate.
//!
//! The role is read from the account once per request, together with the
//! matching profile row. A page that wants a student asks for [`StudentUser`],
//! one that wants a teacher asks for [`TeacherUser`]; anything else is sent
//! back to the login page. An account of the right role with no profile row
//! also has its session ended, so the login page shows the form instead of
//! bouncing the browser back to the role's home.

use axum::{
	async_trait,
	extract::FromRequestParts,
	http::request::Parts,
	response::{IntoResponse, Redirect, Response},
};
use sha2::{Digest, Sha256};
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use crate::app::AppState;
use crate::types::{Account, Role, Student, Teacher};

pub const SESSION_COOKIE: &str = "session";
pub const LOGIN_PATH: &str = "/login";
/// Sessions older than this no longer resolve.
pub const SESSION_DAYS: i64 = 7;

pub fn new_salt() -> String {
	Uuid::new_v4().simple().to_string()
}

pub fn new_session_token() -> String {
	Uuid::new_v4().to_string()
}

pub fn hash_password(salt: &str, password: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(salt.as_bytes());
	hasher.update(b":");
	hasher.update(password.as_bytes());
	hex::encode(hasher.finalize())
}

pub fn session_cookie(token: String) -> Cookie<'static> {
	Cookie::build((SESSION_COOKIE, token))
		.path("/")
		.http_only(true)
		.build()
}

pub fn clear_session_cookie(cookies: &Cookies) {
	let mut cookie = Cookie::from(SESSION_COOKIE);
	cookie.set_path("/");
	cookies.remove(cookie);
}

fn to_login() -> Response {
	Redirect::to(LOGIN_PATH).into_response()
}

/// The signed-in account, if the request carries a live session.
pub struct MaybeSession(pub Option<Session>);

pub struct Session {
	pub account: Account,
	pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
	type Rejection = Response;

	async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
		let cookies = Cookies::from_request_parts(parts, state)
			.await
			.map_err(IntoResponse::into_response)?;
		let Some(token) = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
			return Ok(MaybeSession(None));
		};
		let account = Account::find_by_session(&state.db, &token)
			.await
			.map_err(IntoResponse::into_response)?;
		if account.is_none() {
			tracing::debug!("stale session cookie");
		}
		Ok(MaybeSession(account.map(|account| Session { account, token })))
	}
}

async fn session_with_role(parts: &mut Parts, state: &AppState, role: Role) -> Result<Session, Response> {
	let MaybeSession(session) = MaybeSession::from_request_parts(parts, state).await?;
	match session {
		Some(session) if session.account.role == role => Ok(session),
		Some(session) => {
			tracing::warn!(
				username = %session.account.username,
				path = %parts.uri.path(),
				"role gate refused"
			);
			Err(to_login())
		}
		None => Err(to_login()),
	}
}

async fn end_profileless_session(parts: &mut Parts, state: &AppState, session: Session) -> Response {
	tracing::warn!(username = %session.account.username, "account has no profile, session ended");
	if let Err(err) = Account::end_session(&state.db, &session.token).await {
		return err.into_response();
	}
	if let Ok(cookies) = Cookies::from_request_parts(parts, state).await {
		clear_session_cookie(&cookies);
	}
	to_login()
}

pub struct StudentUser {
	pub account: Account,
	pub student: Student,
}

#[async_trait]
impl FromRequestParts<AppState> for StudentUser {
	type Rejection = Response;

	async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
		let session = session_with_role(parts, state, Role::Student).await?;
		let found = Student::find_by_account(&state.db, session.account.id)
			.await
			.map_err(IntoResponse::into_response)?;
		match found {
			Some(student) => Ok(StudentUser { account: session.account, student }),
			None => Err(end_profileless_session(parts, state, session).await),
		}
	}
}

pub struct TeacherUser {
	pub account: Account,
	pub teacher: Teacher,
}

#[async_trait]
impl FromRequestParts<AppState> for TeacherUser {
	type Rejection = Response;

	async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
		let session = session_with_role(parts, state, Role::Teacher).await?;
		let found = Teacher::find_by_account(&state.db, session.account.id)
			.await
			.map_err(IntoResponse::into_response)?;
		match found {
			Some(teacher) => Ok(TeacherUser { account: session.account, teacher }),
			None => Err(end_profileless_session(parts, state, session).await),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hash_depends_on_salt_and_password() {
		let a = hash_password("salt", "pw");
		assert_eq!(a, hash_password("salt", "pw"));
		assert_ne!(a, hash_password("other", "pw"));
		assert_ne!(a, hash_password("salt", "pw2"));
		assert_eq!(a.len(), 64);
	}

	#[test]
	fn salts_and_tokens_are_unique() {
		assert_ne!(new_salt(), new_salt());
		assert_ne!(new_session_token(), new_session_token());
	}

	#[test]
	fn session_cookie_is_http_only() {
		let cookie = session_cookie("abc".to_string());
		assert_eq!(cookie.name(), SESSION_COOKIE);
		assert_eq!(cookie.value(), "abc");
		assert_eq!(cookie.http_only(), Some(true));
		assert_eq!(cookie.path(), Some("/"));
	}
}
