use axum::{
	extract::State,
	response::{IntoResponse, Redirect, Response},
	Form,
};
use maud::{html, Markup};
use tower_cookies::Cookies;

use crate::app::AppState;
use crate::auth::{clear_session_cookie, session_cookie, MaybeSession};
use crate::error::AppResult;
use crate::pages::layout::page;
use crate::types::{Account, FormLogin};

pub const LOGIN_FAILED: &str = "Invalid username or password.";

fn login_form(error: Option<&str>, username: &str) -> Markup {
	page("Log in", None, html! {
		h1 { "Log in" }
		@if let Some(error) = error {
			p.error { (error) }
		}
		form method="POST" action="/login" {
			label { "Username " input name="username" type="text" value=(username) autofocus; }
			label { "Password " input name="password" type="password"; }
			button { "Log in" }
		}
	})
}

pub async fn display_login(MaybeSession(session): MaybeSession) -> Response {
	match session {
		Some(session) => Redirect::to(session.account.role.home()).into_response(),
		None => login_form(None, "").into_response(),
	}
}

pub async fn perform_login(
	State(state): State<AppState>,
	cookies: Cookies,
	Form(login): Form<FormLogin>,
) -> AppResult<Response> {
	let Some(account) = Account::authenticate(&state.db, &login.username, &login.password).await? else {
		tracing::warn!(username = %login.username, "login failed");
		return Ok(login_form(Some(LOGIN_FAILED), &login.username).into_response());
	};

	let token = account.start_session(&state.db).await?;
	cookies.add(session_cookie(token));
	tracing::info!(username = %account.username, role = account.role.as_str(), "logged in");
	Ok(Redirect::to(account.role.home()).into_response())
}

pub async fn perform_logout(
	State(state): State<AppState>,
	cookies: Cookies,
	MaybeSession(session): MaybeSession,
) -> AppResult<Redirect> {
	if let Some(session) = session {
		Account::end_session(&state.db, &session.token).await?;
		tracing::info!(username = %session.account.username, "logged out");
	}
	clear_session_cookie(&cookies);
	Ok(Redirect::to("/login"))
}
