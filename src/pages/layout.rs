use maud::{html, Markup, DOCTYPE};

use crate::types::Role;

pub fn page(title: &str, role: Option<Role>, body: Markup) -> Markup {
	html! {
		(DOCTYPE)
		html lang="en" {
			head {
				meta charset="utf-8";
				title { (title) " | Student Tracker" }
				link rel="stylesheet" href="/static/style.css";
			}
			body {
				@if let Some(role) = role {
					(nav(role))
				}
				main { (body) }
			}
		}
	}
}

fn nav(role: Role) -> Markup {
	html! {
		nav {
			@match role {
				Role::Student => {
					a href="/student/home" { "Home" }
					a href="/student/attendance" { "Attendance" }
					a href="/student/marks" { "Marks" }
				},
				Role::Teacher => {
					a href="/teacher/home" { "Home" }
					a href="/teacher/students" { "Attendance" }
					a href="/teacher/exam" { "Exams" }
				},
			}
			form.logout method="POST" action="/logout" {
				button { "Log out" }
			}
		}
	}
}

pub fn error_list(errors: &[String]) -> Markup {
	html! {
		@if !errors.is_empty() {
			ul.errors {
				@for error in errors {
					li { (error) }
				}
			}
		}
	}
}
