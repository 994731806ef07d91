//! Queries against the relational store. Each entity owns its reads and writes.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;

use crate::auth::{hash_password, new_salt, new_session_token, SESSION_DAYS};
use crate::error::{AppError, AppResult};
use crate::schedule::Schedule;
use crate::types::{
	Account, AccountQuery, AttendanceRecord, AttendanceRecordQuery, AttendanceStatus, Exam,
	ExamResult, Id, Module, NewExam, Role, Student, Teacher,
};

impl Account {
	/// A login with no profile; see [`Student::register`] and [`Teacher::register`].
	pub async fn create(db: &SqlitePool, username: &str, password: &str, role: Role) -> AppResult<Account> {
		let mut conn = db.acquire().await?;
		Account::insert(&mut conn, username, password, role).await
	}

	async fn insert(conn: &mut SqliteConnection, username: &str, password: &str, role: Role) -> AppResult<Account> {
		let salt = new_salt();
		let (id,): (Id,) = sqlx::query_as(
			"INSERT INTO accounts (username, pass_salt, pass_hash, role) VALUES (?, ?, ?, ?) RETURNING id",
		)
		.bind(username)
		.bind(&salt)
		.bind(hash_password(&salt, password))
		.bind(role.as_str())
		.fetch_one(&mut *conn)
		.await?;
		tracing::info!(%username, role = role.as_str(), "account created");
		Ok(Account { id, username: username.to_string(), role })
	}

	/// `None` for an unknown username or a wrong password.
	pub async fn authenticate(db: &SqlitePool, username: &str, password: &str) -> AppResult<Option<Account>> {
		let row = sqlx::query_as::<_, AccountQuery>(
			"SELECT id, username, pass_salt, pass_hash, role FROM accounts WHERE username = ?",
		)
		.bind(username)
		.fetch_optional(db)
		.await?;

		Ok(row
			.filter(|row| hash_password(&row.pass_salt, password) == row.pass_hash)
			.as_ref()
			.and_then(Account::from_query))
	}

	pub async fn find_by_session(db: &SqlitePool, token: &str) -> AppResult<Option<Account>> {
		let row = sqlx::query_as::<_, AccountQuery>(
			"SELECT a.id, a.username, a.pass_salt, a.pass_hash, a.role
			 FROM sessions s JOIN accounts a ON a.id = s.account_id
			 WHERE s.token = ? AND s.created_at > datetime('now', ?)",
		)
		.bind(token)
		.bind(session_age())
		.fetch_optional(db)
		.await?;
		Ok(row.as_ref().and_then(Account::from_query))
	}

	/// Opens a new session, dropping every expired one first.
	pub async fn start_session(&self, db: &SqlitePool) -> AppResult<String> {
		let purged = sqlx::query("DELETE FROM sessions WHERE created_at <= datetime('now', ?)")
			.bind(session_age())
			.execute(db)
			.await?
			.rows_affected();
		if purged > 0 {
			tracing::debug!(purged, "expired sessions removed");
		}

		let token = new_session_token();
		sqlx::query("INSERT INTO sessions (token, account_id) VALUES (?, ?)")
			.bind(&token)
			.bind(self.id)
			.execute(db)
			.await?;
		Ok(token)
	}

	pub async fn end_session(db: &SqlitePool, token: &str) -> AppResult<()> {
		sqlx::query("DELETE FROM sessions WHERE token = ?")
			.bind(token)
			.execute(db)
			.await?;
		Ok(())
	}
}

// sqlite modifier for the oldest session still accepted
fn session_age() -> String {
	format!("-{SESSION_DAYS} days")
}

impl Student {
	pub async fn create(
		db: &SqlitePool,
		account_id: Option<Id>,
		full_name: &str,
		student_code: &str,
	) -> AppResult<Student> {
		let mut conn = db.acquire().await?;
		Student::insert(&mut conn, account_id, full_name, student_code).await
	}

	async fn insert(
		conn: &mut SqliteConnection,
		account_id: Option<Id>,
		full_name: &str,
		student_code: &str,
	) -> AppResult<Student> {
		let student = sqlx::query_as::<_, Student>(
			"INSERT INTO students (account_id, full_name, student_code) VALUES (?, ?, ?)
			 RETURNING id, account_id, full_name, student_code",
		)
		.bind(account_id)
		.bind(full_name)
		.bind(student_code)
		.fetch_one(&mut *conn)
		.await?;
		Ok(student)
	}

	/// Login and student profile in one transaction; nothing is kept if either insert fails.
	pub async fn register(
		db: &SqlitePool,
		username: &str,
		password: &str,
		full_name: &str,
		student_code: &str,
	) -> AppResult<(Account, Student)> {
		let mut tx = db.begin().await?;
		let account = Account::insert(&mut tx, username, password, Role::Student).await?;
		let student = Student::insert(&mut tx, Some(account.id), full_name, student_code).await?;
		tx.commit().await?;
		Ok((account, student))
	}

	pub async fn find_by_account(db: &SqlitePool, account_id: Id) -> AppResult<Option<Student>> {
		let student = sqlx::query_as::<_, Student>(
			"SELECT id, account_id, full_name, student_code FROM students WHERE account_id = ?",
		)
		.bind(account_id)
		.fetch_optional(db)
		.await?;
		Ok(student)
	}

	/// Every student, by student code.
	pub async fn roster(db: &SqlitePool) -> AppResult<Vec<Student>> {
		let students = sqlx::query_as::<_, Student>(
			"SELECT id, account_id, full_name, student_code FROM students ORDER BY student_code",
		)
		.fetch_all(db)
		.await?;
		Ok(students)
	}
}

impl Teacher {
	pub async fn create(db: &SqlitePool, account_id: Id, full_name: &str) -> AppResult<Teacher> {
		let mut conn = db.acquire().await?;
		Teacher::insert(&mut conn, account_id, full_name).await
	}

	async fn insert(conn: &mut SqliteConnection, account_id: Id, full_name: &str) -> AppResult<Teacher> {
		let teacher = sqlx::query_as::<_, Teacher>(
			"INSERT INTO teachers (account_id, full_name) VALUES (?, ?) RETURNING id, account_id, full_name",
		)
		.bind(account_id)
		.bind(full_name)
		.fetch_one(&mut *conn)
		.await?;
		Ok(teacher)
	}

	/// Login and teacher profile in one transaction.
	pub async fn register(db: &SqlitePool, username: &str, password: &str, full_name: &str) -> AppResult<(Account, Teacher)> {
		let mut tx = db.begin().await?;
		let account = Account::insert(&mut tx, username, password, Role::Teacher).await?;
		let teacher = Teacher::insert(&mut tx, account.id, full_name).await?;
		tx.commit().await?;
		Ok((account, teacher))
	}

	pub async fn find_by_account(db: &SqlitePool, account_id: Id) -> AppResult<Option<Teacher>> {
		let teacher = sqlx::query_as::<_, Teacher>(
			"SELECT id, account_id, full_name FROM teachers WHERE account_id = ?",
		)
		.bind(account_id)
		.fetch_optional(db)
		.await?;
		Ok(teacher)
	}
}

impl Module {
	/// In creation order.
	pub async fn all(db: &SqlitePool) -> AppResult<Vec<Module>> {
		let modules = sqlx::query_as::<_, Module>("SELECT id, name FROM modules ORDER BY id")
			.fetch_all(db)
			.await?;
		Ok(modules)
	}

	pub async fn find_by_name(db: &SqlitePool, name: &str) -> AppResult<Option<Module>> {
		let module = sqlx::query_as::<_, Module>(
			"SELECT id, name FROM modules WHERE name = ? ORDER BY id LIMIT 1",
		)
		.bind(name)
		.fetch_optional(db)
		.await?;
		Ok(module)
	}

	/// Get-or-create by name. Only teacher module selection and the admin CLI call this.
	pub async fn ensure(db: &SqlitePool, name: &str) -> AppResult<Module> {
		if let Some(module) = Module::find_by_name(db, name).await? {
			return Ok(module);
		}
		let module = sqlx::query_as::<_, Module>("INSERT INTO modules (name) VALUES (?) RETURNING id, name")
			.bind(name)
			.fetch_one(db)
			.await?;
		tracing::info!(name, id = module.id, "module created");
		Ok(module)
	}

	/// Timetabled and stored module names, deduplicated and sorted.
	pub async fn selectable_names(db: &SqlitePool, schedule: &Schedule) -> AppResult<Vec<String>> {
		let mut names: Vec<String> = Module::all(db).await?.into_iter().map(|m| m.name).collect();
		names.extend(schedule.module_names().map(str::to_string));
		names.sort();
		names.dedup();
		Ok(names)
	}
}

fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
	let invalid = || AppError::BadRequest(format!("{year}-{month} is not a valid month"));
	let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
	let next = first
		.checked_add_months(chrono::Months::new(1))
		.ok_or_else(invalid)?;
	Ok((first, next))
}

const UPSERT_ATTENDANCE: &str = "INSERT INTO attendance_records (student_id, module_id, date, status)
	VALUES (?, ?, ?, ?)
	ON CONFLICT(student_id, module_id, date) DO UPDATE SET status = excluded.status";

impl AttendanceRecord {
	/// Writes every status in one transaction; on failure none of them land.
	pub async fn upsert_roster(
		db: &SqlitePool,
		module_id: Id,
		date: NaiveDate,
		statuses: &[(Id, AttendanceStatus)],
	) -> AppResult<()> {
		let mut tx = db.begin().await?;
		for (student_id, status) in statuses {
			sqlx::query(UPSERT_ATTENDANCE)
				.bind(student_id)
				.bind(module_id)
				.bind(date)
				.bind(status.code())
				.execute(&mut *tx)
				.await?;
		}
		tx.commit().await?;
		tracing::info!(module_id, %date, count = statuses.len(), "attendance saved");
		Ok(())
	}

	pub async fn for_student_month(
		db: &SqlitePool,
		student_id: Id,
		year: i32,
		month: u32,
	) -> AppResult<Vec<AttendanceRecord>> {
		let (first, next) = month_bounds(year, month)?;
		let rows = sqlx::query_as::<_, AttendanceRecordQuery>(
			"SELECT student_id, module_id, date, status FROM attendance_records
			 WHERE student_id = ? AND date >= ? AND date < ?",
		)
		.bind(student_id)
		.bind(first)
		.bind(next)
		.fetch_all(db)
		.await?;
		Ok(rows.iter().filter_map(AttendanceRecord::from_query).collect())
	}

	/// student id -> status for one lesson.
	pub async fn for_lesson(
		db: &SqlitePool,
		module_id: Id,
		date: NaiveDate,
	) -> AppResult<HashMap<Id, AttendanceStatus>> {
		let rows = sqlx::query_as::<_, AttendanceRecordQuery>(
			"SELECT student_id, module_id, date, status FROM attendance_records
			 WHERE module_id = ? AND date = ?",
		)
		.bind(module_id)
		.bind(date)
		.fetch_all(db)
		.await?;
		Ok(rows
			.iter()
			.filter_map(AttendanceRecord::from_query)
			.map(|rec| (rec.student_id, rec.status))
			.collect())
	}
}

const EXAM_COLUMNS: &str = "id, title, date, time, place, created_at";

impl Exam {
	pub async fn create(db: &SqlitePool, exam: &NewExam) -> AppResult<Exam> {
		let created = sqlx::query_as::<_, Exam>(&format!(
			"INSERT INTO exams (title, date, time, place) VALUES (?, ?, ?, ?) RETURNING {EXAM_COLUMNS}"
		))
		.bind(&exam.title)
		.bind(exam.date)
		.bind(&exam.time)
		.bind(&exam.place)
		.fetch_one(db)
		.await?;
		tracing::info!(id = created.id, title = %created.title, "exam created");
		Ok(created)
	}

	pub async fn update(db: &SqlitePool, id: Id, exam: &NewExam) -> AppResult<Exam> {
		let updated = sqlx::query_as::<_, Exam>(&format!(
			"UPDATE exams SET title = ?, date = ?, time = ?, place = ? WHERE id = ? RETURNING {EXAM_COLUMNS}"
		))
		.bind(&exam.title)
		.bind(exam.date)
		.bind(&exam.time)
		.bind(&exam.place)
		.bind(id)
		.fetch_optional(db)
		.await?
		.ok_or(AppError::NotFound("exam"))?;
		tracing::info!(id, "exam updated");
		Ok(updated)
	}

	/// Results go with it through the cascade.
	pub async fn delete(db: &SqlitePool, id: Id) -> AppResult<()> {
		let done = sqlx::query("DELETE FROM exams WHERE id = ?")
			.bind(id)
			.execute(db)
			.await?;
		if done.rows_affected() == 0 {
			return Err(AppError::NotFound("exam"));
		}
		tracing::info!(id, "exam deleted");
		Ok(())
	}

	pub async fn find(db: &SqlitePool, id: Id) -> AppResult<Exam> {
		sqlx::query_as::<_, Exam>(&format!("SELECT {EXAM_COLUMNS} FROM exams WHERE id = ?"))
			.bind(id)
			.fetch_optional(db)
			.await?
			.ok_or(AppError::NotFound("exam"))
	}

	/// Exams on or after `today`, soonest first.
	pub async fn upcoming(db: &SqlitePool, today: NaiveDate, limit: Option<i64>) -> AppResult<Vec<Exam>> {
		let exams = sqlx::query_as::<_, Exam>(&format!(
			"SELECT {EXAM_COLUMNS} FROM exams WHERE date >= ? ORDER BY date, time LIMIT ?"
		))
		.bind(today)
		.bind(limit.unwrap_or(-1))
		.fetch_all(db)
		.await?;
		Ok(exams)
	}

	/// Exams before `today`, most recent first.
	pub async fn past(db: &SqlitePool, today: NaiveDate) -> AppResult<Vec<Exam>> {
		let exams = sqlx::query_as::<_, Exam>(&format!(
			"SELECT {EXAM_COLUMNS} FROM exams WHERE date < ? ORDER BY date DESC, time DESC"
		))
		.bind(today)
		.fetch_all(db)
		.await?;
		Ok(exams)
	}
}

#[derive(Debug, sqlx::FromRow)]
struct StudentMarkQuery {
	id: Id,
	title: String,
	date: NaiveDate,
	time: String,
	place: String,
	created_at: NaiveDateTime,
	mark: Option<i64>,
}

const UPSERT_RESULT: &str = "INSERT INTO exam_results (exam_id, student_id, mark) VALUES (?, ?, ?)
	ON CONFLICT(exam_id, student_id) DO UPDATE SET mark = excluded.mark";

impl ExamResult {
	/// student id -> mark for one exam.
	pub async fn for_exam(db: &SqlitePool, exam_id: Id) -> AppResult<HashMap<Id, Option<i64>>> {
		let rows = sqlx::query_as::<_, ExamResult>(
			"SELECT exam_id, student_id, mark FROM exam_results WHERE exam_id = ?",
		)
		.bind(exam_id)
		.fetch_all(db)
		.await?;
		Ok(rows.into_iter().map(|r| (r.student_id, r.mark)).collect())
	}

	/// Writes every mark in one transaction; on failure none of them land.
	pub async fn upsert_roster(db: &SqlitePool, exam_id: Id, marks: &[(Id, Option<i64>)]) -> AppResult<()> {
		let mut tx = db.begin().await?;
		for (student_id, mark) in marks {
			sqlx::query(UPSERT_RESULT)
				.bind(exam_id)
				.bind(student_id)
				.bind(mark)
				.execute(&mut *tx)
				.await?;
		}
		tx.commit().await?;
		tracing::info!(exam_id, count = marks.len(), "marks saved");
		Ok(())
	}

	/// Results of exams held before `today`, most recent exam first.
	pub async fn past_for_student(
		db: &SqlitePool,
		student_id: Id,
		today: NaiveDate,
	) -> AppResult<Vec<(Exam, Option<i64>)>> {
		let rows = sqlx::query_as::<_, StudentMarkQuery>(
			"SELECT e.id, e.title, e.date, e.time, e.place, e.created_at, r.mark
			 FROM exam_results r JOIN exams e ON e.id = r.exam_id
			 WHERE r.student_id = ? AND e.date < ?
			 ORDER BY e.date DESC, e.time DESC",
		)
		.bind(student_id)
		.bind(today)
		.fetch_all(db)
		.await?;
		Ok(rows
			.into_iter()
			.map(|row| {
				let exam = Exam {
					id: row.id,
					title: row.title,
					date: row.date,
					time: row.time,
					place: row.place,
					created_at: row.created_at,
				};
				(exam, row.mark)
			})
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sql::open_in_memory;

	fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	fn new_exam(title: &str, date: NaiveDate, time: &str) -> NewExam {
		NewExam {
			title: title.to_string(),
			date,
			time: time.to_string(),
			place: "Hall A".to_string(),
		}
	}

	#[tokio::test]
	async fn login_checks_password() {
		let db = open_in_memory().await.unwrap();
		let created = Account::create(&db, "ada", "s3cret", Role::Student).await.unwrap();

		let found = Account::authenticate(&db, "ada", "s3cret").await.unwrap().unwrap();
		assert_eq!(found.id, created.id);
		assert_eq!(found.role, Role::Student);
		assert!(Account::authenticate(&db, "ada", "wrong").await.unwrap().is_none());
		assert!(Account::authenticate(&db, "nobody", "s3cret").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn sessions_resolve_until_ended() {
		let db = open_in_memory().await.unwrap();
		let account = Account::create(&db, "mr-t", "pw", Role::Teacher).await.unwrap();
		let token = account.start_session(&db).await.unwrap();

		let found = Account::find_by_session(&db, &token).await.unwrap().unwrap();
		assert_eq!(found.username, "mr-t");
		assert_eq!(found.role, Role::Teacher);

		Account::end_session(&db, &token).await.unwrap();
		assert!(Account::find_by_session(&db, &token).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn expired_sessions_stop_resolving() {
		let db = open_in_memory().await.unwrap();
		let account = Account::create(&db, "ada", "pw", Role::Student).await.unwrap();
		let stale = account.start_session(&db).await.unwrap();
		sqlx::query("UPDATE sessions SET created_at = datetime('now', '-8 days') WHERE token = ?")
			.bind(&stale)
			.execute(&db)
			.await
			.unwrap();
		assert!(Account::find_by_session(&db, &stale).await.unwrap().is_none());

		let fresh = account.start_session(&db).await.unwrap();
		assert!(Account::find_by_session(&db, &fresh).await.unwrap().is_some());
		let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
			.fetch_one(&db)
			.await
			.unwrap();
		assert_eq!(count, 1);
	}

	#[tokio::test]
	async fn register_keeps_login_and_profile_together() {
		let db = open_in_memory().await.unwrap();
		let (account, student) = Student::register(&db, "ada", "pw", "Ada", "S001").await.unwrap();
		assert_eq!(student.account_id, Some(account.id));
		let (account, teacher) = Teacher::register(&db, "mr-t", "pw", "Mr T").await.unwrap();
		assert_eq!(teacher.account_id, account.id);
		assert_eq!(account.role, Role::Teacher);

		// duplicate student code: the account insert is rolled back too
		assert!(Student::register(&db, "ben", "pw", "Ben", "S001").await.is_err());
		assert!(Account::authenticate(&db, "ben", "pw").await.unwrap().is_none());
		let (accounts,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
			.fetch_one(&db)
			.await
			.unwrap();
		assert_eq!(accounts, 2);

		// the username is free again for a retry
		Student::register(&db, "ben", "pw", "Ben", "S002").await.unwrap();
	}

	#[tokio::test]
	async fn attendance_upsert_overwrites() {
		let db = open_in_memory().await.unwrap();
		let student = Student::create(&db, None, "Ada", "S001").await.unwrap();
		let math = Module::ensure(&db, "Math").await.unwrap();
		let date = ymd(2025, 6, 2);

		AttendanceRecord::upsert_roster(&db, math.id, date, &[(student.id, AttendanceStatus::Present)])
			.await
			.unwrap();
		AttendanceRecord::upsert_roster(&db, math.id, date, &[(student.id, AttendanceStatus::Absent)])
			.await
			.unwrap();

		let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM attendance_records")
			.fetch_one(&db)
			.await
			.unwrap();
		assert_eq!(count, 1);
		let lesson = AttendanceRecord::for_lesson(&db, math.id, date).await.unwrap();
		assert_eq!(lesson.get(&student.id), Some(&AttendanceStatus::Absent));
	}

	#[tokio::test]
	async fn month_query_stays_in_month() {
		let db = open_in_memory().await.unwrap();
		let student = Student::create(&db, None, "Ada", "S001").await.unwrap();
		let math = Module::ensure(&db, "Math").await.unwrap();
		for date in [ymd(2025, 5, 30), ymd(2025, 6, 2), ymd(2025, 6, 30), ymd(2025, 7, 1)] {
			AttendanceRecord::upsert_roster(&db, math.id, date, &[(student.id, AttendanceStatus::Present)])
				.await
				.unwrap();
		}
		let june = AttendanceRecord::for_student_month(&db, student.id, 2025, 6).await.unwrap();
		let mut dates: Vec<NaiveDate> = june.iter().map(|r| r.date).collect();
		dates.sort();
		assert_eq!(dates, [ymd(2025, 6, 2), ymd(2025, 6, 30)]);

		let december = AttendanceRecord::for_student_month(&db, student.id, 2025, 12).await.unwrap();
		assert!(december.is_empty());
		assert!(matches!(
			AttendanceRecord::for_student_month(&db, student.id, 2025, 13).await,
			Err(AppError::BadRequest(_))
		));
	}

	#[tokio::test]
	async fn failed_roster_write_leaves_nothing() {
		let db = open_in_memory().await.unwrap();
		let student = Student::create(&db, None, "Ada", "S001").await.unwrap();
		let math = Module::ensure(&db, "Math").await.unwrap();
		// second student does not exist, so the foreign key fails mid-roster
		let res = AttendanceRecord::upsert_roster(
			&db,
			math.id,
			ymd(2025, 6, 2),
			&[(student.id, AttendanceStatus::Present), (999, AttendanceStatus::Absent)],
		)
		.await;
		assert!(res.is_err());
		let lesson = AttendanceRecord::for_lesson(&db, math.id, ymd(2025, 6, 2)).await.unwrap();
		assert!(lesson.is_empty());
	}

	#[tokio::test]
	async fn ensure_module_is_idempotent() {
		let db = open_in_memory().await.unwrap();
		let first = Module::ensure(&db, "Art").await.unwrap();
		let again = Module::ensure(&db, "Art").await.unwrap();
		assert_eq!(first, again);
		assert_eq!(Module::all(&db).await.unwrap().len(), 1);

		let names = Module::selectable_names(&db, &Schedule::default()).await.unwrap();
		assert_eq!(names, ["Art", "Chemistry", "English", "History", "Math"]);
	}

	#[tokio::test]
	async fn exams_split_by_today() {
		let db = open_in_memory().await.unwrap();
		let today = ymd(2025, 6, 10);
		Exam::create(&db, &new_exam("Late", ymd(2025, 6, 20), "09:00")).await.unwrap();
		Exam::create(&db, &new_exam("Soon pm", ymd(2025, 6, 10), "14:00")).await.unwrap();
		Exam::create(&db, &new_exam("Soon am", ymd(2025, 6, 10), "09:00")).await.unwrap();
		Exam::create(&db, &new_exam("Old", ymd(2025, 5, 1), "09:00")).await.unwrap();
		Exam::create(&db, &new_exam("Older", ymd(2025, 4, 1), "09:00")).await.unwrap();

		let titles = |exams: Vec<Exam>| exams.into_iter().map(|e| e.title).collect::<Vec<_>>();
		assert_eq!(titles(Exam::upcoming(&db, today, None).await.unwrap()), ["Soon am", "Soon pm", "Late"]);
		assert_eq!(titles(Exam::upcoming(&db, today, Some(2)).await.unwrap()), ["Soon am", "Soon pm"]);
		assert_eq!(titles(Exam::past(&db, today).await.unwrap()), ["Old", "Older"]);
	}

	#[tokio::test]
	async fn exam_update_and_delete() {
		let db = open_in_memory().await.unwrap();
		let exam = Exam::create(&db, &new_exam("Algebra", ymd(2025, 6, 20), "09:00")).await.unwrap();
		let updated = Exam::update(&db, exam.id, &new_exam("Geometry", ymd(2025, 6, 21), "10:00"))
			.await
			.unwrap();
		assert_eq!(updated.title, "Geometry");
		assert_eq!(updated.created_at, exam.created_at);
		assert_eq!(Exam::find(&db, exam.id).await.unwrap(), updated);

		Exam::delete(&db, exam.id).await.unwrap();
		assert!(matches!(Exam::find(&db, exam.id).await, Err(AppError::NotFound("exam"))));
		assert!(matches!(Exam::delete(&db, exam.id).await, Err(AppError::NotFound("exam"))));
		assert!(matches!(
			Exam::update(&db, exam.id, &new_exam("X", ymd(2025, 6, 21), "10:00")).await,
			Err(AppError::NotFound("exam"))
		));
	}

	#[tokio::test]
	async fn marks_upsert_and_cascade() {
		let db = open_in_memory().await.unwrap();
		let ada = Student::create(&db, None, "Ada", "S001").await.unwrap();
		let ben = Student::create(&db, None, "Ben", "S002").await.unwrap();
		let exam = Exam::create(&db, &new_exam("Algebra", ymd(2025, 5, 20), "09:00")).await.unwrap();

		ExamResult::upsert_roster(&db, exam.id, &[(ada.id, Some(30)), (ben.id, None)]).await.unwrap();
		ExamResult::upsert_roster(&db, exam.id, &[(ada.id, Some(75)), (ben.id, None)]).await.unwrap();
		let marks = ExamResult::for_exam(&db, exam.id).await.unwrap();
		assert_eq!(marks.len(), 2);
		assert_eq!(marks[&ada.id], Some(75));
		assert_eq!(marks[&ben.id], None);

		let past = ExamResult::past_for_student(&db, ada.id, ymd(2025, 6, 1)).await.unwrap();
		assert_eq!(past.len(), 1);
		assert_eq!(past[0].0.title, "Algebra");
		assert_eq!(past[0].1, Some(75));
		assert!(ExamResult::past_for_student(&db, ada.id, ymd(2025, 5, 20)).await.unwrap().is_empty());

		Exam::delete(&db, exam.id).await.unwrap();
		assert!(ExamResult::for_exam(&db, exam.id).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn profiles_follow_accounts() {
		let db = open_in_memory().await.unwrap();
		let account = Account::create(&db, "ada", "pw", Role::Student).await.unwrap();
		let student = Student::create(&db, Some(account.id), "Ada", "S001").await.unwrap();
		assert_eq!(Student::find_by_account(&db, account.id).await.unwrap(), Some(student));
		assert_eq!(Teacher::find_by_account(&db, account.id).await.unwrap(), None);

		sqlx::query("DELETE FROM accounts WHERE id = ?")
			.bind(account.id)
			.execute(&db)
			.await
			.unwrap();
		assert!(Student::roster(&db).await.unwrap().is_empty());
	}
}
