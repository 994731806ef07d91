// student attendance and exam tracker

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use student_tracker::{
	schedule::Schedule,
	sql,
	types::{Module, Student, Teacher},
	AppState, Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "student-tracker", about = "School attendance and exam tracker")]
struct Cli {
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run the web server (default)
	Serve,
	/// Create a student login and profile
	AddStudent {
		#[arg(long)]
		username: String,
		#[arg(long)]
		password: String,
		#[arg(long)]
		code: String,
		#[arg(long)]
		name: String,
	},
	/// Create a teacher login and profile
	AddTeacher {
		#[arg(long)]
		username: String,
		#[arg(long)]
		password: String,
		#[arg(long)]
		name: String,
	},
	/// Make sure a module exists
	AddModule {
		#[arg(long)]
		name: String,
	},
}

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "info,student_tracker=debug,sqlx=warn,tower_http=info".into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	let cli = Cli::parse();
	let config = Config::from_env().context("failed to load configuration")?;

	let db = sql::open(&config.database_url)
		.await
		.with_context(|| format!("can't open database {}", config.database_url))?;

	match cli.command.unwrap_or(Command::Serve) {
		Command::Serve => serve(config, db).await,
		Command::AddStudent { username, password, code, name } => {
			let (account, student) = Student::register(&db, &username, &password, &name, &code)
				.await
				.context("failed to add student")?;
			tracing::info!(account = account.id, id = student.id, code = %student.student_code, "student added");
			Ok(())
		}
		Command::AddTeacher { username, password, name } => {
			let (account, teacher) = Teacher::register(&db, &username, &password, &name)
				.await
				.context("failed to add teacher")?;
			tracing::info!(account = account.id, id = teacher.id, "teacher added");
			Ok(())
		}
		Command::AddModule { name } => {
			let module = Module::ensure(&db, &name).await.context("failed to add module")?;
			tracing::info!(id = module.id, name = %module.name, "module ready");
			Ok(())
		}
	}
}

async fn serve(config: Config, db: sqlx::SqlitePool) -> Result<()> {
	let schedule = Schedule::load(config.schedule_path.as_deref()).context("failed to load schedule")?;
	tracing::info!(modules = schedule.module_names().count(), "schedule loaded");

	let state = AppState::new(db, schedule).with_static_dir(config.static_dir.clone());
	let app = student_tracker::router(state);

	let listener = tokio::net::TcpListener::bind(&config.bind_addr)
		.await
		.with_context(|| format!("failed to bind {}", config.bind_addr))?;
	tracing::info!("listening on {}", config.bind_addr);
	axum::serve(listener, app).await.context("server error")?;
	Ok(())
}
