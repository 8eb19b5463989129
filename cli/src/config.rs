//! Command-line and environment configuration, plus logging setup.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use student_core::controller::parse_year;
use student_core::{StudentStatus, StudentUpdate, DEFAULT_BASE_URL};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "students", about = "Student records front end", version)]
pub struct Cli {
    /// Base URL of the student API, including the /api/v1 prefix
    #[arg(long, env = "STUDENTS_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive page (the default)
    Ui,
    /// Print every student
    List,
    /// Print one student
    Get { id: u64 },
    /// Students in one major
    ByMajor { major: String },
    /// Students with one status (default: active)
    ByStatus { status: Option<StudentStatus> },
    /// Check the service health endpoint
    Health,
    /// Change fields of an existing student
    Update(UpdateArgs),
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub id: u64,
    #[arg(long)]
    pub student_code: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// YYYY-MM-DD, or a full RFC 3339 timestamp
    #[arg(long, value_parser = parse_date_of_birth)]
    pub date_of_birth: Option<DateTime<Utc>>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub major: Option<String>,
    #[arg(long, value_parser = parse_year)]
    pub year: Option<u8>,
    #[arg(long, value_parser = parse_gpa)]
    pub gpa: Option<f64>,
    #[arg(long)]
    pub status: Option<StudentStatus>,
}

impl UpdateArgs {
    pub fn to_update(&self) -> StudentUpdate {
        StudentUpdate {
            student_code: self.student_code.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            date_of_birth: self.date_of_birth,
            address: self.address.clone(),
            major: self.major.clone(),
            year: self.year,
            gpa: self.gpa,
            status: self.status,
        }
    }
}

fn parse_gpa(input: &str) -> Result<f64, String> {
    let gpa: f64 = input
        .trim()
        .parse()
        .map_err(|_| format!("gpa must be a number, got {input:?}"))?;
    if !(0.0..=4.0).contains(&gpa) {
        return Err(format!("gpa must be between 0 and 4, got {gpa}"));
    }
    Ok(gpa)
}

/// A bare date means midnight UTC on that day.
fn parse_date_of_birth(input: &str) -> Result<DateTime<Utc>, String> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("expected YYYY-MM-DD or an RFC 3339 timestamp, got {input:?}"))
}

/// Load `.env` from the working directory or a parent. A missing file is
/// fine; one that exists but does not parse is an error.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    allow_missing(dotenvy::dotenv().map(drop))
}

fn allow_missing(loaded: Result<(), dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match loaded {
        Err(e) if e.not_found() => Ok(()),
        other => other,
    }
}

/// Install the global subscriber. Logs go to stderr so they never
/// interleave with the rendered page on stdout.
pub fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
