use std::io;

use anyhow::{bail, Context};
use clap::Parser;
use student_core::{StudentApi, StudentClient};
use students_cli::config::{self, Cli, Command};
use students_cli::{render, App, Console, UreqTransport};
use tracing::info;

fn main() -> anyhow::Result<()> {
    config::load_dotenv().context("loading .env")?;
    let cli = Cli::parse();
    config::init_tracing(cli.verbose);

    let api = StudentApi::new(StudentClient::new(&cli.api_url), UreqTransport::new());
    info!(base_url = %api.client().base_url(), "using student API");

    match cli.command.unwrap_or(Command::Ui) {
        Command::Ui => {
            let stdin = io::stdin();
            let console = Console::new(stdin.lock(), io::stdout());
            App::new(api, console)
                .run()
                .context("terminal I/O failed")?;
        }
        Command::List => {
            let envelope = api.list_students().context("listing students")?;
            println!("Students ({})", envelope.data.len());
            print!("{}", render::render_students(&envelope.data, None));
        }
        Command::Get { id } => {
            let student = api
                .get_student(id)
                .with_context(|| format!("fetching student {id}"))?;
            print!("{}", render::render_student(&student));
        }
        Command::ByMajor { major } => {
            let envelope = api
                .list_students_by_major(&major)
                .with_context(|| format!("listing students in {major}"))?;
            print!("{}", render::render_students(&envelope.data, None));
        }
        Command::ByStatus { status } => {
            let envelope = api
                .list_students_by_status(status)
                .context("listing students by status")?;
            print!("{}", render::render_students(&envelope.data, None));
        }
        Command::Health => {
            let health = api.health_check().context("checking service health")?;
            println!("service status: {}", health.status);
        }
        Command::Update(args) => {
            let update = args.to_update();
            if update.is_empty() {
                bail!("nothing to update; pass at least one field flag");
            }
            let student = api
                .update_student(args.id, &update)
                .with_context(|| format!("updating student {}", args.id))?;
            print!("{}", render::render_student(&student));
        }
    }
    Ok(())
}
