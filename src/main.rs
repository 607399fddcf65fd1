use anyhow::Context;
use clap::Parser;
use sorteo_lib::cli::{Cli, Command, ConfigAction, SortArgs};
use sorteo_lib::commands::{config, sort, types};
use sorteo_lib::config::AppSettings;
use sorteo_lib::{logging, AppState, RunEvent, RunStatus};
use std::io::Write;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let state = match AppState::new(cli.config_dir.clone()) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("ERROR: cannot prepare config directory: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    // 进程结束前保持 guard，确保缓冲日志写入文件
    let _guard = logging::init_logging(&state.config_dir);

    match dispatch(&state, cli.command).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("命令失败: {:#}", e);
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(state: &AppState, command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::Sort(args) => run_sort(state, args).await,
        Command::Config { action } => {
            let config = match action {
                ConfigAction::Show => config::get_config(state),
                ConfigAction::Set(args) => config::set_config(state, &args)?,
            };
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Types => {
            for line in types::list_types() {
                println!("{}", line);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_sort(state: &AppState, args: SortArgs) -> anyhow::Result<ExitCode> {
    let settings = AppSettings::load(&state.config_dir);
    let request = sort::build_request(&args, &settings)?;

    let show_progress = args.progress;
    let stdout = std::io::stdout();
    let report = sort::run_sort(state, request, |event| match event {
        RunEvent::Log(line) => {
            let _ = writeln!(stdout.lock(), "{}", line);
        }
        RunEvent::Progress(p) if show_progress => {
            eprintln!("Progress: {:.0}%", p * 100.0);
        }
        RunEvent::Progress(_) => {}
    })
    .await
    .context("sort run did not start")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match report.status {
        RunStatus::Completed => Ok(ExitCode::SUCCESS),
        RunStatus::Failed => {
            eprintln!(
                "ERROR: {}",
                report.error.as_deref().unwrap_or("sort run failed")
            );
            Ok(ExitCode::FAILURE)
        }
    }
}
