//! Command-line client for the contest catalogue backend.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use contestdesk_client::{ClassLevel, SessionEvent, SessionStream};
use contestdesk_telemetry::{LogFormat, LoggingConfig, init_logging};
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliResult, parse_url};
use crate::commands::contests::{
    handle_contest_add, handle_contest_get, handle_contest_list, handle_contest_remove,
    handle_contest_update,
};
use crate::commands::token::{handle_token_clear, handle_token_set, handle_token_status};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PAGE_PATH: &str = "/admin";
const DEFAULT_TOKEN_STORE: &str = ".contestdesk/storage.json";
const DEFAULT_CLI_LOG_LEVEL: &str = "warn";

/// Parses CLI arguments, executes the requested command, and reports session
/// events raised along the way. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format,
        build_sha: option_env!("CONTESTDESK_BUILD_SHA").unwrap_or("dev"),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    let command_name = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();
    let (ctx, mut events) = match AppContext::from_cli(&cli, &trace_id) {
        Ok(parts) => parts,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    let result = dispatch(cli.command, cli.output, &ctx).await;
    report_session_events(&mut events);

    match result {
        Ok(()) => {
            tracing::debug!(command = command_name, trace_id = %trace_id, "command succeeded");
            0
        }
        Err(err) => {
            let exit_code = err.exit_code();
            tracing::debug!(
                command = command_name,
                trace_id = %trace_id,
                exit_code,
                "command failed"
            );
            eprintln!("error: {}", err.display_message());
            exit_code
        }
    }
}

async fn dispatch(command: Command, output: OutputFormat, ctx: &AppContext) -> CliResult<()> {
    match command {
        Command::Contests(contests) => match contests {
            ContestsCommand::Ls(args) => handle_contest_list(ctx, args, output).await,
            ContestsCommand::Get(args) => handle_contest_get(ctx, args, output).await,
            ContestsCommand::Add(args) => handle_contest_add(ctx, args, output).await,
            ContestsCommand::Update(args) => handle_contest_update(ctx, args, output).await,
            ContestsCommand::Rm(args) => handle_contest_remove(ctx, args).await,
        },
        Command::Token(token) => match token {
            TokenCommand::Set(args) => handle_token_set(ctx, args),
            TokenCommand::Clear => handle_token_clear(ctx),
            TokenCommand::Status => handle_token_status(ctx),
        },
    }
}

/// Print a sign-in prompt when a command ran into an expired admin session.
fn report_session_events(events: &mut SessionStream) {
    let mut expired = false;
    while let Some(event) = events.try_next() {
        tracing::debug!(kind = event.kind(), "session event received");
        if matches!(event, SessionEvent::Expired { .. }) {
            expired = true;
        }
    }
    if expired {
        eprintln!(
            "admin session expired; run `contestdesk token set <token>` to sign in again"
        );
    }
}

#[derive(Parser)]
#[command(
    name = "contestdesk",
    about = "Command-line client for the contest catalogue"
)]
pub(crate) struct Cli {
    #[arg(long, global = true, env = "CONTESTDESK_HOST", default_value = DEFAULT_HOST)]
    pub(crate) host: String,
    #[arg(
        long,
        global = true,
        env = "CONTESTDESK_PAGE_PATH",
        default_value = DEFAULT_PAGE_PATH,
        help = "Page path the request is attributed to; paths containing /admin expire the session on 401"
    )]
    pub(crate) page_path: String,
    #[arg(
        long,
        global = true,
        env = "CONTESTDESK_API_URL",
        value_parser = parse_url,
        help = "Override the base URL derived from --host"
    )]
    pub(crate) api_url: Option<Url>,
    #[arg(
        long,
        global = true,
        env = "CONTESTDESK_TOKEN_STORE",
        default_value = DEFAULT_TOKEN_STORE
    )]
    pub(crate) token_store: PathBuf,
    #[arg(
        long,
        global = true,
        env = "CONTESTDESK_CA_CERT",
        help = "PEM bundle with extra root certificates to trust"
    )]
    pub(crate) ca_cert: Option<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(
        long,
        global = true,
        env = "CONTESTDESK_LOG_FORMAT",
        default_value = "auto"
    )]
    pub(crate) log_format: LogFormat,
    #[arg(
        long,
        global = true,
        env = "CONTESTDESK_LOG_LEVEL",
        default_value = DEFAULT_CLI_LOG_LEVEL
    )]
    pub(crate) log_level: String,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Browse and manage contests.
    #[command(subcommand)]
    Contests(ContestsCommand),
    /// Manage the stored admin token.
    #[command(subcommand)]
    Token(TokenCommand),
}

#[derive(Subcommand)]
pub(crate) enum ContestsCommand {
    /// List contests, optionally filtered by class or year.
    Ls(ContestListArgs),
    /// Show one contest.
    Get(ContestIdArgs),
    /// Create a contest from a JSON file.
    Add(ContestAddArgs),
    /// Apply a partial update from a JSON file.
    Update(ContestUpdateArgs),
    /// Delete a contest.
    Rm(ContestIdArgs),
}

#[derive(Subcommand)]
pub(crate) enum TokenCommand {
    /// Store an admin token issued by the backend.
    Set(TokenSetArgs),
    /// Forget the stored admin token.
    Clear,
    /// Report whether an admin token is stored.
    Status,
}

#[derive(Args, Debug)]
pub(crate) struct ContestListArgs {
    #[arg(long = "class", value_parser = parse_class_level, conflicts_with = "year")]
    pub(crate) class_level: Option<ClassLevel>,
    #[arg(long)]
    pub(crate) year: Option<i32>,
}

#[derive(Args, Debug)]
pub(crate) struct ContestIdArgs {
    pub(crate) id: i64,
}

#[derive(Args, Debug)]
pub(crate) struct ContestAddArgs {
    #[arg(long)]
    pub(crate) file: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ContestUpdateArgs {
    pub(crate) id: i64,
    #[arg(long)]
    pub(crate) file: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct TokenSetArgs {
    pub(crate) value: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

fn parse_class_level(input: &str) -> Result<ClassLevel, String> {
    input
        .parse::<ClassLevel>()
        .map_err(|_| format!("invalid class '{input}' (expected 9, 10, 11, 12, or other)"))
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Contests(ContestsCommand::Ls(_)) => "contests_ls",
        Command::Contests(ContestsCommand::Get(_)) => "contests_get",
        Command::Contests(ContestsCommand::Add(_)) => "contests_add",
        Command::Contests(ContestsCommand::Update(_)) => "contests_update",
        Command::Contests(ContestsCommand::Rm(_)) => "contests_rm",
        Command::Token(TokenCommand::Set(_)) => "token_set",
        Command::Token(TokenCommand::Clear) => "token_clear",
        Command::Token(TokenCommand::Status) => "token_status",
    }
}
