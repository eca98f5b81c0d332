use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gitchat::core::config::{self, CliOverrides};
use gitchat::core::session::ClientSession;
use gitchat::core::store::{ChatStore, FileChatStore};
use gitchat::net::TcpConnection;
use gitchat::tui::{self, SessionOutcome};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "gitchat", about = "Terminal chat room for everyone working on a repository")]
struct Args {
    /// Chat server host
    #[arg(long)]
    host: Option<String>,
    /// Chat server port
    #[arg(long)]
    port: Option<u16>,
    /// Name shown to other users
    #[arg(long)]
    username: Option<String>,
    /// Repository URI naming the room, e.g. github.com/acme/widgets
    #[arg(long)]
    repo: Option<String>,
    /// File that keeps the chat between sessions
    #[arg(long)]
    store: Option<String>,
    /// Do not read or write the chat store
    #[arg(long)]
    no_store: bool,
    /// Click to focus panes and scroll the log with the wheel
    #[arg(long)]
    mouse: bool,
    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            repo_uri: self.repo.clone(),
            store_path: self.store.clone(),
            no_store: self.no_store,
            mouse: self.mouse,
        }
    }
}

/// Initialize file logger - the terminal belongs to the TUI.
fn init_logging(verbose: bool) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let path = config::config_dir()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok())
        .map(|dir| dir.join("gitchat.log"))
        .unwrap_or_else(|| PathBuf::from("gitchat.log"));

    if let Ok(log_file) = File::create(&path) {
        let _ = WriteLogger::init(level, log_config, log_file);
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();
    init_logging(args.verbose);

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("gitchat: {e}");
            return ExitCode::FAILURE;
        }
    };
    let config = match config::resolve(&file_config, &args.overrides()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("gitchat: {e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "GitChat starting up as {} in {} via {}:{}",
        config.identity.username,
        config.identity.repo_uri,
        config.host,
        config.port
    );

    // Built by hand rather than with #[tokio::main]: dropping a runtime waits
    // for blocking tasks, and the receive task may still be parked in a read.
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("gitchat: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    let outcome = {
        let _guard = runtime.enter();
        connect_and_run(&config)
    };
    runtime.shutdown_background();

    exit_code(outcome)
}

/// Logs how the session ended and maps it to the process exit status.
fn exit_code(outcome: Result<SessionOutcome, Box<dyn std::error::Error>>) -> ExitCode {
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("Fatal: {}", e);
            eprintln!("gitchat: {e}");
            return ExitCode::FAILURE;
        }
    };
    match &outcome {
        SessionOutcome::Quit => log::info!("Exited by user"),
        SessionOutcome::RemoteClosed => log::info!("Exited after the server closed the connection"),
        SessionOutcome::Failed(e) => {
            log::error!("Session failed: {}", e);
            eprintln!("gitchat: {e}");
        }
    }
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn connect_and_run(
    config: &config::ResolvedConfig,
) -> Result<SessionOutcome, Box<dyn std::error::Error>> {
    let connection = TcpConnection::connect(&config.host, config.port)?;
    let mut session = ClientSession::new(Box::new(connection.sender), config.identity.clone());
    session.handshake()?;

    let store = config.store_path.as_ref().map(|path| {
        log::info!("Chat store at {}", path.display());
        Box::new(FileChatStore::new(path.clone())) as Box<dyn ChatStore>
    });

    Ok(tui::run(config, session, Box::new(connection.receiver), store)?)
}
