use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod app;
mod constants;
mod event;
mod handler;
mod horizon;
mod network;
mod stellar;
mod theme;
#[cfg(test)]
mod test_utils;
mod tui;
mod ui;
mod wallet;

use crate::{
    app::App,
    constants::TICK_RATE,
    event::{Action, WalletUpdateEvent},
    handler::handle_event,
    horizon::{HorizonClient, LedgerClient},
    network::TaskRunner,
    stellar::Network,
    tui::Tui,
    wallet::{DEFAULT_WALLET_URL, WalletAgent, WalletProvider},
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ASCII art logo
const LOGO: &str = r#"
██╗     ██╗   ██╗███╗   ███╗███████╗███╗   ██╗██╗   ██╗ ██████╗ ████████╗███████╗
██║     ██║   ██║████╗ ████║██╔════╝████╗  ██║██║   ██║██╔═══██╗╚══██╔══╝██╔════╝
██║     ██║   ██║██╔████╔██║█████╗  ██╔██╗ ██║██║   ██║██║   ██║   ██║   █████╗
██║     ██║   ██║██║╚██╔╝██║██╔══╝  ██║╚██╗██║╚██╗ ██╔╝██║   ██║   ██║   ██╔══╝
███████╗╚██████╔╝██║ ╚═╝ ██║███████╗██║ ╚████║ ╚████╔╝ ╚██████╔╝   ██║   ███████╗
╚══════╝ ╚═════╝ ╚═╝     ╚═╝╚══════╝╚═╝  ╚═══╝  ╚═══╝   ╚═════╝    ╚═╝   ╚══════╝
"#;

/// lumenvote - vote and support with one Stellar payment, from the terminal
#[derive(Parser)]
#[command(version = VERSION, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Target network
    #[arg(short, long, value_enum, default_value_t = Network::TestNet)]
    network: Network,

    /// Horizon base URL override
    #[arg(long)]
    horizon_url: Option<String>,

    /// Wallet agent base URL
    #[arg(long, default_value = DEFAULT_WALLET_URL)]
    wallet_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Display version with ASCII art
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they do not tear the alternate screen.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if handle_cli_commands(&cli) {
        return Ok(());
    }

    color_eyre::install()?;
    let mut terminal = tui::init()?;
    let mut app = App::new(cli.network);

    let runtime = tokio::runtime::Handle::current();
    let (sender, mut receiver) = mpsc::channel::<WalletUpdateEvent>(100);

    let horizon = Arc::new(match &cli.horizon_url {
        Some(url) => HorizonClient::with_url(url),
        None => HorizonClient::new(cli.network),
    });
    let wallet = Arc::new(WalletAgent::new(cli.wallet_url.clone()));
    let runner = TaskRunner::new(horizon, wallet, runtime, sender);

    // One-shot startup check; the UI shows a loading state until it lands.
    runner.check_connection();

    let result = run_app(&mut terminal, &mut app, &runner, &mut receiver).await;

    tui::restore()?;
    result
}

/// Handles CLI subcommands. Returns true if a command was handled and the
/// app should exit.
fn handle_cli_commands(cli: &Cli) -> bool {
    match &cli.command {
        Some(Commands::Version) => {
            println!("{LOGO}");
            println!("lumenvote v{VERSION}");
            println!("Vote and support with one Stellar payment, from the terminal");
            true
        }
        None => false,
    }
}

/// Main application loop.
async fn run_app<L, W>(
    terminal: &mut Tui,
    app: &mut App,
    runner: &TaskRunner<L, W>,
    receiver: &mut mpsc::Receiver<WalletUpdateEvent>,
) -> Result<()>
where
    L: LedgerClient + 'static,
    W: WalletProvider + 'static,
{
    loop {
        if app.exit {
            break;
        }

        terminal.draw(|frame| ui::render(app, frame))?;

        // Poll for terminal events with a very small timeout, then drain
        // task events and sleep if nothing happened.
        let mut terminal_event_ready = false;
        if crossterm::event::poll(Duration::from_millis(1))? {
            terminal_event_ready = true;
            match crossterm::event::read() {
                Ok(crossterm::event::Event::Resize(..)) => continue,
                Ok(event) => {
                    if let Some(action) = handle_event(app, event) {
                        dispatch(app, action, runner)?;
                    }
                }
                Err(_) => app.exit = true,
            }
        }

        match receiver.try_recv() {
            Ok(event) => dispatch(app, event.into(), runner)?,
            Err(mpsc::error::TryRecvError::Empty) => {}
            Err(mpsc::error::TryRecvError::Disconnected) => app.exit = true,
        }

        if !terminal_event_ready {
            tokio::time::sleep(TICK_RATE.min(Duration::from_millis(50))).await;
        }
    }
    Ok(())
}

/// Applies an action, surfacing update errors as a popup instead of
/// terminating the loop.
fn dispatch<L, W>(app: &mut App, action: Action, runner: &TaskRunner<L, W>) -> Result<()>
where
    L: LedgerClient + 'static,
    W: WalletProvider + 'static,
{
    if let Err(e) = app.update(action, runner) {
        app.update(Action::ShowMessage(format!("Error: {e}")), runner)?;
    }
    Ok(())
}
