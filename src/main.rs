use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod app;
mod attachment;
mod config;
mod gemini;
mod handler;
mod model;
mod theme;
mod tui;
mod ui;

use app::App;
use gemini::GeminiClient;
use tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    // Missing credentials are a startup failure, reported while stderr is
    // still a plain terminal.
    let client = GeminiClient::from_env()?;
    let mut app = App::new(client);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    tracing::info!("uxwrite v{} started", env!("CARGO_PKG_VERSION"));
    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut EventHandler, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Log to a file under the user data dir; the TUI owns stderr. Level is
/// controlled by `UXWRITE_LOG`. Best-effort: an unwritable log location
/// silently disables logging rather than blocking the app.
fn init_logging() {
    let Some(log_dir) = dirs::data_local_dir().map(|d| d.join("uxwrite")) else {
        return;
    };
    if std::fs::create_dir_all(&log_dir).is_err() {
        return;
    }
    let Ok(log_file) = std::fs::File::create(log_dir.join("uxwrite.log")) else {
        return;
    };

    let env_filter = EnvFilter::try_from_env("UXWRITE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("uxwrite=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();
}
