use std::io;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::error;
use tracing_subscriber::EnvFilter;

use council::api::CouncilClient;
use council::app::{App, AppMessage};
use council::config::Config;
use council::ui;

/// Log to a file so the alternate screen stays clean. Filter via `RUST_LOG`.
fn init_logging() {
    let Some(dir) = dirs::cache_dir() else {
        return;
    };
    let dir = dir.join("council");
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let path = dir.join(format!("council-{}.log", chrono::Utc::now().format("%Y%m%d")));
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let config = Config::load();
    let client = Arc::new(CouncilClient::new(&config));
    let (message_tx, message_rx) = mpsc::unbounded_channel();
    let app = App::new(client, message_tx);

    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let result = run(&mut terminal, app, message_rx).await;

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    mut message_rx: mpsc::UnboundedReceiver<AppMessage>,
) -> Result<()> {
    app.refresh_conversations();

    let mut terminal_events = EventStream::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(120));

    loop {
        if app.dirty {
            terminal.draw(|frame| ui::render(frame, &app))?;
            app.dirty = false;
        }

        tokio::select! {
            maybe_event = terminal_events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.handle_key(key);
                    }
                    Some(Ok(Event::Resize(_, _))) => app.mark_dirty(),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => error!(err = %e, "terminal event error"),
                    None => break,
                }
            }
            Some(message) = message_rx.recv() => {
                app.handle_message(message);
            }
            _ = ticker.tick() => app.on_tick(),
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
