use std::{io, time::Duration};

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use taskdeck::api::ApiClient;
use taskdeck::app::App;
use taskdeck::config::Config;
use taskdeck::session::SessionStore;
use taskdeck::ui;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they don't tear the alternate screen; silence
    // them entirely unless RUST_LOG is set.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = Config::from_env();
    tracing::debug!(?config, "starting");
    let store = SessionStore::new(config.session_file.clone());
    let mut app = App::new(ApiClient::new(config.api_url.clone(), store));

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    // A stored session skips the login screen; load the list right away.
    if app.is_dashboard() {
        app.load_tasks().await;
    }

    loop {
        app.tick();
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.on_key(key).await;
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
