use anyhow::Result;
use lugia_core::{Config, ConversationClient, SelectionStore, Session};
use tracing::{info, warn};

mod app;
mod debounce;
mod handler;
mod highlight;
mod logging;
mod theme;
mod tui;
mod ui;
mod worker;

use app::App;
use tui::EventHandler;
use worker::SessionWorker;

#[tokio::main]
async fn main() -> Result<()> {
    // Logging is best effort; the UI works without it
    match logging::configure_logging() {
        Ok(path) => info!(log = %path.display(), "lugia starting"),
        Err(err) => eprintln!("Logging disabled: {}", err),
    }

    let config = Config::load().unwrap_or_else(|err| {
        warn!(error = %err, "could not read config, using defaults");
        Config::new()
    });
    let base_url = config.base_url();
    info!(%base_url, "using chat server");

    let client = ConversationClient::http(&base_url)?;
    let store = SelectionStore::default_location()?;
    info!(state = %store.path().display(), "selection state file");
    let session = Session::new(client, store);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let worker = SessionWorker::spawn(session, events.sender());
    let mut app = App::new(worker, &config);
    app.start();

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    info!("lugia exiting");
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}
