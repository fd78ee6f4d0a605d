use anyhow::Result;

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    log::info!("Starting quizgen {}", env!("CARGO_PKG_VERSION"));

    let mut app = App::load()?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    if let Err(e) = &result {
        log::error!("quizgen exited with error: {}", e);
    }
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event).await?;
        }

        app.poll_tasks().await;
    }
    Ok(())
}
