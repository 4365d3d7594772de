pub mod app;
pub mod config;
pub mod container_management;
pub mod error;
pub mod inputs;
pub mod io;

use app::{ui, App, AppReturn};
use eyre::Result;
use inputs::{events::Events, InputEvent};
use std::{io::stdout, time::Duration};

/// Runs the dashboard until the user quits.
///
/// This loop is the only place the view changes: key presses go to
/// `App::do_action`, finished background work is picked up on every tick.
pub async fn start_ui(app: &mut App, tick_rate: Duration) -> Result<()> {
    let mut stdout = stdout();
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = tui::backend::CrosstermBackend::new(stdout);
    let mut terminal = tui::Terminal::new(backend)?;
    terminal.clear()?;
    terminal.hide_cursor()?;

    let mut events = Events::new(tick_rate);

    app.initialize().await;

    let outcome = loop {
        if let Err(e) = ui::render(&mut terminal, app) {
            break Err(e);
        }

        let result = match events.next().await {
            InputEvent::Input(key) => app.do_action(key).await,
            InputEvent::Tick => app.update_on_tick(),
        };

        // Check if we should exit
        if result == AppReturn::Exit {
            events.close();
            break Ok(());
        }
    };

    terminal.clear()?;
    terminal.show_cursor()?;
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;

    Ok(outcome?)
}
