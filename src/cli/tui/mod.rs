//! Interactive TUI for Cupcake.
//!
//! Renders the dashboard's state cells and forwards key presses to it.
//! Channel updates arrive in the background, so the screen is redrawn on a
//! short tick even without input.

mod app;
mod input;
mod ui;

use std::io::{self, stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::Dashboard;
use crate::dashboard::FIRST_SNAPSHOT_GRACE;

pub use app::{Action, TuiApp};

const TICK: Duration = Duration::from_millis(250);

/// Run the TUI, landing on the page addressed by `fragment`.
pub async fn run(dashboard: Dashboard, fragment: Option<String>) -> Result<()> {
    dashboard.start(fragment.as_deref(), FIRST_SNAPSHOT_GRACE).await;

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = TuiApp::new(dashboard.clone());
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    dashboard.shutdown().await;
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(TICK)? {
            let event = event::read()?;
            if let Some(action) = input::handle_event(event, app.form_open()) {
                app.handle_action(action).await;
            }
        }

        if !app.running {
            break;
        }
    }

    Ok(())
}
