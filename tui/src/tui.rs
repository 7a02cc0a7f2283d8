use std::io::Stdout;
use std::io::stdout;

use crossterm::execute;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::backend::CrosstermBackend;

/// A type alias for the terminal type used in this application
pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// Switches the terminal to raw mode on the alternate screen.
pub fn init() -> std::io::Result<Terminal> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    set_panic_hook();
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;
    Ok(terminal)
}

fn set_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore(); // ignore any errors as we are already failing
        hook(panic_info);
    }));
}

/// Restore the terminal to its original state.
pub fn restore() -> std::io::Result<()> {
    execute!(stdout(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}
