use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use daybook::{config::Args, logging, ui, App, Storage, SystemClock};
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, sync::Arc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let _logger = match logging::init_logging(&args.log_level, &args.log_dir) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("logging disabled: {err}");
            None
        }
    };

    // Load before the terminal switches screens so the lists start populated.
    let mut app = App::new(
        Storage::new(&args.data_file),
        Arc::new(SystemClock),
        args.tick_period(),
    );

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("{:?}", err);
    }
    info!("event=app_exit status=ok");
    Ok(())
}
