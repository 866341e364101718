//! # opal entry point
//!
//! Launches the picker TUI: every executable on `$PATH`, filterable by name,
//! launched with Enter or a mouse click.
//!
//! ## Key Bindings
//!
//! - `Esc` - quit
//! - `Up` / `Down` - move the selection (held keys repeat)
//! - `Enter` - launch the selected application
//! - any printable character / `Backspace` - edit the filter
//!
//! ## Architecture
//!
//! 1. **Source**: `PathSource` scans `$PATH` once at startup
//! 2. **Worker**: a background task debounces filter queries and refetches
//! 3. **UI**: the render/event loop applies results and draws each frame

use opal::source::{PathSource, Source};
use opal::ui::{self, App};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::panic;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trait for reading terminal events (allows dependency injection for testing)
trait EventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

/// Production event reader that uses crossterm's event polling + read
struct CrosstermEventReader;

impl EventReader for CrosstermEventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout).context("Failed to poll for events")? {
            Ok(Some(event::read().context("Failed to read input event")?))
        } else {
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Set up panic hook to ensure terminal is restored on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            PopKeyboardEnhancementFlags,
            LeaveAlternateScreen,
            DisableMouseCapture
        );

        original_hook(panic_info);
    }));

    let result = run_application().await;

    let _ = panic::take_hook();

    result
}

async fn run_application() -> Result<()> {
    let source: Arc<dyn Source> =
        Arc::new(PathSource::from_env().context("Failed to scan PATH for applications")?);

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode for terminal")?;

    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        SetTitle("opal")
    )
    .context("Failed to setup terminal")?;

    // Key release reporting is what makes our own repeat emulation possible;
    // without it the terminal's native autorepeat takes over.
    let release_events = supports_keyboard_enhancement().unwrap_or(false);
    if release_events {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .context("Failed to enable keyboard enhancement")?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(Arc::clone(&source));
    app.emulate_repeat = release_events;

    // Run the app and ensure cleanup happens even on error
    let mut event_reader = CrosstermEventReader;
    let run_result = run_app(&mut terminal, &mut app, &mut event_reader).await;

    app.shutdown();
    let cleanup_result = cleanup_terminal(&mut terminal, release_events);

    run_result?;
    cleanup_result?;

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_reader: &mut dyn EventReader,
) -> Result<()> {
    loop {
        app.on_frame(Instant::now());

        terminal
            .draw(|f| ui::render(f, app))
            .context("Failed to draw terminal UI")?;

        // Sleep until input arrives, the idle tick elapses, or the key-repeat
        // machine wants a wakeup, whichever is soonest.
        let timeout = app.poll_timeout(Instant::now());
        let mut event = event_reader.read_event(timeout)?;

        // Drain everything already queued so a frame processes its input in
        // arrival order without redrawing in between.
        while let Some(ev) = event {
            match ev {
                Event::Key(key) => app.handle_key(key, Instant::now()),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
            if app.should_quit {
                return Ok(());
            }
            event = event_reader.read_event(Duration::ZERO)?;
        }
    }
}

/// Clean up terminal state
fn cleanup_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    release_events: bool,
) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;

    if release_events {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)
            .context("Failed to disable keyboard enhancement")?;
    }
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to restore terminal")?;

    terminal.show_cursor().context("Failed to show cursor")?;

    Ok(())
}
