//! # Application Controller
//!
//! The render-loop-owned half of the picker. `App` holds every piece of
//! UI-visible state (query text, list store, key-repeat machine) plus the
//! handles to the background side (filter worker, result slot, status line).
//! All mutation happens on the render thread; the background side only ever
//! reaches the controller through the result slot and the status line.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::source::Source;
use crate::ui::keyrepeat::{KeyRepeat, NavKey};
use crate::ui::list::ListStore;
use crate::ui::status::StatusLine;
use crate::ui::worker::{self, FilterWorker, ResultSlot};

/// Poll timeout while nothing time-driven is pending. Doubles as the redraw
/// cadence that picks up worker results.
const IDLE_TICK: Duration = Duration::from_millis(100);

pub struct App {
    source: Arc<dyn Source>,
    pub list: ListStore,
    pub query: String,
    pub status: StatusLine,
    pub repeat: KeyRepeat,
    pub should_quit: bool,
    /// True when the terminal reports key release events, which lets us run
    /// our own repeat emulation. Without release reporting the terminal's
    /// native autorepeat delivers repeated presses and the machine stays idle.
    pub emulate_repeat: bool,
    results: ResultSlot,
    worker: FilterWorker,
    list_area: Option<Rect>,
}

impl App {
    pub fn new(source: Arc<dyn Source>) -> Self {
        let status = StatusLine::new();
        let results = ResultSlot::new();
        let worker = FilterWorker::spawn(Arc::clone(&source), results.clone(), status.clone());

        Self {
            source,
            list: ListStore::new(),
            query: String::new(),
            status,
            repeat: KeyRepeat::new(),
            should_quit: false,
            emulate_repeat: false,
            results,
            worker,
            list_area: None,
        }
    }

    /// Per-frame bookkeeping, run before drawing: apply at most one pending
    /// list refresh from the worker, then advance key-repeat timing.
    pub fn on_frame(&mut self, now: Instant) {
        if let Some(items) = self.results.take() {
            self.list.refresh(items);
        }

        if let Some((key, owed)) = self.repeat.poll(now) {
            for _ in 0..owed {
                self.apply_move(key);
            }
        }
    }

    /// How long the event loop may sleep before the next time-driven wakeup.
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        match self.repeat.next_deadline(now) {
            Some(deadline) => deadline.saturating_duration_since(now).min(IDLE_TICK),
            None => IDLE_TICK,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        match key.kind {
            KeyEventKind::Press => self.handle_key_press(key, now),
            KeyEventKind::Release => match key.code {
                KeyCode::Up => self.repeat.release(NavKey::Up),
                KeyCode::Down => self.repeat.release(NavKey::Down),
                _ => {}
            },
            // Only delivered with enhancement flags active, where we
            // synthesize repeats ourselves.
            KeyEventKind::Repeat => {}
        }
    }

    fn handle_key_press(&mut self, key: KeyEvent, now: Instant) {
        use crossterm::event::KeyModifiers;

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up => {
                self.apply_move(NavKey::Up);
                if self.emulate_repeat {
                    self.repeat.press(NavKey::Up, now);
                }
            }
            KeyCode::Down => {
                self.apply_move(NavKey::Down);
                if self.emulate_repeat {
                    self.repeat.press(NavKey::Down, now);
                }
            }
            KeyCode::Enter => self.run_selected(),
            KeyCode::Backspace => {
                if self.query.pop().is_some() {
                    self.push_query();
                }
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.query.push(c);
                self.push_query();
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            if let Some(index) = self.row_at(mouse.column, mouse.row) {
                self.list.select(index);
                self.run_selected();
            }
        }
    }

    /// Map terminal coordinates to a list row, if they land on one.
    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.list_area?;
        let contains = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        if !contains {
            return None;
        }
        let index = self.list.viewport_first() + (row - area.y) as usize;
        (index < self.list.len()).then_some(index)
    }

    /// Launch the selected item. Non-blocking: the actual `run` call happens
    /// on a fire-and-forget task that only writes status on completion.
    pub fn run_selected(&mut self) {
        match self.list.selected_item() {
            Some(item) => worker::spawn_launch(&self.source, &self.status, item.clone()),
            None => self.status.set("No application selected"),
        }
    }

    /// Called by the renderer with the inner list rectangle, for pointer
    /// hit-testing and viewport sizing.
    pub fn record_list_area(&mut self, area: Rect) {
        self.list_area = Some(area);
        self.list.set_viewport_count(area.height as usize);
    }

    /// Stop the background worker and close the source. Idempotent.
    pub fn shutdown(&mut self) {
        self.worker.stop();
        self.source.close();
    }

    fn apply_move(&mut self, key: NavKey) {
        match key {
            NavKey::Up => self.list.move_up(),
            NavKey::Down => self.list.move_down(),
        }
    }

    fn push_query(&mut self) {
        self.worker.send_query(self.query.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Item, SourceError};
    use crossterm::event::KeyModifiers;
    use std::sync::Mutex;

    /// Source that records every launch, for asserting on run behavior.
    struct RecordingSource {
        runs: Mutex<Vec<String>>,
    }

    impl RecordingSource {
        fn new() -> Self {
            Self {
                runs: Mutex::new(Vec::new()),
            }
        }
    }

    impl Source for RecordingSource {
        fn list(&self) -> Result<Vec<Item>, SourceError> {
            Ok(Vec::new())
        }
        fn set_filter_name(&self, _name: &str) -> Result<(), SourceError> {
            Ok(())
        }
        fn reset_filters(&self) -> Result<(), SourceError> {
            Ok(())
        }
        fn run(&self, id: &str) -> Result<(), SourceError> {
            self.runs.lock().expect("runs lock").push(id.to_string());
            Ok(())
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::empty(), KeyEventKind::Release)
    }

    fn items(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item::new(format!("/bin/app{i}"), format!("app{i}")))
            .collect()
    }

    #[tokio::test]
    async fn down_presses_clamp_at_last_row() {
        let mut app = App::new(Arc::new(RecordingSource::new()));
        app.list.refresh(items(3));

        let now = Instant::now();
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Down), now);
        }
        assert_eq!(app.list.selected_index(), 2);
    }

    #[tokio::test]
    async fn escape_quits() {
        let mut app = App::new(Arc::new(RecordingSource::new()));
        app.handle_key(key(KeyCode::Esc), Instant::now());
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn typing_edits_the_query() {
        let mut app = App::new(Arc::new(RecordingSource::new()));
        let now = Instant::now();

        app.handle_key(key(KeyCode::Char('a')), now);
        app.handle_key(key(KeyCode::Char('b')), now);
        assert_eq!(app.query, "ab");

        app.handle_key(key(KeyCode::Backspace), now);
        assert_eq!(app.query, "a");

        // Backspace on an empty query stays a no-op.
        app.handle_key(key(KeyCode::Backspace), now);
        app.handle_key(key(KeyCode::Backspace), now);
        assert_eq!(app.query, "");
    }

    #[tokio::test]
    async fn control_chords_do_not_edit_the_query() {
        let mut app = App::new(Arc::new(RecordingSource::new()));
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        app.handle_key(event, Instant::now());
        assert_eq!(app.query, "");
    }

    #[tokio::test]
    async fn enter_on_empty_list_reports_no_selection() {
        let source = Arc::new(RecordingSource::new());
        let mut app = App::new(Arc::clone(&source) as Arc<dyn Source>);

        app.handle_key(key(KeyCode::Enter), Instant::now());
        assert_eq!(app.status.get(), "No application selected");
        assert!(source.runs.lock().expect("runs lock").is_empty());
    }

    #[tokio::test]
    async fn enter_launches_the_selected_item() {
        let source = Arc::new(RecordingSource::new());
        let mut app = App::new(Arc::clone(&source) as Arc<dyn Source>);
        app.list.refresh(items(3));
        app.handle_key(key(KeyCode::Down), Instant::now());

        app.handle_key(key(KeyCode::Enter), Instant::now());
        assert_eq!(app.status.get(), "Running: app1");

        // The launch task completes in the background.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(
            *source.runs.lock().expect("runs lock"),
            vec!["/bin/app1".to_string()]
        );
        assert_eq!(app.status.get(), "Launched: app1");
    }

    #[tokio::test]
    async fn repeat_only_arms_with_release_reporting() {
        let mut app = App::new(Arc::new(RecordingSource::new()));
        app.list.refresh(items(5));

        let now = Instant::now();
        app.handle_key(key(KeyCode::Down), now);
        assert!(!app.repeat.is_active());

        app.emulate_repeat = true;
        app.handle_key(key(KeyCode::Down), now);
        assert!(app.repeat.is_active());

        app.handle_key(release(KeyCode::Down), now);
        assert!(!app.repeat.is_active());
    }

    #[tokio::test]
    async fn held_key_fires_owed_moves_on_frame() {
        let mut app = App::new(Arc::new(RecordingSource::new()));
        app.emulate_repeat = true;
        app.list.refresh(items(20));

        let start = Instant::now();
        app.handle_key(key(KeyCode::Down), start);
        assert_eq!(app.list.selected_index(), 1);

        // 250ms of hold: one repeat owed on top of the press move.
        app.on_frame(start + Duration::from_millis(250));
        assert_eq!(app.list.selected_index(), 2);
    }

    #[tokio::test]
    async fn click_selects_and_launches_the_row() {
        let source = Arc::new(RecordingSource::new());
        let mut app = App::new(Arc::clone(&source) as Arc<dyn Source>);
        app.list.refresh(items(5));
        app.record_list_area(Rect::new(1, 4, 40, 10));

        let mouse = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 10,
            row: 6,
            modifiers: KeyModifiers::empty(),
        };
        app.handle_mouse(mouse);

        assert_eq!(app.list.selected_index(), 2);
        assert_eq!(app.status.get(), "Running: app2");
    }

    #[tokio::test]
    async fn clicks_outside_the_rows_are_ignored() {
        let mut app = App::new(Arc::new(RecordingSource::new()));
        app.list.refresh(items(2));
        app.record_list_area(Rect::new(1, 4, 40, 10));

        // Inside the list area but below the last row.
        let mouse = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 10,
            row: 9,
            modifiers: KeyModifiers::empty(),
        };
        app.handle_mouse(mouse);
        assert_eq!(app.list.selected_index(), 0);
        assert_eq!(app.status.get(), "");
    }

    #[tokio::test]
    async fn worker_results_apply_on_the_next_frame() {
        let mut app = App::new(Arc::new(RecordingSource::new()));

        // The spawned worker runs its initial fetch; give it a moment, then
        // the frame step consumes the handoff slot.
        tokio::time::sleep(Duration::from_millis(150)).await;
        app.on_frame(Instant::now());
        assert!(app.list.is_empty()); // RecordingSource lists nothing

        app.shutdown();
    }
}
