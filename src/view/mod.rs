//! Terminal shell (impure): drives a [`PagerSession`] with crossterm input
//! and paints it through ratatui.

mod canvas;
mod search_input;
mod status;

pub use canvas::BufferCanvas;
pub use search_input::{SearchInput, SearchPrompt};
pub use status::{StatusBar, StatusMessage, StatusStyles};

use crate::config::KeyBindings;
use crate::model::{KeyAction, Notice, PagerError};
use crate::source::InputSource;
use crate::state::{PagerSession, Progress, SearchDirection, SessionSummary, Viewport};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout},
    Terminal,
};
use std::io::{self, Stdout};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// The session failed
    #[error(transparent)]
    Pager(#[from] PagerError),
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    session: PagerSession<InputSource>,
    key_bindings: KeyBindings,
    prompt: Option<SearchPrompt>,
    message: Option<StatusMessage>,
    progress: Progress,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen. If setup fails
    /// after raw mode is on, the terminal is restored before returning.
    pub fn new(session: PagerSession<InputSource>) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let setup = move || -> Result<Self, TuiError> {
            let mut stdout = io::stdout();
            stdout.execute(EnterAlternateScreen)?;
            let backend = CrosstermBackend::new(stdout);
            let terminal = Terminal::new(backend)?;
            Self::with_terminal(terminal, session)
        };
        restore_on_error(setup(), restore_terminal)
    }

    /// Run the main event loop
    ///
    /// Returns when the user quits. Redraws after every key and resize.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            match event::read()? {
                Event::Key(key) => {
                    if self.handle_key(key)? {
                        return Ok(());
                    }
                }
                Event::Resize(width, height) => {
                    debug!(width, height, "Terminal resized");
                }
                _ => continue,
            }
            self.draw()?;
        }
    }
}

impl<B> TuiApp<B>
where
    B: Backend,
{
    fn with_terminal(
        terminal: Terminal<B>,
        session: PagerSession<InputSource>,
    ) -> Result<Self, TuiError> {
        let mut app = Self {
            terminal,
            session,
            key_bindings: KeyBindings::default(),
            prompt: None,
            message: None,
            progress: Progress::All,
        };
        app.sync_viewport()?;
        Ok(app)
    }

    /// Text area for the current terminal size: everything but the status row.
    fn text_viewport(&self) -> Result<Viewport, TuiError> {
        let size = self.terminal.size()?;
        Ok(Viewport::new(size.width, size.height.saturating_sub(1)))
    }

    fn sync_viewport(&mut self) -> Result<(), TuiError> {
        let viewport = self.text_viewport()?;
        if viewport != self.session.viewport() {
            self.session.resize(viewport)?;
        }
        Ok(())
    }

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    fn handle_key(&mut self, key: KeyEvent) -> Result<bool, TuiError> {
        if key.kind == KeyEventKind::Release {
            return Ok(false);
        }
        if self.prompt.is_some() {
            self.handle_prompt_key(key)?;
            return Ok(false);
        }

        self.message = None;
        let Some(action) = self.key_bindings.get(key) else {
            return Ok(false);
        };

        match action {
            KeyAction::Quit => return Ok(true),
            KeyAction::SearchForward => {
                self.prompt = Some(SearchPrompt::new(SearchDirection::Forward));
            }
            KeyAction::SearchBackward => {
                self.prompt = Some(SearchPrompt::new(SearchDirection::Backward));
            }
            KeyAction::Redraw => self.terminal.clear()?,
            action => {
                let result = self.session.handle(action);
                if let Some(Some(notice)) = self.report(result)? {
                    self.message = Some(StatusMessage::info(notice.to_string()));
                }
            }
        }
        Ok(false)
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Result<(), TuiError> {
        let Some(prompt) = self.prompt.as_mut() else {
            return Ok(());
        };
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Char('c' | 'g') if control => self.prompt = None,
            KeyCode::Backspace => {
                if !prompt.pop() {
                    self.prompt = None;
                }
            }
            KeyCode::Enter => {
                if let Some(prompt) = self.prompt.take() {
                    self.submit_search(prompt.query(), prompt.direction())?;
                }
            }
            KeyCode::Char(ch) if !control => prompt.push(ch),
            _ => {}
        }
        Ok(())
    }

    /// Run a typed search. An empty pattern repeats the last search.
    fn submit_search(&mut self, query: &str, direction: SearchDirection) -> Result<(), TuiError> {
        if query.is_empty() {
            let result = self.session.search_next(direction);
            if let Some(Some(notice)) = self.report(result)? {
                self.message = Some(StatusMessage::info(notice.to_string()));
            }
            return Ok(());
        }
        let result = self.session.search(query, direction);
        if let Some(false) = self.report(result)? {
            self.message = Some(StatusMessage::info(Notice::NotFound.to_string()));
        }
        Ok(())
    }

    /// Turn pattern errors into a status message; pass fatal errors up.
    fn report<T>(&mut self, result: Result<T, PagerError>) -> Result<Option<T>, TuiError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if !err.is_fatal() => {
                warn!(error = %err, "Search pattern rejected");
                self.message = Some(StatusMessage::error(err.to_string()));
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Render the current frame
    ///
    /// Resizes the session first when the terminal changed size.
    fn draw(&mut self) -> Result<(), TuiError> {
        self.sync_viewport()?;

        let session = &mut self.session;
        let prompt = self.prompt.as_ref();
        let message = self.message.as_ref();
        let mut outcome = Ok(self.progress);

        self.terminal.draw(|frame| {
            let [text_area, status_area] =
                Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

            let rendered = {
                let mut canvas = BufferCanvas::new(frame.buffer_mut(), text_area);
                session.render(&mut canvas)
            };
            let progress = match rendered {
                Ok(status) => status.progress,
                Err(err) => {
                    outcome = Err(err);
                    return;
                }
            };
            outcome = Ok(progress);

            let scheme = session.rules().scheme();
            match prompt {
                Some(prompt) => {
                    frame.render_widget(SearchInput::new(prompt, scheme.normal), status_area);
                }
                None => {
                    let styles = StatusStyles {
                        bar: scheme.status,
                        message: scheme.message,
                        error: scheme.error,
                    };
                    frame.render_widget(
                        StatusBar::new(session.name(), progress, styles).message(message),
                        status_area,
                    );
                }
            }
        })?;

        self.progress = outcome?;
        Ok(())
    }

    /// End the session and hand back where the user left off.
    fn close(self) -> SessionSummary {
        self.session.close()
    }

    /// Build an app over any backend without touching the real terminal.
    #[cfg(test)]
    pub(crate) fn new_for_test(
        terminal: Terminal<B>,
        session: PagerSession<InputSource>,
    ) -> Result<Self, TuiError> {
        Self::with_terminal(terminal, session)
    }
}

/// Page `session` in the terminal until the user quits.
///
/// `initial_search` runs before the first frame. `message` is shown in the
/// status bar until the first key.
///
/// # Errors
///
/// Returns `TuiError` on terminal failures and on stream errors, which end
/// the session. The terminal is restored in both cases.
pub fn run_pager(
    session: PagerSession<InputSource>,
    initial_search: Option<&str>,
    message: Option<StatusMessage>,
) -> Result<SessionSummary, TuiError> {
    let mut app = TuiApp::new(session)?;
    app.message = message;

    let result = match initial_search {
        Some(query) => app.submit_search(query, SearchDirection::Forward),
        None => Ok(()),
    }
    .and_then(|()| app.run());

    restore_terminal()?;

    result.map(|()| app.close())
}

/// Run `restore` when `result` is an error, keeping the original error.
fn restore_on_error<T>(
    result: Result<T, TuiError>,
    restore: impl FnOnce() -> Result<(), TuiError>,
) -> Result<T, TuiError> {
    if result.is_err() {
        if let Err(err) = restore() {
            warn!(error = %err, "Failed to restore terminal");
        }
    }
    result
}

/// Restore terminal to normal state
///
/// Disables raw mode and leaves the alternate screen
pub fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
