use std::io::{Write, stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::SetTitle;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, input, update};
use crate::document::{Metrics, WINDOW_TITLE, demo_catalog};
use crate::source::DirSource;
use crate::ui::pixels_for_cells;
use crate::viewport::ScrollViewport;
use crate::watcher::DocumentWatcher;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const WATCH_DEBOUNCE: Duration = Duration::from_millis(150);

/// Turn mouse reporting back off. A failure here must not hide the run's
/// own result, so it is only logged.
pub(super) fn release_mouse(out: &mut impl Write) {
    if let Err(err) = execute!(out, DisableMouseCapture) {
        tracing::debug!(error = %err, "failed to disable mouse capture");
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// Link activations are shown in the status bar while running and
    /// written to stdout once the terminal has been restored.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization, document construction,
    /// or the event loop encounters an I/O failure.
    pub fn run(&self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        let init_scope = crate::perf::scope("app.ratatui_init");
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal: stackview requires an interactive terminal")?;
        drop(init_scope);

        let result = execute!(stdout(), SetTitle(WINDOW_TITLE), EnableMouseCapture)
            .context("Failed to configure terminal")
            .and_then(|()| self.init_model(&terminal))
            .and_then(|mut model| {
                let watcher = self.start_watcher();
                Self::event_loop(&mut terminal, &mut model, watcher)?;
                Ok(model)
            });

        // Restore terminal
        release_mouse(&mut stdout());
        ratatui::restore();

        let model = result?;
        if !model.link_log.is_empty() {
            let mut out = stdout().lock();
            out.write_all(model.link_log.contents().as_bytes())
                .context("Failed to write link log")?;
            out.flush().context("Failed to flush link log")?;
        }
        Ok(())
    }

    fn init_model(&self, terminal: &DefaultTerminal) -> Result<Model> {
        let _scope = crate::perf::scope("app.build_document");
        let size = terminal.size().context("Failed to query terminal size")?;
        let (width, height) = self
            .size
            .unwrap_or_else(|| pixels_for_cells(size.width, size.height.saturating_sub(1)));

        let spec = demo_catalog()
            .context("Invalid demo catalog")?
            .with_document_name(self.document_name());
        let source = DirSource::new(self.document_dir());
        let viewport = ScrollViewport::build(&spec, &Metrics::default(), &source, (width, height))
            .context("Failed to build document")?;
        crate::perf::log_event(
            "init.layout",
            format!(
                "terminal={}x{} viewport={width}x{height} content_h={}",
                size.width,
                size.height,
                viewport.content_height()
            ),
        );

        let mut model = Model::new(
            viewport,
            self.document_path.clone(),
            (size.width, size.height),
        )
        .context("Failed to attach link router")?;
        model.follow_terminal = self.size.is_none();
        model.watch_enabled = self.watch_enabled;
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);
        Ok(model)
    }

    fn start_watcher(&self) -> Option<DocumentWatcher> {
        if !self.watch_enabled {
            return None;
        }
        match DocumentWatcher::new(&self.document_path, WATCH_DEBOUNCE) {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                tracing::warn!(error = %err, path = %self.document_path.display(), "watch disabled");
                None
            }
        }
    }

    fn event_loop(
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        mut watcher: Option<DocumentWatcher>,
    ) -> Result<()> {
        let mut needs_render = true;
        loop {
            if needs_render {
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if watcher
                .as_mut()
                .is_some_and(DocumentWatcher::take_change_ready)
            {
                update(model, Message::Reload);
                needs_render = true;
            }

            if event::poll(POLL_INTERVAL)? {
                let event = event::read()?;
                if let Some(msg) = input::handle_event(&event, model) {
                    update(model, msg);
                    needs_render = true;
                }
            }

            if model.should_quit {
                return Ok(());
            }
        }
    }
}
