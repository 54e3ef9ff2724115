//! Ratatui-based terminal dashboard.
//!
//! Layout: a sidebar with the era narrative and totals, the per-year bar chart,
//! and a details panel listing what was acquired in the selected year.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::pipeline::{RunOutput, run_pipeline};
use crate::domain::DashboardConfig;
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::AcqBarChart;

/// Start the TUI.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
    terminal
        .draw(|f| app.draw(f))
        .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
    app.reload();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: DashboardConfig,
    /// `None` until the first load finishes.
    run: Option<Result<RunOutput, AppError>>,
    /// Index into the ascending year list.
    selected: usize,
    status: String,
}

impl App {
    fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            run: None,
            selected: 0,
            status: "Loading acquisitions...".to_string(),
        }
    }

    /// Run the pipeline again; a failure replaces the chart with an error panel.
    fn reload(&mut self) {
        let result = run_pipeline(&self.config);
        self.status = match &result {
            Ok(run) => format!(
                "Loaded {} rows from {} source",
                run.rows_loaded,
                run.source.label().to_lowercase()
            ),
            Err(err) => format!("Load failed (exit code {})", err.exit_code()),
        };
        let years = result.as_ref().map(|r| r.aggregation.counts.len()).unwrap_or(0);
        self.selected = self.selected.min(years.saturating_sub(1));
        self.run = Some(result);
    }

    fn loaded(&self) -> Option<&RunOutput> {
        match &self.run {
            Some(Ok(run)) => Some(run),
            _ => None,
        }
    }

    fn selected_year(&self) -> Option<i32> {
        let run = self.loaded()?;
        run.aggregation.counts.years().get(self.selected).copied()
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let years = self.loaded().map(|r| r.aggregation.counts.len()).unwrap_or(0);

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => self.selected = self.selected.saturating_sub(1),
            KeyCode::Right => {
                if self.selected + 1 < years {
                    self.selected += 1;
                }
            }
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = years.saturating_sub(1),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }

        false
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let detail = match self.loaded() {
            Some(run) => format!(
                "source: {} | rows: {} | years: {} | total: {}",
                run.source.label(),
                run.rows_loaded,
                run.aggregation.counts.len(),
                run.aggregation.counts.total()
            ),
            None => "source: -".to_string(),
        };
        let line = Line::from(vec![
            Span::styled("acq", Style::default().fg(Color::Cyan)),
            Span::raw(" - Acquisitions through the years | "),
            Span::styled(detail, Style::default().fg(Color::Gray)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let run = match &self.run {
            None => {
                let msg = Paragraph::new("Waiting for data...")
                    .style(Style::default().fg(Color::Yellow))
                    .block(Block::default().borders(Borders::ALL));
                frame.render_widget(msg, area);
                return;
            }
            Some(Err(err)) => {
                self.draw_error(frame, area, err);
                return;
            }
            Some(Ok(run)) => run,
        };

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(area);
        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(7)])
            .split(cols[1]);

        self.draw_sidebar(frame, cols[0], run);
        self.draw_chart(frame, main[0], run);
        self.draw_details(frame, main[1], run);
    }

    fn draw_sidebar(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &RunOutput) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let gray = Style::default().fg(Color::Gray);

        let mut lines = vec![
            Line::from(Span::styled("Acquisitions through the years", bold)),
            Line::raw(""),
            Line::raw(crate::report::era_narrative(&run.era)),
            Line::raw(""),
        ];
        for row in crate::report::format_era_totals(&run.era).lines() {
            lines.push(Line::raw(row.to_string()));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!("Data: {}", run.source.description()),
            gray,
        )));
        if run.report.legacy_repaired {
            lines.push(Line::from(Span::styled("Record #11 forced to 2000", gray)));
        }
        for w in &run.warnings {
            lines.push(Line::from(Span::styled(w.clone(), Style::default().fg(Color::Yellow))));
        }

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("About").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &RunOutput) {
        let block = Block::default().title("Acquisitions per year").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let bars = run.bars();
        if bars.is_empty() {
            let msg = Paragraph::new("No acquisitions to plot.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        let widget = AcqBarChart {
            bars: &bars,
            split_year: run.era.split_year,
            selected: self.selected_year(),
        };
        frame.render_widget(widget, inner);
    }

    fn draw_details(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &RunOutput) {
        let text = match self.selected_year() {
            Some(year) => {
                let count = run.aggregation.counts.get(year);
                let names = run.aggregation.entities_in(year);
                let listed = if names.is_empty() {
                    "(no names recorded)".to_string()
                } else {
                    names.join(", ")
                };
                Text::from(vec![
                    Line::from(Span::styled(
                        format!("{year}: {count} acquisition(s)"),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::raw(listed),
                ])
            }
            None => Text::raw("No year selected."),
        };

        let p = Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Selected year").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_error(&self, frame: &mut ratatui::Frame<'_>, area: Rect, err: &AppError) {
        let mut lines = vec![
            Line::from(Span::styled(
                "Could not load the acquisitions table.",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
        ];
        for row in err.message().lines() {
            lines.push(Line::raw(row.to_string()));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "Press r to retry or q to quit.",
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Error").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ select year  Home/End first/last  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use ratatui::backend::TestBackend;
    use tempfile::NamedTempFile;

    use super::*;

    fn offline_config(csv: &str) -> (NamedTempFile, DashboardConfig) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(csv.as_bytes()).unwrap();
        let config = DashboardConfig {
            offline: true,
            fallback_csv: file.path().to_path_buf(),
            ..DashboardConfig::default()
        };
        (file, config)
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn arrows_walk_the_year_list() {
        let (_file, config) = offline_config("Date,Company\n1997,NeXT\n2010,Siri\n2014,Beats\n");
        let mut app = App::new(config);
        app.reload();
        assert_eq!(app.selected_year(), Some(1997));

        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Right);
        assert_eq!(app.selected_year(), Some(2014));

        app.handle_key(KeyCode::Home);
        assert_eq!(app.selected_year(), Some(1997));
        app.handle_key(KeyCode::Left);
        assert_eq!(app.selected_year(), Some(1997));
        app.handle_key(KeyCode::End);
        assert_eq!(app.selected_year(), Some(2014));

        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn missing_sources_show_an_error_panel() {
        let config = DashboardConfig {
            offline: true,
            fallback_csv: "/nonexistent/acq.csv".into(),
            ..DashboardConfig::default()
        };
        let mut app = App::new(config);
        app.reload();
        assert!(app.loaded().is_none());
        assert_eq!(app.selected_year(), None);
        assert!(!app.handle_key(KeyCode::Right));

        let txt = screen(&app);
        assert!(txt.contains("Could not load the acquisitions table."));
        assert!(txt.contains("Press r to retry"));
    }
}
