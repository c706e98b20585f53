//! Map view rendered with ratatui onto a second terminal device.
//!
//! The console keeps the process's own terminal, so the map is drawn to
//! another tty (for example the `/dev/pts/N` of a second window). Keys
//! typed there are not read; closing that window makes the next write
//! fail, which ends the session like closing a window would.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal, TerminalOptions, Viewport,
};

use crate::config::{Config, Rgb};
use crate::session::view::{View, ViewError, ViewEvent};
use crate::town::{glyph_rows, Town, MAX_CONSTRUCTIONS, MAX_MERCENARIES};

#[derive(Debug, Clone, Copy)]
struct Palette {
    background: Color,
    font: Color,
    border: Color,
}

impl Palette {
    const fn from_config(config: &Config) -> Self {
        Self {
            background: rgb(config.background_color),
            font: rgb(config.font_color),
            border: rgb(config.border_color),
        }
    }

    const fn cell(self, glyph: char) -> Color {
        match glyph {
            '#' => Color::DarkGray,
            'T' | 'P' | 'B' => Color::Green,
            'A' => Color::Yellow,
            '+' | 'Q' => Color::Magenta,
            'm' => Color::Cyan,
            'r' => Color::Red,
            _ => self.font,
        }
    }
}

const fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.0, color.1, color.2)
}

/// Renders the town map and a status line on a tty device.
#[derive(Debug)]
pub struct TerminalView {
    device: PathBuf,
    title: String,
    palette: Option<Palette>,
    terminal: Option<Terminal<CrosstermBackend<File>>>,
}

impl TerminalView {
    /// View on `device`, titled with the town name.
    #[must_use]
    pub fn new(device: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            title: title.into(),
            palette: None,
            terminal: None,
        }
    }

    /// Device the view draws on.
    #[must_use]
    pub fn device(&self) -> &Path {
        &self.device
    }
}

impl View for TerminalView {
    fn setup(&mut self, config: &Config) -> Result<(), ViewError> {
        let setup_error = |source| ViewError::Setup {
            device: self.device.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .write(true)
            .open(&self.device)
            .map_err(setup_error)?;
        execute!(file, EnterAlternateScreen, Hide).map_err(setup_error)?;

        let viewport = Viewport::Fixed(Rect::new(0, 0, config.window_width, config.window_height));
        let terminal = Terminal::with_options(CrosstermBackend::new(file), TerminalOptions { viewport })
            .map_err(setup_error)?;

        self.palette = Some(Palette::from_config(config));
        self.terminal = Some(terminal);
        tracing::info!(device = %self.device.display(), "terminal view ready");
        Ok(())
    }

    fn draw(&mut self, town: &Town) -> Result<(), ViewError> {
        let (Some(terminal), Some(palette)) = (self.terminal.as_mut(), self.palette) else {
            return Ok(());
        };
        let title = &self.title;
        terminal.draw(|frame| render(frame, town, title, palette))?;
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<ViewEvent>, ViewError> {
        Ok(None)
    }

    fn teardown(&mut self) {
        if let Some(mut terminal) = self.terminal.take() {
            let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen, Show);
        }
    }
}

fn render(frame: &mut Frame, town: &Town, title: &str, palette: Palette) {
    let base = Style::default().fg(palette.font).bg(palette.background);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(4)])
        .split(frame.area());

    let lines: Vec<Line> = glyph_rows(town)
        .into_iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .into_iter()
                .flat_map(|glyph| {
                    [
                        Span::styled(glyph.to_string(), Style::default().fg(palette.cell(glyph))),
                        Span::raw(" "),
                    ]
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let map = Paragraph::new(lines).style(base).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title(format!(" {title} ")),
    );
    frame.render_widget(map, chunks[0]);

    let admin = town.administrator().map_or("?", |a| a.name);
    let hud = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                format!("Round {}", town.round),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  Money {}", town.money)),
        ]),
        Line::from(format!(
            "{admin}  Units {}/{MAX_MERCENARIES}  Sites {}/{MAX_CONSTRUCTIONS}",
            town.mercenaries().len(),
            town.constructions().len(),
        )),
    ])
    .style(base)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border)),
    );
    frame.render_widget(hud, chunks[1]);
}
