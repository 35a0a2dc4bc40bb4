use std::io;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    widgets::TableState,
};
use strum_macros::Display;

use crate::{
    app::{Portfolio, ui},
    models::{PortfolioSummary, RealizedPnl, RealizedPnlFilter},
};

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum View {
    #[default]
    Holdings,
    #[strum(to_string = "Realized P/L")]
    Realized,
}

impl View {
    fn toggle(self) -> Self {
        match self {
            View::Holdings => View::Realized,
            View::Realized => View::Holdings,
        }
    }
}

pub struct App {
    portfolio: Portfolio,
    summary: PortfolioSummary,
    realized: Vec<RealizedPnl>,
    view: View,
    table_state: TableState,
    error_popup: Option<String>,
}

impl App {
    pub async fn new(portfolio: Portfolio) -> Result<Self> {
        let mut app = Self {
            portfolio,
            summary: PortfolioSummary::default(),
            realized: Vec::new(),
            view: View::default(),
            table_state: TableState::default(),
            error_popup: None,
        };
        app.reload().await?;
        Ok(app)
    }

    async fn reload(&mut self) -> Result<()> {
        self.summary = self.portfolio.get_portfolio_summary().await?;
        self.realized = self
            .portfolio
            .list_realized_pnl(RealizedPnlFilter::default())
            .await?;
        self.table_state.select(None);
        Ok(())
    }

    fn row_count(&self) -> usize {
        match self.view {
            View::Holdings => self.summary.holdings().len(),
            View::Realized => self.realized.len(),
        }
    }

    fn select_next(&mut self) {
        let rows = self.row_count();
        if rows == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < rows => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    fn select_previous(&mut self) {
        let rows = self.row_count();
        if rows == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => rows - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_app(&mut terminal).await;

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|frame| {
                ui::render(
                    frame,
                    &self.summary,
                    &self.realized,
                    self.view,
                    &mut self.table_state,
                    &self.error_popup,
                )
            })?;

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if self.error_popup.is_some() {
                    if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                        self.error_popup = None;
                    }
                    continue;
                }

                match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Esc => self.table_state.select(None),
                    KeyCode::Tab => {
                        self.view = self.view.toggle();
                        self.table_state.select(None);
                    }
                    KeyCode::F(5) => {
                        if let Err(e) = self.reload().await {
                            self.error_popup = Some(format!("Error reloading portfolio: {:#}", e));
                        }
                    }
                    KeyCode::Down => self.select_next(),
                    KeyCode::Up => self.select_previous(),
                    _ => {}
                }
            }
        }
    }
}
