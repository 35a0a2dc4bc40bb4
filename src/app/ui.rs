use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};
use rust_decimal::Decimal;

use crate::{
    app::app::View,
    models::{PortfolioSummary, RealizedPnl},
};

fn gain_color(value: Decimal) -> Color {
    if value >= Decimal::ZERO {
        Color::Green
    } else {
        Color::Red
    }
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    Row::new(cells).style(Style::default()).height(1)
}

pub fn render(
    frame: &mut Frame,
    summary: &PortfolioSummary,
    realized: &[RealizedPnl],
    view: View,
    table_state: &mut TableState,
    error_popup: &Option<String>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_summary(frame, summary, chunks[0]);

    match view {
        View::Holdings => render_holdings(frame, summary, table_state, chunks[1]),
        View::Realized => render_realized(frame, realized, table_state, chunks[1]),
    }

    let help = Paragraph::new("Tab: switch view  F5: reload  Up/Down: select  q: quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[2]);

    if let Some(message) = error_popup {
        render_error_popup(frame, message);
    }
}

fn render_summary(frame: &mut Frame, summary: &PortfolioSummary, area: Rect) {
    let realized = *summary.total_realized_pnl();
    let text = format!(
        "Invested: {:.2}   Recovered: {:.2}   Realized P/L: {:.2}   Shares: {}   Active symbols: {}",
        summary.total_invested(),
        summary.total_recovered(),
        realized,
        summary.total_shares_held(),
        summary.active_symbol_count(),
    );

    let title = Paragraph::new(text)
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .title("PSX Portfolio")
                .borders(Borders::ALL),
        );
    frame.render_widget(title, area);
}

fn render_holdings(
    frame: &mut Frame,
    summary: &PortfolioSummary,
    table_state: &mut TableState,
    area: Rect,
) {
    let holdings = summary.holdings();

    if holdings.is_empty() {
        let empty_message = Paragraph::new("No holdings to display. Add or import transactions first.")
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty_message, area);
        return;
    }

    let header = header_row(&[
        "Symbol",
        "Available",
        "Avg. Cost",
        "Invested",
        "Bought",
        "Sold",
        "Real. P/L",
    ]);

    let rows = holdings.iter().map(|holding| {
        let realized_pnl = *holding.total_realized_pnl();
        let style = if holding.is_active() {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let cells = [
            Cell::from(holding.symbol().clone()),
            Cell::from(holding.available_quantity().to_string()),
            Cell::from(format!("{:.4}", holding.avg_cost_per_share())),
            Cell::from(format!("{:.2}", holding.total_invested_amount())),
            Cell::from(holding.total_shares_bought().to_string()),
            Cell::from(holding.total_shares_sold().to_string()),
            Cell::from(format!("{:.2}", realized_pnl)).style(Style::default().fg(gain_color(realized_pnl))),
        ];

        Row::new(cells).style(style).height(1)
    });

    let widths = [
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(16),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(16),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(View::Holdings.to_string())
                .borders(Borders::ALL),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    frame.render_stateful_widget(table, area, table_state);
}

fn render_realized(
    frame: &mut Frame,
    realized: &[RealizedPnl],
    table_state: &mut TableState,
    area: Rect,
) {
    if realized.is_empty() {
        let empty_message = Paragraph::new("No sales recorded yet.")
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty_message, area);
        return;
    }

    let header = header_row(&[
        "Date",
        "Symbol",
        "Qty",
        "Sell Rate",
        "Avg. Cost",
        "Net Proceeds",
        "Cost Basis",
        "P/L",
        "P/L %",
    ]);

    let rows = realized.iter().map(|record| {
        let pnl = *record.realized_pnl();
        let pnl_style = Style::default().fg(gain_color(pnl));

        let cells = [
            Cell::from(record.sell_date().to_string()),
            Cell::from(record.symbol().clone()),
            Cell::from(record.quantity_sold().to_string()),
            Cell::from(format!("{:.4}", record.sell_rate())),
            Cell::from(format!("{:.4}", record.avg_cost_basis())),
            Cell::from(format!("{:.2}", record.net_proceeds())),
            Cell::from(format!("{:.2}", record.cost_basis())),
            Cell::from(format!("{:.2}", pnl)).style(pnl_style),
            Cell::from(format!("{:.2}%", record.pnl_percentage())).style(pnl_style),
        ];

        Row::new(cells).height(1)
    });

    let widths = [
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(15),
        Constraint::Length(15),
        Constraint::Length(14),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(View::Realized.to_string())
                .borders(Borders::ALL),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    frame.render_stateful_widget(table, area, table_state);
}

fn render_error_popup(frame: &mut Frame, message: &str) {
    let area = frame.area();
    let popup = Rect {
        x: area.width / 6,
        y: area.height / 3,
        width: area.width * 2 / 3,
        height: area.height.min(5),
    };

    let paragraph = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title("Error (Enter to close)")
                .borders(Borders::ALL),
        );

    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}
