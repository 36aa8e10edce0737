use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use crate::models::{format_day, REFERENCE_CURRENCY};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_delta, percent, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_categories(f, chunks[0], app);
    render_earnings(f, chunks[1], app);
}

fn render_categories(f: &mut Frame, area: Rect, app: &App) {
    let title = format!(
        "Categories since {} ({REFERENCE_CURRENCY}) | :months <n>",
        format_day(app.stats_since)
    );

    if app.breakdown.is_empty() {
        let reason = app
            .rates_error
            .as_deref()
            .unwrap_or("No flows in this period");
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(reason, theme::dim_style())),
        ])
        .centered()
        .block(theme::panel(title));
        f.render_widget(msg, area);
        return;
    }

    let header_cells = ["Category", "Spent", "%", "Earned", "%"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .breakdown
        .iter()
        .enumerate()
        .skip(app.stats_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, totals)| {
            let style = if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            Row::new(vec![
                Cell::from(truncate(&totals.category.name, 18)),
                Cell::from(Span::styled(
                    format_amount(totals.expense, ""),
                    theme::expense_style(),
                )),
                Cell::from(percent(totals.expense_share)),
                Cell::from(Span::styled(
                    format_amount(totals.income, ""),
                    theme::income_style(),
                )),
                Cell::from(percent(totals.income_share)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(12),
        Constraint::Length(14),
        Constraint::Length(7),
        Constraint::Length(14),
        Constraint::Length(7),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(theme::panel(title));
    f.render_widget(table, area);
}

fn render_earnings(f: &mut Frame, area: Rect, app: &App) {
    let header_cells = ["Account", "In", "Out", "Net"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .earnings
        .iter()
        .map(|e| {
            let currency = e.account.currency.as_str();
            let net = e.net();
            Row::new(vec![
                Cell::from(format!("{} ({currency})", truncate(&e.account.name, 12))),
                Cell::from(Span::styled(format_amount(e.income, ""), theme::income_style())),
                Cell::from(Span::styled(format_amount(e.expense, ""), theme::expense_style())),
                Cell::from(Span::styled(format_delta(net, ""), theme::amount_style(net))),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(theme::panel("Per account"));
    f.render_widget(table, area);
}
