use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use crate::models::{format_day, BankAccount, REFERENCE_CURRENCY};
use crate::replay::HistoryRow;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_delta, format_number, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let range = match (app.history.days().next(), app.history.last_day()) {
        (Some(first), Some(last)) => {
            format!(" {} → {}", format_day(first.date), format_day(last.date))
        }
        _ => String::new(),
    };
    let title = format!("History{range} | :select | :range");

    if let Some(err) = &app.history_error {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled(err.as_str(), theme::expense_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Fetch rates with :rates fetch or set one with :rates set <CODE> <rate>",
                theme::dim_style(),
            )),
        ];
        f.render_widget(Paragraph::new(msg).centered().block(theme::panel(title)), area);
        return;
    }
    if app.history.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled(
            "No accounts to replay",
            theme::dim_style(),
        )))
        .centered()
        .block(theme::panel(title));
        f.render_widget(msg, area);
        return;
    }

    let columns: Vec<&BankAccount> = app
        .history_selection()
        .into_iter()
        .filter_map(|id| BankAccount::find_by_id(&app.snapshot.accounts, id))
        .collect();

    let mut header_cells = vec![Cell::from("Date").style(theme::header_style())];
    header_cells.extend(columns.iter().map(|a| {
        Cell::from(truncate(&format!("{} ({})", a.name, a.currency), 16))
            .style(theme::header_style())
    }));
    header_cells.push(Cell::from(format!("Total {REFERENCE_CURRENCY}")).style(theme::header_style()));
    header_cells.push(Cell::from("Delta").style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .history_rows()
        .into_iter()
        .enumerate()
        .skip(app.history_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, row)| match row {
            HistoryRow::MonthEnd(month) => {
                let label = format!("── {} ──", month.format("%B %Y"));
                let mut cells = vec![Cell::from(label)];
                cells.extend((0..columns.len() + 2).map(|_| Cell::from("")));
                Row::new(cells).style(theme::month_marker_style())
            }
            HistoryRow::Day(snapshot) => {
                let mut cells = vec![Cell::from(format_day(snapshot.date))];
                cells.extend(columns.iter().map(|a| {
                    let val = a.id.and_then(|id| snapshot.balances.get(&id)).copied();
                    match val {
                        Some(v) => Cell::from(Span::styled(format_number(v), theme::amount_style(v))),
                        None => Cell::from(""),
                    }
                }));
                cells.push(Cell::from(format_number(snapshot.total)));
                cells.push(Cell::from(Span::styled(
                    format_delta(snapshot.delta, ""),
                    theme::amount_style(snapshot.delta),
                )));
                let style = if i % 2 == 1 {
                    theme::alt_row_style()
                } else {
                    theme::normal_style()
                };
                Row::new(cells).style(style)
            }
        })
        .collect();

    let mut widths = vec![Constraint::Length(18)];
    widths.extend(columns.iter().map(|_| Constraint::Length(16)));
    widths.push(Constraint::Length(16));
    widths.push(Constraint::Length(14));

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(theme::panel(title));

    f.render_widget(table, area);
}
