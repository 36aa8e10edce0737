use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use crate::models::{format_day, Movement};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_number, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let title = title(app);

    if app.movements.is_empty() {
        let hint = if app.search_input.is_empty() && app.flow_filter_account.is_none() {
            "Add one with :flow <account> <amount> [YYYY-MM-DD] <name> [#category]"
        } else {
            "Press Esc to clear the filters"
        };
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled("Nothing to show", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(hint, theme::dim_style())),
        ];
        f.render_widget(Paragraph::new(msg).centered().block(theme::panel(title)), area);
        return;
    }

    let header_cells = ["", "ID", "Date", "Name", "Account", "Category", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .movements
        .iter()
        .enumerate()
        .skip(app.flow_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, movement)| {
            let style = if i == app.flow_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let (marker, account, amount) = match movement {
                Movement::Flow(flow) => {
                    let amount_style = if flow.is_expense() {
                        theme::expense_style()
                    } else {
                        theme::income_style()
                    };
                    (
                        Span::raw(" "),
                        app.account_name(flow.account_id).to_string(),
                        Span::styled(format_amount(flow.cost, &flow.currency), amount_style),
                    )
                }
                Movement::Transfer(t) => (
                    Span::styled("⇄", theme::transfer_style()),
                    format!(
                        "{} → {}",
                        app.account_name(t.from_account),
                        app.account_name(t.to_account)
                    ),
                    Span::styled(transfer_amount(app, t), theme::transfer_style()),
                ),
            };

            // Transfer ids carry a T prefix, as the CLI accepts them
            let id = match movement {
                Movement::Flow(_) => movement.id().map(|i| i.to_string()),
                Movement::Transfer(_) => movement.id().map(|i| format!("T{i}")),
            };

            Row::new(vec![
                Cell::from(marker),
                Cell::from(id.unwrap_or_default()),
                Cell::from(format_day(movement.date())),
                Cell::from(truncate(movement.name(), 40)),
                Cell::from(truncate(&account, 24)),
                Cell::from(app.category_name(movement.category_id()).to_string()),
                Cell::from(amount),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(1),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Min(20),
        Constraint::Length(24),
        Constraint::Length(14),
        Constraint::Length(26),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(theme::panel(title));

    f.render_widget(table, area);
}

/// `100.00 EUR → 108.00 USD`, or a single amount within one currency.
fn transfer_amount(app: &App, t: &crate::models::Transfer) -> String {
    let from = app.account_currency(t.from_account);
    let to = app.account_currency(t.to_account);
    if from == to {
        format_amount(t.amount, from)
    } else {
        let credited = t
            .credited()
            .map(format_number)
            .unwrap_or_else(|| "?".to_string());
        format!("{} → {credited} {to}", format_amount(t.amount, from))
    }
}

fn title(app: &App) -> String {
    let mut title = format!("Flows ({})", app.movements.len());
    if let Some(id) = app.flow_filter_account {
        title.push_str(&format!(" account: {}", app.account_name(id)));
    }
    if !app.search_input.is_empty() {
        title.push_str(&format!(" search: '{}'", app.search_input));
    }
    title
}
