use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use crate::models::{format_day, REFERENCE_CURRENCY};
use crate::replay::{reference_rate, to_reference, ReplayError};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::format_amount;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.snapshot.balances.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No accounts yet.",
                theme::dim_style().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Create one with :account <name> <currency> <initial balance>",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(theme::panel("Accounts"));
        f.render_widget(msg, area);
        return;
    }

    // Title, earnings, balance, bottom border
    let card_height = 4_usize;
    let visible = area.height.saturating_sub(2) as usize;
    let cards_per_page = (visible / card_height).max(1);
    let first = app
        .account_index
        .saturating_sub(cards_per_page.saturating_sub(1));

    let items: Vec<ListItem> = app
        .snapshot
        .balances
        .iter()
        .enumerate()
        .skip(first)
        .take(cards_per_page)
        .map(|(i, bal)| {
            let account = &bal.account;
            let selected = i == app.account_index;
            let border_color = if selected {
                theme::ACCENT
            } else {
                theme::OVERLAY
            };

            let title_line = Line::from(vec![
                Span::styled("┌─", Style::default().fg(border_color)),
                Span::styled(
                    format!(
                        " {} ({}) since {} ",
                        account.name,
                        account.currency,
                        format_day(account.creation_date)
                    ),
                    Style::default()
                        .fg(if selected {
                            theme::ACCENT
                        } else {
                            theme::TEXT_DIM
                        })
                        .add_modifier(Modifier::BOLD),
                ),
            ]);

            let earnings = account.id.and_then(|id| {
                app.earnings
                    .iter()
                    .find(|e| e.account.id == Some(id))
            });
            let detail_line = match earnings {
                Some(e) => Line::from(vec![
                    Span::styled(
                        format!("  Since {}  in: ", format_day(app.stats_since)),
                        theme::dim_style(),
                    ),
                    Span::styled(
                        format_amount(e.income, &account.currency),
                        theme::income_style(),
                    ),
                    Span::styled("    out: ", theme::dim_style()),
                    Span::styled(
                        format_amount(e.expense, &account.currency),
                        theme::expense_style(),
                    ),
                ]),
                None => Line::from(Span::styled("  No flows yet", theme::dim_style())),
            };

            let mut balance_spans = vec![
                Span::styled("  Balance: ", theme::dim_style()),
                Span::styled(
                    format_amount(bal.balance, &account.currency),
                    theme::amount_style(bal.balance).add_modifier(Modifier::BOLD),
                ),
            ];
            if account.currency != REFERENCE_CURRENCY {
                let converted = reference_rate(&app.snapshot.rates, account)
                    .and_then(|rate| to_reference(bal.balance, rate))
                    .map(|value| format_amount(value.round_dp(2), REFERENCE_CURRENCY))
                    .unwrap_or_else(|e| match e {
                        ReplayError::Overflow { .. } => "out of range".to_string(),
                        _ => "no rate".to_string(),
                    });
                balance_spans.push(Span::styled(format!("  ≈ {converted}"), theme::dim_style()));
            }
            let balance_line = Line::from(balance_spans);

            let border_width = (area.width as usize).saturating_sub(3);
            let bottom_line = Line::from(Span::styled(
                format!("└{}", "─".repeat(border_width)),
                Style::default().fg(border_color),
            ));

            ListItem::new(vec![title_line, detail_line, balance_line, bottom_line])
        })
        .collect();

    let list = List::new(items).block(theme::panel(format!(
        "{} Accounts | j/k navigate | Enter show flows | D delete",
        app.snapshot.balances.len()
    )));
    f.render_widget(list, area);
}
