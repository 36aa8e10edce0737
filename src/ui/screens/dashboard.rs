use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Paragraph, Sparkline},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{format_day, REFERENCE_CURRENCY};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{delta_arrow, format_amount, format_delta, percent, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(summary) = &app.summary else {
        render_unavailable(f, area, app);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Summary cards
            Constraint::Min(8),    // Repartition
            Constraint::Length(4), // Daily spending
        ])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(chunks[0]);

    render_card(
        f,
        cards[0],
        "Total",
        format_amount(summary.total, REFERENCE_CURRENCY),
        theme::ACCENT,
        format!("{} accounts", app.snapshot.accounts.len()),
    );
    render_card(
        f,
        cards[1],
        "Last month",
        format_delta(summary.change_1m, REFERENCE_CURRENCY),
        change_color(summary.change_1m),
        delta_arrow(summary.change_1m).to_string(),
    );
    render_card(
        f,
        cards[2],
        "Last 6 months",
        format_delta(summary.change_6m, REFERENCE_CURRENCY),
        change_color(summary.change_6m),
        delta_arrow(summary.change_6m).to_string(),
    );
    let published = app
        .snapshot
        .rates
        .published()
        .map(format_day)
        .unwrap_or_else(|| "never".to_string());
    render_card(
        f,
        cards[3],
        "Rates",
        format!("{} currencies", app.snapshot.rates.foreign_count()),
        theme::TEXT,
        format!("published {published}"),
    );

    render_repartition(f, chunks[1], app);
    render_spending(f, chunks[2], app);
}

fn change_color(val: Decimal) -> Color {
    if val < Decimal::ZERO {
        theme::RED
    } else {
        theme::GREEN
    }
}

fn render_card(f: &mut Frame, area: Rect, title: &str, value: String, color: Color, sub: String) {
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(sub, theme::dim_style())),
    ])
    .centered()
    .block(theme::panel(title));

    f.render_widget(text, area);
}

fn render_unavailable(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![Line::from("")];
    if app.snapshot.accounts.is_empty() {
        lines.push(Line::from(Span::styled(
            "No accounts yet.",
            theme::dim_style().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Create one with :account <name> <currency> <initial balance>",
            theme::dim_style(),
        )));
    } else {
        let reason = app.rates_error.as_deref().unwrap_or("Totals unavailable");
        lines.push(Line::from(Span::styled(reason, theme::expense_style())));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Fetch rates with :rates fetch or set one with :rates set <CODE> <rate>",
            theme::dim_style(),
        )));
    }
    f.render_widget(
        Paragraph::new(lines).centered().block(theme::panel("Dashboard")),
        area,
    );
}

fn render_repartition(f: &mut Frame, area: Rect, app: &App) {
    if app.repartition.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled(
            "Nothing to show",
            theme::dim_style(),
        )))
        .centered()
        .block(theme::panel("Balance repartition"));
        f.render_widget(msg, area);
        return;
    }

    let bars: Vec<Bar> = app
        .repartition
        .iter()
        .take(12)
        .map(|share| {
            let val = share.value.max(Decimal::ZERO).to_u64().unwrap_or(0);
            Bar::default()
                .value(val)
                .text_value(percent(share.share))
                .label(Line::from(truncate(&share.account.name, 10)))
                .style(Style::default().fg(theme::ACCENT))
                .value_style(
                    Style::default()
                        .fg(theme::HEADER_BG)
                        .bg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(theme::panel(format!("Balance repartition ({REFERENCE_CURRENCY})")))
        .data(BarGroup::default().bars(&bars))
        .bar_width(10)
        .bar_gap(1)
        .bar_style(Style::default().fg(theme::ACCENT));

    f.render_widget(chart, area);
}

fn render_spending(f: &mut Frame, area: Rect, app: &App) {
    let data: Vec<u64> = app
        .daily
        .iter()
        .map(|d| d.spent.to_u64().unwrap_or(0))
        .collect();
    let spent: Decimal = app.daily.iter().map(|d| d.spent).sum();
    let earned: Decimal = app.daily.iter().map(|d| d.earned).sum();

    let title = format!(
        "Daily spending, {} days | in {} | out {}",
        app.daily.len(),
        format_amount(earned, REFERENCE_CURRENCY),
        format_amount(spent, REFERENCE_CURRENCY),
    );
    let sparkline = Sparkline::default()
        .block(theme::panel(title))
        .data(&data)
        .style(Style::default().fg(theme::YELLOW));

    f.render_widget(sparkline, area);
}
