//! Frame layout: screen tabs with the rates badge, the active screen, a
//! status line and the prompt.

use std::collections::BTreeMap;

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Tabs},
    Frame,
};

use super::app::{App, InputMode, Screen};
use super::commands::COMMANDS;
use super::screens;
use super::theme;
use super::util::format_amount;
use crate::models::{format_day, REFERENCE_CURRENCY};

/// Keys handled outside of the prompt, as (key, action).
const KEYS: &[(&str, &str)] = &[
    ("1-5, Tab", "switch screen"),
    ("j/k, arrows", "move the cursor"),
    ("g / G", "first / last row"),
    ("Ctrl-d / Ctrl-u", "half a page down / up"),
    (":", "type a command"),
    ("/", "search flows as you type"),
    ("Enter", "flows of the selected account"),
    ("D", "delete the selected flow or account"),
    ("Esc", "drop search and account filter"),
    ("r", "reload from the database"),
    ("?", "toggle this help"),
    ("Ctrl-q, Ctrl-c", "quit"),
];

const HELP_WIDTH: u16 = 78;

pub(crate) fn render(f: &mut Frame, app: &App) {
    let [top, body, status, prompt_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(5),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(f.area());

    render_tabs(f, top, app);
    match app.screen {
        Screen::Dashboard => screens::dashboard::render(f, body, app),
        Screen::Accounts => screens::accounts::render(f, body, app),
        Screen::Flows => screens::flows::render(f, body, app),
        Screen::History => screens::history::render(f, body, app),
        Screen::Stats => screens::stats::render(f, body, app),
    }
    f.render_widget(Paragraph::new(Line::from(status_spans(app, status.width))), status);
    render_prompt(f, prompt_area, app);

    if app.show_help {
        render_help(f, f.area());
    }
}

// ── Top row ──────────────────────────────────────────────────

fn render_tabs(f: &mut Frame, area: Rect, app: &App) {
    let badge = rates_badge(app);
    let [tabs_area, badge_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(badge.width() as u16)])
            .areas(area);

    let selected = Screen::all()
        .iter()
        .position(|s| *s == app.screen)
        .unwrap_or(0);
    let tabs = Tabs::new(
        Screen::all()
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{} {s}", i + 1)),
    )
    .select(selected)
    .style(Style::default().fg(theme::TEXT_DIM).bg(theme::HEADER_BG))
    .highlight_style(
        Style::default()
            .fg(theme::ACCENT)
            .add_modifier(Modifier::BOLD),
    )
    .divider(Span::styled("·", Style::default().fg(theme::OVERLAY)));

    f.render_widget(tabs, tabs_area);
    f.render_widget(
        Paragraph::new(badge).style(Style::default().bg(theme::HEADER_BG)),
        badge_area,
    );
}

/// Where the conversion rates stand: unusable, absent, fetched or typed in.
pub(crate) fn rates_badge(app: &App) -> Line<'static> {
    let rates = &app.snapshot.rates;
    if app.rates_error.is_some() {
        return Line::styled(" rates unusable ", Style::default().fg(theme::RED));
    }
    let text = match (rates.foreign_count(), rates.published()) {
        (0, _) => format!(" {REFERENCE_CURRENCY} only "),
        (n, Some(day)) => format!(" {n} rates of {} ", format_day(day)),
        (n, None) => format!(" {n} rates set by hand "),
    };
    Line::styled(text, Style::default().fg(theme::MAUVE))
}

// ── Status line ──────────────────────────────────────────────

fn status_spans(app: &App, width: u16) -> Vec<Span<'static>> {
    let badge = match app.input_mode {
        InputMode::Normal => theme::ACCENT,
        InputMode::Command => theme::GREEN,
        InputMode::Search => theme::YELLOW,
        InputMode::Confirm => theme::RED,
    };
    let mut spans = vec![
        Span::styled(
            format!(" {} ", app.input_mode),
            Style::default()
                .fg(theme::HEADER_BG)
                .bg(badge)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {} ", screen_fact(app)), theme::status_bar_style()),
    ];

    let hints: Vec<Span<'static>> = screen_hints(app.screen)
        .iter()
        .flat_map(|(key, what)| {
            [
                Span::styled(
                    format!(" {key}"),
                    Style::default().fg(theme::ACCENT).bg(theme::SURFACE),
                ),
                Span::styled(format!(" {what} "), theme::status_bar_style()),
            ]
        })
        .collect();

    let used: usize = spans.iter().chain(&hints).map(Span::width).sum();
    spans.push(Span::styled(
        " ".repeat((width as usize).saturating_sub(used)),
        theme::status_bar_style(),
    ));
    spans.extend(hints);
    spans
}

/// One figure summing up the active screen.
pub(crate) fn screen_fact(app: &App) -> String {
    match app.screen {
        Screen::Dashboard => match &app.summary {
            Some(summary) => format!("worth {}", format_amount(summary.total, REFERENCE_CURRENCY)),
            None => "worth unknown".to_string(),
        },
        Screen::Accounts => format!("{} accounts", app.snapshot.accounts.len()),
        Screen::Flows => format!(
            "{} of {} movements",
            app.movements.len(),
            app.snapshot.flows.len() + app.snapshot.transfers.len()
        ),
        Screen::History => match (app.history.days().next(), app.history.last_day()) {
            (Some(first), Some(last)) => {
                format!("{} → {}", format_day(first.date), format_day(last.date))
            }
            _ => "no history".to_string(),
        },
        Screen::Stats => format!("since {}", format_day(app.stats_since)),
    }
}

pub(crate) fn screen_hints(screen: Screen) -> &'static [(&'static str, &'static str)] {
    match screen {
        Screen::Dashboard => &[(":rates fetch", "update rates"), ("r", "reload"), ("?", "help")],
        Screen::Accounts => &[("Enter", "flows"), (":account", "new"), ("D", "delete")],
        Screen::Flows => &[("/", "search"), (":edit", "change"), ("D", "delete")],
        Screen::History => &[(":select", "accounts"), (":range", "dates"), (":export-history", "csv")],
        Screen::Stats => &[(":months", "window"), ("?", "help")],
    }
}

// ── Prompt ───────────────────────────────────────────────────

fn render_prompt(f: &mut Frame, area: Rect, app: &App) {
    let (line, cursor) = prompt(app);
    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme::COMMAND_BG)),
        area,
    );
    if let Some(offset) = cursor {
        f.set_cursor_position((area.x + offset, area.y));
    }
}

/// Bottom line content, and the cursor column while typing.
pub(crate) fn prompt(app: &App) -> (Line<'_>, Option<u16>) {
    match app.input_mode {
        InputMode::Command => typed(":", theme::ACCENT, &app.command_input, None),
        InputMode::Search => {
            let found = (!app.search_input.is_empty())
                .then(|| format!("  {} found", app.movements.len()));
            typed("/", theme::YELLOW, &app.search_input, found)
        }
        InputMode::Confirm => (
            Line::from(vec![
                Span::styled(app.confirm_message.as_str(), Style::default().fg(theme::YELLOW)),
                Span::styled("  y confirms, n cancels", theme::dim_style()),
            ]),
            None,
        ),
        InputMode::Normal if app.status_message.is_empty() => (
            Line::styled(" ? lists keys and commands", theme::dim_style()),
            None,
        ),
        InputMode::Normal => (
            Line::styled(app.status_message.as_str(), theme::command_bar_style()),
            None,
        ),
    }
}

fn typed<'a>(
    sigil: &'static str,
    color: Color,
    input: &'a str,
    extra: Option<String>,
) -> (Line<'a>, Option<u16>) {
    let mut spans = vec![
        Span::styled(sigil, Style::default().fg(color)),
        Span::styled(input, theme::command_bar_style()),
    ];
    if let Some(extra) = extra {
        spans.push(Span::styled(extra, theme::dim_style()));
    }
    (Line::from(spans), Some((sigil.len() + input.len()) as u16))
}

// ── Help ─────────────────────────────────────────────────────

fn render_help(f: &mut Frame, area: Rect) {
    let lines = help_lines();
    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let popup = centered(area, HELP_WIDTH.min(area.width.saturating_sub(4)), height);

    let block = Block::bordered()
        .title(Span::styled(
            " moneyflow ",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::styled(" any key closes ", theme::dim_style()).right_aligned())
        .border_style(Style::default().fg(theme::ACCENT))
        .style(Style::default().bg(theme::HEADER_BG));

    f.render_widget(Clear, popup);
    f.render_widget(Paragraph::new(lines).block(block), popup);
}

/// Keys, then one line per command with its aliases.
pub(crate) fn help_lines() -> Vec<Line<'static>> {
    let heading = |text: &'static str| {
        Line::styled(
            text,
            Style::default()
                .fg(theme::YELLOW)
                .add_modifier(Modifier::BOLD),
        )
    };
    let entry = |key: String, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<20} "), Style::default().fg(theme::ACCENT)),
            Span::styled(what, theme::normal_style()),
        ])
    };

    let mut lines = vec![heading(" Keys")];
    lines.extend(KEYS.iter().map(|&(key, what)| entry(key.to_string(), what)));
    lines.push(Line::default());
    lines.push(heading(" Commands"));
    for (names, what) in command_groups() {
        lines.push(entry(format!(":{}", names.join(" :")), what));
    }
    lines
}

/// Registered names sharing a description, longest name first.
fn command_groups() -> Vec<(Vec<&'static str>, &'static str)> {
    let mut by_description: BTreeMap<&'static str, Vec<&'static str>> = BTreeMap::new();
    for (&name, command) in COMMANDS.iter() {
        by_description
            .entry(command.description)
            .or_default()
            .push(name);
    }

    let mut groups: Vec<(Vec<&'static str>, &'static str)> = by_description
        .into_iter()
        .map(|(what, mut names)| {
            names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
            (names, what)
        })
        .collect();
    groups.sort_by(|a, b| a.0.cmp(&b.0));
    groups
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}
