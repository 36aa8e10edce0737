use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::config::Config;
use crate::db::Database;
use crate::ui::app::{App, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(db: &mut Database, config: &Config) -> Result<()> {
    let mut app = App::new(config);
    app.refresh_all(db)?;
    if let Some(err) = app.rates_error.clone() {
        app.set_status(format!("{err}. Try :rates fetch"));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = %e, "tui exited with an error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // tab bar + status + command bar + table borders and header
            let content_height = f.area().height.saturating_sub(6) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, db)?,
                InputMode::Command => handle_command_input(key, app, db)?,
                InputMode::Search => handle_search_input(key, app)?,
                InputMode::Confirm => handle_confirm_input(key, app, db)?,
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            app.search_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char(c @ '1'..='5') => {
            let idx = (c as usize) - ('1' as usize);
            if let Some(&screen) = Screen::all().get(idx) {
                switch_screen(app, screen);
            }
        }
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = (idx + 1) % screens.len();
            switch_screen(app, screens[next]);
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let prev = if idx == 0 { screens.len() - 1 } else { idx - 1 };
            switch_screen(app, screens[prev]);
        }
        KeyCode::Esc => handle_escape(app),
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Char('r') => {
            app.refresh_all(db)?;
            app.set_status("Reloaded");
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half_page = app.visible_rows / 2;
            for _ in 0..half_page {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half_page = app.visible_rows / 2;
            for _ in 0..half_page {
                handle_move_up(app);
            }
        }
        KeyCode::Char('D') if matches!(app.screen, Screen::Flows | Screen::Accounts) => {
            run_command("delete", app, db);
        }
        KeyCode::Enter if app.screen == Screen::Accounts => {
            // Show only the highlighted account in the flow list
            if let Some(name) = app.selected_account().map(|b| b.account.name.clone()) {
                run_command(&format!("filter-account {name}"), app, db);
            }
        }
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            run_command(&input, app, db);
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

/// Run a `:` command, reporting failures in the status bar.
fn run_command(input: &str, app: &mut App, db: &mut Database) {
    if let Err(e) = commands::handle_command(input, app, db) {
        tracing::warn!(command = input, error = %e, "command failed");
        app.set_status(format!("Error: {e}"));
    }
}

fn handle_search_input(key: event::KeyEvent, app: &mut App) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.screen = Screen::Flows;
            app.refresh_flows();
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_input.clear();
            app.refresh_flows();
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            app.screen = Screen::Flows;
            app.flow_index = 0;
            app.flow_scroll = 0;
            app.refresh_flows();
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            app.screen = Screen::Flows;
            app.flow_index = 0;
            app.flow_scroll = 0;
            app.refresh_flows();
        }
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.pending_action.take() {
                let outcome = match action {
                    PendingAction::DeleteFlow { id, name } => {
                        db.delete_flow(id).map(|_| format!("Deleted flow: {name}"))
                    }
                    PendingAction::DeleteTransfer { id, name } => db
                        .delete_transfer(id)
                        .map(|_| format!("Deleted transfer: {name}")),
                    PendingAction::DeleteAccount { id, name } => db
                        .delete_account(id)
                        .map(|_| format!("Deleted account: {name}")),
                };
                match outcome {
                    Ok(msg) => {
                        app.refresh_all(db)?;
                        app.set_status(msg);
                    }
                    Err(e) => app.set_status(format!("Error: {e}")),
                }
            }
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
        _ => {}
    }
    Ok(())
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, screen: Screen) {
    app.screen = screen;
    app.status_message.clear();
}

fn handle_move_down(app: &mut App) {
    let page = app.visible_rows;
    match app.screen {
        Screen::Accounts => {
            if app.account_index + 1 < app.snapshot.balances.len() {
                app.account_index += 1;
            }
        }
        Screen::Flows => {
            let len = app.movements.len();
            scroll_down(&mut app.flow_index, &mut app.flow_scroll, len, page);
        }
        Screen::History => {
            let len = app.history.rows().len();
            if app.history_scroll + page < len {
                app.history_scroll += 1;
            }
        }
        Screen::Stats => {
            let len = app.breakdown.len();
            if app.stats_scroll + page < len {
                app.stats_scroll += 1;
            }
        }
        Screen::Dashboard => {}
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Accounts => app.account_index = app.account_index.saturating_sub(1),
        Screen::Flows => scroll_up(&mut app.flow_index, &mut app.flow_scroll),
        Screen::History => app.history_scroll = app.history_scroll.saturating_sub(1),
        Screen::Stats => app.stats_scroll = app.stats_scroll.saturating_sub(1),
        Screen::Dashboard => {}
    }
}

fn handle_escape(app: &mut App) {
    if app.screen == Screen::Flows
        && (app.flow_filter_account.is_some() || !app.search_input.is_empty())
    {
        app.flow_filter_account = None;
        app.search_input.clear();
        app.flow_index = 0;
        app.flow_scroll = 0;
        app.refresh_flows();
        app.set_status("Filters cleared");
    } else {
        app.status_message.clear();
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Accounts => app.account_index = 0,
        Screen::Flows => scroll_to_top(&mut app.flow_index, &mut app.flow_scroll),
        Screen::History => app.history_scroll = 0,
        Screen::Stats => app.stats_scroll = 0,
        Screen::Dashboard => {}
    }
}

fn handle_goto_bottom(app: &mut App) {
    let page = app.visible_rows;
    match app.screen {
        Screen::Accounts => {
            app.account_index = app.snapshot.balances.len().saturating_sub(1);
        }
        Screen::Flows => {
            let len = app.movements.len();
            scroll_to_bottom(&mut app.flow_index, &mut app.flow_scroll, len, page);
        }
        Screen::History => {
            app.history_scroll = app.history.rows().len().saturating_sub(page);
        }
        Screen::Stats => {
            app.stats_scroll = app.breakdown.len().saturating_sub(page);
        }
        Screen::Dashboard => {}
    }
}
