use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::app::{App, InputMode, PendingAction, Screen};
use crate::db::{Database, RecordFilter};
use crate::models::*;
use crate::rates::{self, RateProvider};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit moneyflow", cmd_quit, r);
    register_command!("quit", "Quit moneyflow", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("a", "Go to Accounts", cmd_accounts, r);
    register_command!("accounts", "Go to Accounts", cmd_accounts, r);
    register_command!("f", "Go to Flows", cmd_flows, r);
    register_command!("flows", "Go to Flows", cmd_flows, r);
    register_command!("hi", "Go to History", cmd_history, r);
    register_command!("history", "Go to History", cmd_history, r);
    register_command!("st", "Go to Stats", cmd_stats, r);
    register_command!("stats", "Go to Stats", cmd_stats, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!(
        "account",
        "Create account (e.g. :account Main EUR 1200)",
        cmd_account,
        r
    );
    register_command!(
        "category",
        "Create category (e.g. :category Subscriptions)",
        cmd_category,
        r
    );
    register_command!(
        "flow",
        "Add flow (e.g. :flow Main -4.50 Coffee #Food)",
        cmd_flow,
        r
    );
    register_command!(
        "transfer",
        "Add transfer (e.g. :transfer Main Travel 100 1.08)",
        cmd_transfer,
        r
    );
    register_command!(
        "edit",
        "Edit selected flow (e.g. :edit amount -12.30)",
        cmd_edit,
        r
    );
    register_command!("delete", "Delete selected flow/account", cmd_delete, r);
    register_command!(
        "search",
        "Search flows by name (e.g. :search coffee)",
        cmd_search,
        r
    );
    register_command!("s", "Search flows (e.g. :s coffee)", cmd_search, r);
    register_command!(
        "filter-account",
        "Filter flows by account (e.g. :filter-account Main)",
        cmd_filter_account,
        r
    );
    register_command!("fa", "Filter flows by account", cmd_filter_account, r);
    register_command!(
        "select",
        "History accounts (e.g. :select Main,Travel)",
        cmd_select,
        r
    );
    register_command!(
        "range",
        "History range, - for an open bound (e.g. :range - 2024-06-30)",
        cmd_range,
        r
    );
    register_command!("months", "Stats window in months (e.g. :months 6)", cmd_months, r);
    register_command!(
        "rates",
        "Rates: fetch | import <file> | set <CUR> <rate>",
        cmd_rates,
        r
    );
    register_command!(
        "export",
        "Export flows to CSV (e.g. :export ~/flows.csv)",
        cmd_export,
        r
    );
    register_command!(
        "export-history",
        "Export history to CSV (e.g. :export-history ~/history.csv)",
        cmd_export_history,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        tracing::debug!(command = cmd_name, "running command");
        (cmd.run)(args, app, db)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

pub(crate) fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 2) // skip short aliases for suggestions
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    Ok(())
}

fn cmd_accounts(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Accounts;
    Ok(())
}

fn cmd_flows(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Flows;
    Ok(())
}

fn cmd_history(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::History;
    Ok(())
}

fn cmd_stats(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Stats;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_account(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() < 2 {
        app.set_status("Usage: :account <name> <CUR> [initial balance] [YYYY-MM-DD]");
        return Ok(());
    }

    let name = parts[0];
    let currency = parts[1].to_uppercase();
    if !is_currency_code(&currency) {
        app.set_status(format!("Invalid currency code: {}", parts[1]));
        return Ok(());
    }
    let balance = match parts.get(2) {
        Some(v) => match Decimal::from_str(v) {
            Ok(b) => b,
            Err(_) => {
                app.set_status(format!("Invalid amount: {v}"));
                return Ok(());
            }
        },
        None => Decimal::ZERO,
    };
    let created = match parts.get(3) {
        Some(v) => match parse_day(v) {
            Ok(d) => d,
            Err(e) => {
                app.set_status(e.to_string());
                return Ok(());
            }
        },
        None => app.today,
    };

    let account = BankAccount::new(name.to_string(), &currency, balance, created);
    db.insert_account(&account)?;
    if !app.snapshot.rates.contains(&currency) {
        app.set_status(format!(
            "Created account: {account}. No rate for {currency} yet, try :rates fetch"
        ));
    } else {
        app.set_status(format!("Created account: {account}"));
    }
    app.refresh_all(db)
}

fn cmd_category(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :category <name>");
        return Ok(());
    }
    db.insert_category(&Category::new(args.to_string()))?;
    app.refresh_all(db)?;
    app.set_status(format!("Created category: {args}"));
    Ok(())
}

/// Flow arguments: `<account> <amount> [YYYY-MM-DD] <name...> [#category]`.
#[derive(Debug, PartialEq)]
pub(crate) struct FlowArgs<'a> {
    pub(crate) account: &'a str,
    pub(crate) cost: Decimal,
    pub(crate) date: Option<NaiveDate>,
    pub(crate) name: String,
    pub(crate) category: Option<&'a str>,
}

pub(crate) fn parse_flow_args(args: &str) -> Result<FlowArgs<'_>, String> {
    const USAGE: &str = "Usage: :flow <account> <amount> [YYYY-MM-DD] <name> [#category]";
    let mut tokens = args.split_whitespace();
    let (Some(account), Some(amount)) = (tokens.next(), tokens.next()) else {
        return Err(USAGE.into());
    };
    let cost = Decimal::from_str(amount).map_err(|_| format!("Invalid amount: {amount}"))?;

    let mut date = None;
    let mut category = None;
    let mut words = Vec::new();
    for token in tokens {
        if let Some(cat) = token.strip_prefix('#') {
            category = Some(cat);
        } else if date.is_none() && words.is_empty() && NaiveDate::parse_from_str(token, DAY_FORMAT).is_ok() {
            date = parse_day(token).ok();
        } else {
            words.push(token);
        }
    }
    if words.is_empty() {
        return Err(USAGE.into());
    }

    Ok(FlowArgs {
        account,
        cost,
        date,
        name: words.join(" "),
        category,
    })
}

fn cmd_flow(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let parsed = match parse_flow_args(args) {
        Ok(p) => p,
        Err(msg) => {
            app.set_status(msg);
            return Ok(());
        }
    };
    let Some(account) = resolve_account(&app.snapshot.accounts, parsed.account) else {
        app.set_status(format!("Account '{}' not found", parsed.account));
        return Ok(());
    };
    let category_name = parsed.category.unwrap_or("Other");
    let Some(category_id) =
        Category::find_by_name(&app.snapshot.categories, category_name).and_then(|c| c.id)
    else {
        app.set_status(format!("Category '{category_name}' not found"));
        return Ok(());
    };
    let Some(account_id) = account.id else {
        return Ok(());
    };
    let account_label = account.to_string();

    let flow = Flow::new(
        parsed.name.clone(),
        parsed.cost,
        category_id,
        account_id,
        parsed.date.unwrap_or(app.today),
    );
    db.insert_flow(&flow)?;
    app.refresh_all(db)?;
    app.set_status(format!(
        "Added flow: {} {} to {account_label}",
        parsed.name, parsed.cost
    ));
    Ok(())
}

fn cmd_transfer(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    const USAGE: &str = "Usage: :transfer <from> <to> <amount> [rate] [YYYY-MM-DD] [name]";
    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() < 3 {
        app.set_status(USAGE);
        return Ok(());
    }

    let (Some(from), Some(to)) = (
        resolve_account(&app.snapshot.accounts, parts[0]).and_then(|a| a.id),
        resolve_account(&app.snapshot.accounts, parts[1]).and_then(|a| a.id),
    ) else {
        app.set_status(format!("Account '{}' or '{}' not found", parts[0], parts[1]));
        return Ok(());
    };
    let Ok(amount) = Decimal::from_str(parts[2]) else {
        app.set_status(format!("Invalid amount: {}", parts[2]));
        return Ok(());
    };

    let mut rest = &parts[3..];
    let mut rate = Decimal::ONE;
    if let Some(r) = rest.first().and_then(|t| Decimal::from_str(t).ok()) {
        rate = r;
        rest = &rest[1..];
    }
    let mut date = app.today;
    if let Some(d) = rest.first().and_then(|t| NaiveDate::parse_from_str(t, DAY_FORMAT).ok()) {
        date = d;
        rest = &rest[1..];
    }
    let name = if rest.is_empty() {
        format!("{} → {}", app.account_name(from), app.account_name(to))
    } else {
        rest.join(" ")
    };
    let Some(category_id) =
        Category::find_by_name(&app.snapshot.categories, "Savings").and_then(|c| c.id)
    else {
        app.set_status("Category 'Savings' not found");
        return Ok(());
    };

    let transfer = Transfer::new(name.clone(), amount, rate, category_id, from, to, date);
    db.insert_transfer(&transfer)?;
    app.refresh_all(db)?;
    app.set_status(format!("Added transfer: {name} ({amount} × {rate})"));
    Ok(())
}

fn cmd_edit(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let selected = match app.selected_movement() {
        Some(Movement::Flow(f)) if app.screen == Screen::Flows => f.id,
        _ => None,
    };
    let Some(id) = selected else {
        app.set_status("Select a flow on the Flows screen first");
        return Ok(());
    };

    let mut parts = args.splitn(2, ' ');
    let field = parts.next().unwrap_or("");
    let value = parts.next().unwrap_or("").trim();
    if value.is_empty() {
        app.set_status("Usage: :edit <name|amount|date|category|account> <value>");
        return Ok(());
    }

    let mut patch = FlowPatch::default();
    match field {
        "name" => patch.name = Some(value.to_string()),
        "amount" | "cost" => match Decimal::from_str(value) {
            Ok(v) => patch.cost = Some(v),
            Err(_) => {
                app.set_status(format!("Invalid amount: {value}"));
                return Ok(());
            }
        },
        "date" => match parse_day(value) {
            Ok(d) => patch.date = Some(d),
            Err(e) => {
                app.set_status(e.to_string());
                return Ok(());
            }
        },
        "category" => match Category::find_by_name(&app.snapshot.categories, value) {
            Some(c) => patch.category_id = c.id,
            None => {
                app.set_status(format!("Category '{value}' not found"));
                return Ok(());
            }
        },
        "account" => match resolve_account(&app.snapshot.accounts, value) {
            Some(a) => patch.account_id = a.id,
            None => {
                app.set_status(format!("Account '{value}' not found"));
                return Ok(());
            }
        },
        other => {
            app.set_status(format!("Unknown field: {other}"));
            return Ok(());
        }
    }

    db.update_flow(id, &patch)?;
    app.refresh_all(db)?;
    app.set_status(format!("Updated flow {id}"));
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    let pending = match app.screen {
        Screen::Flows => match app.selected_movement() {
            Some(Movement::Flow(f)) => f.id.map(|id| PendingAction::DeleteFlow {
                id,
                name: f.name.clone(),
            }),
            Some(Movement::Transfer(t)) => t.id.map(|id| PendingAction::DeleteTransfer {
                id,
                name: t.name.clone(),
            }),
            None => None,
        },
        Screen::Accounts => app.selected_account().and_then(|b| {
            b.account.id.map(|id| PendingAction::DeleteAccount {
                id,
                name: b.account.name.clone(),
            })
        }),
        _ => None,
    };

    match pending {
        Some(action) => request_confirm(app, action),
        None => app.set_status("Select a flow or an account first"),
    }
    Ok(())
}

pub(crate) fn request_confirm(app: &mut App, action: PendingAction) {
    app.confirm_message = match &action {
        PendingAction::DeleteFlow { name, .. } => format!("Delete flow '{name}'?"),
        PendingAction::DeleteTransfer { name, .. } => format!("Delete transfer '{name}'?"),
        PendingAction::DeleteAccount { name, .. } => format!("Delete account '{name}'?"),
    };
    app.pending_action = Some(action);
    app.input_mode = InputMode::Confirm;
}

fn cmd_search(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.search_input = args.to_string();
    app.screen = Screen::Flows;
    app.flow_index = 0;
    app.flow_scroll = 0;
    app.refresh_flows();

    if args.is_empty() {
        app.set_status("Search cleared");
    } else {
        app.set_status(format!("Searching: {args}"));
    }
    Ok(())
}

fn cmd_filter_account(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Flows;
    app.flow_index = 0;
    app.flow_scroll = 0;

    if args.is_empty() {
        app.flow_filter_account = None;
        app.refresh_flows();
        app.set_status("Account filter cleared - showing all flows");
        return Ok(());
    }

    match resolve_account(&app.snapshot.accounts, args) {
        Some(acct) => {
            let name = acct.name.clone();
            app.flow_filter_account = acct.id;
            app.refresh_flows();
            app.set_status(format!("Filtering by account: {name}"));
        }
        None => {
            let names: Vec<&str> = app.snapshot.accounts.iter().map(|a| a.name.as_str()).collect();
            app.set_status(format!("Account not found. Available: {}", names.join(", ")));
        }
    }
    Ok(())
}

fn cmd_select(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.history_accounts.clear();
        app.set_status("History shows all accounts");
    } else {
        let mut ids = Vec::new();
        for part in args.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match resolve_account(&app.snapshot.accounts, part).and_then(|a| a.id) {
                Some(id) if !ids.contains(&id) => ids.push(id),
                Some(_) => {}
                None => {
                    app.set_status(format!("Account '{part}' not found"));
                    return Ok(());
                }
            }
        }
        app.history_accounts = ids;
        app.set_status(format!("History shows {} account(s)", app.history_accounts.len()));
    }
    app.screen = Screen::History;
    app.history_scroll = 0;
    app.refresh_history(db)
}

fn cmd_range(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    // "-" leaves a bound open
    let parse = |s: &str| match s {
        "-" => Ok(None),
        day => parse_day(day).map(Some).map_err(|e| e.to_string()),
    };
    let (from, to) = match parts.as_slice() {
        [] => (Ok(None), Ok(None)),
        [from] => (parse(from), Ok(None)),
        [from, to, ..] => (parse(from), parse(to)),
    };
    let (from, to) = match (from, to) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(msg), _) | (_, Err(msg)) => {
            app.set_status(msg);
            return Ok(());
        }
    };
    if let (Some(f), Some(t)) = (from, to) {
        if f > t {
            app.set_status(format!("Invalid range: {f} is after {t}"));
            return Ok(());
        }
    }

    app.history_from = from;
    app.history_to = to;
    app.screen = Screen::History;
    app.history_scroll = 0;
    app.refresh_history(db)?;
    match (from, to) {
        (None, None) => app.set_status("History range reset"),
        _ => app.set_status(format!(
            "History from {} to {}",
            from.map(format_day).unwrap_or_else(|| "default".into()),
            to.map(format_day).unwrap_or_else(|| "today".into()),
        )),
    }
    Ok(())
}

fn cmd_months(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    match args.parse::<u32>() {
        Ok(n) if n > 0 => {
            app.config.stats_months = n;
            app.refresh_stats();
            app.screen = Screen::Stats;
            app.set_status(format!("Stats over the last {n} month(s)"));
        }
        _ => app.set_status("Usage: :months <n> (n > 0)"),
    }
    Ok(())
}

fn cmd_rates(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    match parts.as_slice() {
        [] => {
            let rates = db.current_rates()?;
            let list: Vec<String> = rates
                .iter()
                .filter(|(code, _)| *code != REFERENCE_CURRENCY)
                .map(|(code, rate)| format!("{code} {rate}"))
                .collect();
            if list.is_empty() {
                app.set_status("No rates stored. Use :rates fetch");
            } else {
                app.set_status(list.join(" | "));
            }
        }
        ["fetch"] => {
            let client = rates::EcbClient::new(&app.config.rates_url, app.config.http_timeout())?;
            match client.current_rates() {
                Ok(fetched) => {
                    let count = db.save_rates(&fetched)?;
                    app.refresh_all(db)?;
                    app.set_status(format!("Saved {count} rates"));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "rate fetch failed");
                    app.set_status(format!("Rate fetch failed: {e}"));
                }
            }
        }
        ["import", path] => {
            let imported = rates::import_ecb_file(&crate::run::shellexpand(path))?;
            let count = db.save_rates(&imported)?;
            app.refresh_all(db)?;
            app.set_status(format!("Saved {count} rates"));
        }
        ["set", code, rate] => {
            let Ok(rate) = Decimal::from_str(rate) else {
                app.set_status(format!("Invalid rate: {rate}"));
                return Ok(());
            };
            let code = code.to_uppercase();
            db.set_rate(&code, rate)?;
            app.refresh_all(db)?;
            app.set_status(format!("{code} = {rate}"));
        }
        _ => app.set_status("Usage: :rates [fetch | import <file> | set <CUR> <rate>]"),
    }
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/moneyflow-flows-{}.csv", format_day(app.today))
    } else {
        crate::run::shellexpand(args)
    };

    let filter = RecordFilter {
        account_id: app.flow_filter_account,
        ..RecordFilter::default()
    };
    let count = db.export_flows_csv(&path, &filter)?;
    if count == 0 {
        app.set_status("No flows to export");
    } else {
        app.set_status(format!("Exported {count} flows to {path}"));
    }
    Ok(())
}

fn cmd_export_history(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if app.history.is_empty() {
        app.set_status("Nothing to export");
        return Ok(());
    }
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/moneyflow-history-{}.csv", format_day(app.today))
    } else {
        crate::run::shellexpand(args)
    };
    let count = crate::ledger::export_history_csv(&app.history, &app.snapshot.accounts, &path)?;
    app.set_status(format!("Exported {count} days to {path}"));
    Ok(())
}

/// Find an account by name (case-insensitive) or by id.
pub(crate) fn resolve_account<'a>(accounts: &'a [BankAccount], key: &str) -> Option<&'a BankAccount> {
    BankAccount::find_by_name(accounts, key).or_else(|| {
        key.parse::<i64>()
            .ok()
            .and_then(|id| BankAccount::find_by_id(accounts, id))
    })
}
