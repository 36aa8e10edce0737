use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::config::{Config, Paths};
use crate::db::{Database, RecordFilter};
use crate::ledger::{self, Snapshot};
use crate::models::*;
use crate::rates::{self, RateProvider};
use crate::replay::{self, HistoryRow};
use crate::stats;

pub(crate) fn as_cli(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let rest = &args[2..];
    match args[1].as_str() {
        "accounts" => cli_accounts(db),
        "add-account" => cli_add_account(rest, db),
        "edit-account" => cli_edit_account(rest, db),
        "categories" => cli_categories(db),
        "add-category" => cli_add_category(rest, db),
        "delete-category" => cli_delete_category(rest, db),
        "balances" | "b" => cli_balances(rest, db),
        "flows" | "f" => cli_flows(rest, db),
        "add-flow" => cli_add_flow(rest, db),
        "edit-flow" => cli_edit_flow(rest, db),
        "delete-flow" => cli_delete_flow(rest, db),
        "add-transfer" => cli_add_transfer(rest, db),
        "delete-transfer" => cli_delete_transfer(rest, db),
        "history" | "h" => cli_history(rest, db, config),
        "stats" | "s" => cli_stats(rest, db, config),
        "rates" => cli_rates(rest, db, config),
        "export" => cli_export(rest, db),
        "config" => cli_config(rest, config),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("moneyflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("moneyflow - local personal finance tracker with multi-currency history");
    println!();
    println!("Usage: moneyflow [command]");
    println!();
    println!("Commands:");
    println!("  (none)                               Launch interactive TUI");
    println!("  accounts                             List bank accounts with balances");
    println!("  add-account <name> <CUR>             Create a bank account");
    println!("    --balance <amount>                 Initial balance (default: 0)");
    println!("    --date <YYYY-MM-DD>                Creation date (default: today)");
    println!("  edit-account <name> [--name <new>] [--balance <amount>] [--date <date>]");
    println!("  categories                           List categories");
    println!("  add-category <name>                  Create a category");
    println!("  delete-category <name>               Delete an unused category");
    println!("  balances [--as-of <date>]            Balances at the end of a day");
    println!("  flows                                List flows, newest first");
    println!("    --account <name> --from <date> --to <date>");
    println!("  add-flow <name> <amount> --account <name>");
    println!("    --category <name> --date <date>    (defaults: Other, today)");
    println!("  edit-flow <id> [--name] [--amount] [--category] [--account] [--date]");
    println!("  delete-flow <id>                     Delete a flow");
    println!("  add-transfer <name> <amount> --from <account> --to <account>");
    println!("    --rate <rate> --category <name> --date <date>");
    println!("  delete-transfer <id>                 Delete a transfer");
    println!("  history                              Day-by-day balance history");
    println!("    --from <date> --to <date> --accounts <A,B> --csv <path>");
    println!("  stats [--months <n>]                 Category and account statistics");
    println!("  rates                                Show stored exchange rates");
    println!("  rates fetch                          Download today's ECB rates");
    println!("  rates import <file.xml>              Load rates from a saved ECB feed");
    println!("  rates set <CUR> <rate>               Set one rate (units per EUR)");
    println!("  export [path]                        Export flows to CSV");
    println!("    --account <name> --from <date> --to <date>");
    println!("  config                               Show settings and where they live");
    println!("  config set <key> <value>             history-start, stats-months, rates-url,");
    println!("                                       http-timeout, log-filter");
    println!("  --help, -h                           Show this help");
    println!("  --version, -V                        Show version");
}

// ── Accounts & categories ────────────────────────────────────

fn cli_accounts(db: &Database) -> Result<()> {
    let balances = db.current_balances()?;
    if balances.is_empty() {
        println!("No accounts. Create one with: moneyflow add-account <name> <CUR>");
        return Ok(());
    }

    println!(
        "{:<4} {:<24} {:<4} {:>14}  Created",
        "ID", "Name", "Cur", "Balance"
    );
    println!("{}", "─".repeat(60));
    for b in &balances {
        println!(
            "{:<4} {:<24} {:<4} {:>14.2}  {}",
            b.account.id.unwrap_or(0),
            b.account.name,
            b.account.currency,
            b.balance,
            format_day(b.account.creation_date),
        );
    }
    Ok(())
}

fn cli_add_account(args: &[String], db: &Database) -> Result<()> {
    let pos = positionals(args);
    let (Some(name), Some(currency)) = (pos.first(), pos.get(1)) else {
        bail!("Usage: moneyflow add-account <name> <CUR> [--balance <amount>] [--date <date>]");
    };
    let balance = match flag_value(args, "--balance") {
        Some(v) => parse_amount(v)?,
        None => Decimal::ZERO,
    };
    let date = optional_day(args, "--date")?.unwrap_or_else(today);

    let account = BankAccount::new(name.to_string(), currency, balance, date);
    let id = db.insert_account(&account)?;
    println!("Created account {id}: {account}");
    Ok(())
}

fn cli_edit_account(args: &[String], db: &Database) -> Result<()> {
    let Some(key) = positionals(args).first().copied() else {
        bail!("Usage: moneyflow edit-account <name> [--name <new>] [--balance <amount>] [--date <date>]");
    };
    let Some(mut account) = db.find_account(key)? else {
        bail!("Account '{key}' not found");
    };
    if let Some(name) = flag_value(args, "--name") {
        account.name = name.to_string();
    }
    if let Some(v) = flag_value(args, "--balance") {
        account.initial_balance = parse_amount(v)?;
    }
    if let Some(day) = optional_day(args, "--date")? {
        account.creation_date = day;
    }
    db.update_account(&account)?;
    println!("Updated account: {account}");
    Ok(())
}

fn cli_categories(db: &Database) -> Result<()> {
    for cat in db.get_categories()? {
        println!("{:<4} {}", cat.id.unwrap_or(0), cat.name);
    }
    Ok(())
}

fn cli_add_category(args: &[String], db: &Database) -> Result<()> {
    let Some(name) = positionals(args).first().copied() else {
        bail!("Usage: moneyflow add-category <name>");
    };
    let id = db.insert_category(&Category::new(name.to_string()))?;
    println!("Created category {id}: {name}");
    Ok(())
}

fn cli_delete_category(args: &[String], db: &Database) -> Result<()> {
    let Some(name) = positionals(args).first().copied() else {
        bail!("Usage: moneyflow delete-category <name>");
    };
    let id = find_category_id(db, name)?;
    db.delete_category(id)?;
    println!("Deleted category: {name}");
    Ok(())
}

// ── Balances ─────────────────────────────────────────────────

fn cli_balances(args: &[String], db: &Database) -> Result<()> {
    let day = optional_day(args, "--as-of")?.unwrap_or_else(today);
    let balances = db.balances_as_of(day)?;
    let rates = db.current_rates()?;

    println!("Balances at end of {}", format_day(day));
    println!("{}", "─".repeat(48));
    for b in &balances {
        println!(
            "  {:<28} {:>12.2} {}",
            b.account.name, b.balance, b.account.currency
        );
    }

    let ids: Vec<i64> = balances.iter().filter_map(|b| b.account_id()).collect();
    match stats::total_in_reference(&balances, &rates, &ids) {
        Ok(total) => println!("  {:<28} {:>12.2} {REFERENCE_CURRENCY}", "Total", total),
        Err(e) => println!("  Total unavailable: {e}"),
    }
    Ok(())
}

// ── Flows & transfers ────────────────────────────────────────

fn cli_flows(args: &[String], db: &Database) -> Result<()> {
    let filter = record_filter(args, db)?;
    let accounts = db.get_accounts()?;
    let categories = db.get_categories()?;
    let flows = db.get_flows(&filter)?;
    let transfers = db.get_transfers(&filter)?;

    let movements = Movement::merge(flows, transfers);
    if movements.is_empty() {
        println!("No flows");
        return Ok(());
    }

    println!(
        "{:<6} {:<10}  {:<28} {:>12}  {:<20} Category",
        "ID", "Date", "Name", "Amount", "Account"
    );
    println!("{}", "─".repeat(96));
    for movement in &movements {
        let category = Category::find_by_id(&categories, movement.category_id())
            .map(|c| c.name.as_str())
            .unwrap_or("?");
        match movement {
            Movement::Flow(f) => {
                let account = account_name(&accounts, f.account_id);
                println!(
                    "{:<6} {:<10}  {:<28} {:>12.2}  {:<20} {}",
                    f.id.unwrap_or(0),
                    format_day(f.date),
                    f.name,
                    f.cost,
                    format!("{account} {}", f.currency),
                    category,
                );
            }
            Movement::Transfer(t) => {
                println!(
                    "T{:<5} {:<10}  {:<28} {:>12.2}  {:<20} {}",
                    t.id.unwrap_or(0),
                    format_day(t.date),
                    t.name,
                    t.amount,
                    format!(
                        "{} → {}",
                        account_name(&accounts, t.from_account),
                        account_name(&accounts, t.to_account)
                    ),
                    category,
                );
            }
        }
    }
    Ok(())
}

fn cli_add_flow(args: &[String], db: &Database) -> Result<()> {
    let pos = positionals(args);
    let (Some(name), Some(amount)) = (pos.first(), pos.get(1)) else {
        bail!("Usage: moneyflow add-flow <name> <amount> --account <name> [--category <name>] [--date <date>]");
    };
    let cost = parse_amount(amount)?;
    let account = required_account(args, "--account", db)?;
    let category = category_or_default(args, db)?;
    let date = optional_day(args, "--date")?.unwrap_or_else(today);

    let flow = Flow::new(name.to_string(), cost, category, account, date);
    let id = db.insert_flow(&flow)?;
    println!("Added flow {id}: {name} {cost:.2} on {}", format_day(date));
    Ok(())
}

fn cli_edit_flow(args: &[String], db: &Database) -> Result<()> {
    let id = parse_id(positionals(args).first().copied(), "edit-flow <id> [--name ...]")?;

    let mut patch = FlowPatch {
        name: flag_value(args, "--name").map(str::to_string),
        date: optional_day(args, "--date")?,
        ..FlowPatch::default()
    };
    if let Some(v) = flag_value(args, "--amount") {
        patch.cost = Some(parse_amount(v)?);
    }
    if flag_value(args, "--account").is_some() {
        patch.account_id = Some(required_account(args, "--account", db)?);
    }
    if let Some(name) = flag_value(args, "--category") {
        patch.category_id = Some(find_category_id(db, name)?);
    }

    match db.update_flow(id, &patch)? {
        0 => bail!("Flow {id} not found"),
        _ => println!("Updated flow {id}"),
    }
    Ok(())
}

fn cli_delete_flow(args: &[String], db: &Database) -> Result<()> {
    let id = parse_id(positionals(args).first().copied(), "delete-flow <id>")?;
    let Some(flow) = db.get_flow_by_id(id)? else {
        bail!("Flow {id} not found");
    };
    db.delete_flow(id)?;
    println!("Deleted flow {id}: {} {:.2} on {}", flow.name, flow.cost, format_day(flow.date));
    Ok(())
}

fn cli_add_transfer(args: &[String], db: &Database) -> Result<()> {
    let pos = positionals(args);
    let (Some(name), Some(amount)) = (pos.first(), pos.get(1)) else {
        bail!("Usage: moneyflow add-transfer <name> <amount> --from <account> --to <account> [--rate <rate>]");
    };
    let amount = parse_amount(amount)?;
    let from = required_account(args, "--from", db)?;
    let to = required_account(args, "--to", db)?;
    let rate = match flag_value(args, "--rate") {
        Some(v) => parse_amount(v)?,
        None => Decimal::ONE,
    };
    let category = category_or_default(args, db)?;
    let date = optional_day(args, "--date")?.unwrap_or_else(today);

    let transfer = Transfer::new(name.to_string(), amount, rate, category, from, to, date);
    let id = db.insert_transfer(&transfer)?;
    let credited = transfer.credited().unwrap_or_default();
    println!(
        "Added transfer {id}: {amount:.2} → {credited:.2} on {}",
        format_day(date)
    );
    Ok(())
}

fn cli_delete_transfer(args: &[String], db: &Database) -> Result<()> {
    let id = parse_id(positionals(args).first().copied(), "delete-transfer <id>")?;
    let Some(transfer) = db.get_transfer_by_id(id)? else {
        bail!("Transfer {id} not found");
    };
    db.delete_transfer(id)?;
    println!("Deleted transfer {id}: {} {:.2}", transfer.name, transfer.amount);
    Ok(())
}

// ── History & statistics ─────────────────────────────────────

fn cli_history(args: &[String], db: &Database, config: &Config) -> Result<()> {
    let accounts = db.get_accounts()?;
    let selected = match flag_value(args, "--accounts") {
        Some(list) => parse_account_list(list, &accounts)?,
        None => accounts.iter().filter_map(|a| a.id).collect(),
    };

    let last = optional_day(args, "--to")?.unwrap_or_else(today);
    let start = optional_day(args, "--from")?.or(config.history_start_until(last));
    let (first, last) = replay::history_window(start, last);
    let history = ledger::load_history(db, first, last, &selected)?;

    if let Some(path) = flag_value(args, "--csv") {
        let path = shellexpand(path);
        let count = ledger::export_history_csv(&history, &accounts, &path)?;
        println!("Exported {count} days to {path}");
        return Ok(());
    }

    print!("{:<10}", "Date");
    for id in &selected {
        print!(" {:>14}", truncate_name(&account_name(&accounts, *id), 14));
    }
    println!(" {:>14}", format!("Total {REFERENCE_CURRENCY}"));
    println!("{}", "─".repeat(12 + 15 * (selected.len() + 1)));

    for row in history.newest_first() {
        match row {
            HistoryRow::MonthEnd(month) => {
                println!("── {} ──", month.format("%B %Y"));
            }
            HistoryRow::Day(day) => {
                print!("{:<10}", format_day(day.date));
                for id in &selected {
                    match day.balances.get(id) {
                        Some(b) => print!(" {:>14.2}", b),
                        None => print!(" {:>14}", "-"),
                    }
                }
                let arrow = match day.delta.cmp(&Decimal::ZERO) {
                    std::cmp::Ordering::Greater => "↑",
                    std::cmp::Ordering::Less => "↓",
                    std::cmp::Ordering::Equal => " ",
                };
                println!(" {:>14.2} {arrow}", day.total);
            }
        }
    }
    Ok(())
}

fn cli_stats(args: &[String], db: &Database, config: &Config) -> Result<()> {
    let months = match flag_value(args, "--months") {
        Some(v) => v
            .parse::<u32>()
            .with_context(|| format!("Invalid month count: {v}"))?,
        None => config.stats_months,
    };
    let config = Config {
        stats_months: months,
        ..config.clone()
    };
    let today = today();
    let since = config.stats_since(today);

    let snapshot = Snapshot::load(db)?;
    let ids = snapshot.account_ids();
    let summary = ledger::summarize(&snapshot, today)?;

    println!("Since {} ({} month(s))", format_day(since), config.stats_months);
    println!("{}", "─".repeat(48));
    println!("  Total:            {:>12.2} {REFERENCE_CURRENCY}", summary.total);
    println!("  Last month:       {:>+12.2} {REFERENCE_CURRENCY}", summary.change_1m);
    println!("  Last 6 months:    {:>+12.2} {REFERENCE_CURRENCY}", summary.change_6m);

    let breakdown = stats::category_breakdown(
        &snapshot.flows,
        &snapshot.categories,
        &snapshot.accounts,
        &snapshot.rates,
        since,
        &ids,
    )?;
    if !breakdown.is_empty() {
        println!();
        println!("By category ({REFERENCE_CURRENCY}):");
        for row in &breakdown {
            println!(
                "  {:<20} {:>10.2} spent ({:>5.1}%)  {:>10.2} earned",
                row.category.name,
                row.expense,
                row.expense_share * Decimal::ONE_HUNDRED,
                row.income,
            );
        }
    }

    println!();
    println!("By account:");
    for e in stats::earnings_per_account(&snapshot.flows, &snapshot.accounts, since) {
        println!(
            "  {:<20} {:>10.2} in  {:>10.2} out  {:>+10.2} {}",
            e.account.name,
            e.income,
            e.expense,
            e.net(),
            e.account.currency,
        );
    }
    Ok(())
}

// ── Rates ────────────────────────────────────────────────────

fn cli_rates(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    match args.first().map(String::as_str) {
        None => {
            let rates = db.current_rates()?;
            if rates.foreign_count() == 0 {
                println!("No rates stored. Run: moneyflow rates fetch");
                return Ok(());
            }
            if let Some(day) = rates.published() {
                println!("Published {}", format_day(day));
            }
            for (code, rate) in rates.iter() {
                println!("  {code}  {rate}");
            }
            Ok(())
        }
        Some("fetch") => {
            let client = rates::EcbClient::new(&config.rates_url, config.http_timeout())?;
            let fetched = client.current_rates()?;
            let count = db.save_rates(&fetched)?;
            println!("Saved {count} rates");
            Ok(())
        }
        Some("import") => {
            let Some(path) = args.get(1) else {
                bail!("Usage: moneyflow rates import <file.xml>");
            };
            let imported = rates::import_ecb_file(&shellexpand(path))?;
            let count = db.save_rates(&imported)?;
            println!("Saved {count} rates");
            Ok(())
        }
        Some("set") => {
            let (Some(code), Some(rate)) = (args.get(1), args.get(2)) else {
                bail!("Usage: moneyflow rates set <CUR> <rate>");
            };
            let rate = parse_amount(rate)?;
            db.set_rate(&code.to_uppercase(), rate)?;
            println!("{} = {rate}", code.to_uppercase());
            Ok(())
        }
        Some(other) => bail!("Unknown rates command: {other}"),
    }
}

fn cli_export(args: &[String], db: &Database) -> Result<()> {
    let filter = record_filter(args, db)?;
    let output_path = positionals(args)
        .first()
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/moneyflow-flows-{}.csv", format_day(today()))
        });

    let count = db.export_flows_csv(&output_path, &filter)?;
    if count == 0 {
        println!("No flows to export");
    } else {
        println!("Exported {count} flows to {output_path}");
    }
    Ok(())
}

// ── Settings ─────────────────────────────────────────────────

fn cli_config(args: &[String], config: &Config) -> Result<()> {
    let paths = Paths::discover()?;
    match args.first().map(String::as_str) {
        None => {
            println!("Config:   {}", paths.config_file.display());
            println!("Database: {}", paths.database().display());
            println!("Log:      {}", paths.log_file().display());
            println!();
            println!("{}", serde_json::to_string_pretty(config)?);
            Ok(())
        }
        Some("set") => {
            let (Some(key), Some(value)) = (args.get(1), args.get(2)) else {
                bail!("Usage: moneyflow config set <key> <value>");
            };
            let updated = apply_setting(config.clone(), key, value)?;
            updated.save(&paths.config_file)?;
            tracing::info!(key = %key, value = %value, "config updated");
            println!("{key} = {value}");
            Ok(())
        }
        Some(other) => bail!("Unknown config command: {other}"),
    }
}

/// Return `config` with one setting changed.
pub(crate) fn apply_setting(mut config: Config, key: &str, value: &str) -> Result<Config> {
    match key {
        "history-start" => {
            config.history_start = match value {
                "none" | "" => None,
                v => Some(parse_day(v)?),
            };
        }
        "stats-months" => {
            let months = value
                .parse::<u32>()
                .with_context(|| format!("Invalid month count: {value}"))?;
            if months == 0 {
                bail!("stats-months must be at least 1");
            }
            config.stats_months = months;
        }
        "rates-url" => config.rates_url = value.to_string(),
        "http-timeout" => {
            config.http_timeout_secs = value
                .parse::<u64>()
                .with_context(|| format!("Invalid timeout: {value}"))?;
        }
        "log-filter" => config.log_filter = value.to_string(),
        other => bail!("Unknown setting: {other}"),
    }
    Ok(config)
}

// ── Argument helpers ─────────────────────────────────────────

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Value following `flag`, e.g. `--account Main`.
pub(crate) fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Arguments that are neither `--flags` nor their values.
pub(crate) fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
        } else if arg.starts_with("--") {
            skip_next = true;
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

pub(crate) fn parse_amount(s: &str) -> Result<Decimal> {
    let cleaned: String = s.chars().filter(|c| *c != ',' && *c != '_').collect();
    Decimal::from_str(cleaned.trim()).with_context(|| format!("Invalid amount: {s}"))
}

fn parse_id(arg: Option<&str>, usage: &str) -> Result<i64> {
    let Some(arg) = arg else {
        bail!("Usage: moneyflow {usage}");
    };
    arg.trim_start_matches('T')
        .parse::<i64>()
        .with_context(|| format!("Invalid id: {arg}"))
}

fn optional_day(args: &[String], flag: &str) -> Result<Option<NaiveDate>> {
    flag_value(args, flag).map(parse_day).transpose()
}

fn required_account(args: &[String], flag: &str, db: &Database) -> Result<i64> {
    let Some(name) = flag_value(args, flag) else {
        bail!("Missing {flag} <account>");
    };
    db.find_account(name)?
        .and_then(|a| a.id)
        .ok_or_else(|| anyhow::anyhow!("Account '{name}' not found"))
}

fn find_category_id(db: &Database, name: &str) -> Result<i64> {
    db.find_category(name)?
        .and_then(|c| c.id)
        .ok_or_else(|| anyhow::anyhow!("Category '{name}' not found"))
}

fn category_or_default(args: &[String], db: &Database) -> Result<i64> {
    find_category_id(db, flag_value(args, "--category").unwrap_or("Other"))
}

fn record_filter(args: &[String], db: &Database) -> Result<RecordFilter> {
    let account_id = match flag_value(args, "--account") {
        Some(_) => Some(required_account(args, "--account", db)?),
        None => None,
    };
    Ok(RecordFilter {
        account_id,
        from: optional_day(args, "--from")?,
        to: optional_day(args, "--to")?,
    })
}

/// Resolve a comma separated list of account names or ids.
pub(crate) fn parse_account_list(list: &str, accounts: &[BankAccount]) -> Result<Vec<i64>> {
    let mut ids = Vec::new();
    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let account = match part.parse::<i64>() {
            Ok(id) => BankAccount::find_by_id(accounts, id),
            Err(_) => BankAccount::find_by_name(accounts, part),
        };
        match account.and_then(|a| a.id) {
            Some(id) if !ids.contains(&id) => ids.push(id),
            Some(_) => {}
            None => bail!("Account '{part}' not found"),
        }
    }
    Ok(ids)
}

fn account_name(accounts: &[BankAccount], id: i64) -> String {
    BankAccount::find_by_id(accounts, id)
        .map(|a| a.name.clone())
        .unwrap_or_else(|| "?".into())
}

fn truncate_name(name: &str, max: usize) -> String {
    crate::ui::util::truncate(name, max)
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
