//! Glue between the store and the pure replay/statistics code.

use anyhow::Result;
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use crate::db::{Database, RecordFilter};
use crate::models::{Balance, BankAccount, Category, CurrencyRates, Flow, Transfer};
use crate::replay::{self, History};
use crate::stats;

/// Everything the dashboard and stats screens need, read in one go.
#[derive(Debug, Clone, Default)]
pub(crate) struct Snapshot {
    pub(crate) accounts: Vec<BankAccount>,
    pub(crate) categories: Vec<Category>,
    pub(crate) flows: Vec<Flow>,
    pub(crate) transfers: Vec<Transfer>,
    pub(crate) rates: CurrencyRates,
    pub(crate) balances: Vec<Balance>,
}

impl Snapshot {
    pub(crate) fn load(db: &Database) -> Result<Self> {
        let accounts = db.get_accounts()?;
        let flows = db.get_flows(&RecordFilter::default())?;
        let transfers = db.get_transfers(&RecordFilter::default())?;
        let balances = replay::settle(&accounts, &flows, &transfers)?;
        Ok(Self {
            categories: db.get_categories()?,
            rates: db.load_rates()?,
            accounts,
            flows,
            transfers,
            balances,
        })
    }

    pub(crate) fn account_ids(&self) -> Vec<i64> {
        self.accounts.iter().filter_map(|a| a.id).collect()
    }
}

/// Headline numbers of the dashboard, in the reference currency.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Summary {
    pub(crate) total: Decimal,
    pub(crate) change_1m: Decimal,
    pub(crate) change_6m: Decimal,
}

pub(crate) fn summarize(snapshot: &Snapshot, today: NaiveDate) -> Result<Summary> {
    let since = |months: u32| today.checked_sub_months(Months::new(months)).unwrap_or(today);
    let change = |months: u32| {
        stats::net_change_since(
            &snapshot.flows,
            &snapshot.transfers,
            &snapshot.accounts,
            &snapshot.rates,
            since(months),
        )
    };
    Ok(Summary {
        total: stats::total_in_reference(
            &snapshot.balances,
            &snapshot.rates,
            &snapshot.account_ids(),
        )?,
        change_1m: change(1)?,
        change_6m: change(6)?,
    })
}

/// Load what the replay needs for `[first_day, last_day]` and run it.
pub(crate) fn load_history(
    db: &Database,
    first_day: NaiveDate,
    last_day: NaiveDate,
    selected: &[i64],
) -> Result<History> {
    let opening = db.opening_balances(first_day)?;
    let range = RecordFilter::between(first_day, last_day);
    let flows = db.get_flows(&range)?;
    let transfers = db.get_transfers(&range)?;
    let rates = db.load_rates()?;
    Ok(replay::replay(
        &opening, &flows, &transfers, &rates, first_day, last_day, selected,
    )?)
}

/// Write a replay to CSV: one row per day, one column per account plus the
/// reference total. Returns the number of days written.
pub(crate) fn export_history_csv(
    history: &History,
    accounts: &[BankAccount],
    path: &str,
) -> Result<usize> {
    use anyhow::Context;

    let ids: Vec<i64> = history
        .last_day()
        .map(|s| s.balances.keys().copied().collect())
        .unwrap_or_default();

    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {path}"))?;
    let mut header = vec!["date".to_string()];
    for id in &ids {
        header.push(
            BankAccount::find_by_id(accounts, *id)
                .map(|a| a.to_string())
                .unwrap_or_else(|| "?".into()),
        );
    }
    header.push(format!("total_{}", crate::models::REFERENCE_CURRENCY));
    header.push("delta".into());
    wtr.write_record(&header)?;

    let mut count = 0;
    for day in history.days() {
        let mut record = vec![crate::models::format_day(day.date)];
        for id in &ids {
            record.push(
                day.balances
                    .get(id)
                    .map(|b| format!("{b:.2}"))
                    .unwrap_or_default(),
            );
        }
        record.push(format!("{:.2}", day.total));
        record.push(format!("{:.2}", day.delta));
        wtr.write_record(&record)?;
        count += 1;
    }
    wtr.flush()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use rust_decimal_macros::dec;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn setup(db: &mut Database) -> (i64, i64) {
        let a = db
            .insert_account(&BankAccount::new("A".into(), "EUR", dec!(100), d("2024-01-01")))
            .unwrap();
        let b = db
            .insert_account(&BankAccount::new("B".into(), "USD", dec!(50), d("2024-01-01")))
            .unwrap();
        let food = db.find_category("Food").unwrap().unwrap().id.unwrap();
        db.insert_flow(&Flow::new("Before".into(), dec!(-10), food, a, d("2024-01-05")))
            .unwrap();
        db.insert_flow(&Flow::new("Inside".into(), dec!(-20), food, a, d("2024-01-11")))
            .unwrap();
        db.insert_flow(&Flow::new("Lunch".into(), dec!(-5), food, b, d("2024-01-12")))
            .unwrap();
        db.save_rates(&CurrencyRates::new().with_rate("USD", dec!(1.25)))
            .unwrap();
        (a, b)
    }

    #[test]
    fn test_load_history_starts_from_opening_balances() {
        let mut db = Database::open_in_memory().unwrap();
        let (a, b) = setup(&mut db);
        let history = load_history(&db, d("2024-01-10"), d("2024-01-12"), &[a, b]).unwrap();

        let first = history.day(d("2024-01-10")).unwrap();
        assert_eq!(first.balances[&a], dec!(90));
        // 90 + 50 / 1.25
        assert_eq!(first.total, dec!(130));

        let last = history.last_day().unwrap();
        assert_eq!(last.balances[&a], dec!(70));
        assert_eq!(last.balances[&b], dec!(45));
        assert_eq!(last.delta, dec!(-4));
    }

    #[test]
    fn test_load_history_missing_rate() {
        let mut db = Database::open_in_memory().unwrap();
        let (a, _) = setup(&mut db);
        let chf = db
            .insert_account(&BankAccount::new("C".into(), "CHF", dec!(1), d("2024-01-01")))
            .unwrap();
        let err = load_history(&db, d("2024-01-10"), d("2024-01-12"), &[a, chf]).unwrap_err();
        assert!(err.to_string().contains("CHF"));
    }

    #[test]
    fn test_summarize() {
        let mut db = Database::open_in_memory().unwrap();
        setup(&mut db);
        let snapshot = Snapshot::load(&db).unwrap();
        let summary = summarize(&snapshot, d("2024-02-08")).unwrap();
        // 70 EUR + 45 USD / 1.25
        assert_eq!(summary.total, dec!(106));
        // since 2024-01-08: -20 - 5 / 1.25
        assert_eq!(summary.change_1m, dec!(-24));
        assert_eq!(summary.change_6m, dec!(-34));
    }

    #[test]
    fn test_export_history_csv() {
        let mut db = Database::open_in_memory().unwrap();
        let (a, b) = setup(&mut db);
        let history = load_history(&db, d("2024-01-10"), d("2024-01-12"), &[a, b]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let accounts = db.get_accounts().unwrap();

        let count = export_history_csv(&history, &accounts, path.to_str().unwrap()).unwrap();
        assert_eq!(count, 3);
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "date,A (EUR),B (USD),total_EUR,delta");
        assert_eq!(lines[3], "2024-01-12,70.00,45.00,106.00,-4.00");
    }
}
