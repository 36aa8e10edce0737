#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::{Balance, BankAccount, CurrencyRates, Flow, Transfer};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn account(id: i64, currency: &str, balance: Decimal) -> Balance {
    let mut account = BankAccount::new(format!("Account {id}"), currency, balance, day("2023-01-01"));
    account.id = Some(id);
    Balance::opening(account)
}

fn flow(account_id: i64, cost: Decimal, date: &str) -> Flow {
    Flow::new("Flow".into(), cost, 1, account_id, day(date))
}

fn transfer(from: i64, to: i64, amount: Decimal, rate: Decimal, date: &str) -> Transfer {
    Transfer::new("Transfer".into(), amount, rate, 1, from, to, day(date))
}

fn eur_usd() -> CurrencyRates {
    CurrencyRates::new().with_rate("USD", dec!(1.1))
}

// ── Scenario ──────────────────────────────────────────────────

#[test]
fn test_two_currency_scenario() {
    let accounts = vec![account(1, "EUR", dec!(100.00)), account(2, "USD", dec!(50.00))];
    let flows = vec![flow(1, dec!(-20.00), "2024-01-01")];
    let transfers = vec![transfer(1, 2, dec!(10.00), dec!(1.1), "2024-01-02")];

    let history = replay(
        &accounts,
        &flows,
        &transfers,
        &eur_usd(),
        day("2024-01-01"),
        day("2024-01-02"),
        &[1, 2],
    )
    .unwrap();

    let day1 = history.day(day("2024-01-01")).unwrap();
    assert_eq!(day1.balances[&1], dec!(80.00));
    assert_eq!(day1.balances[&2], dec!(50.00));

    let day2 = history.day(day("2024-01-02")).unwrap();
    assert_eq!(day2.balances[&1], dec!(70.00));
    assert_eq!(day2.balances[&2], dec!(61.00));
    assert_eq!(day2.total.round_dp(2), dec!(125.45));
}

#[test]
fn test_delta_is_difference_with_previous_day() {
    let accounts = vec![account(1, "EUR", dec!(100))];
    let flows = vec![
        flow(1, dec!(-20), "2024-01-01"),
        flow(1, dec!(5), "2024-01-03"),
    ];
    let history = replay(
        &accounts,
        &flows,
        &[],
        &CurrencyRates::new(),
        day("2024-01-01"),
        day("2024-01-03"),
        &[1],
    )
    .unwrap();

    let deltas: Vec<Decimal> = history.days().map(|s| s.delta).collect();
    assert_eq!(deltas, vec![dec!(-20), dec!(0), dec!(5)]);
}

// ── Properties ────────────────────────────────────────────────

#[test]
fn test_replay_is_idempotent() {
    let accounts = vec![account(1, "EUR", dec!(100)), account(2, "USD", dec!(0))];
    let flows = vec![
        flow(1, dec!(-3.33), "2024-02-27"),
        flow(2, dec!(9.99), "2024-03-02"),
    ];
    let transfers = vec![transfer(1, 2, dec!(7), dec!(1.0875), "2024-03-01")];
    let run = || {
        replay(
            &accounts,
            &flows,
            &transfers,
            &eur_usd(),
            day("2024-02-25"),
            day("2024-03-05"),
            &[2, 1],
        )
        .unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_flows_are_additive() {
    let accounts = vec![account(1, "EUR", dec!(250))];
    let flows = vec![
        flow(1, dec!(-12.40), "2024-05-01"),
        flow(1, dec!(1200), "2024-05-10"),
        flow(1, dec!(-99.99), "2024-05-10"),
        flow(1, dec!(-0.61), "2024-05-31"),
    ];
    let history = replay(
        &accounts,
        &flows,
        &[],
        &CurrencyRates::new(),
        day("2024-05-01"),
        day("2024-05-31"),
        &[1],
    )
    .unwrap();

    let expected = dec!(250) + flows.iter().map(|f| f.cost).sum::<Decimal>();
    assert_eq!(history.last_day().unwrap().balances[&1], expected);
}

#[test]
fn test_same_currency_transfer_conserves_total() {
    let accounts = vec![account(1, "EUR", dec!(300)), account(2, "EUR", dec!(20))];
    let transfers = vec![transfer(1, 2, dec!(150), Decimal::ONE, "2024-06-02")];
    let history = replay(
        &accounts,
        &[],
        &transfers,
        &CurrencyRates::new(),
        day("2024-06-01"),
        day("2024-06-03"),
        &[1, 2],
    )
    .unwrap();

    let moved = history.day(day("2024-06-02")).unwrap();
    assert_eq!(moved.balances[&1], dec!(150));
    assert_eq!(moved.balances[&2], dec!(170));
    assert_eq!(moved.total, dec!(320));
    assert_eq!(moved.delta, Decimal::ZERO);
}

#[test]
fn test_totals_normalize_each_currency() {
    let rates = CurrencyRates::new()
        .with_rate("USD", dec!(1.25))
        .with_rate("GBP", dec!(0.8));
    let accounts = vec![
        account(1, "EUR", dec!(10)),
        account(2, "USD", dec!(50)),
        account(3, "GBP", dec!(8)),
    ];
    let history = replay(
        &accounts,
        &[],
        &[],
        &rates,
        day("2024-01-01"),
        day("2024-01-01"),
        &[1, 2, 3],
    )
    .unwrap();

    // 10 + 50 / 1.25 + 8 / 0.8
    assert_eq!(history.last_day().unwrap().total, dec!(60));
}

#[test]
fn test_range_bounds_are_inclusive() {
    let accounts = vec![account(1, "EUR", dec!(0))];
    let flows = vec![
        flow(1, dec!(1), "2024-03-09"),
        flow(1, dec!(10), "2024-03-10"),
        flow(1, dec!(100), "2024-03-20"),
        flow(1, dec!(1000), "2024-03-21"),
    ];
    let history = replay(
        &accounts,
        &flows,
        &[],
        &CurrencyRates::new(),
        day("2024-03-10"),
        day("2024-03-20"),
        &[1],
    )
    .unwrap();

    assert_eq!(history.days().count(), 11);
    assert_eq!(history.day(day("2024-03-10")).unwrap().balances[&1], dec!(10));
    assert_eq!(history.last_day().unwrap().balances[&1], dec!(110));
}

#[test]
fn test_residue_is_floored_to_zero() {
    let accounts = vec![account(1, "EUR", dec!(10))];
    let flows = vec![flow(1, dec!(-9.9996), "2024-01-01")];
    let history = replay(
        &accounts,
        &flows,
        &[],
        &CurrencyRates::new(),
        day("2024-01-01"),
        day("2024-01-01"),
        &[1],
    )
    .unwrap();

    assert_eq!(history.last_day().unwrap().balances[&1], Decimal::ZERO);
}

#[test]
fn test_small_but_real_balance_is_kept() {
    let accounts = vec![account(1, "EUR", dec!(0.01))];
    let history = replay(
        &accounts,
        &[],
        &[],
        &CurrencyRates::new(),
        day("2024-01-01"),
        day("2024-01-01"),
        &[1],
    )
    .unwrap();
    assert_eq!(history.last_day().unwrap().balances[&1], dec!(0.01));
}

// ── Selection ─────────────────────────────────────────────────

#[test]
fn test_unselected_accounts_are_ignored() {
    let accounts = vec![account(1, "EUR", dec!(100)), account(2, "EUR", dec!(100))];
    let flows = vec![flow(2, dec!(-50), "2024-01-01")];
    let transfers = vec![transfer(2, 1, dec!(25), Decimal::ONE, "2024-01-01")];
    let history = replay(
        &accounts,
        &flows,
        &transfers,
        &CurrencyRates::new(),
        day("2024-01-01"),
        day("2024-01-01"),
        &[1],
    )
    .unwrap();

    let snapshot = history.last_day().unwrap();
    assert_eq!(snapshot.balances.len(), 1);
    assert_eq!(snapshot.balances[&1], dec!(125));
    assert_eq!(snapshot.total, dec!(125));
}

#[test]
fn test_unknown_selected_account_is_skipped() {
    let accounts = vec![account(1, "EUR", dec!(5))];
    let history = replay(
        &accounts,
        &[],
        &[],
        &CurrencyRates::new(),
        day("2024-01-01"),
        day("2024-01-02"),
        &[1, 42],
    )
    .unwrap();
    assert!(history.days().all(|s| s.balances.len() == 1));
}

#[test]
fn test_unselected_account_rate_not_required() {
    let accounts = vec![account(1, "EUR", dec!(5)), account(2, "JPY", dec!(500))];
    let result = replay(
        &accounts,
        &[],
        &[],
        &CurrencyRates::new(),
        day("2024-01-01"),
        day("2024-01-01"),
        &[1],
    );
    assert!(result.is_ok());
}

#[test]
fn test_empty_selection_yields_zero_totals() {
    let history = replay(
        &[],
        &[],
        &[],
        &CurrencyRates::new(),
        day("2024-01-01"),
        day("2024-01-03"),
        &[],
    )
    .unwrap();
    assert_eq!(history.days().count(), 3);
    assert!(history.days().all(|s| s.total.is_zero() && s.balances.is_empty()));
}

// ── Errors ────────────────────────────────────────────────────

#[test]
fn test_missing_rate_fails_closed() {
    let accounts = vec![account(1, "EUR", dec!(5)), account(2, "CHF", dec!(5))];
    let err = replay(
        &accounts,
        &[],
        &[],
        &CurrencyRates::new(),
        day("2024-01-01"),
        day("2024-01-01"),
        &[1, 2],
    )
    .unwrap_err();
    assert_eq!(
        err,
        ReplayError::MissingRate {
            account: "Account 2".into(),
            currency: "CHF".into(),
        }
    );
}

#[test]
fn test_zero_rate_is_rejected() {
    let accounts = vec![account(1, "CHF", dec!(5))];
    let rates = CurrencyRates::new().with_rate("CHF", Decimal::ZERO);
    let err = replay(
        &accounts,
        &[],
        &[],
        &rates,
        day("2024-01-01"),
        day("2024-01-01"),
        &[1],
    )
    .unwrap_err();
    assert!(matches!(err, ReplayError::InvalidRate { .. }));
}

#[test]
fn test_tiny_rate_reports_overflow() {
    let accounts = vec![account(1, "JPY", dec!(1000000000))];
    let rates = CurrencyRates::new().with_rate("JPY", dec!(0.0000000000000000000001));
    let err = replay(
        &accounts,
        &[],
        &[],
        &rates,
        day("2024-01-01"),
        day("2024-01-01"),
        &[1],
    )
    .unwrap_err();
    assert_eq!(err, ReplayError::Overflow { what: "a conversion" });
}

#[test]
fn test_transfer_credit_overflow_is_an_error() {
    let accounts = vec![account(1, "EUR", Decimal::MAX), account(2, "EUR", dec!(0))];
    let transfers = vec![transfer(1, 2, Decimal::MAX, dec!(2), "2024-01-01")];
    let err = replay(
        &accounts,
        &[],
        &transfers,
        &CurrencyRates::new(),
        day("2024-01-01"),
        day("2024-01-01"),
        &[1, 2],
    )
    .unwrap_err();
    assert_eq!(err, ReplayError::Overflow { what: "a balance" });
}

#[test]
fn test_inverted_range_is_rejected() {
    let err = replay(
        &[],
        &[],
        &[],
        &CurrencyRates::new(),
        day("2024-01-02"),
        day("2024-01-01"),
        &[],
    )
    .unwrap_err();
    assert_eq!(
        err,
        ReplayError::InvalidRange {
            first: day("2024-01-02"),
            last: day("2024-01-01"),
        }
    );
}

#[test]
fn test_single_day_range() {
    let accounts = vec![account(1, "EUR", dec!(1))];
    let history = replay(
        &accounts,
        &[],
        &[],
        &CurrencyRates::new(),
        day("2024-01-01"),
        day("2024-01-01"),
        &[1],
    )
    .unwrap();
    assert_eq!(history.rows().len(), 1);
}

// ── Month markers ─────────────────────────────────────────────

#[test]
fn test_month_end_marker_between_months() {
    let accounts = vec![account(1, "EUR", dec!(1))];
    let history = replay(
        &accounts,
        &[],
        &[],
        &CurrencyRates::new(),
        day("2024-01-30"),
        day("2024-02-02"),
        &[1],
    )
    .unwrap();

    let rows = history.rows();
    assert_eq!(rows.len(), 5);
    assert!(matches!(rows[0], HistoryRow::Day(ref s) if s.date == day("2024-01-30")));
    assert!(matches!(rows[1], HistoryRow::Day(ref s) if s.date == day("2024-01-31")));
    assert_eq!(rows[2], HistoryRow::MonthEnd(day("2024-01-01")));
    assert!(matches!(rows[3], HistoryRow::Day(ref s) if s.date == day("2024-02-01")));
}

#[test]
fn test_no_marker_at_range_start() {
    let accounts = vec![account(1, "EUR", dec!(1))];
    let history = replay(
        &accounts,
        &[],
        &[],
        &CurrencyRates::new(),
        day("2024-03-01"),
        day("2024-03-03"),
        &[1],
    )
    .unwrap();
    assert!(history
        .rows()
        .iter()
        .all(|row| matches!(row, HistoryRow::Day(_))));
}

#[test]
fn test_marker_on_year_change() {
    let accounts = vec![account(1, "EUR", dec!(1))];
    let history = replay(
        &accounts,
        &[],
        &[],
        &CurrencyRates::new(),
        day("2023-12-31"),
        day("2024-01-01"),
        &[1],
    )
    .unwrap();
    assert_eq!(history.rows()[1], HistoryRow::MonthEnd(day("2023-12-01")));
}

#[test]
fn test_newest_first_reverses_rows() {
    let accounts = vec![account(1, "EUR", dec!(1))];
    let history = replay(
        &accounts,
        &[],
        &[],
        &CurrencyRates::new(),
        day("2024-01-01"),
        day("2024-01-03"),
        &[1],
    )
    .unwrap();
    let first = history.newest_first().next().unwrap();
    assert!(matches!(first, HistoryRow::Day(ref s) if s.date == day("2024-01-03")));
}

// ── settle ────────────────────────────────────────────────────

#[test]
fn test_settle_applies_flows_and_rated_transfers() {
    let accounts: Vec<BankAccount> = vec![
        account(1, "EUR", dec!(100)).account,
        account(2, "USD", dec!(50)).account,
    ];
    let flows = vec![flow(1, dec!(-20), "2024-01-01"), flow(9, dec!(-1), "2024-01-01")];
    let transfers = vec![transfer(1, 2, dec!(10), dec!(1.1), "2024-01-02")];

    let balances = settle(&accounts, &flows, &transfers).unwrap();
    assert_eq!(balances[0].balance, dec!(70));
    assert_eq!(balances[1].balance, dec!(61.0));
}

#[test]
fn test_settle_without_records_returns_initial() {
    let accounts: Vec<BankAccount> = vec![account(1, "EUR", dec!(42)).account];
    let balances = settle(&accounts, &[], &[]).unwrap();
    assert_eq!(balances[0].balance, dec!(42));
}

#[test]
fn test_settle_reports_balance_overflow() {
    let accounts: Vec<BankAccount> = vec![account(1, "EUR", Decimal::MAX).account];
    let flows = vec![flow(1, dec!(1), "2024-01-01")];
    assert_eq!(
        settle(&accounts, &flows, &[]),
        Err(ReplayError::Overflow { what: "a balance" })
    );
}

// ── history_window ────────────────────────────────────────────

#[test]
fn test_window_is_capped_to_one_year() {
    let (first, last) = history_window(Some(day("2020-01-01")), day("2024-06-15"));
    assert_eq!(first, day("2023-06-15"));
    assert_eq!(last, day("2024-06-15"));
}

#[test]
fn test_window_keeps_recent_start() {
    let (first, last) = history_window(Some(day("2024-05-01")), day("2024-05-31"));
    assert_eq!(first, day("2024-05-01"));
    assert_eq!(last, day("2024-05-31"));
}

#[test]
fn test_window_without_start_is_the_year_before_last() {
    let (first, last) = history_window(None, day("2022-06-30"));
    assert_eq!(first, day("2021-06-30"));
    assert_eq!(last, day("2022-06-30"));
}
