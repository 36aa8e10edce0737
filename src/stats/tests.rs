#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn account(id: i64, currency: &str) -> BankAccount {
    let mut a = BankAccount::new(format!("Account {id}"), currency, dec!(0), d("2024-01-01"));
    a.id = Some(id);
    a
}

fn balance(id: i64, currency: &str, amount: Decimal) -> Balance {
    Balance {
        account: account(id, currency),
        balance: amount,
    }
}

fn category(id: i64, name: &str) -> Category {
    let mut c = Category::new(name.into());
    c.id = Some(id);
    c
}

fn flow(account_id: i64, category_id: i64, cost: Decimal, date: &str) -> Flow {
    Flow::new("flow".into(), cost, category_id, account_id, d(date))
}

fn rates() -> CurrencyRates {
    CurrencyRates::new()
        .with_rate("USD", dec!(1.25))
        .with_rate("GBP", dec!(0.8))
}

fn accounts() -> Vec<BankAccount> {
    vec![account(1, "EUR"), account(2, "USD"), account(3, "GBP")]
}

// ── Totals ────────────────────────────────────────────────────

#[test]
fn test_total_in_reference() {
    let balances = vec![
        balance(1, "EUR", dec!(10)),
        balance(2, "USD", dec!(25)),
        balance(3, "GBP", dec!(8)),
    ];
    let total = total_in_reference(&balances, &rates(), &[1, 2, 3]).unwrap();
    assert_eq!(total, dec!(40));

    let partial = total_in_reference(&balances, &rates(), &[2]).unwrap();
    assert_eq!(partial, dec!(20));
}

#[test]
fn test_total_missing_rate_fails() {
    let balances = vec![balance(1, "CHF", dec!(10))];
    let err = total_in_reference(&balances, &rates(), &[1]).unwrap_err();
    assert!(matches!(err, ReplayError::MissingRate { .. }));
}

#[test]
fn test_total_ignores_unselected_missing_rate() {
    let balances = vec![balance(1, "EUR", dec!(10)), balance(2, "CHF", dec!(10))];
    assert_eq!(total_in_reference(&balances, &rates(), &[1]).unwrap(), dec!(10));
}

#[test]
fn test_total_overflow_is_an_error() {
    let balances = vec![balance(1, "JPY", dec!(1000000000))];
    let tiny = CurrencyRates::new().with_rate("JPY", dec!(0.0000000000000000000001));
    let err = total_in_reference(&balances, &tiny, &[1]).unwrap_err();
    assert!(matches!(err, ReplayError::Overflow { .. }));

    let huge = vec![balance(1, "EUR", Decimal::MAX), balance(2, "EUR", Decimal::MAX)];
    let err = total_in_reference(&huge, &rates(), &[1, 2]).unwrap_err();
    assert_eq!(err, ReplayError::Overflow { what: "a total" });
}

#[test]
fn test_category_breakdown_overflow_is_an_error() {
    let flows = vec![
        flow(1, 1, Decimal::MIN, "2024-02-01"),
        flow(1, 1, Decimal::MIN, "2024-02-02"),
    ];
    let err = category_breakdown(
        &flows,
        &[category(1, "Food")],
        &accounts(),
        &rates(),
        d("2024-01-01"),
        &[1],
    )
    .unwrap_err();
    assert_eq!(err, ReplayError::Overflow { what: "a flow total" });
}

// ── Net change ────────────────────────────────────────────────

#[test]
fn test_net_change_counts_flows_since() {
    let flows = vec![
        flow(1, 1, dec!(-10), "2024-03-01"),
        flow(2, 1, dec!(50), "2024-03-02"),
        flow(1, 1, dec!(-999), "2024-02-28"),
    ];
    let change = net_change_since(&flows, &[], &accounts(), &rates(), d("2024-03-01")).unwrap();
    // -10 + 50 / 1.25
    assert_eq!(change, dec!(30));
}

#[test]
fn test_net_change_same_currency_transfer_is_neutral() {
    let mut accts = accounts();
    accts.push(account(4, "EUR"));
    let transfers = vec![Transfer::new(
        "Move".into(),
        dec!(100),
        dec!(1),
        1,
        1,
        4,
        d("2024-03-05"),
    )];
    let change = net_change_since(&[], &transfers, &accts, &rates(), d("2024-03-01")).unwrap();
    assert_eq!(change, dec!(0));
}

#[test]
fn test_net_change_cross_currency_gain() {
    // 100 EUR converted at 1.5 gives 150 USD, worth 120 EUR at 1.25
    let transfers = vec![Transfer::new(
        "Exchange".into(),
        dec!(100),
        dec!(1.5),
        1,
        1,
        2,
        d("2024-03-05"),
    )];
    let change =
        net_change_since(&[], &transfers, &accounts(), &rates(), d("2024-03-01")).unwrap();
    assert_eq!(change, dec!(20));
}

// ── Earnings ──────────────────────────────────────────────────

#[test]
fn test_earnings_per_account() {
    let flows = vec![
        flow(1, 1, dec!(100), "2024-03-01"),
        flow(1, 1, dec!(-30), "2024-03-02"),
        flow(1, 1, dec!(-5), "2024-03-03"),
        flow(2, 1, dec!(7), "2024-03-03"),
        flow(1, 1, dec!(1000), "2024-01-01"),
    ];
    let earnings = earnings_per_account(&flows, &accounts(), d("2024-02-01"));
    assert_eq!(earnings.len(), 3);
    assert_eq!(earnings[0].income, dec!(100));
    assert_eq!(earnings[0].expense, dec!(35));
    assert_eq!(earnings[0].net(), dec!(65));
    assert_eq!(earnings[1].income, dec!(7));
    assert_eq!(earnings[2].income, dec!(0));
}

// ── Categories ────────────────────────────────────────────────

#[test]
fn test_category_breakdown_sorted_by_spending() {
    let cats = vec![category(1, "Food"), category(2, "Rent"), category(3, "Salary")];
    let flows = vec![
        flow(1, 1, dec!(-20), "2024-03-01"),
        flow(2, 1, dec!(-25), "2024-03-01"),
        flow(1, 2, dec!(-60), "2024-03-01"),
        flow(1, 3, dec!(500), "2024-03-01"),
    ];
    let rows =
        category_breakdown(&flows, &cats, &accounts(), &rates(), d("2024-03-01"), &[1, 2])
            .unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.category.name.as_str()).collect();
    assert_eq!(names, vec!["Rent", "Food", "Salary"]);

    // Food: 20 EUR + 25 USD / 1.25
    assert_eq!(rows[1].expense, dec!(40));
    assert_eq!(rows[0].expense_share, dec!(0.6));
    assert_eq!(rows[1].expense_share, dec!(0.4));
    assert_eq!(rows[2].income, dec!(500));
    assert_eq!(rows[2].income_share, dec!(1));
}

#[test]
fn test_category_breakdown_skips_unknown_category() {
    let cats = vec![category(1, "Food")];
    let flows = vec![
        flow(1, 1, dec!(-20), "2024-03-01"),
        flow(1, 99, dec!(-80), "2024-03-01"),
    ];
    let rows =
        category_breakdown(&flows, &cats, &accounts(), &rates(), d("2024-01-01"), &[1]).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].expense_share, dec!(1));
}

#[test]
fn test_category_breakdown_respects_selection() {
    let cats = vec![category(1, "Food")];
    let flows = vec![flow(2, 1, dec!(-20), "2024-03-01")];
    let rows =
        category_breakdown(&flows, &cats, &accounts(), &rates(), d("2024-01-01"), &[1]).unwrap();
    assert!(rows.is_empty());
}

// ── Daily flows ───────────────────────────────────────────────

#[test]
fn test_daily_flows_fill_every_day() {
    let flows = vec![
        flow(1, 1, dec!(-1.004), "2024-03-01"),
        flow(1, 1, dec!(12), "2024-03-03"),
        flow(2, 1, dec!(-10), "2024-03-03"),
    ];
    let days = daily_flows(&flows, &accounts(), &rates(), d("2024-03-01"), d("2024-03-04"), &[1, 2])
        .unwrap();
    assert_eq!(days.len(), 4);
    assert_eq!(days[0].spent, dec!(1.00));
    assert_eq!(days[1].earned, dec!(0));
    assert_eq!(days[2].earned, dec!(12));
    assert_eq!(days[2].spent, dec!(8));
    assert_eq!(days[3].date, d("2024-03-04"));
}

#[test]
fn test_daily_flows_inverted_range() {
    let err = daily_flows(&[], &accounts(), &rates(), d("2024-03-02"), d("2024-03-01"), &[1])
        .unwrap_err();
    assert!(matches!(err, ReplayError::InvalidRange { .. }));
}

// ── Repartition ───────────────────────────────────────────────

#[test]
fn test_balance_repartition() {
    let balances = vec![
        balance(1, "EUR", dec!(30)),
        balance(2, "USD", dec!(12.5)),
        balance(3, "GBP", dec!(-4)),
    ];
    let shares = balance_repartition(&balances, &rates(), &[1, 2, 3]).unwrap();
    assert_eq!(shares[0].account.id, Some(1));
    assert_eq!(shares[0].share, dec!(0.75));
    assert_eq!(shares[1].value, dec!(10));
    assert_eq!(shares[1].share, dec!(0.25));
    assert_eq!(shares[2].value, dec!(-5));
    assert_eq!(shares[2].share, dec!(0));
}

#[test]
fn test_repartition_all_empty() {
    let balances = vec![balance(1, "EUR", dec!(0))];
    let shares = balance_repartition(&balances, &rates(), &[1]).unwrap();
    assert_eq!(shares[0].share, dec!(0));
}
