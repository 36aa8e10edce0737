//! Aggregates shown on the dashboard and stats screens.
//!
//! Amounts are converted to the reference currency with the account's rate.
//! A selected account without a usable rate fails the whole computation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{Balance, BankAccount, Category, CurrencyRates, Flow, Transfer};
use crate::replay::{reference_rate, sum_checked, to_reference, ReplayError};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AccountEarnings {
    pub(crate) account: BankAccount,
    /// Sum of positive flows, in the account currency.
    pub(crate) income: Decimal,
    /// Sum of negative flows as a positive number, in the account currency.
    pub(crate) expense: Decimal,
}

impl AccountEarnings {
    pub(crate) fn net(&self) -> Decimal {
        self.income - self.expense
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryTotals {
    pub(crate) category: Category,
    pub(crate) income: Decimal,
    pub(crate) expense: Decimal,
    /// Fraction of all income, 0 to 1.
    pub(crate) income_share: Decimal,
    /// Fraction of all expenses, 0 to 1.
    pub(crate) expense_share: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DayFlows {
    pub(crate) date: NaiveDate,
    pub(crate) earned: Decimal,
    /// Positive amount.
    pub(crate) spent: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AccountShare {
    pub(crate) account: BankAccount,
    pub(crate) value: Decimal,
    /// Fraction of the positive total; zero for empty or overdrawn accounts.
    pub(crate) share: Decimal,
}

/// Sum of the selected balances in the reference currency.
pub(crate) fn total_in_reference(
    balances: &[Balance],
    rates: &CurrencyRates,
    selected: &[i64],
) -> Result<Decimal, ReplayError> {
    let mut converted = Vec::new();
    for b in balances.iter().filter(|b| is_selected(selected, b.account_id())) {
        converted.push(to_reference(b.balance, reference_rate(rates, &b.account)?)?);
    }
    sum_checked(converted)
}

/// Change of the overall worth since `since` (inclusive), in the reference
/// currency.
///
/// Flows count at today's rate. Transfers only matter when they cross
/// currencies: the credited side is worth `amount * rate / rate_to` while
/// the debited side loses `amount / rate_from`.
pub(crate) fn net_change_since(
    flows: &[Flow],
    transfers: &[Transfer],
    accounts: &[BankAccount],
    rates: &CurrencyRates,
    since: NaiveDate,
) -> Result<Decimal, ReplayError> {
    let divisors = divisors(accounts, rates)?;

    let mut changes = Vec::new();
    for flow in flows.iter().filter(|f| f.date >= since) {
        if let Some(rate) = divisors.get(&flow.account_id) {
            changes.push(to_reference(flow.cost, *rate)?);
        }
    }
    for transfer in transfers.iter().filter(|t| t.date >= since) {
        let (Some(rate_from), Some(rate_to)) = (
            divisors.get(&transfer.from_account),
            divisors.get(&transfer.to_account),
        ) else {
            continue;
        };
        let credited = transfer.credited().ok_or(ReplayError::Overflow {
            what: "a transfer",
        })?;
        changes.push(to_reference(credited, *rate_to)?);
        changes.push(-to_reference(transfer.amount, *rate_from)?);
    }
    sum_checked(changes)
}

/// Incomes and expenses per account since `since`, in each account's own
/// currency. Accounts keep the order they are given in.
pub(crate) fn earnings_per_account(
    flows: &[Flow],
    accounts: &[BankAccount],
    since: NaiveDate,
) -> Vec<AccountEarnings> {
    accounts
        .iter()
        .map(|account| {
            let mut earnings = AccountEarnings {
                account: account.clone(),
                income: Decimal::ZERO,
                expense: Decimal::ZERO,
            };
            for flow in flows
                .iter()
                .filter(|f| f.date >= since && Some(f.account_id) == account.id)
            {
                if flow.is_income() {
                    earnings.income += flow.cost;
                } else {
                    earnings.expense += flow.abs_cost();
                }
            }
            earnings
        })
        .collect()
}

/// Reference-currency incomes and expenses per category, biggest spending
/// first. Flows whose category is unknown are left out.
pub(crate) fn category_breakdown(
    flows: &[Flow],
    categories: &[Category],
    accounts: &[BankAccount],
    rates: &CurrencyRates,
    since: NaiveDate,
    selected: &[i64],
) -> Result<Vec<CategoryTotals>, ReplayError> {
    let divisors = selected_divisors(accounts, rates, selected)?;

    let mut sums: BTreeMap<i64, (Decimal, Decimal)> = BTreeMap::new();
    for flow in flows.iter().filter(|f| f.date >= since) {
        let Some(rate) = divisors.get(&flow.account_id) else {
            continue;
        };
        if Category::find_by_id(categories, flow.category_id).is_none() {
            continue;
        }
        let entry = sums.entry(flow.category_id).or_default();
        accumulate(entry, flow, *rate)?;
    }

    let total_income = sum_checked(sums.values().map(|(i, _)| *i))?;
    let total_expense = sum_checked(sums.values().map(|(_, e)| *e))?;

    let mut rows: Vec<CategoryTotals> = sums
        .into_iter()
        .filter_map(|(id, (income, expense))| {
            let category = Category::find_by_id(categories, id)?.clone();
            Some(CategoryTotals {
                category,
                income,
                expense,
                income_share: share(income, total_income),
                expense_share: share(expense, total_expense),
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.expense
            .cmp(&a.expense)
            .then_with(|| b.income.cmp(&a.income))
            .then_with(|| a.category.name.cmp(&b.category.name))
    });
    Ok(rows)
}

/// Earned and spent amounts for every day of `[first, last]`, in the
/// reference currency rounded to cents. Days without flows are zero.
pub(crate) fn daily_flows(
    flows: &[Flow],
    accounts: &[BankAccount],
    rates: &CurrencyRates,
    first: NaiveDate,
    last: NaiveDate,
    selected: &[i64],
) -> Result<Vec<DayFlows>, ReplayError> {
    if first > last {
        return Err(ReplayError::InvalidRange { first, last });
    }
    let divisors = selected_divisors(accounts, rates, selected)?;

    let mut by_day: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
    for flow in flows.iter().filter(|f| f.date >= first && f.date <= last) {
        let Some(rate) = divisors.get(&flow.account_id) else {
            continue;
        };
        let entry = by_day.entry(flow.date).or_default();
        accumulate(entry, flow, *rate)?;
    }

    Ok(first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|date| {
            let (earned, spent) = by_day.get(&date).copied().unwrap_or_default();
            DayFlows {
                date,
                earned: earned.round_dp(2),
                spent: spent.round_dp(2),
            }
        })
        .collect())
}

/// How the selected balances split across accounts, largest first.
pub(crate) fn balance_repartition(
    balances: &[Balance],
    rates: &CurrencyRates,
    selected: &[i64],
) -> Result<Vec<AccountShare>, ReplayError> {
    let mut values = Vec::new();
    for b in balances.iter().filter(|b| is_selected(selected, b.account_id())) {
        let value = to_reference(b.balance, reference_rate(rates, &b.account)?)?;
        values.push((b.account.clone(), value));
    }
    let positive_total = sum_checked(
        values
            .iter()
            .map(|(_, v)| *v)
            .filter(|v| *v > Decimal::ZERO),
    )?;

    let mut shares: Vec<AccountShare> = values
        .into_iter()
        .map(|(account, value)| AccountShare {
            share: if value > Decimal::ZERO {
                share(value, positive_total)
            } else {
                Decimal::ZERO
            },
            account,
            value,
        })
        .collect();
    shares.sort_by(|a, b| b.value.cmp(&a.value));
    Ok(shares)
}

fn is_selected(selected: &[i64], id: Option<i64>) -> bool {
    id.is_some_and(|id| selected.contains(&id))
}

/// Add a flow to an `(income, expense)` pair, converted with `rate`.
fn accumulate(
    entry: &mut (Decimal, Decimal),
    flow: &Flow,
    rate: Decimal,
) -> Result<(), ReplayError> {
    let value = to_reference(flow.cost, rate)?;
    let overflow = ReplayError::Overflow { what: "a flow total" };
    if flow.is_income() {
        entry.0 = entry.0.checked_add(value).ok_or(overflow)?;
    } else {
        entry.1 = entry.1.checked_sub(value).ok_or(overflow)?;
    }
    Ok(())
}

fn share(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        Decimal::ZERO
    } else {
        part / total
    }
}

fn divisors(
    accounts: &[BankAccount],
    rates: &CurrencyRates,
) -> Result<BTreeMap<i64, Decimal>, ReplayError> {
    let mut out = BTreeMap::new();
    for account in accounts {
        if let Some(id) = account.id {
            out.insert(id, reference_rate(rates, account)?);
        }
    }
    Ok(out)
}

fn selected_divisors(
    accounts: &[BankAccount],
    rates: &CurrencyRates,
    selected: &[i64],
) -> Result<BTreeMap<i64, Decimal>, ReplayError> {
    let chosen: Vec<BankAccount> = accounts
        .iter()
        .filter(|a| is_selected(selected, a.id))
        .cloned()
        .collect();
    divisors(&chosen, rates)
}

#[cfg(test)]
mod tests;
