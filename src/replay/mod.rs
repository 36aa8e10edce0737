//! Day-by-day reconstruction of account balances.
//!
//! Everything here is pure: callers load accounts, flows, transfers and
//! rates from the store first and pass them in.

mod error;

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{Balance, BankAccount, CurrencyRates, Flow, Transfer};

pub(crate) use error::ReplayError;

/// Balances closer to zero than this are float residue and reported as zero.
const ZERO_FLOOR: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// State of the selected accounts at the end of one day.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DailySnapshot {
    pub(crate) date: NaiveDate,
    /// Account id → balance in the account's own currency.
    pub(crate) balances: BTreeMap<i64, Decimal>,
    /// Sum of all balances, in the reference currency.
    pub(crate) total: Decimal,
    /// `total` minus the previous day's total.
    pub(crate) delta: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum HistoryRow {
    /// Emitted between the last day of a month and the first day of the
    /// next one. Carries the first day of the month that just ended.
    MonthEnd(NaiveDate),
    Day(DailySnapshot),
}

/// Output of [`replay`], oldest row first.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct History {
    rows: Vec<HistoryRow>,
}

impl History {
    pub(crate) fn rows(&self) -> &[HistoryRow] {
        &self.rows
    }

    /// Rows for display, most recent day first.
    pub(crate) fn newest_first(&self) -> impl Iterator<Item = &HistoryRow> {
        self.rows.iter().rev()
    }

    pub(crate) fn days(&self) -> impl Iterator<Item = &DailySnapshot> {
        self.rows.iter().filter_map(|row| match row {
            HistoryRow::Day(snapshot) => Some(snapshot),
            HistoryRow::MonthEnd(_) => None,
        })
    }

    #[cfg(test)]
    pub(crate) fn day(&self, date: NaiveDate) -> Option<&DailySnapshot> {
        self.days().find(|s| s.date == date)
    }

    pub(crate) fn last_day(&self) -> Option<&DailySnapshot> {
        self.days().last()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Replay flows and transfers over `[first_day, last_day]`.
///
/// `accounts` carry each account's balance at the start of `first_day`.
/// Only accounts listed in `selected` are tracked; records touching other
/// accounts are ignored, as are selected ids with no matching account.
/// Every selected account's currency must have a positive rate.
pub(crate) fn replay(
    accounts: &[Balance],
    flows: &[Flow],
    transfers: &[Transfer],
    rates: &CurrencyRates,
    first_day: NaiveDate,
    last_day: NaiveDate,
    selected: &[i64],
) -> Result<History, ReplayError> {
    if first_day > last_day {
        return Err(ReplayError::InvalidRange {
            first: first_day,
            last: last_day,
        });
    }

    let mut ledger: BTreeMap<i64, Decimal> = BTreeMap::new();
    let mut divisors: BTreeMap<i64, Decimal> = BTreeMap::new();
    for id in selected.iter().copied().collect::<BTreeSet<i64>>() {
        match accounts.iter().find(|b| b.account_id() == Some(id)) {
            Some(start) => {
                divisors.insert(id, reference_rate(rates, &start.account)?);
                ledger.insert(id, start.balance);
            }
            None => tracing::warn!(account_id = id, "selected account not found, ignoring"),
        }
    }

    let in_range = |d: NaiveDate| d >= first_day && d <= last_day;

    let mut flows_by_day: BTreeMap<NaiveDate, Vec<&Flow>> = BTreeMap::new();
    for flow in flows
        .iter()
        .filter(|f| in_range(f.date) && ledger.contains_key(&f.account_id))
    {
        flows_by_day.entry(flow.date).or_default().push(flow);
    }

    let mut transfers_by_day: BTreeMap<NaiveDate, Vec<&Transfer>> = BTreeMap::new();
    for transfer in transfers.iter().filter(|t| {
        in_range(t.date)
            && (ledger.contains_key(&t.from_account) || ledger.contains_key(&t.to_account))
    }) {
        transfers_by_day.entry(transfer.date).or_default().push(transfer);
    }

    tracing::debug!(
        %first_day,
        %last_day,
        accounts = ledger.len(),
        flows = flows_by_day.values().map(Vec::len).sum::<usize>(),
        transfers = transfers_by_day.values().map(Vec::len).sum::<usize>(),
        "replaying balances"
    );

    let mut rows = Vec::new();
    let mut previous_total = total_in_reference(&ledger, &divisors)?;
    let mut previous_month: Option<NaiveDate> = None;

    for day in first_day.iter_days().take_while(|d| *d <= last_day) {
        for flow in flows_by_day.get(&day).into_iter().flatten() {
            apply_flow(&mut ledger, flow)?;
        }
        for transfer in transfers_by_day.get(&day).into_iter().flatten() {
            apply_transfer(&mut ledger, transfer)?;
        }
        clamp_residue(&mut ledger);

        let month = first_of_month(day);
        if let Some(previous) = previous_month {
            if previous != month {
                rows.push(HistoryRow::MonthEnd(previous));
            }
        }
        previous_month = Some(month);

        let total = total_in_reference(&ledger, &divisors)?;
        let delta = total
            .checked_sub(previous_total)
            .ok_or(ReplayError::Overflow { what: "daily delta" })?;
        rows.push(HistoryRow::Day(DailySnapshot {
            date: day,
            balances: ledger.clone(),
            total,
            delta,
        }));
        previous_total = total;
    }

    tracing::debug!(rows = rows.len(), "replay finished");
    Ok(History { rows })
}

/// Apply every given flow and transfer to the accounts' initial balances.
///
/// The caller decides which records count (e.g. everything dated before a
/// day). Records referencing unknown accounts are ignored.
pub(crate) fn settle(
    accounts: &[BankAccount],
    flows: &[Flow],
    transfers: &[Transfer],
) -> Result<Vec<Balance>, ReplayError> {
    let mut ledger: BTreeMap<i64, Decimal> = accounts
        .iter()
        .filter_map(|a| a.id.map(|id| (id, a.initial_balance)))
        .collect();

    for flow in flows {
        apply_flow(&mut ledger, flow)?;
    }
    for transfer in transfers {
        apply_transfer(&mut ledger, transfer)?;
    }
    clamp_residue(&mut ledger);

    Ok(accounts
        .iter()
        .map(|account| Balance {
            balance: account
                .id
                .and_then(|id| ledger.get(&id).copied())
                .unwrap_or(account.initial_balance),
            account: account.clone(),
        })
        .collect())
}

fn apply_flow(ledger: &mut BTreeMap<i64, Decimal>, flow: &Flow) -> Result<(), ReplayError> {
    if let Some(balance) = ledger.get_mut(&flow.account_id) {
        *balance = balance
            .checked_add(flow.cost)
            .ok_or(ReplayError::Overflow { what: "a balance" })?;
    }
    Ok(())
}

fn apply_transfer(
    ledger: &mut BTreeMap<i64, Decimal>,
    transfer: &Transfer,
) -> Result<(), ReplayError> {
    let overflow = ReplayError::Overflow { what: "a balance" };
    if let Some(balance) = ledger.get_mut(&transfer.from_account) {
        *balance = balance
            .checked_sub(transfer.amount)
            .ok_or_else(|| overflow.clone())?;
    }
    if let Some(balance) = ledger.get_mut(&transfer.to_account) {
        *balance = transfer
            .credited()
            .and_then(|credit| balance.checked_add(credit))
            .ok_or(overflow)?;
    }
    Ok(())
}

/// Rate dividing an amount of `account`'s currency into the reference currency.
pub(crate) fn reference_rate(
    rates: &CurrencyRates,
    account: &BankAccount,
) -> Result<Decimal, ReplayError> {
    let rate = rates
        .rate(&account.currency)
        .ok_or_else(|| ReplayError::MissingRate {
            account: account.name.clone(),
            currency: account.currency.clone(),
        })?;
    if rate <= Decimal::ZERO {
        return Err(ReplayError::InvalidRate {
            currency: account.currency.clone(),
            rate,
        });
    }
    Ok(rate)
}

/// Resolve the displayed history range ending on `last`.
///
/// The first day is `start`, but never more than one year before `last`.
/// Without a start the range covers that whole year.
pub(crate) fn history_window(start: Option<NaiveDate>, last: NaiveDate) -> (NaiveDate, NaiveDate) {
    let year_before = last.checked_sub_months(Months::new(12)).unwrap_or(last);
    let first = start.map_or(year_before, |start| start.max(year_before));
    (first, last)
}

pub(crate) fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// `amount` of a currency quoted at `rate`, in the reference currency.
pub(crate) fn to_reference(amount: Decimal, rate: Decimal) -> Result<Decimal, ReplayError> {
    amount
        .checked_div(rate)
        .ok_or(ReplayError::Overflow { what: "a conversion" })
}

/// Overflow-checked sum.
pub(crate) fn sum_checked(
    values: impl IntoIterator<Item = Decimal>,
) -> Result<Decimal, ReplayError> {
    values.into_iter().try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(v).ok_or(ReplayError::Overflow { what: "a total" })
    })
}

fn total_in_reference(
    ledger: &BTreeMap<i64, Decimal>,
    divisors: &BTreeMap<i64, Decimal>,
) -> Result<Decimal, ReplayError> {
    let mut converted = Vec::with_capacity(ledger.len());
    for (id, balance) in ledger {
        if let Some(rate) = divisors.get(id) {
            converted.push(to_reference(*balance, *rate)?);
        }
    }
    sum_checked(converted)
}

fn clamp_residue(ledger: &mut BTreeMap<i64, Decimal>) {
    for balance in ledger.values_mut() {
        if balance.abs() < ZERO_FLOOR {
            *balance = Decimal::ZERO;
        }
    }
}

#[cfg(test)]
mod tests;
