use anyhow::Result;
use chrono::{Local, NaiveDate};

use crate::config::Config;
use crate::db::Database;
use crate::ledger::{self, Snapshot, Summary};
use crate::models::*;
use crate::replay::{self, History, HistoryRow};
use crate::stats::{self, AccountEarnings, AccountShare, CategoryTotals, DayFlows};

/// Days shown by the dashboard spend sparkline.
const SPARKLINE_DAYS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Accounts,
    Flows,
    History,
    Stats,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[
            Self::Dashboard,
            Self::Accounts,
            Self::Flows,
            Self::History,
            Self::Stats,
        ]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Accounts => write!(f, "Accounts"),
            Self::Flows => write!(f, "Flows"),
            Self::History => write!(f, "History"),
            Self::Stats => write!(f, "Stats"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingAction {
    DeleteFlow { id: i64, name: String },
    DeleteTransfer { id: i64, name: String },
    DeleteAccount { id: i64, name: String },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) today: NaiveDate,
    pub(crate) config: Config,

    pub(crate) snapshot: Snapshot,
    /// Set when the current rates cannot convert every account.
    pub(crate) rates_error: Option<String>,

    // Dashboard
    pub(crate) summary: Option<Summary>,
    pub(crate) repartition: Vec<AccountShare>,
    pub(crate) daily: Vec<DayFlows>,

    // Accounts
    pub(crate) account_index: usize,

    // Flows
    pub(crate) movements: Vec<Movement>,
    pub(crate) flow_index: usize,
    pub(crate) flow_scroll: usize,
    pub(crate) flow_filter_account: Option<i64>,

    // History
    pub(crate) history: History,
    /// Accounts shown by the history; empty means every account.
    pub(crate) history_accounts: Vec<i64>,
    pub(crate) history_from: Option<NaiveDate>,
    pub(crate) history_to: Option<NaiveDate>,
    pub(crate) history_scroll: usize,
    pub(crate) history_error: Option<String>,

    // Stats
    pub(crate) breakdown: Vec<CategoryTotals>,
    pub(crate) earnings: Vec<AccountEarnings>,
    pub(crate) stats_since: NaiveDate,
    pub(crate) stats_scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(config: &Config) -> Self {
        let today = Local::now().date_naive();
        Self::with_today(config, today)
    }

    pub(crate) fn with_today(config: &Config, today: NaiveDate) -> Self {
        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            status_message: String::new(),
            show_help: false,
            today,
            config: config.clone(),

            snapshot: Snapshot::default(),
            rates_error: None,

            summary: None,
            repartition: Vec::new(),
            daily: Vec::new(),

            account_index: 0,

            movements: Vec::new(),
            flow_index: 0,
            flow_scroll: 0,
            flow_filter_account: None,

            history: History::default(),
            history_accounts: Vec::new(),
            history_from: None,
            history_to: None,
            history_scroll: 0,
            history_error: None,

            breakdown: Vec::new(),
            earnings: Vec::new(),
            stats_since: config.stats_since(today),
            stats_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    pub(crate) fn refresh_all(&mut self, db: &Database) -> Result<()> {
        self.snapshot = Snapshot::load(db)?;
        self.refresh_dashboard();
        self.refresh_accounts();
        self.refresh_flows();
        self.refresh_history(db)?;
        self.refresh_stats();
        Ok(())
    }

    /// Recompute the dashboard from the loaded snapshot. Conversion failures
    /// are kept for display rather than aborting.
    pub(crate) fn refresh_dashboard(&mut self) {
        let ids = self.snapshot.account_ids();
        let first = self
            .today
            .checked_sub_days(chrono::Days::new(SPARKLINE_DAYS - 1))
            .unwrap_or(self.today);

        let computed = ledger::summarize(&self.snapshot, self.today).and_then(|summary| {
            let repartition =
                stats::balance_repartition(&self.snapshot.balances, &self.snapshot.rates, &ids)?;
            let daily = stats::daily_flows(
                &self.snapshot.flows,
                &self.snapshot.accounts,
                &self.snapshot.rates,
                first,
                self.today,
                &ids,
            )?;
            Ok((summary, repartition, daily))
        });

        match computed {
            Ok((summary, repartition, daily)) => {
                self.summary = Some(summary);
                self.repartition = repartition;
                self.daily = daily;
                self.rates_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "dashboard unavailable");
                self.summary = None;
                self.repartition.clear();
                self.daily.clear();
                self.rates_error = Some(e.to_string());
            }
        }
    }

    pub(crate) fn refresh_accounts(&mut self) {
        if self.account_index >= self.snapshot.balances.len() {
            self.account_index = self.snapshot.balances.len().saturating_sub(1);
        }
    }

    /// Rebuild the merged flow/transfer list from the snapshot, applying the
    /// account filter and the search text.
    pub(crate) fn refresh_flows(&mut self) {
        let needle = self.search_input.to_lowercase();
        let flows: Vec<Flow> = self
            .snapshot
            .flows
            .iter()
            .filter(|f| self.flow_filter_account.map_or(true, |id| f.account_id == id))
            .cloned()
            .collect();
        let transfers: Vec<Transfer> = self
            .snapshot
            .transfers
            .iter()
            .filter(|t| self.flow_filter_account.map_or(true, |id| t.touches(id)))
            .cloned()
            .collect();

        self.movements = Movement::merge(flows, transfers)
            .into_iter()
            .filter(|m| needle.is_empty() || m.name().to_lowercase().contains(&needle))
            .collect();

        if self.flow_index >= self.movements.len() {
            self.flow_index = self.movements.len().saturating_sub(1);
        }
        if self.flow_scroll > self.flow_index {
            self.flow_scroll = self.flow_index;
        }
    }

    pub(crate) fn refresh_history(&mut self, db: &Database) -> Result<()> {
        let last = self.history_to.unwrap_or(self.today);
        let start = self
            .history_from
            .or(self.config.history_start_until(last));
        let (first, last) = replay::history_window(start, last);
        let selected = self.history_selection();

        match ledger::load_history(db, first, last, &selected) {
            Ok(history) => {
                self.history = history;
                self.history_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "history unavailable");
                self.history = History::default();
                self.history_error = Some(e.to_string());
            }
        }
        let len = self.history.rows().len();
        if self.history_scroll >= len {
            self.history_scroll = len.saturating_sub(1);
        }
        Ok(())
    }

    pub(crate) fn refresh_stats(&mut self) {
        self.stats_since = self.config.stats_since(self.today);
        let ids = self.snapshot.account_ids();
        self.earnings =
            stats::earnings_per_account(&self.snapshot.flows, &self.snapshot.accounts, self.stats_since);
        match stats::category_breakdown(
            &self.snapshot.flows,
            &self.snapshot.categories,
            &self.snapshot.accounts,
            &self.snapshot.rates,
            self.stats_since,
            &ids,
        ) {
            Ok(rows) => self.breakdown = rows,
            Err(e) => {
                self.breakdown.clear();
                self.rates_error = Some(e.to_string());
            }
        }
    }

    /// Account ids the history replays.
    pub(crate) fn history_selection(&self) -> Vec<i64> {
        if self.history_accounts.is_empty() {
            self.snapshot.account_ids()
        } else {
            self.history_accounts.clone()
        }
    }

    /// History rows for display, newest first.
    pub(crate) fn history_rows(&self) -> Vec<&HistoryRow> {
        self.history.newest_first().collect()
    }

    pub(crate) fn selected_account(&self) -> Option<&Balance> {
        self.snapshot.balances.get(self.account_index)
    }

    pub(crate) fn selected_movement(&self) -> Option<&Movement> {
        self.movements.get(self.flow_index)
    }

    pub(crate) fn account_name(&self, id: i64) -> &str {
        BankAccount::find_by_id(&self.snapshot.accounts, id)
            .map(|a| a.name.as_str())
            .unwrap_or("?")
    }

    pub(crate) fn account_currency(&self, id: i64) -> &str {
        BankAccount::find_by_id(&self.snapshot.accounts, id)
            .map(|a| a.currency.as_str())
            .unwrap_or("")
    }

    pub(crate) fn category_name(&self, id: i64) -> &str {
        Category::find_by_id(&self.snapshot.categories, id)
            .map(|c| c.name.as_str())
            .unwrap_or("?")
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}
