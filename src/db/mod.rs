mod schema;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::*;
use crate::replay;

pub(crate) struct Database {
    conn: Connection,
}

/// Optional restrictions when listing flows or transfers.
/// Date bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordFilter {
    pub(crate) account_id: Option<i64>,
    pub(crate) from: Option<NaiveDate>,
    pub(crate) to: Option<NaiveDate>,
}

impl RecordFilter {
    pub(crate) fn through(day: NaiveDate) -> Self {
        Self {
            to: Some(day),
            ..Self::default()
        }
    }

    pub(crate) fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::default()
        }
    }
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        db.seed_default_categories()?;
        tracing::info!(path = %path.display(), "database ready");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_categories()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::debug!(version = schema::CURRENT_VERSION, "created schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tracing::info!(from_version, "applying migration");
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    fn seed_default_categories(&mut self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let defaults = [
            ("Food", "#f38ba8"),
            ("Groceries", "#fab387"),
            ("Housing", "#f9e2af"),
            ("Transport", "#a6e3a1"),
            ("Leisure", "#94e2d5"),
            ("Health", "#89dceb"),
            ("Shopping", "#74c7ec"),
            ("Bills", "#89b4fa"),
            ("Salary", "#b4befe"),
            ("Gifts", "#cba6f7"),
            ("Savings", "#f5c2e7"),
            ("Other", "#9399b2"),
        ];

        let tx = self.conn.transaction()?;
        for (name, color) in &defaults {
            tx.execute(
                "INSERT OR IGNORE INTO categories (name, color) VALUES (?1, ?2)",
                params![name, color],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Bank accounts ─────────────────────────────────────────

    pub(crate) fn insert_account(&self, account: &BankAccount) -> Result<i64> {
        if account.name.trim().is_empty() {
            bail!("Account name cannot be empty");
        }
        if !is_currency_code(&account.currency) {
            bail!("Invalid currency code: {}", account.currency);
        }
        self.conn.execute(
            "INSERT INTO bank_accounts (name, creation_date, initial_balance, currency, color)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account.name,
                format_day(account.creation_date),
                account.initial_balance.to_string(),
                account.currency,
                account.color,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_accounts(&self) -> Result<Vec<BankAccount>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, creation_date, initial_balance, currency, color
             FROM bank_accounts ORDER BY name",
        )?;
        let rows = stmt.query_map([], account_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_account_by_id(&self, id: i64) -> Result<Option<BankAccount>> {
        let result = self.conn.query_row(
            "SELECT id, name, creation_date, initial_balance, currency, color
             FROM bank_accounts WHERE id = ?1",
            params![id],
            account_from_row,
        );
        match result {
            Ok(a) => Ok(Some(a)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn find_account(&self, name: &str) -> Result<Option<BankAccount>> {
        let accounts = self.get_accounts()?;
        Ok(BankAccount::find_by_name(&accounts, name).cloned())
    }

    pub(crate) fn update_account(&self, account: &BankAccount) -> Result<()> {
        let Some(id) = account.id else {
            bail!("Cannot update an account that was never saved");
        };
        if !is_currency_code(&account.currency) {
            bail!("Invalid currency code: {}", account.currency);
        }
        let changed = self.conn.execute(
            "UPDATE bank_accounts
             SET name = ?1, creation_date = ?2, initial_balance = ?3, currency = ?4, color = ?5
             WHERE id = ?6",
            params![
                account.name,
                format_day(account.creation_date),
                account.initial_balance.to_string(),
                account.currency,
                account.color,
                id,
            ],
        )?;
        if changed == 0 {
            bail!("Bank account {id} not found");
        }
        Ok(())
    }

    /// Delete an account. Refused while flows or transfers still use it.
    pub(crate) fn delete_account(&self, id: i64) -> Result<()> {
        let references: i64 = self.conn.query_row(
            "SELECT (SELECT COUNT(*) FROM flows WHERE bank_account = ?1)
                  + (SELECT COUNT(*) FROM transfers WHERE from_account = ?1 OR to_account = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        if references > 0 {
            bail!("Account is used by {references} flow(s)/transfer(s); delete those first");
        }
        self.conn
            .execute("DELETE FROM bank_accounts WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn get_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                color: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let result = self.conn.query_row(
            "SELECT id, name, color FROM categories WHERE id = ?1",
            params![id],
            |row| {
                Ok(Category {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    color: row.get(2)?,
                })
            },
        );
        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn find_category(&self, name: &str) -> Result<Option<Category>> {
        let categories = self.get_categories()?;
        Ok(Category::find_by_name(&categories, name).cloned())
    }

    pub(crate) fn insert_category(&self, cat: &Category) -> Result<i64> {
        if cat.name.trim().is_empty() {
            bail!("Category name cannot be empty");
        }
        self.conn
            .execute(
                "INSERT INTO categories (name, color) VALUES (?1, ?2)",
                params![cat.name, cat.color],
            )
            .with_context(|| format!("Failed to create category '{}'", cat.name))?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn delete_category(&self, id: i64) -> Result<()> {
        let references: i64 = self.conn.query_row(
            "SELECT (SELECT COUNT(*) FROM flows WHERE category = ?1)
                  + (SELECT COUNT(*) FROM transfers WHERE category = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        if references > 0 {
            bail!("Category is used by {references} flow(s)/transfer(s)");
        }
        self.conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Flows ─────────────────────────────────────────────────

    pub(crate) fn insert_flow(&self, flow: &Flow) -> Result<i64> {
        if flow.name.trim().is_empty() {
            bail!("Flow name cannot be empty");
        }
        if flow.cost.is_zero() {
            bail!("Flow cost cannot be zero");
        }
        self.ensure_account(flow.account_id)?;
        self.ensure_category(flow.category_id)?;
        self.conn.execute(
            "INSERT INTO flows (name, cost, category, bank_account, date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                flow.name,
                flow.cost.to_string(),
                flow.category_id,
                flow.account_id,
                format_day(flow.date),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Flows matching `filter`, newest first.
    pub(crate) fn get_flows(&self, filter: &RecordFilter) -> Result<Vec<Flow>> {
        let mut sql = String::from(
            "SELECT f.id, f.name, f.cost, f.category, f.bank_account, f.date, COALESCE(b.currency, '')
             FROM flows f LEFT JOIN bank_accounts b ON b.id = f.bank_account WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(aid) = filter.account_id {
            sql.push_str(&format!(" AND f.bank_account = ?{}", param_values.len() + 1));
            param_values.push(Box::new(aid));
        }
        if let Some(from) = filter.from {
            sql.push_str(&format!(" AND f.date >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(format_day(from)));
        }
        if let Some(to) = filter.to {
            sql.push_str(&format!(" AND f.date <= ?{}", param_values.len() + 1));
            param_values.push(Box::new(format_day(to)));
        }
        sql.push_str(" ORDER BY f.date DESC, f.id DESC");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), flow_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_flow_by_id(&self, id: i64) -> Result<Option<Flow>> {
        let result = self.conn.query_row(
            "SELECT f.id, f.name, f.cost, f.category, f.bank_account, f.date, COALESCE(b.currency, '')
             FROM flows f LEFT JOIN bank_accounts b ON b.id = f.bank_account WHERE f.id = ?1",
            params![id],
            flow_from_row,
        );
        match result {
            Ok(f) => Ok(Some(f)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply a partial update. Returns the number of rows changed.
    pub(crate) fn update_flow(&self, id: i64, patch: &FlowPatch) -> Result<usize> {
        if patch.is_empty() {
            bail!("Nothing to update");
        }

        let mut assignments: Vec<String> = Vec::new();
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                bail!("Flow name cannot be empty");
            }
            assignments.push(format!("name = ?{}", param_values.len() + 1));
            param_values.push(Box::new(name.clone()));
        }
        if let Some(cost) = patch.cost {
            if cost.is_zero() {
                bail!("Flow cost cannot be zero");
            }
            assignments.push(format!("cost = ?{}", param_values.len() + 1));
            param_values.push(Box::new(cost.to_string()));
        }
        if let Some(category_id) = patch.category_id {
            self.ensure_category(category_id)?;
            assignments.push(format!("category = ?{}", param_values.len() + 1));
            param_values.push(Box::new(category_id));
        }
        if let Some(account_id) = patch.account_id {
            self.ensure_account(account_id)?;
            assignments.push(format!("bank_account = ?{}", param_values.len() + 1));
            param_values.push(Box::new(account_id));
        }
        if let Some(date) = patch.date {
            assignments.push(format!("date = ?{}", param_values.len() + 1));
            param_values.push(Box::new(format_day(date)));
        }

        let sql = format!(
            "UPDATE flows SET {} WHERE id = ?{}",
            assignments.join(", "),
            param_values.len() + 1
        );
        param_values.push(Box::new(id));

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        Ok(self.conn.execute(&sql, params_ref.as_slice())?)
    }

    pub(crate) fn delete_flow(&self, id: i64) -> Result<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM flows WHERE id = ?1", params![id])?)
    }

    // ── Transfers ─────────────────────────────────────────────

    pub(crate) fn insert_transfer(&self, transfer: &Transfer) -> Result<i64> {
        if transfer.name.trim().is_empty() {
            bail!("Transfer name cannot be empty");
        }
        if transfer.amount <= Decimal::ZERO {
            bail!("Transfer amount must be positive");
        }
        if transfer.rate <= Decimal::ZERO {
            bail!("Transfer rate must be positive");
        }
        if transfer.credited().is_none() {
            bail!("Transfer amount times rate is out of range");
        }
        if transfer.from_account == transfer.to_account {
            bail!("Cannot transfer from an account to itself");
        }
        self.ensure_account(transfer.from_account)?;
        self.ensure_account(transfer.to_account)?;
        self.ensure_category(transfer.category_id)?;
        self.conn.execute(
            "INSERT INTO transfers (name, amount, rate, category, from_account, to_account, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                transfer.name,
                transfer.amount.to_string(),
                transfer.rate.to_string(),
                transfer.category_id,
                transfer.from_account,
                transfer.to_account,
                format_day(transfer.date),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Transfers matching `filter`, newest first. An account filter matches
    /// either side of the transfer.
    pub(crate) fn get_transfers(&self, filter: &RecordFilter) -> Result<Vec<Transfer>> {
        let mut sql = String::from(
            "SELECT id, name, amount, rate, category, from_account, to_account, date
             FROM transfers WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(aid) = filter.account_id {
            sql.push_str(&format!(
                " AND (from_account = ?{0} OR to_account = ?{0})",
                param_values.len() + 1
            ));
            param_values.push(Box::new(aid));
        }
        if let Some(from) = filter.from {
            sql.push_str(&format!(" AND date >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(format_day(from)));
        }
        if let Some(to) = filter.to {
            sql.push_str(&format!(" AND date <= ?{}", param_values.len() + 1));
            param_values.push(Box::new(format_day(to)));
        }
        sql.push_str(" ORDER BY date DESC, id DESC");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), transfer_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_transfer_by_id(&self, id: i64) -> Result<Option<Transfer>> {
        let result = self.conn.query_row(
            "SELECT id, name, amount, rate, category, from_account, to_account, date
             FROM transfers WHERE id = ?1",
            params![id],
            transfer_from_row,
        );
        match result {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn delete_transfer(&self, id: i64) -> Result<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM transfers WHERE id = ?1", params![id])?)
    }

    // ── Balances ──────────────────────────────────────────────

    /// Balance of every account including all recorded flows and transfers.
    pub(crate) fn current_balances(&self) -> Result<Vec<Balance>> {
        self.settled(&RecordFilter::default())
    }

    /// Balance of every account at the end of `day`.
    pub(crate) fn balances_as_of(&self, day: NaiveDate) -> Result<Vec<Balance>> {
        self.settled(&RecordFilter::through(day))
    }

    /// Balance of every account at the start of `day`, i.e. excluding
    /// anything dated `day` or later.
    pub(crate) fn opening_balances(&self, day: NaiveDate) -> Result<Vec<Balance>> {
        match day.pred_opt() {
            Some(previous) => self.balances_as_of(previous),
            None => Ok(self.get_accounts()?.into_iter().map(Balance::opening).collect()),
        }
    }

    fn settled(&self, filter: &RecordFilter) -> Result<Vec<Balance>> {
        let accounts = self.get_accounts()?;
        let flows = self.get_flows(filter)?;
        let transfers = self.get_transfers(filter)?;
        Ok(replay::settle(&accounts, &flows, &transfers)?)
    }

    // ── Currency rates ────────────────────────────────────────

    /// Replace stored rates with `rates`. Returns the number of foreign
    /// currencies saved; the reference currency is implied and not stored.
    pub(crate) fn save_rates(&mut self, rates: &CurrencyRates) -> Result<usize> {
        let published = rates.published().map(format_day);
        let now = chrono::Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM currency_rates", [])?;
        let mut count = 0;
        for (code, rate) in rates.iter().filter(|(code, _)| *code != REFERENCE_CURRENCY) {
            if !is_usable_rate(rate) {
                tracing::warn!(currency = code, %rate, "not saving rate below the minimum");
                continue;
            }
            tx.execute(
                "INSERT INTO currency_rates (currency, rate, published, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![code, rate.to_string(), published, now],
            )?;
            count += 1;
        }
        tx.commit()?;
        tracing::info!(currencies = count, "saved currency rates");
        Ok(count)
    }

    /// Insert or replace a single rate, keeping the others.
    pub(crate) fn set_rate(&self, code: &str, rate: Decimal) -> Result<()> {
        if !is_currency_code(code) {
            bail!("Invalid currency code: {code}");
        }
        if code == REFERENCE_CURRENCY {
            bail!("{REFERENCE_CURRENCY} is the reference currency; its rate is always 1");
        }
        if rate <= Decimal::ZERO {
            bail!("Rate must be positive");
        }
        if !is_usable_rate(rate) {
            bail!("Rate {rate} is below the minimum of {MIN_RATE}");
        }
        self.conn.execute(
            "INSERT INTO currency_rates (currency, rate, published, updated_at)
             VALUES (?1, ?2, NULL, ?3)
             ON CONFLICT(currency) DO UPDATE SET rate = ?2, updated_at = ?3",
            params![code, rate.to_string(), chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub(crate) fn load_rates(&self) -> Result<CurrencyRates> {
        let mut stmt = self
            .conn
            .prepare("SELECT currency, rate, published FROM currency_rates ORDER BY currency")?;
        let rows = stmt.query_map([], |row| {
            let code: String = row.get(0)?;
            let rate = decimal_at(row, 1)?;
            let published: Option<String> = row.get(2)?;
            Ok((code, rate, published))
        })?;

        let mut rates = CurrencyRates::new();
        for row in rows {
            let (code, rate, published) = row?;
            rates.insert(&code, rate);
            if let Some(day) = published.and_then(|p| parse_day(&p).ok()) {
                if rates.published().map_or(true, |current| day > current) {
                    rates.set_published(day);
                }
            }
        }
        Ok(rates)
    }

    // ── Export ────────────────────────────────────────────────

    /// Write flows matching `filter` to a CSV file. Returns the row count.
    pub(crate) fn export_flows_csv(&self, path: &str, filter: &RecordFilter) -> Result<usize> {
        let flows = self.get_flows(filter)?;
        if flows.is_empty() {
            return Ok(0);
        }
        let accounts = self.get_accounts()?;
        let categories = self.get_categories()?;

        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {path}"))?;
        wtr.write_record(["id", "date", "name", "cost", "currency", "account", "category"])?;
        for flow in &flows {
            let account = BankAccount::find_by_id(&accounts, flow.account_id)
                .map(|a| a.name.as_str())
                .unwrap_or("?");
            let category = Category::find_by_id(&categories, flow.category_id)
                .map(|c| c.name.as_str())
                .unwrap_or("?");
            wtr.write_record([
                flow.id.unwrap_or(0).to_string(),
                format_day(flow.date),
                flow.name.clone(),
                flow.cost.to_string(),
                flow.currency.clone(),
                account.to_string(),
                category.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(flows.len())
    }

    fn ensure_account(&self, id: i64) -> Result<()> {
        if self.get_account_by_id(id)?.is_none() {
            bail!("Unknown bank account: {id}");
        }
        Ok(())
    }

    fn ensure_category(&self, id: i64) -> Result<()> {
        if self.get_category_by_id(id)?.is_none() {
            bail!("Unknown category: {id}");
        }
        Ok(())
    }
}

// ── Row mapping ───────────────────────────────────────────────

fn decimal_at(row: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn day_at(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, DAY_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn account_from_row(row: &Row) -> rusqlite::Result<BankAccount> {
    Ok(BankAccount {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        creation_date: day_at(row, 2)?,
        initial_balance: decimal_at(row, 3)?,
        currency: row.get(4)?,
        color: row.get(5)?,
    })
}

fn flow_from_row(row: &Row) -> rusqlite::Result<Flow> {
    Ok(Flow {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        cost: decimal_at(row, 2)?,
        category_id: row.get(3)?,
        account_id: row.get(4)?,
        date: day_at(row, 5)?,
        currency: row.get(6)?,
    })
}

fn transfer_from_row(row: &Row) -> rusqlite::Result<Transfer> {
    Ok(Transfer {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        amount: decimal_at(row, 2)?,
        rate: decimal_at(row, 3)?,
        category_id: row.get(4)?,
        from_account: row.get(5)?,
        to_account: row.get(6)?,
        date: day_at(row, 7)?,
    })
}
