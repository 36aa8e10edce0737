pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS bank_accounts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    creation_date   TEXT NOT NULL,
    initial_balance TEXT NOT NULL DEFAULT '0',
    currency        TEXT NOT NULL DEFAULT 'EUR',
    color           TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS categories (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE,
    color TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS flows (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    cost         TEXT NOT NULL,
    category     INTEGER NOT NULL REFERENCES categories(id),
    bank_account INTEGER NOT NULL REFERENCES bank_accounts(id),
    date         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS transfers (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    amount       TEXT NOT NULL,
    rate         TEXT NOT NULL DEFAULT '1',
    category     INTEGER NOT NULL REFERENCES categories(id),
    from_account INTEGER NOT NULL REFERENCES bank_accounts(id),
    to_account   INTEGER NOT NULL REFERENCES bank_accounts(id),
    date         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS currency_rates (
    currency   TEXT PRIMARY KEY,
    rate       TEXT NOT NULL,
    published  TEXT,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_flows_date ON flows(date);
CREATE INDEX IF NOT EXISTS idx_flows_account ON flows(bank_account);
CREATE INDEX IF NOT EXISTS idx_transfers_date ON transfers(date);
CREATE INDEX IF NOT EXISTS idx_transfers_from ON transfers(from_account);
CREATE INDEX IF NOT EXISTS idx_transfers_to ON transfers(to_account);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
