use chrono::NaiveDate;
use rust_decimal::Decimal;

pub(crate) const DEFAULT_ACCOUNT_COLOR: &str = "#89b4fa";

#[derive(Debug, Clone, PartialEq)]
pub struct BankAccount {
    pub id: Option<i64>,
    pub name: String,
    pub creation_date: NaiveDate,
    /// Balance on `creation_date`, in the account's own currency.
    pub initial_balance: Decimal,
    pub currency: String,
    /// Display only.
    pub color: String,
}

impl BankAccount {
    pub fn new(
        name: String,
        currency: &str,
        initial_balance: Decimal,
        creation_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            name,
            creation_date,
            initial_balance,
            currency: currency.trim().to_uppercase(),
            color: DEFAULT_ACCOUNT_COLOR.to_string(),
        }
    }

    /// Find an account by name (case-insensitive) in a slice.
    pub fn find_by_name<'a>(accounts: &'a [BankAccount], name: &str) -> Option<&'a BankAccount> {
        let lower = name.to_lowercase();
        accounts.iter().find(|a| a.name.to_lowercase() == lower)
    }

    /// Find an account by ID in a slice.
    pub fn find_by_id(accounts: &[BankAccount], id: i64) -> Option<&BankAccount> {
        accounts.iter().find(|a| a.id == Some(id))
    }
}

impl std::fmt::Display for BankAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.currency)
    }
}

/// An account together with its balance at some point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub account: BankAccount,
    pub balance: Decimal,
}

impl Balance {
    /// The balance an account has on its creation date.
    pub fn opening(account: BankAccount) -> Self {
        let balance = account.initial_balance;
        Self { account, balance }
    }

    pub fn account_id(&self) -> Option<i64> {
        self.account.id
    }
}
