use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Money moved between two accounts, possibly across currencies.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub id: Option<i64>,
    pub name: String,
    /// Debited from `from_account`, in its currency.
    pub amount: Decimal,
    /// Fixed when the transfer is recorded; `amount * rate` lands on `to_account`.
    pub rate: Decimal,
    pub category_id: i64,
    pub from_account: i64,
    pub to_account: i64,
    pub date: NaiveDate,
}

impl Transfer {
    pub fn new(
        name: String,
        amount: Decimal,
        rate: Decimal,
        category_id: i64,
        from_account: i64,
        to_account: i64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            name,
            amount,
            rate,
            category_id,
            from_account,
            to_account,
            date,
        }
    }

    /// Amount credited to the destination account, in its currency.
    /// `None` when `amount * rate` does not fit a decimal.
    pub fn credited(&self) -> Option<Decimal> {
        self.amount.checked_mul(self.rate)
    }

    pub fn touches(&self, account_id: i64) -> bool {
        self.from_account == account_id || self.to_account == account_id
    }
}
