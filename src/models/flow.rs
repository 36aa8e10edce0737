use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A dated income (positive cost) or expense (negative cost) on one account.
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    pub id: Option<i64>,
    pub name: String,
    pub cost: Decimal,
    pub category_id: i64,
    pub account_id: i64,
    pub date: NaiveDate,
    /// Currency of `account_id`, filled in when read from the store.
    pub currency: String,
}

impl Flow {
    pub fn new(
        name: String,
        cost: Decimal,
        category_id: i64,
        account_id: i64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            name,
            cost,
            category_id,
            account_id,
            date,
            currency: String::new(),
        }
    }

    pub fn is_income(&self) -> bool {
        self.cost > Decimal::ZERO
    }

    pub fn is_expense(&self) -> bool {
        self.cost < Decimal::ZERO
    }

    pub fn abs_cost(&self) -> Decimal {
        self.cost.abs()
    }
}

/// Partial update of a flow; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowPatch {
    pub name: Option<String>,
    pub cost: Option<Decimal>,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
    pub date: Option<NaiveDate>,
}

impl FlowPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.cost.is_none()
            && self.category_id.is_none()
            && self.account_id.is_none()
            && self.date.is_none()
    }
}
