mod account;
mod category;
mod currency;
mod day;
mod flow;
mod movement;
mod transfer;

pub use account::{Balance, BankAccount};
pub use category::Category;
pub use currency::{is_currency_code, is_usable_rate, CurrencyRates, MIN_RATE, REFERENCE_CURRENCY};
pub use day::{format_day, parse_day, DAY_FORMAT};
pub use flow::{Flow, FlowPatch};
pub use movement::Movement;
pub use transfer::Transfer;
