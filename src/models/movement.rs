use chrono::NaiveDate;

use super::{Flow, Transfer};

/// Anything that moves money: listed together, newest first.
#[derive(Debug, Clone, PartialEq)]
pub enum Movement {
    Flow(Flow),
    Transfer(Transfer),
}

impl Movement {
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Flow(f) => f.date,
            Self::Transfer(t) => t.date,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Flow(f) => f.id,
            Self::Transfer(t) => t.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Flow(f) => &f.name,
            Self::Transfer(t) => &t.name,
        }
    }

    pub fn category_id(&self) -> i64 {
        match self {
            Self::Flow(f) => f.category_id,
            Self::Transfer(t) => t.category_id,
        }
    }

    pub fn touches(&self, account_id: i64) -> bool {
        match self {
            Self::Flow(f) => f.account_id == account_id,
            Self::Transfer(t) => t.touches(account_id),
        }
    }

    /// Merge flows and transfers into one list, newest first.
    ///
    /// Same-day entries keep flows before transfers, each by descending id.
    pub fn merge(flows: Vec<Flow>, transfers: Vec<Transfer>) -> Vec<Movement> {
        let mut all: Vec<Movement> = flows
            .into_iter()
            .map(Movement::Flow)
            .chain(transfers.into_iter().map(Movement::Transfer))
            .collect();
        all.sort_by(|a, b| {
            b.date()
                .cmp(&a.date())
                .then_with(|| a.kind_rank().cmp(&b.kind_rank()))
                .then_with(|| b.id().cmp(&a.id()))
        });
        all
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Self::Flow(_) => 0,
            Self::Transfer(_) => 1,
        }
    }
}
