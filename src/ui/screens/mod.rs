pub(crate) mod accounts;
pub(crate) mod dashboard;
pub(crate) mod flows;
pub(crate) mod history;
pub(crate) mod stats;
