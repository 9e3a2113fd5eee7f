pub mod ledger;
pub mod swap;
