pub mod credits;
pub mod models;
pub mod transactions;

pub use credits::CreditLedger;
pub use transactions::TransactionStore;
