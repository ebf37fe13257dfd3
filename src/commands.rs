pub mod info;
pub mod report;
pub mod transactions;
