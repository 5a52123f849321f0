pub mod registry;
pub mod traits;

// Price feed implementations
pub mod alphavantage;
pub mod static_quotes;
pub mod yahoo_finance;
