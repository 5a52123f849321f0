pub mod analytics;
pub mod display;
pub mod holding;
pub mod metrics;
pub mod price;
pub mod settings;
pub mod upload;
