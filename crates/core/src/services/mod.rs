pub mod aggregation_service;
pub mod holdings_service;
pub mod metrics_service;
pub mod price_service;
pub mod upload_service;
