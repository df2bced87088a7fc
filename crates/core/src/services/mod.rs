pub mod calculation_service;
pub mod comparison_service;
pub mod market_data_service;
pub mod metrics_engine;
pub mod scenario_service;
