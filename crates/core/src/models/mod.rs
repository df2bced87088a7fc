pub mod investment;
pub mod metrics;
pub mod price;
pub mod scenario;
pub mod settings;
