pub mod compliance;
pub mod export;
pub mod pipeline;
pub mod risk_model;
pub mod snapshot;
