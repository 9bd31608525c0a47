pub mod agent;
pub mod agents;
pub mod errors;
pub mod providers;
