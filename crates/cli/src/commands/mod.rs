pub mod assess;
pub mod batch;
pub mod config_cmd;
pub mod onboard;
pub mod rules;
