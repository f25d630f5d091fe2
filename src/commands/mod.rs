pub mod add;
pub mod browse;
pub mod delete;
pub mod edit;
pub mod lock;
pub mod pin;
pub mod settings;
pub mod status;
pub mod week;
