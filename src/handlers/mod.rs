pub mod health_handlers;
pub mod register_handlers;
