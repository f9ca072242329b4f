// demos/order_desk/src/web/handlers/mod.rs

pub mod order_handlers;
