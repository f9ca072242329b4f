pub mod action;
pub mod clock;
pub mod order;
pub mod status;

// Re-export key types for easier access from other gigflow modules (and lib.rs)
pub use action::{ActionKind, Actor, OrderAction};
pub use clock::{Clock, FixedClock, Stamp, SystemClock};
pub use order::{Order, OrderId};
pub use status::OrderStatus;
