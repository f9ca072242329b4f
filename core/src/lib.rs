// src/lib.rs

//! gigflow: the order lifecycle of a freelance services marketplace.
//!
//! gigflow tracks a purchased service from checkout to completion:
//!  - A closed `OrderStatus` enum and a pure, fully guarded state machine
//!    (deliver, re-deliver after revision, request changes, complete, cancel).
//!  - An in-memory `OrderStore` shared between the workflow and read-only views.
//!  - A pluggable `OrderBackend` persistence seam with optimistic versioning.
//!  - An append-only `EventLog` from which any order can be rebuilt.
//!  - Dashboard tabs, free-text client search and tab badge counts.
//!  - Server-side validation of delivery attachments.

pub mod attachment;
pub mod backend;
pub mod classifier;
pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod store;
pub mod transition;
pub mod view;
pub mod workflow;

// --- Re-exports for the Public API ---

// Domain types that users will interact with frequently
pub use crate::core::action::{ActionKind, Actor, OrderAction};
pub use crate::core::clock::{Clock, FixedClock, Stamp, SystemClock};
pub use crate::core::order::{Order, OrderId};
pub use crate::core::status::OrderStatus;

// The state machine and the service driving it
pub use crate::transition::{attempt_transition, available_actions};
pub use crate::workflow::{OrderWorkflow, TransitionHook};

pub use crate::attachment::{AttachmentKind, AttachmentPolicy, AttachmentRef, AttachmentStore, InMemoryAttachmentStore};
pub use crate::backend::{InMemoryBackend, OrderBackend, OrderFilter};
pub use crate::classifier::{Classifier, OrderTab};
pub use crate::config::WorkflowConfig;
pub use crate::events::{rebuild, EventLog, EventPayload, OrderEvent};
pub use crate::store::OrderStore;
pub use crate::view::{tab_counts, visible_orders, OrderQuery, OrderSort};

pub use crate::error::{OrderError, OrderResult, TransitionError};

/*
    Typical use:
    1. Implement `OrderBackend` for your database (or start with `InMemoryBackend`).
    2. Build an `OrderWorkflow::new(Arc::new(backend), WorkflowConfig::default())`,
       optionally `.with_clock(..)` and `.on_transition(..)` hooks.
    3. `workflow.load().await?` to hydrate the store from the backend.
    4. Drive the lifecycle with `deliver`, `request_revision`, `mark_completed`, `cancel`
       (or `apply` with an explicit `OrderAction` and `Actor`).
    5. Render dashboards with `workflow.view(&OrderQuery::tab(OrderTab::Revision))`
       and `workflow.tab_counts()`.
*/
