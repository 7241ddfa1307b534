//! # drillbot Protocols
//!
//! Core protocol definitions for the drillbot automation core.
//! Contains only interface definitions and wire types - no implementations.
//!
//! ## Core Traits
//!
//! - [`ObserverPage`] - DOM access from the isolated observer context, plus the
//!   explicit entry points into the page's privileged main world
//! - [`Solver`] - External problem solver invoked once per cycle
//! - [`InputDriver`] - Synthetic pointer/keyboard input used by solvers
//! - [`KvStore`] - Durable flat key-value storage shared by all contexts
//! - [`ClockSource`] - Real wall/monotonic clock readings
//! - [`PrivilegedAction`] - One-shot quota-gated main-world effect
//!
//! ## Wire Types
//!
//! - [`Command`] / [`Ack`] - Requests into the observer and their single reply
//! - [`Event`] - Notifications from the observer to the control surface

pub mod action;
pub mod clock;
pub mod error;
pub mod message;
pub mod mode;
pub mod page;
pub mod solver;
pub mod store;

pub use action::PrivilegedAction;
pub use clock::{ClockReading, ClockSource};
pub use error::{PageError, QuotaError, SolverError, StoreError, TransportError};
pub use message::{Ack, Command, Event, EventSink};
pub use mode::BotMode;
pub use page::{
    FreezeSignal, KeyDescriptor, KeyEventKind, MouseEventKind, ObserverPage, Visibility,
    FREEZE_MESSAGE_TYPE,
};
pub use solver::{InputDriver, Solver, SolverContext};
pub use store::{keys, KvStore, PersistedFlags};
