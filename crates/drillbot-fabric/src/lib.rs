//! # drillbot Fabric
//!
//! The contexts around the observer and the messages between them.
//!
//! ```text
//!  ControlSurface ──Command──► Coordinator ──Request{reply}──► ObserverHost
//!        ▲                         │                               │
//!        └──────── Event ◄─────────┴────────── EventSink ◄─────────┘
//! ```
//!
//! - [`Coordinator`]: default flags on first install, command relay, event fan-out
//! - [`ObserverHost`] / [`ObserverSupervisor`]: one controller per document,
//!   recreated on navigation
//! - [`ControlSurface`]: optimistic view with rollback on transport failure
//! - [`UsageQuota`]: bounded privileged-action counter

pub mod action_script;
pub mod coordinator;
pub mod log_panel;
pub mod observer_host;
pub mod quota;
pub mod surface;
pub mod transport;

pub use action_script::ScriptAction;
pub use coordinator::Coordinator;
pub use log_panel::LogPanel;
pub use observer_host::{ObserverHost, ObserverSpec, ObserverSupervisor};
pub use quota::UsageQuota;
pub use surface::{ControlSurface, SurfaceView, UNREACHABLE_MESSAGE};
pub use transport::{command_channel, CommandReceiver, CommandSender, Request};
