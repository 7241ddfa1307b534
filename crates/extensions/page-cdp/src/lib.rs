//! Observed page over the Chrome DevTools Protocol.
//!
//! [`CdpPage`] implements [`drillbot_protocols::ObserverPage`] for a live
//! Chrome tab. Observer calls run in an isolated world; main-world calls
//! (clock bridge, privileged scripts) evaluate in the page's default context.

pub mod cdp;
pub mod page;
pub mod scripts;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use page::{CdpPage, OBSERVER_WORLD};
