//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session coordinator and the
//! environment it runs in. Each port is a trait that can be implemented by
//! adapters in the infrastructure layer.

mod clock;
mod discovery;
mod storage;
mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use discovery::DiscoveryApi;
pub use storage::{KeyValueStorage, StorageError};
pub use window::{MessageListener, PopupHandle, PopupId, WindowHost, WindowMessage};
