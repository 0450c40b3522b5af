//! Auth connectors.
//!
//! Both connectors talk to the same auth backend endpoints
//! (`{base}/{provider}/start`, `/refresh` and `/logout`). The mediated one
//! refreshes silently through the backend and funnels concurrent logins
//! through the request manager; the direct one does neither.

mod backend;
mod direct;
mod mediated;

pub use backend::ConnectorOptions;
pub use direct::DirectAuthConnector;
pub use mediated::MediatedAuthConnector;
