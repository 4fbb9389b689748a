pub mod context;
pub mod error;
pub mod shutdown;

pub use context::AppContext;
pub use error::{CalibrError, ErrorKind, Result};
pub use shutdown::shutdown_signal;
