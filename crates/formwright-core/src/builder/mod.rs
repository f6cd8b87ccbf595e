//! Interactive form construction: the builder session state machine and the
//! read-only preview it renders.

pub mod preview;
pub mod session;

pub use preview::{FormPreview, PreviewField};
pub use session::{BuilderSession, SessionOrigin, SessionState};
