mod coordinator;
mod error;
mod event;
mod workspace;

pub use coordinator::{Coordinator, CoordinatorConfig};
pub use error::CoordinatorError;
pub use event::{BodyFuture, CaptureEvent, PanelEvent};
pub use workspace::{WorkspaceContext, open_or_create_workspace};
