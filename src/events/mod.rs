mod bus;
mod types;

pub use bus::{EventBus, EventRecorder, SubscriptionId};
pub use types::{EventKind, MobileView, ViewerEvent};
