mod keep_awake;
mod notify;

pub use keep_awake::{platform_keep_awake, CaffeinateKeepAwake, InhibitKeepAwake, KeepAwake, NoopKeepAwake};
pub use notify::{DesktopNotifier, Notifier, NullNotifier};
