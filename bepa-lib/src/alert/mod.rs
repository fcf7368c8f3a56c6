mod dispatcher;
mod notifier;

pub use dispatcher::{format_message, AlertDispatcher};
pub use notifier::{locate_command, Notifier, NotifySend};
