pub mod conversation;
pub mod dialogs;
pub mod maintenance;
pub mod session;

pub use conversation::{chat, render_reply, say, turn};
pub use dialogs::list_dialogs;
pub use maintenance::{clear_logs, logs};
pub use session::{reset_session, show_session};
