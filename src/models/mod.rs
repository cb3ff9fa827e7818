pub mod entity;
pub mod hotel;
pub mod intent;
pub mod message;
pub mod response;
pub mod session;
pub mod turn;

pub use entity::{find_entity, Entity};
pub use hotel::{Hotel, Review};
pub use intent::{Intent, Recognition, ScoredIntent};
pub use message::{Card, InboundMessage, Reply};
pub use response::{
    ChatData, ClearLogsData, DialogInfo, DialogsData, ErrorResponse, LogEntry, LogsData, ResetSessionData,
    SessionData, SuccessResponse,
};
pub use session::{ActiveDialog, DialogData, DialogState, Session};
pub use turn::{RouteKind, TurnInfo, TurnOutcome};
