//! 预约生命周期
//!
//! - [`BookingManager`] - 状态机与通知副作用
//! - [`Notifier`] - 聊天通知能力
//! - [`PendingRejections`] - 等待拒绝理由的会话表

pub mod error;
pub mod lifecycle;
pub mod messages;
pub mod notifier;
pub mod pending;

pub use error::{BookingError, BookingResult};
pub use lifecycle::{BookingManager, Decision, DecisionAction, ManagerSettings};
pub use notifier::{Action, LogNotifier, Notifier, NotifyError};
pub use pending::{PendingRejection, PendingRejections};
