//! Booking Lifecycle Manager
//!
//! 预约状态机：
//!
//! ```text
//! submit ──► pending ──confirm──► confirmed ──cancel──► cancelled
//!              │  └──reject──► (awaiting reason) ──reason──► rejected
//!              └──cancel──► cancelled
//! ```
//!
//! "awaiting reason" 不落库：数据库中仍是 `pending`，只有管理员消息显示
//! 待填写理由。所有状态写入都是条件更新 (期望的旧状态)，并发操作只有一个
//! 能成功。
//!
//! Notifier calls are best-effort: each is bounded by the configured timeout
//! and a failure is logged, never returned to the caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use shared::models::{
    Availability, Booking, BookingRequest, BookingStatus, MessageRef, NewBooking,
};
use tracing::{debug, info, warn};

use super::error::{BookingError, BookingResult};
use super::messages;
use super::notifier::{Action, Notifier, NotifyError};
use super::pending::{PendingRejection, PendingRejections};
use crate::store::{BookingStore, ShopCatalog};

/// Admin decision carried by an approval button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionAction {
    Confirm,
    Reject,
}

impl DecisionAction {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Reject => "reject",
        }
    }

    /// Callback payload for a booking, e.g. `confirm_<id>`
    pub fn payload(&self, booking_id: &str) -> String {
        format!("{}_{}", self.prefix(), booking_id)
    }

    /// Parse `confirm_<id>` / `reject_<id>`
    pub fn parse(payload: &str) -> Option<(Self, String)> {
        let (prefix, id) = payload.split_once('_')?;
        if id.is_empty() {
            return None;
        }
        let action = match prefix {
            "confirm" => Self::Confirm,
            "reject" => Self::Reject,
            _ => return None,
        };
        Some((action, id.to_string()))
    }

    pub fn target_status(&self) -> BookingStatus {
        match self {
            Self::Confirm => BookingStatus::Confirmed,
            Self::Reject => BookingStatus::Rejected,
        }
    }
}

/// Outcome of [`BookingManager::decide`]
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Confirmed(Booking),
    /// Booking stays `pending` until the admin supplies a reason
    AwaitingReason(Booking),
}

/// 管理员身份与通知超时
#[derive(Debug, Clone, Copy)]
pub struct ManagerSettings {
    pub admin_chat_id: i64,
    pub notify_timeout: Duration,
}

pub struct BookingManager {
    bookings: Arc<dyn BookingStore>,
    shops: Arc<dyn ShopCatalog>,
    notifier: Arc<dyn Notifier>,
    settings: ManagerSettings,
    pending: PendingRejections,
}

impl BookingManager {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        shops: Arc<dyn ShopCatalog>,
        notifier: Arc<dyn Notifier>,
        settings: ManagerSettings,
    ) -> Self {
        Self {
            bookings,
            shops,
            notifier,
            settings,
            pending: PendingRejections::new(),
        }
    }

    pub fn admin_chat_id(&self) -> i64 {
        self.settings.admin_chat_id
    }

    pub fn pending_rejections(&self) -> &PendingRejections {
        &self.pending
    }

    // ========== Operations ==========

    /// Create a `pending` booking and prompt the admin
    pub async fn submit(&self, request: BookingRequest) -> BookingResult<Booking> {
        let draft = self.validate(request).await?;
        let mut booking = self.bookings.insert(draft).await?;
        info!(
            booking_id = %booking.id,
            shop_id = booking.shop_id,
            user = booking.user_telegram_id,
            "Booking request created"
        );

        self.prompt_admin(&mut booking).await;
        Ok(booking)
    }

    /// Handle an admin approval button
    pub async fn decide(
        &self,
        booking_id: &str,
        action: DecisionAction,
        admin_message: MessageRef,
    ) -> BookingResult<Decision> {
        let booking = self.load(booking_id).await?;
        if booking.status != BookingStatus::Pending {
            return Err(BookingError::InvalidTransition {
                id: booking.id,
                from: booking.status,
                to: action.target_status(),
            });
        }

        match action {
            DecisionAction::Confirm => {
                let confirmed = self.apply(&booking, BookingStatus::Confirmed, None).await?;
                info!(booking_id = %confirmed.id, "Booking confirmed");

                self.notify(
                    "requester outcome",
                    self.notifier.send(
                        confirmed.user_telegram_id,
                        &messages::requester_outcome(&confirmed),
                        &[],
                    ),
                )
                .await;
                self.notify(
                    "admin prompt edit",
                    self.notifier
                        .edit(admin_message, &messages::admin_decided(&confirmed)),
                )
                .await;

                Ok(Decision::Confirmed(confirmed))
            }
            DecisionAction::Reject => {
                self.notify(
                    "admin prompt edit",
                    self.notifier
                        .edit(admin_message, &messages::admin_pending_reason(&booking)),
                )
                .await;

                let replaced = self.pending.register(
                    admin_message.chat_id,
                    PendingRejection {
                        booking_id: booking.id.clone(),
                        original_message: admin_message,
                    },
                );
                if let Some(previous) = replaced {
                    if previous.booking_id != booking.id {
                        self.supersede(previous).await;
                    }
                }
                info!(booking_id = %booking.id, "Rejection awaiting reason");

                self.notify(
                    "reason request",
                    self.notifier.request_reply(
                        admin_message.chat_id,
                        &messages::reason_request(&booking),
                    ),
                )
                .await;

                Ok(Decision::AwaitingReason(booking))
            }
        }
    }

    /// Complete a rejection with the admin's free-text reason.
    ///
    /// Returns `Ok(None)` when the conversation has no pending rejection or
    /// the booking has disappeared.
    pub async fn supply_rejection_reason(
        &self,
        admin_chat_id: i64,
        text: &str,
    ) -> BookingResult<Option<Booking>> {
        let reason = text.trim();
        if reason.is_empty() {
            if self.pending.contains(admin_chat_id) {
                return Err(BookingError::Validation(
                    "Rejection reason must not be empty".into(),
                ));
            }
            return Ok(None);
        }

        let Some(entry) = self.pending.take(admin_chat_id) else {
            debug!(admin_chat_id, "No pending rejection for conversation");
            return Ok(None);
        };

        let Some(booking) = self.bookings.find_by_id(&entry.booking_id).await? else {
            warn!(booking_id = %entry.booking_id, "Pending rejection refers to a missing booking");
            return Ok(None);
        };
        if booking.status != BookingStatus::Pending {
            return Err(BookingError::InvalidTransition {
                id: booking.id,
                from: booking.status,
                to: BookingStatus::Rejected,
            });
        }

        let rejected = self
            .apply(&booking, BookingStatus::Rejected, Some(reason.to_string()))
            .await?;
        info!(booking_id = %rejected.id, "Booking rejected");

        self.notify(
            "requester outcome",
            self.notifier.send(
                rejected.user_telegram_id,
                &messages::requester_outcome(&rejected),
                &[],
            ),
        )
        .await;
        self.notify(
            "admin prompt edit",
            self.notifier
                .edit(entry.original_message, &messages::admin_decided(&rejected)),
        )
        .await;

        Ok(Some(rejected))
    }

    /// Cancel a `pending` or `confirmed` booking.
    ///
    /// `actor` is the Telegram id of the caller when known; it must match
    /// the requester.
    pub async fn cancel(&self, booking_id: &str, actor: Option<i64>) -> BookingResult<Booking> {
        let booking = self.load(booking_id).await?;
        if let Some(actor) = actor
            && actor != booking.user_telegram_id
        {
            return Err(BookingError::NotOwner(booking.id));
        }
        if !booking.status.is_cancellable() {
            return Err(BookingError::InvalidTransition {
                id: booking.id,
                from: booking.status,
                to: BookingStatus::Cancelled,
            });
        }

        let was_pending = booking.status == BookingStatus::Pending;
        let cancelled = self.apply(&booking, BookingStatus::Cancelled, None).await?;
        info!(booking_id = %cancelled.id, "Booking cancelled");

        if self.pending.discard_booking(&cancelled.id) > 0 {
            debug!(booking_id = %cancelled.id, "Dropped pending rejection of cancelled booking");
        }

        self.notify(
            "cancel notice",
            self.notifier.send(
                self.settings.admin_chat_id,
                &messages::cancelled_notice(&cancelled),
                &[],
            ),
        )
        .await;
        if was_pending && let Some(prompt) = cancelled.admin_message {
            self.notify(
                "admin prompt edit",
                self.notifier.edit(prompt, &messages::admin_decided(&cancelled)),
            )
            .await;
        }

        Ok(cancelled)
    }

    /// Working hours and future confirmed slots of a shop
    pub async fn availability(&self, shop_id: i64) -> BookingResult<Availability> {
        self.availability_at(shop_id, Utc::now()).await
    }

    pub async fn availability_at(
        &self,
        shop_id: i64,
        now: DateTime<Utc>,
    ) -> BookingResult<Availability> {
        let shop = self
            .shops
            .find_by_id(shop_id)
            .await?
            .ok_or(BookingError::ShopNotFound(shop_id))?;
        let booked = self.bookings.find_confirmed_after(shop_id, now).await?;
        Ok(Availability {
            working_hours: shop.working_hours,
            booked_slots: booked.into_iter().map(|b| b.requested_time).collect(),
        })
    }

    /// Show the current state on an approval prompt whose button went stale
    pub async fn show_current_state(&self, booking: &Booking, admin_message: MessageRef) {
        self.notify(
            "admin prompt edit",
            self.notifier
                .edit(admin_message, &messages::already_decided(booking)),
        )
        .await;
    }

    /// Send the approval prompt with decision buttons and remember its reference
    async fn prompt_admin(&self, booking: &mut Booking) {
        let actions = [
            Action::new("✅ Confirm", DecisionAction::Confirm.payload(&booking.id)),
            Action::new("❌ Reject", DecisionAction::Reject.payload(&booking.id)),
        ];
        let prompt = messages::admin_prompt(booking);
        let sent = self
            .notify(
                "admin prompt",
                self.notifier
                    .send(self.settings.admin_chat_id, &prompt, &actions),
            )
            .await;

        if let Some(message) = sent {
            match self.bookings.set_admin_message(&booking.id, message).await {
                Ok(()) => booking.admin_message = Some(message),
                Err(e) => warn!(booking_id = %booking.id, error = %e, "Failed to store admin message reference"),
            }
        }
    }

    /// 同一会话只保留一个待填理由的拒绝; 被替换的预约重新发出审批提示
    async fn supersede(&self, previous: PendingRejection) {
        warn!(booking_id = %previous.booking_id, "Pending rejection superseded before a reason arrived");
        let mut booking = match self.load(&previous.booking_id).await {
            Ok(booking) => booking,
            Err(e) => {
                warn!(booking_id = %previous.booking_id, error = %e, "Failed to reload superseded booking");
                return;
            }
        };

        if booking.status != BookingStatus::Pending {
            self.show_current_state(&booking, previous.original_message).await;
            return;
        }

        self.notify(
            "admin prompt edit",
            self.notifier.edit(
                previous.original_message,
                &messages::admin_rejection_abandoned(&booking),
            ),
        )
        .await;
        self.prompt_admin(&mut booking).await;
    }

    /// Current stored state of a booking
    pub async fn booking(&self, booking_id: &str) -> BookingResult<Booking> {
        self.load(booking_id).await
    }

    // ========== Internals ==========

    async fn load(&self, booking_id: &str) -> BookingResult<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(booking_id.to_string()))
    }

    /// Conditional status write; a lost race reports the status that won
    async fn apply(
        &self,
        booking: &Booking,
        next: BookingStatus,
        reason: Option<String>,
    ) -> BookingResult<Booking> {
        let expected: Vec<BookingStatus> = [BookingStatus::Pending, BookingStatus::Confirmed]
            .into_iter()
            .filter(|s| s.can_transition_to(next))
            .collect();

        if let Some(updated) = self
            .bookings
            .transition(&booking.id, &expected, next, reason)
            .await?
        {
            return Ok(updated);
        }

        let current = self.load(&booking.id).await?;
        Err(BookingError::InvalidTransition {
            id: current.id,
            from: current.status,
            to: next,
        })
    }

    async fn validate(&self, request: BookingRequest) -> BookingResult<NewBooking> {
        let user_number = non_blank(request.user_number);
        let requested_time = non_blank(request.requested_time);

        let mut missing = Vec::new();
        if request.shop_id.is_none() {
            missing.push("shopId");
        }
        if request.user_telegram_id.is_none() {
            missing.push("userTelegramId");
        }
        if requested_time.is_none() {
            missing.push("requestedTime");
        }
        if user_number.is_none() {
            missing.push("userNumber");
        }

        let (Some(shop_id), Some(user_telegram_id), Some(requested_time), Some(user_number)) =
            (request.shop_id, request.user_telegram_id, requested_time, user_number)
        else {
            return Err(BookingError::MissingFields(missing));
        };

        let requested_time = DateTime::parse_from_rfc3339(&requested_time)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| {
                BookingError::Validation("requestedTime must be an RFC 3339 timestamp".into())
            })?;

        let shop_name = match non_blank(request.shop_name) {
            Some(name) => name,
            None => self
                .shops
                .find_by_id(shop_id)
                .await?
                .map(|shop| shop.name.en)
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| shop_id.to_string()),
        };

        Ok(NewBooking {
            shop_id,
            shop_name,
            user_telegram_id,
            user_telegram_username: non_blank(request.user_telegram_username),
            user_number,
            user_telegram_number: non_blank(request.user_telegram_number),
            requested_time,
        })
    }

    /// 带超时的通知调用；失败只记录日志
    async fn notify<T>(
        &self,
        what: &'static str,
        call: impl Future<Output = Result<T, NotifyError>>,
    ) -> Option<T> {
        let timeout = self.settings.notify_timeout;
        let outcome = match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout(timeout)),
        };
        match outcome {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(what, error = %e, "Notification failed");
                None
            }
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
