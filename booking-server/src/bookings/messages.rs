//! Chat message texts for the approval workflow
//!
//! Plain text only, no parse mode, so user-supplied values need no escaping.

use chrono::{DateTime, Utc};
use shared::models::{Booking, BookingStatus};

fn format_time(time: DateTime<Utc>) -> String {
    time.format("%A, %B %-d, %Y %H:%M UTC").to_string()
}

fn requester(booking: &Booking) -> String {
    match booking.user_telegram_username.as_deref() {
        Some(username) if !username.is_empty() => format!("@{username}"),
        _ => booking.user_telegram_id.to_string(),
    }
}

/// Approval prompt sent to the admin for a new booking
pub fn admin_prompt(booking: &Booking) -> String {
    format!(
        "📢 New Booking Request 📢\n\
         Shop: {}\n\
         User: {}\n\
         User Number: {}\n\
         User Telegram number: {}\n\
         Time: {}",
        booking.shop_name,
        requester(booking),
        booking.user_number,
        booking.user_telegram_number.as_deref().unwrap_or("-"),
        format_time(booking.requested_time),
    )
}

/// Admin prompt while the rejection reason is outstanding
pub fn admin_pending_reason(booking: &Booking) -> String {
    format!(
        "{}\n\nAction taken: REJECT (pending reason)",
        admin_prompt(booking)
    )
}

/// Old prompt of a rejection that was replaced by another one
pub fn admin_rejection_abandoned(booking: &Booking) -> String {
    format!(
        "{}\n\nReject abandoned: no reason was given. The request was sent again below.",
        admin_prompt(booking)
    )
}

/// Terminal display of the admin prompt
pub fn admin_decided(booking: &Booking) -> String {
    let mut text = format!(
        "{}\n\nAction taken: {}",
        admin_prompt(booking),
        booking.status.as_str().to_uppercase()
    );
    if let Some(reason) = booking.rejection_reason.as_deref() {
        text.push_str(&format!("\nReason: {reason}"));
    }
    text
}

/// Force-reply prompt asking the admin for a reason
pub fn reason_request(booking: &Booking) -> String {
    format!(
        "Please reply with the reason for rejecting the booking at {} ({}).",
        booking.shop_name,
        format_time(booking.requested_time)
    )
}

/// Outcome message for the requester
pub fn requester_outcome(booking: &Booking) -> String {
    match booking.status {
        BookingStatus::Confirmed => format!(
            "✅ Your booking for {} at {} has been confirmed!",
            booking.shop_name,
            format_time(booking.requested_time)
        ),
        BookingStatus::Rejected => format!(
            "❌ Unfortunately, your booking for {} at {} could not be confirmed.\nReason: {}",
            booking.shop_name,
            format_time(booking.requested_time),
            booking.rejection_reason.as_deref().unwrap_or("-")
        ),
        _ => format!(
            "Your booking for {} at {} is now {}.",
            booking.shop_name,
            format_time(booking.requested_time),
            booking.status
        ),
    }
}

/// Admin notice after a requester cancels
pub fn cancelled_notice(booking: &Booking) -> String {
    format!(
        "🚫 Booking cancelled by the user\n\
         Shop: {}\n\
         User: {}\n\
         Time: {}",
        booking.shop_name,
        requester(booking),
        format_time(booking.requested_time)
    )
}

/// Admin notice for a stale action button
pub fn already_decided(booking: &Booking) -> String {
    format!("{}\n\nThis booking is already {}.", admin_prompt(booking), booking.status)
}
