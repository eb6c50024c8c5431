//! Data model shared by the producer and gateway services.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One notification flowing through the pipeline.
///
/// Records are synthesized fresh per request, so `id` is only unique within a single
/// response sequence. Wire names follow the upstream contract (`userId`, `createdAt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: i64,
    pub user_id: i64,
    /// Category of the notification, e.g. `SYSTEM`. Unknown values are passed
    /// through untouched and receive no title prefix.
    #[serde(rename = "type")]
    pub kind: String,
    /// Display title; enrichment prepends exactly one category prefix.
    pub title: String,
    pub message: String,
    /// Mirrors `kind` for the built-in sources.
    pub source: String,
    /// Records already marked read never appear in a stream response.
    pub read: bool,
    pub created_at: NaiveDateTime,
    pub read_at: Option<NaiveDateTime>,
}

/// The notification categories the built-in sources produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationCategory {
    System,
    User,
    Social,
}

impl NotificationCategory {
    /// All built-in categories, in the order the original services registered them.
    pub const ALL: [NotificationCategory; 3] = [
        NotificationCategory::System,
        NotificationCategory::User,
        NotificationCategory::Social,
    ];

    /// Canonical wire name of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::System => "SYSTEM",
            NotificationCategory::User => "USER",
            NotificationCategory::Social => "SOCIAL",
        }
    }

    /// Human-readable name used in synthetic titles and messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            NotificationCategory::System => "System",
            NotificationCategory::User => "User",
            NotificationCategory::Social => "Social",
        }
    }

    /// Title prefix applied during enrichment.
    pub fn title_prefix(&self) -> &'static str {
        match self {
            NotificationCategory::System => "[SYSTEM] ",
            NotificationCategory::User => "[USER] ",
            NotificationCategory::Social => "[SOCIAL] ",
        }
    }

    /// Base offset for synthetic record ids, keeping ids distinct across categories
    /// within one response sequence.
    pub fn id_base(&self) -> i64 {
        match self {
            NotificationCategory::System => 0,
            NotificationCategory::User => 100,
            NotificationCategory::Social => 200,
        }
    }

    /// Hours subtracted from "now" before the per-index offset, so merged categories
    /// interleave into a meaningful chronological order.
    pub fn hour_offset(&self) -> i64 {
        match self {
            NotificationCategory::System => 0,
            NotificationCategory::User => 3,
            NotificationCategory::Social => 6,
        }
    }
}

/// Returns the title prefix for a record kind.
///
/// Unrecognized kinds deliberately map to the empty prefix and pass through
/// enrichment unchanged.
pub fn title_prefix_for(kind: &str) -> &'static str {
    match kind {
        "SYSTEM" => NotificationCategory::System.title_prefix(),
        "USER" => NotificationCategory::User.title_prefix(),
        "SOCIAL" => NotificationCategory::Social.title_prefix(),
        _ => "",
    }
}

/// Structured error body returned by both HTTP surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
    pub message: String,
    pub timestamp: NaiveDateTime,
    pub path: String,
}

impl ErrorResponse {
    /// Builds an error body stamped with the current time.
    pub fn new(
        status: u16,
        error: impl Into<String>,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            status,
            error: error.into(),
            message: message.into(),
            timestamp: chrono::Utc::now().naive_utc(),
            path: path.into(),
        }
    }
}

/// A stream request parameter violated its constraint.
///
/// Both the producer endpoint and the gateway client run this validation before any
/// stream or network work happens, and the message echoes the violated constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("userId must be positive")]
    UserId,

    #[error("limit must be positive")]
    Limit,
}

/// Validates the shared stream request parameters.
///
/// `user_id` must be positive; `limit`, when present, must be positive too. The
/// `filter` parameter is free-form and needs no validation.
pub fn validate_stream_params(user_id: i64, limit: Option<i64>) -> Result<(), ParameterError> {
    if user_id <= 0 {
        return Err(ParameterError::UserId);
    }

    if let Some(limit) = limit
        && limit <= 0
    {
        return Err(ParameterError::Limit);
    }

    Ok(())
}
