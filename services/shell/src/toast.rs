//! Toast notification queue
//!
//! Toasts carry their own creation time and duration; `expire` drops
//! everything whose deadline is at or before the given instant. Actions
//! are data, resolved by the owning `AppContext`.

use chrono::{DateTime, Duration, Utc};
use persistence::Language;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_DURATION_MS: i64 = 4000;
pub const MAX_ACTIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToastKind {
    #[default]
    Neutral,
    Success,
    Danger,
    Warning,
    Info,
    InProgress,
}

impl ToastKind {
    /// Colour of the countdown bar.
    pub fn timer_color(self) -> &'static str {
        match self {
            ToastKind::Neutral | ToastKind::InProgress | ToastKind::Success => "#16c284",
            ToastKind::Danger => "#ff3b46",
            ToastKind::Warning => "#f97316",
            ToastKind::Info => "#3b82f6",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionVariant {
    #[default]
    Primary,
    Secondary,
}

/// What pressing a toast button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToastCommand {
    RevertLanguage { to: Language },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastAction {
    pub label: String,
    pub variant: ActionVariant,
    pub command: ToastCommand,
}

/// A toast before it is queued.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToastRequest {
    pub kind: ToastKind,
    pub title: String,
    pub body: Option<String>,
    pub actions: Vec<ToastAction>,
    pub duration_ms: Option<i64>,
}

impl ToastRequest {
    pub fn new(kind: ToastKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn action(mut self, action: ToastAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn duration_ms(mut self, ms: i64) -> Self {
        self.duration_ms = Some(ms);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub title: String,
    pub body: Option<String>,
    pub actions: Vec<ToastAction>,
    pub created_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl Toast {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::milliseconds(self.duration_ms)
    }
}

/// Visible toasts, oldest first.
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a toast and return its id. Extra actions beyond the button
    /// limit are dropped.
    pub fn push(&mut self, request: ToastRequest, now: DateTime<Utc>) -> Uuid {
        let id = Uuid::now_v7();
        let mut actions = request.actions;
        actions.truncate(MAX_ACTIONS);
        let duration_ms = request.duration_ms.unwrap_or(DEFAULT_DURATION_MS).max(0);

        debug!(%id, kind = ?request.kind, title = %request.title, "Toast pushed");
        self.toasts.push(Toast {
            id,
            kind: request.kind,
            title: request.title,
            body: request.body,
            actions,
            created_at: now,
            duration_ms,
        });
        id
    }

    pub fn dismiss(&mut self, id: Uuid) -> Option<Toast> {
        let pos = self.toasts.iter().position(|t| t.id == id)?;
        Some(self.toasts.remove(pos))
    }

    /// Drop expired toasts; returns how many went.
    pub fn expire(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.expires_at() > now);
        before - self.toasts.len()
    }

    pub fn get(&self, id: Uuid) -> Option<&Toast> {
        self.toasts.iter().find(|t| t.id == id)
    }

    pub fn visible(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_default_duration() {
        let mut queue = ToastQueue::new();
        let id = queue.push(ToastRequest::new(ToastKind::Info, "hello"), t0());
        let toast = queue.get(id).unwrap();
        assert_eq!(toast.duration_ms, DEFAULT_DURATION_MS);
        assert_eq!(toast.expires_at(), t0() + Duration::milliseconds(4000));
    }

    #[test]
    fn test_expire_at_deadline() {
        let mut queue = ToastQueue::new();
        queue.push(ToastRequest::new(ToastKind::Neutral, "a"), t0());
        queue.push(
            ToastRequest::new(ToastKind::Warning, "b").duration_ms(10_000),
            t0(),
        );

        assert_eq!(queue.expire(t0() + Duration::milliseconds(3999)), 0);
        assert_eq!(queue.expire(t0() + Duration::milliseconds(4000)), 1);
        assert_eq!(queue.visible()[0].title, "b");
        assert_eq!(queue.expire(t0() + Duration::seconds(10)), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dismiss() {
        let mut queue = ToastQueue::new();
        let a = queue.push(ToastRequest::new(ToastKind::Success, "a"), t0());
        let b = queue.push(ToastRequest::new(ToastKind::Danger, "b"), t0());
        assert_ne!(a, b);

        assert_eq!(queue.dismiss(a).map(|t| t.title), Some("a".to_string()));
        assert!(queue.dismiss(a).is_none());
        assert_eq!(queue.len(), 1);
        assert!(queue.get(b).is_some());
    }

    #[test]
    fn test_actions_capped() {
        let action = ToastAction {
            label: "Revert".into(),
            variant: ActionVariant::Secondary,
            command: ToastCommand::RevertLanguage { to: Language::English },
        };
        let request = ToastRequest::new(ToastKind::Success, "x")
            .action(action.clone())
            .action(action.clone())
            .action(action);
        let mut queue = ToastQueue::new();
        let id = queue.push(request, t0());
        assert_eq!(queue.get(id).unwrap().actions.len(), MAX_ACTIONS);
    }

    #[test]
    fn test_kind_serde_is_kebab() {
        assert_eq!(
            serde_json::to_string(&ToastKind::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(ToastKind::Danger.timer_color(), "#ff3b46");
    }
}
