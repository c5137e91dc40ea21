use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSender {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub verification_badge: bool,
}

/// Sender reference carried on snoozed items (no verification badge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderRef {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Approve,
    Review,
    Respond,
    Delegate,
    Schedule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMetadata {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Priority score in [0, 100].
    pub score: f64,
    pub deadline_iso: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadContext {
    pub message_count: u32,
    pub participants: u32,
    pub last_activity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardContent {
    pub sender: EmailSender,
    pub subject: String,
    pub preview: String,
    pub action_metadata: ActionMetadata,
    pub thread_context: ThreadContext,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandCard {
    pub id: String,
    pub gmail_thread_id: String,
    pub content: CardContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub highlights: Vec<String>,
    pub source: String,
    pub is_new: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarItemType {
    Event,
    Deadline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarItem {
    pub id: String,
    pub title: String,
    pub time: String,
    pub duration: String,
    #[serde(rename = "type")]
    pub item_type: CalendarItemType,
    pub location: Option<String>,
    pub attendees: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub thread_id: String,
    pub subject: String,
    pub waiting_since_iso: String,
    pub waiting_since_label: String,
    pub recipient: String,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStats {
    pub actions_resolved: u32,
    pub critical_handled: u32,
    pub average_response_time: String,
    /// Fraction of focused time in [0, 1].
    pub focus_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebriefStatistics {
    pub today: TimelineStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebriefSnapshot {
    pub statistics: DebriefStatistics,
    pub follow_ups: Vec<FollowUp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnoozedItem {
    pub id: String,
    pub gmail_thread_id: String,
    pub sender: SenderRef,
    pub subject: String,
    pub snooze_until_label: String,
    pub snooze_until_iso: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwaitingReply {
    pub id: String,
    pub gmail_thread_id: String,
    pub email: String,
    pub subject: String,
    pub last_sent_label: String,
    pub days_waiting: u32,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    pub commands: Vec<CommandCard>,
    pub insights: Vec<Insight>,
    pub calendar: Vec<CalendarItem>,
    pub debrief: DebriefSnapshot,
    pub snoozed: Vec<SnoozedItem>,
    pub awaiting_replies: Vec<AwaitingReply>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceMeta {
    pub updated_at: String,
}

/// Per-slice freshness timestamps driving cache validator computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMeta {
    pub commands: SliceMeta,
    pub insights: SliceMeta,
    pub timeline: SliceMeta,
    pub calendar: SliceMeta,
    pub snoozed: SliceMeta,
}

impl DashboardMeta {
    /// Slices in declaration order (the order refresh params are reported in).
    pub fn slices(&self) -> [(&'static str, &str); 5] {
        [
            ("commands", self.commands.updated_at.as_str()),
            ("insights", self.insights.updated_at.as_str()),
            ("timeline", self.timeline.updated_at.as_str()),
            ("calendar", self.calendar.updated_at.as_str()),
            ("snoozed", self.snoozed.updated_at.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub workspace_ids: Vec<String>,
    pub active_workspace_id: Option<String>,
}

impl Session {
    pub fn can_access(&self, workspace_id: &str) -> bool {
        !workspace_id.is_empty() && self.workspace_ids.iter().any(|id| id == workspace_id)
    }
}
