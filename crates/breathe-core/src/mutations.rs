use crate::model::{ActionMetadata, AwaitingReply, CommandCard, FollowUp, WorkspaceSnapshot};
use crate::time::parse_rfc3339;
use crate::validate::{validate_snapshot, ValidationError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Injected time source so transitions stay deterministic under test.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkspaceMutationError {
    #[error("We couldn't find that item.")]
    NotFound,
    #[error("This item was already updated.")]
    Conflict,
    #[error("Please check the form and try again.")]
    Validation,
}

impl WorkspaceMutationError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Validation => 422,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Open,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpStatus {
    Waiting,
    Nudged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AwaitingReplyStatus {
    Waiting,
    Snoozed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderChannel {
    Email,
    Telegram,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteCommandPayload {
    pub action_metadata: ActionMetadata,
    pub completed_at_iso: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NudgeFollowUpPayload {
    pub reminder_channel: ReminderChannel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnoozeAwaitingReplyPayload {
    pub snooze_until_iso: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResolution {
    pub id: String,
    pub status: CommandStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedToday {
    pub actions_resolved: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStatistics {
    pub today: ResolvedToday,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebriefTotals {
    pub statistics: ResolvedStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteCommandResult {
    pub command: CommandResolution,
    pub debrief: DebriefTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NudgedFollowUp {
    pub thread_id: String,
    pub nudged_at_iso: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NudgeFollowUpResult {
    pub follow_up: NudgedFollowUp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnoozedReply {
    pub id: String,
    pub status: AwaitingReplyStatus,
    pub snooze_until_iso: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnoozedSnapshot {
    pub id: String,
    pub snooze_until_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnoozeAwaitingReplyResult {
    pub awaiting_reply: SnoozedReply,
    pub snoozed: Vec<SnoozedSnapshot>,
}

#[derive(Debug, Clone)]
struct CommandState {
    card: CommandCard,
    status: CommandStatus,
    completed_at_iso: Option<String>,
    note: Option<String>,
}

#[derive(Debug, Clone)]
struct FollowUpState {
    item: FollowUp,
    status: FollowUpStatus,
    nudged_at_iso: Option<String>,
    reminder_channel: Option<ReminderChannel>,
    message: Option<String>,
}

#[derive(Debug, Clone)]
struct AwaitingReplyState {
    item: AwaitingReply,
    status: AwaitingReplyStatus,
    snooze_until_iso: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Clone)]
enum CachedResult {
    Complete(CompleteCommandResult),
    Nudge(NudgeFollowUpResult),
    Snooze(SnoozeAwaitingReplyResult),
}

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub action: &'static str,
    pub entity_id: String,
    pub at: DateTime<Utc>,
}

const MAX_TEXT_LEN: usize = 500;

/// In-memory mutation service for one workspace. Owns its entity maps for
/// the lifetime of the instance; callers needing cross-request exclusion
/// wrap it in a mutex.
pub struct WorkspaceMutationService {
    workspace_id: String,
    commands: HashMap<String, CommandState>,
    follow_ups: HashMap<String, FollowUpState>,
    awaiting_replies: HashMap<String, AwaitingReplyState>,
    snoozed: BTreeMap<String, SnoozedSnapshot>,
    actions_resolved: u32,
    audit_log: Vec<AuditEntry>,
    idempotency: HashMap<String, CachedResult>,
    now: Clock,
}

impl WorkspaceMutationService {
    pub fn new(
        workspace_id: impl Into<String>,
        snapshot: WorkspaceSnapshot,
        now: Clock,
    ) -> Result<Self, ValidationError> {
        validate_snapshot(&snapshot)?;

        let commands = snapshot
            .commands
            .into_iter()
            .map(|card| {
                (
                    card.id.clone(),
                    CommandState {
                        card,
                        status: CommandStatus::Open,
                        completed_at_iso: None,
                        note: None,
                    },
                )
            })
            .collect();

        let follow_ups = snapshot
            .debrief
            .follow_ups
            .into_iter()
            .map(|item| {
                (
                    item.thread_id.clone(),
                    FollowUpState {
                        item,
                        status: FollowUpStatus::Waiting,
                        nudged_at_iso: None,
                        reminder_channel: None,
                        message: None,
                    },
                )
            })
            .collect();

        let awaiting_replies = snapshot
            .awaiting_replies
            .into_iter()
            .map(|item| {
                (
                    item.id.clone(),
                    AwaitingReplyState {
                        item,
                        status: AwaitingReplyStatus::Waiting,
                        snooze_until_iso: None,
                        reason: None,
                    },
                )
            })
            .collect();

        let snoozed = snapshot
            .snoozed
            .iter()
            .map(|item| {
                (
                    item.id.clone(),
                    SnoozedSnapshot {
                        id: item.id.clone(),
                        snooze_until_label: item.snooze_until_label.clone(),
                    },
                )
            })
            .collect();

        Ok(Self {
            workspace_id: workspace_id.into(),
            commands,
            follow_ups,
            awaiting_replies,
            snoozed,
            actions_resolved: snapshot.debrief.statistics.today.actions_resolved,
            audit_log: Vec::new(),
            idempotency: HashMap::new(),
            now,
        })
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    pub fn actions_resolved(&self) -> u32 {
        self.actions_resolved
    }

    pub fn audit_log(&self) -> &[AuditEntry] {
        &self.audit_log
    }

    pub fn command_status(&self, command_id: &str) -> Option<CommandStatus> {
        self.commands.get(command_id).map(|state| state.status)
    }

    fn check_workspace(&self, provided: &str) -> Result<(), WorkspaceMutationError> {
        if self.workspace_id != provided {
            return Err(WorkspaceMutationError::NotFound);
        }
        Ok(())
    }

    fn memo_key(
        &self,
        operation: &str,
        entity_id: &str,
        idempotency_key: &str,
    ) -> Result<String, WorkspaceMutationError> {
        // Client keys must be UUID-shaped; anything else is a payload error.
        Uuid::parse_str(idempotency_key).map_err(|_| WorkspaceMutationError::Validation)?;
        Ok(format!(
            "{}:{operation}:{entity_id}:{idempotency_key}",
            self.workspace_id
        ))
    }

    pub fn complete_command(
        &mut self,
        workspace_id: &str,
        command_id: &str,
        payload: &CompleteCommandPayload,
        idempotency_key: &str,
    ) -> Result<CompleteCommandResult, WorkspaceMutationError> {
        self.check_workspace(workspace_id)?;
        let memo_key = self.memo_key("command.complete", command_id, idempotency_key)?;
        if let Some(CachedResult::Complete(result)) = self.idempotency.get(&memo_key) {
            return Ok(result.clone());
        }

        let state = self
            .commands
            .get_mut(command_id)
            .ok_or(WorkspaceMutationError::NotFound)?;
        if state.status == CommandStatus::Resolved {
            return Err(WorkspaceMutationError::Conflict);
        }

        parse_rfc3339(&payload.completed_at_iso).ok_or(WorkspaceMutationError::Validation)?;
        let note = payload.note.trim();
        if note.is_empty() {
            return Err(WorkspaceMutationError::Validation);
        }
        check_metadata_consistency(&state.card.content.action_metadata, &payload.action_metadata)?;

        state.status = CommandStatus::Resolved;
        state.completed_at_iso = Some(payload.completed_at_iso.clone());
        state.note = Some(note.to_string());
        self.actions_resolved += 1;
        let at = (self.now)();
        self.audit_log.push(AuditEntry {
            action: "complete",
            entity_id: command_id.to_string(),
            at,
        });

        let result = CompleteCommandResult {
            command: CommandResolution {
                id: command_id.to_string(),
                status: CommandStatus::Resolved,
            },
            debrief: DebriefTotals {
                statistics: ResolvedStatistics {
                    today: ResolvedToday {
                        actions_resolved: self.actions_resolved,
                    },
                },
            },
        };
        self.idempotency
            .insert(memo_key, CachedResult::Complete(result.clone()));
        Ok(result)
    }

    pub fn nudge_follow_up(
        &mut self,
        workspace_id: &str,
        thread_id: &str,
        payload: &NudgeFollowUpPayload,
        idempotency_key: &str,
    ) -> Result<NudgeFollowUpResult, WorkspaceMutationError> {
        self.check_workspace(workspace_id)?;
        let memo_key = self.memo_key("followUp.nudge", thread_id, idempotency_key)?;
        if let Some(CachedResult::Nudge(result)) = self.idempotency.get(&memo_key) {
            return Ok(result.clone());
        }

        let state = self
            .follow_ups
            .get_mut(thread_id)
            .ok_or(WorkspaceMutationError::NotFound)?;
        if state.status == FollowUpStatus::Nudged {
            return Err(WorkspaceMutationError::Conflict);
        }

        let message = checked_text(&payload.message)?;

        let nudged_at_iso = (self.now)().to_rfc3339_opts(SecondsFormat::Millis, true);
        state.status = FollowUpStatus::Nudged;
        state.nudged_at_iso = Some(nudged_at_iso.clone());
        state.reminder_channel = Some(payload.reminder_channel);
        state.message = Some(message);
        let at = (self.now)();
        self.audit_log.push(AuditEntry {
            action: "nudge",
            entity_id: thread_id.to_string(),
            at,
        });

        let result = NudgeFollowUpResult {
            follow_up: NudgedFollowUp {
                thread_id: thread_id.to_string(),
                nudged_at_iso,
            },
        };
        self.idempotency
            .insert(memo_key, CachedResult::Nudge(result.clone()));
        Ok(result)
    }

    pub fn snooze_awaiting_reply(
        &mut self,
        workspace_id: &str,
        awaiting_reply_id: &str,
        payload: &SnoozeAwaitingReplyPayload,
        idempotency_key: &str,
    ) -> Result<SnoozeAwaitingReplyResult, WorkspaceMutationError> {
        self.check_workspace(workspace_id)?;
        let memo_key = self.memo_key("awaitingReply.snooze", awaiting_reply_id, idempotency_key)?;
        if let Some(CachedResult::Snooze(result)) = self.idempotency.get(&memo_key) {
            return Ok(result.clone());
        }

        let state = self
            .awaiting_replies
            .get_mut(awaiting_reply_id)
            .ok_or(WorkspaceMutationError::NotFound)?;
        if state.status == AwaitingReplyStatus::Snoozed {
            return Err(WorkspaceMutationError::Conflict);
        }

        let snooze_until =
            parse_rfc3339(&payload.snooze_until_iso).ok_or(WorkspaceMutationError::Validation)?;
        if snooze_until <= (self.now)() {
            return Err(WorkspaceMutationError::Validation);
        }
        let reason = checked_text(&payload.reason)?;

        state.status = AwaitingReplyStatus::Snoozed;
        state.snooze_until_iso = Some(payload.snooze_until_iso.clone());
        state.reason = Some(reason);
        self.snoozed.insert(
            awaiting_reply_id.to_string(),
            SnoozedSnapshot {
                id: awaiting_reply_id.to_string(),
                snooze_until_label: payload.snooze_until_iso.clone(),
            },
        );
        let at = (self.now)();
        self.audit_log.push(AuditEntry {
            action: "snooze",
            entity_id: awaiting_reply_id.to_string(),
            at,
        });

        let result = SnoozeAwaitingReplyResult {
            awaiting_reply: SnoozedReply {
                id: awaiting_reply_id.to_string(),
                status: AwaitingReplyStatus::Snoozed,
                snooze_until_iso: payload.snooze_until_iso.clone(),
            },
            snoozed: self
                .snoozed
                .values()
                .filter(|item| item.id == awaiting_reply_id)
                .cloned()
                .collect(),
        };
        self.idempotency
            .insert(memo_key, CachedResult::Snooze(result.clone()));
        Ok(result)
    }
}

/// Trimmed, non-empty, at most 500 chars.
fn checked_text(value: &str) -> Result<String, WorkspaceMutationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(WorkspaceMutationError::Validation);
    }
    Ok(trimmed.to_string())
}

/// Stale-client protection: the payload must echo the stored metadata.
fn check_metadata_consistency(
    stored: &ActionMetadata,
    provided: &ActionMetadata,
) -> Result<(), WorkspaceMutationError> {
    if stored.action_type != provided.action_type
        || stored.score != provided.score
        || stored.deadline_iso != provided.deadline_iso
    {
        return Err(WorkspaceMutationError::Validation);
    }
    Ok(())
}
