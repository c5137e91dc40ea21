use crate::model::{ActionMetadata, AwaitingReply, CommandCard, FollowUp, WorkspaceSnapshot};
use crate::time::parse_rfc3339;
use thiserror::Error;

/// Structural validation failure. `field` is the path of the offending
/// field within the snapshot, e.g. `commands[0].content.actionMetadata.score`.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field}: expected an email address")]
    InvalidEmail { field: String },
    #[error("{field}: expected an RFC 3339 timestamp")]
    InvalidTimestamp { field: String },
    #[error("{field}: value {value} is out of range")]
    OutOfRange { field: String, value: f64 },
    #[error("{field}: must not be empty")]
    Empty { field: String },
}

fn check_email(field: &str, value: &str) -> Result<(), ValidationError> {
    let (local, domain) = value.split_once('@').ok_or(ValidationError::InvalidEmail {
        field: field.to_string(),
    })?;
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ValidationError::InvalidEmail {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn check_timestamp(field: &str, value: &str) -> Result<(), ValidationError> {
    parse_rfc3339(value)
        .map(|_| ())
        .ok_or(ValidationError::InvalidTimestamp {
            field: field.to_string(),
        })
}

fn check_nonempty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty {
            field: field.to_string(),
        });
    }
    Ok(())
}

pub fn validate_action_metadata(field: &str, meta: &ActionMetadata) -> Result<(), ValidationError> {
    if !(0.0..=100.0).contains(&meta.score) {
        return Err(ValidationError::OutOfRange {
            field: format!("{field}.score"),
            value: meta.score,
        });
    }
    if let Some(deadline) = &meta.deadline_iso {
        check_timestamp(&format!("{field}.deadlineIso"), deadline)?;
    }
    Ok(())
}

pub fn validate_command_card(field: &str, card: &CommandCard) -> Result<(), ValidationError> {
    check_nonempty(&format!("{field}.id"), &card.id)?;
    check_email(&format!("{field}.content.sender.email"), &card.content.sender.email)?;
    validate_action_metadata(
        &format!("{field}.content.actionMetadata"),
        &card.content.action_metadata,
    )?;
    if card.content.thread_context.participants < 1 {
        return Err(ValidationError::OutOfRange {
            field: format!("{field}.content.threadContext.participants"),
            value: f64::from(card.content.thread_context.participants),
        });
    }
    Ok(())
}

pub fn validate_follow_up(field: &str, item: &FollowUp) -> Result<(), ValidationError> {
    check_nonempty(&format!("{field}.threadId"), &item.thread_id)?;
    check_timestamp(&format!("{field}.waitingSinceIso"), &item.waiting_since_iso)?;
    check_email(&format!("{field}.recipient"), &item.recipient)?;
    Ok(())
}

pub fn validate_awaiting_reply(field: &str, item: &AwaitingReply) -> Result<(), ValidationError> {
    check_nonempty(&format!("{field}.id"), &item.id)?;
    check_email(&format!("{field}.email"), &item.email)?;
    Ok(())
}

/// Parse-or-fail boundary check: the first structural violation wins.
pub fn validate_snapshot(snapshot: &WorkspaceSnapshot) -> Result<(), ValidationError> {
    for (i, card) in snapshot.commands.iter().enumerate() {
        validate_command_card(&format!("commands[{i}]"), card)?;
    }
    for (i, insight) in snapshot.insights.iter().enumerate() {
        check_nonempty(&format!("insights[{i}].id"), &insight.id)?;
    }
    for (i, item) in snapshot.calendar.iter().enumerate() {
        check_nonempty(&format!("calendar[{i}].id"), &item.id)?;
    }
    let focus = snapshot.debrief.statistics.today.focus_score;
    if !(0.0..=1.0).contains(&focus) {
        return Err(ValidationError::OutOfRange {
            field: "debrief.statistics.today.focusScore".to_string(),
            value: focus,
        });
    }
    for (i, item) in snapshot.debrief.follow_ups.iter().enumerate() {
        validate_follow_up(&format!("debrief.followUps[{i}]"), item)?;
    }
    for (i, item) in snapshot.snoozed.iter().enumerate() {
        check_nonempty(&format!("snoozed[{i}].id"), &item.id)?;
        check_timestamp(&format!("snoozed[{i}].snoozeUntilIso"), &item.snooze_until_iso)?;
    }
    for (i, item) in snapshot.awaiting_replies.iter().enumerate() {
        validate_awaiting_reply(&format!("awaitingReplies[{i}]"), item)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::workspace_fixture;

    #[test]
    fn fixture_passes_validation() {
        validate_snapshot(&workspace_fixture()).unwrap();
    }

    #[test]
    fn out_of_range_score_reports_field_path() {
        let mut snapshot = workspace_fixture();
        snapshot.commands[1].content.action_metadata.score = 250.0;
        let err = validate_snapshot(&snapshot).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                field: "commands[1].content.actionMetadata.score".to_string(),
                value: 250.0,
            }
        );
    }

    #[test]
    fn bad_recipient_reports_field_path() {
        let mut snapshot = workspace_fixture();
        snapshot.debrief.follow_ups[0].recipient = "not-an-email".to_string();
        let err = validate_snapshot(&snapshot).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidEmail {
                field: "debrief.followUps[0].recipient".to_string(),
            }
        );
    }

    #[test]
    fn first_violation_wins() {
        let mut snapshot = workspace_fixture();
        snapshot.commands[0].id = String::new();
        snapshot.awaiting_replies[0].email = "broken".to_string();
        let err = validate_snapshot(&snapshot).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Empty {
                field: "commands[0].id".to_string(),
            }
        );
    }
}
