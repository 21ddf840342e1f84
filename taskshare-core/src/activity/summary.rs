//! Human-readable activity summaries
//!
//! Renders an entry as one line such as `alice shared task with bob (edit)`.
//! Missing detail fields fall back to neutral words instead of failing.

use serde_json::Value as JsonValue;

use crate::models::activity::{ActivityAction, ActivityLog, ResourceType};

fn detail<'a>(details: &'a JsonValue, key: &str, fallback: &'a str) -> &'a str {
    details.get(key).and_then(JsonValue::as_str).unwrap_or(fallback)
}

/// Renders `log` as one line
///
/// `username` is the actor's name; `None` renders as `User <id>`.
pub fn summary(log: &ActivityLog, username: Option<&str>) -> String {
    let actor = username
        .map(str::to_string)
        .unwrap_or_else(|| format!("User {}", log.user_id));
    let resource = format!("{} #{}", log.resource_type.as_str(), log.resource_id);

    let Some(details) = log.details.as_ref() else {
        return format!("{} {} {}", actor, log.action.as_str(), resource);
    };

    match (log.resource_type, log.action) {
        (ResourceType::Task, ActivityAction::Created) => {
            format!("{} created task '{}'", actor, detail(details, "title", ""))
        }
        (ResourceType::Task, ActivityAction::Updated) => {
            match details.get("changed_fields").and_then(JsonValue::as_array) {
                Some(fields) => {
                    let fields: Vec<&str> = fields.iter().filter_map(JsonValue::as_str).collect();
                    format!("{} updated {}", actor, fields.join(", "))
                }
                None => format!("{} updated {}", actor, resource),
            }
        }
        (ResourceType::Task, ActivityAction::Deleted) => {
            format!("{} deleted task '{}'", actor, detail(details, "title", ""))
        }
        (ResourceType::Task, ActivityAction::Shared) => format!(
            "{} shared task with {} ({})",
            actor,
            detail(details, "shared_with_username", "someone"),
            detail(details, "permission", "access"),
        ),
        (ResourceType::Task, ActivityAction::ShareUpdated) => format!(
            "{} changed {}'s access to task ({} -> {})",
            actor,
            detail(details, "shared_with_username", "someone"),
            detail(details, "old_permission", "?"),
            detail(details, "new_permission", "?"),
        ),
        (ResourceType::Task, ActivityAction::Unshared) => format!(
            "{} removed {}'s access to task",
            actor,
            detail(details, "unshared_username", "someone"),
        ),
        (ResourceType::Comment, ActivityAction::Created) => format!("{} added a comment", actor),
        (ResourceType::Comment, ActivityAction::Updated) => format!("{} edited a comment", actor),
        (ResourceType::Comment, ActivityAction::Deleted) => format!("{} deleted a comment", actor),
        (ResourceType::File, ActivityAction::Uploaded) => {
            format!("{} uploaded {}", actor, detail(details, "filename", "a file"))
        }
        (ResourceType::File, ActivityAction::Deleted) => {
            format!("{} deleted {}", actor, detail(details, "filename", "a file"))
        }
        _ => format!("{} {} {}", actor, log.action.as_str(), resource),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::NewActivity;
    use crate::models::comment::TaskComment;
    use crate::models::file::TaskFile;
    use crate::models::share::ShareLevel;
    use crate::models::task::Task;
    use crate::models::user::User;
    use chrono::Utc;
    use serde_json::json;

    fn bob() -> User {
        User {
            id: 2,
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            created_at: Utc::now(),
        }
    }

    fn to_log(entry: NewActivity) -> ActivityLog {
        ActivityLog {
            id: 1,
            user_id: entry.user_id,
            action: entry.action,
            resource_type: entry.resource_type,
            resource_id: entry.resource_id,
            details: entry.details,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_share_summaries() {
        let shared = to_log(NewActivity::task_shared(1, 10, &bob(), ShareLevel::Edit));
        assert_eq!(
            summary(&shared, Some("alice")),
            "alice shared task with bob (edit)"
        );

        let updated = to_log(NewActivity::share_updated(
            1,
            10,
            &bob(),
            ShareLevel::View,
            ShareLevel::Edit,
        ));
        assert_eq!(
            summary(&updated, Some("alice")),
            "alice changed bob's access to task (view -> edit)"
        );

        let unshared = to_log(NewActivity::task_unshared(1, 10, &bob()));
        assert_eq!(
            summary(&unshared, Some("alice")),
            "alice removed bob's access to task"
        );
    }

    #[test]
    fn test_task_comment_and_file_summaries() {
        let before = Task {
            id: 10,
            owner_id: 1,
            title: "Launch".to_string(),
            description: None,
            completed: false,
            created_at: Utc::now(),
        };
        let after = Task {
            description: Some("Ship it".to_string()),
            completed: true,
            ..before.clone()
        };
        let comment = TaskComment {
            id: 5,
            task_id: 10,
            user_id: 2,
            content: "Looks good".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };
        let file = TaskFile {
            id: 4,
            task_id: 10,
            original_filename: "plan.pdf".to_string(),
            stored_filename: "a1b2c3.pdf".to_string(),
            file_size: 2048,
            content_type: None,
            uploaded_at: Utc::now(),
        };

        let cases = [
            (NewActivity::task_created(1, &before), "alice created task 'Launch'"),
            (
                NewActivity::task_updated(1, &before, &after),
                "alice updated description, completed",
            ),
            (NewActivity::task_deleted(1, &after), "alice deleted task 'Launch'"),
            (NewActivity::comment_created(1, &comment), "alice added a comment"),
            (
                NewActivity::comment_updated(1, &comment, "Looks bad"),
                "alice edited a comment",
            ),
            (NewActivity::comment_deleted(1, &comment), "alice deleted a comment"),
            (NewActivity::file_uploaded(1, &file), "alice uploaded plan.pdf"),
            (NewActivity::file_deleted(1, &file), "alice deleted plan.pdf"),
        ];

        for (entry, expected) in cases {
            assert_eq!(summary(&to_log(entry), Some("alice")), expected);
        }
    }

    #[test]
    fn test_unknown_actor_and_no_details() {
        let log = ActivityLog {
            id: 1,
            user_id: 7,
            action: ActivityAction::Deleted,
            resource_type: ResourceType::Task,
            resource_id: 3,
            details: None,
            created_at: Utc::now(),
        };

        assert_eq!(summary(&log, None), "User 7 deleted task #3");
    }

    #[test]
    fn test_file_and_task_update_summaries() {
        let upload = ActivityLog {
            id: 1,
            user_id: 1,
            action: ActivityAction::Uploaded,
            resource_type: ResourceType::File,
            resource_id: 4,
            details: Some(json!({ "filename": "plan.pdf" })),
            created_at: Utc::now(),
        };
        assert_eq!(summary(&upload, Some("alice")), "alice uploaded plan.pdf");

        let update = ActivityLog {
            action: ActivityAction::Updated,
            resource_type: ResourceType::Task,
            details: Some(json!({ "changed_fields": ["title", "completed"] })),
            ..upload
        };
        assert_eq!(
            summary(&update, Some("alice")),
            "alice updated title, completed"
        );
    }
}
