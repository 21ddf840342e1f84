//! Comment authorship rule
//!
//! Any user with VIEW on a task may read and add comments. Changing an
//! existing comment is narrower:
//!
//! | Action | Allowed for                 |
//! |--------|-----------------------------|
//! | Edit   | the author                  |
//! | Delete | the author, the task owner  |
//!
//! Both actions still require VIEW on the parent task, so an author whose
//! share was revoked can no longer touch their old comments.

use tracing::warn;

use super::error::AccessError;
use super::permission::TaskPermission;
use super::resolver::AccessResolver;
use crate::models::{comment::TaskComment, task::Task, user::User};

/// A change to an existing comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    /// Change the text; only the author, while they can still see the task
    Edit,

    /// Remove the comment; the author or the task owner may
    Delete,
}

impl CommentAction {
    /// Converts action to the name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentAction::Edit => "edit",
            CommentAction::Delete => "delete",
        }
    }

    /// Decides the action given the user's permission on the parent task
    pub fn allowed(&self, comment: &TaskComment, user_id: i64, permission: TaskPermission) -> bool {
        if !permission.has_access() {
            return false;
        }

        match self {
            CommentAction::Edit => comment.is_authored_by(user_id),
            CommentAction::Delete => {
                comment.is_authored_by(user_id) || permission == TaskPermission::Owner
            }
        }
    }
}

impl AccessResolver {
    /// Checks that the user may edit or delete a comment
    ///
    /// # Errors
    ///
    /// - `AccessError::TaskNotFound` if the comment is not on `task`
    /// - `AccessError::AccessDenied` if the user cannot view the task
    /// - `AccessError::CommentDenied` if the user can view the task but the
    ///   authorship rule refuses the action
    pub async fn require_comment_action(
        &self,
        task: &Task,
        comment: &TaskComment,
        user: &User,
        action: CommentAction,
    ) -> Result<(), AccessError> {
        let permission = self
            .require_child(task, comment, user, TaskPermission::View)
            .await?;

        if !action.allowed(comment, user.id, permission) {
            warn!(
                comment_id = comment.id,
                user_id = user.id,
                action = action.as_str(),
                "Comment change refused"
            );
            return Err(AccessError::CommentDenied {
                comment_id: comment.id,
                user_id: user.id,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::share::{NewShare, ShareLevel};
    use crate::sharing::memory::InMemoryShareStore;
    use crate::sharing::store::ShareStore;
    use chrono::Utc;
    use std::sync::Arc;

    const OWNER: i64 = 1;
    const EDITOR: i64 = 2;
    const VIEWER: i64 = 3;

    fn user(id: i64) -> User {
        User {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            created_at: Utc::now(),
        }
    }

    fn comment(id: i64, task_id: i64, author: i64) -> TaskComment {
        TaskComment {
            id,
            task_id,
            user_id: author,
            content: "looks good".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    async fn setup() -> (AccessResolver, Arc<InMemoryShareStore>, Task) {
        let store = Arc::new(InMemoryShareStore::new());
        let task = Task {
            id: 100,
            owner_id: OWNER,
            title: "Release".to_string(),
            description: None,
            completed: false,
            created_at: Utc::now(),
        };

        for (grantee, level) in [(EDITOR, ShareLevel::Edit), (VIEWER, ShareLevel::View)] {
            store
                .insert(NewShare {
                    task_id: task.id,
                    shared_with_user_id: grantee,
                    shared_by_user_id: OWNER,
                    permission: level,
                })
                .await
                .unwrap();
        }

        (AccessResolver::new(store.clone()), store, task)
    }

    #[test]
    fn test_action_names() {
        assert_eq!(CommentAction::Edit.as_str(), "edit");
        assert_eq!(CommentAction::Delete.as_str(), "delete");
    }

    #[test]
    fn test_allowed_table() {
        let by_viewer = comment(1, 100, VIEWER);

        assert!(CommentAction::Edit.allowed(&by_viewer, VIEWER, TaskPermission::View));
        assert!(!CommentAction::Edit.allowed(&by_viewer, OWNER, TaskPermission::Owner));
        assert!(!CommentAction::Edit.allowed(&by_viewer, EDITOR, TaskPermission::Edit));

        assert!(CommentAction::Delete.allowed(&by_viewer, VIEWER, TaskPermission::View));
        assert!(CommentAction::Delete.allowed(&by_viewer, OWNER, TaskPermission::Owner));
        assert!(!CommentAction::Delete.allowed(&by_viewer, EDITOR, TaskPermission::Edit));

        // Authorship alone is not enough without access to the task
        assert!(!CommentAction::Edit.allowed(&by_viewer, VIEWER, TaskPermission::None));
    }

    #[tokio::test]
    async fn test_editor_cannot_edit_viewers_comment() {
        let (resolver, _, task) = setup().await;
        let c = comment(7, task.id, VIEWER);

        let err = resolver
            .require_comment_action(&task, &c, &user(EDITOR), CommentAction::Edit)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AccessError::CommentDenied { comment_id: 7, user_id: EDITOR }
        ));

        assert!(resolver
            .require_comment_action(&task, &c, &user(VIEWER), CommentAction::Edit)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_owner_may_delete_but_not_edit() {
        let (resolver, _, task) = setup().await;
        let c = comment(7, task.id, EDITOR);
        let owner = user(OWNER);

        assert!(resolver
            .require_comment_action(&task, &c, &owner, CommentAction::Delete)
            .await
            .is_ok());
        assert!(matches!(
            resolver
                .require_comment_action(&task, &c, &owner, CommentAction::Edit)
                .await,
            Err(AccessError::CommentDenied { .. })
        ));
    }

    #[tokio::test]
    async fn test_revoked_author_is_denied_task_access() {
        let (resolver, store, task) = setup().await;
        let c = comment(7, task.id, VIEWER);

        store.delete(task.id, VIEWER).await.unwrap();

        let err = resolver
            .require_comment_action(&task, &c, &user(VIEWER), CommentAction::Delete)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::AccessDenied { .. }));
    }
}
