//! Permission levels
//!
//! Levels form a total order, lowest to highest: None < View < Edit < Owner.
//! Only View and Edit are ever stored (as [`ShareLevel`]); Owner is derived
//! from `tasks.owner_id` and None means no access at all.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::share::ShareLevel;

/// A user's access level on a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPermission {
    /// No access
    None,

    /// Shared read access
    View,

    /// Shared write access
    Edit,

    /// The task's owner
    Owner,
}

impl TaskPermission {
    /// Converts permission to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPermission::None => "none",
            TaskPermission::View => "view",
            TaskPermission::Edit => "edit",
            TaskPermission::Owner => "owner",
        }
    }

    /// Returns numeric level for comparison
    pub fn rank(&self) -> u8 {
        match self {
            TaskPermission::None => 0,
            TaskPermission::View => 1,
            TaskPermission::Edit => 2,
            TaskPermission::Owner => 3,
        }
    }

    /// Checks if this level satisfies `required`
    pub fn meets(&self, required: TaskPermission) -> bool {
        self.rank() >= required.rank()
    }

    /// Returns true for anything above None
    pub fn has_access(&self) -> bool {
        self.meets(TaskPermission::View)
    }
}

impl From<ShareLevel> for TaskPermission {
    fn from(level: ShareLevel) -> Self {
        match level {
            ShareLevel::View => TaskPermission::View,
            ShareLevel::Edit => TaskPermission::Edit,
        }
    }
}

impl fmt::Display for TaskPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true iff `actual` is at least `required`
pub fn meets(actual: TaskPermission, required: TaskPermission) -> bool {
    actual.meets(required)
}

/// Operations a handler performs on a task or one of its sub-resources
///
/// Each operation has a fixed minimum level so handlers never pick one ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOperation {
    /// Read the task itself
    ViewTask,

    /// Change title, description or completion
    UpdateTask,

    /// Delete the task (and everything attached to it)
    DeleteTask,

    /// List who the task is shared with
    ListShares,

    /// Share, re-level or unshare
    ManageShares,

    /// Read the task's comments
    ListComments,

    /// Post a comment
    AddComment,

    /// List attached files
    ListFiles,

    /// Download an attached file
    DownloadFile,

    /// Attach a file
    UploadFile,

    /// Remove an attached file
    DeleteFile,

    /// Read the task's activity timeline
    ViewTimeline,
}

impl TaskOperation {
    /// Gets the minimum permission required for this operation
    pub fn required_permission(&self) -> TaskPermission {
        match self {
            TaskOperation::ViewTask
            | TaskOperation::ListComments
            | TaskOperation::AddComment
            | TaskOperation::ListFiles
            | TaskOperation::DownloadFile
            | TaskOperation::ViewTimeline => TaskPermission::View,

            TaskOperation::UpdateTask | TaskOperation::UploadFile | TaskOperation::DeleteFile => {
                TaskPermission::Edit
            }

            TaskOperation::DeleteTask | TaskOperation::ListShares | TaskOperation::ManageShares => {
                TaskPermission::Owner
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TaskPermission; 4] = [
        TaskPermission::None,
        TaskPermission::View,
        TaskPermission::Edit,
        TaskPermission::Owner,
    ];

    #[test]
    fn test_permission_as_str() {
        assert_eq!(TaskPermission::None.as_str(), "none");
        assert_eq!(TaskPermission::View.as_str(), "view");
        assert_eq!(TaskPermission::Edit.as_str(), "edit");
        assert_eq!(TaskPermission::Owner.as_str(), "owner");
    }

    #[test]
    fn test_meets_matches_rank() {
        for actual in ALL {
            for required in ALL {
                assert_eq!(meets(actual, required), actual.rank() >= required.rank());
                // Derived ordering agrees with the explicit ranks
                assert_eq!(actual >= required, meets(actual, required));
            }
        }
    }

    #[test]
    fn test_meets_is_monotonic() {
        for level in ALL {
            for required in ALL {
                if !meets(level, required) {
                    continue;
                }
                for lower in ALL.iter().filter(|l| **l <= required) {
                    assert!(meets(level, *lower), "{} should meet {}", level, lower);
                }
            }
        }
    }

    #[test]
    fn test_none_only_meets_none() {
        assert!(meets(TaskPermission::None, TaskPermission::None));
        assert!(!meets(TaskPermission::None, TaskPermission::View));
        assert!(!TaskPermission::None.has_access());
        assert!(TaskPermission::View.has_access());
    }

    #[test]
    fn test_from_share_level() {
        assert_eq!(TaskPermission::from(ShareLevel::View), TaskPermission::View);
        assert_eq!(TaskPermission::from(ShareLevel::Edit), TaskPermission::Edit);
    }

    #[test]
    fn test_operation_minimums() {
        assert_eq!(TaskOperation::ViewTask.required_permission(), TaskPermission::View);
        assert_eq!(TaskOperation::AddComment.required_permission(), TaskPermission::View);
        assert_eq!(TaskOperation::DownloadFile.required_permission(), TaskPermission::View);
        assert_eq!(TaskOperation::ViewTimeline.required_permission(), TaskPermission::View);
        assert_eq!(TaskOperation::UpdateTask.required_permission(), TaskPermission::Edit);
        assert_eq!(TaskOperation::UploadFile.required_permission(), TaskPermission::Edit);
        assert_eq!(TaskOperation::DeleteFile.required_permission(), TaskPermission::Edit);
        assert_eq!(TaskOperation::DeleteTask.required_permission(), TaskPermission::Owner);
        assert_eq!(TaskOperation::ListShares.required_permission(), TaskPermission::Owner);
        assert_eq!(TaskOperation::ManageShares.required_permission(), TaskPermission::Owner);
    }
}
