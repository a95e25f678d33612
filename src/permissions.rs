/// Management capability predicate
///
/// Gates the create-task, create-event, and add-members actions. Pure and
/// recomputed on demand; nothing is cached.

use crate::models::{Project, Role};

/// Whether a user may manage a project
///
/// Admins manage every project; managers manage only projects they
/// created; everyone else is read-only.
pub fn can_manage(user_id: i64, role: Role, project: &Project) -> bool {
    match role {
        Role::Admin => true,
        Role::Manager => project.created_by == Some(user_id),
        Role::Member | Role::Unknown => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(created_by: Option<i64>) -> Project {
        Project {
            id: 1,
            name: "P".to_string(),
            description: None,
            created_by,
            users: vec![],
        }
    }

    #[test]
    fn test_admin_manages_everything() {
        assert!(can_manage(99, Role::Admin, &project(Some(1))));
        assert!(can_manage(99, Role::Admin, &project(None)));
    }

    #[test]
    fn test_manager_needs_ownership() {
        assert!(can_manage(5, Role::Manager, &project(Some(5))));
        assert!(!can_manage(5, Role::Manager, &project(Some(6))));
        assert!(!can_manage(5, Role::Manager, &project(None)));
    }

    #[test]
    fn test_members_and_unknown_roles_cannot_manage() {
        assert!(!can_manage(5, Role::Member, &project(Some(5))));
        assert!(!can_manage(5, Role::Unknown, &project(Some(5))));
    }
}
