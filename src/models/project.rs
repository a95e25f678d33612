/// Project and member models
///
/// A project is the read-mostly aggregate the details screen is built
/// around. Its `users` list is the authoritative membership snapshot as of
/// the last fetch or attach; the client never edits membership locally.

use serde::{Deserialize, Serialize};

/// Member role within the system
///
/// A small closed set used for permission checks. Unrecognized roles
/// deserialize as `Unknown` and grant no capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,

    /// Can manage projects they created
    Manager,

    /// Regular member, read-only on project management actions
    Member,

    /// Role string the client does not recognize
    #[default]
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Converts role to its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Member => "member",
            Role::Unknown => "unknown",
        }
    }
}

/// A user as it appears in membership lists and the member picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Unique user ID
    #[serde(deserialize_with = "super::id::required")]
    pub id: i64,

    /// Display name
    pub name: String,

    /// Email address
    #[serde(default)]
    pub email: String,

    /// Role within the system
    #[serde(default)]
    pub role: Role,

    /// Job position, free-form
    #[serde(default)]
    pub position: Option<String>,
}

/// Project aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project ID
    #[serde(deserialize_with = "super::id::required")]
    pub id: i64,

    /// Project name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// User who created the project (drives the manager permission check)
    #[serde(default, deserialize_with = "super::id::optional")]
    pub created_by: Option<i64>,

    /// Membership snapshot as of the last fetch or attach
    #[serde(default)]
    pub users: Vec<Member>,
}

impl Project {
    /// Returns the ids of the current members, in list order
    pub fn member_ids(&self) -> Vec<i64> {
        self.users.iter().map(|u| u.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::Manager.as_str(), "manager");
        assert_eq!(Role::Member.as_str(), "member");
        assert_eq!(Role::Unknown.as_str(), "unknown");
    }

    #[test]
    fn test_unknown_role_deserializes() {
        let member: Member =
            serde_json::from_str(r#"{"id": 1, "name": "A", "role": "superuser"}"#).unwrap();
        assert_eq!(member.role, Role::Unknown);
    }

    #[test]
    fn test_project_tolerates_string_ids_and_missing_fields() {
        let project: Project = serde_json::from_str(
            r#"{"id": "7", "name": "Apollo", "created_by": "3"}"#,
        )
        .unwrap();
        assert_eq!(project.id, 7);
        assert_eq!(project.created_by, Some(3));
        assert!(project.users.is_empty());
        assert!(project.description.is_none());
    }

    #[test]
    fn test_member_ids_preserve_order() {
        let project: Project = serde_json::from_str(
            r#"{"id": 1, "name": "P", "users": [
                {"id": 5, "name": "E", "role": "member"},
                {"id": 2, "name": "B", "role": "admin"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(project.member_ids(), vec![5, 2]);
    }
}
