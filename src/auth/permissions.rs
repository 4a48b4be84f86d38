//! Roles, permission levels and the per-operation access table

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Role carried in a user record and in token claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

impl Role {
    pub const ALL: [&'static str; 2] = ["admin", "member"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// What a route demands before its handler runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PermissionLevel {
    /// No token needed
    Public,
    /// Any valid token
    Authenticated,
    /// Valid token with role `admin`
    Admin,
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionLevel::Public => write!(f, "PUBLIC"),
            PermissionLevel::Authenticated => write!(f, "AUTHENTICATED"),
            PermissionLevel::Admin => write!(f, "ADMIN"),
        }
    }
}

/// Every operation the HTTP surface exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Health,
    OpenApiDocument,
    Register,
    Login,
    Me,

    ListUsers,
    GetUser,
    CreateUser,
    UpdateUser,
    DeleteUser,

    ListKegiatan,
    GetKegiatan,
    CreateKegiatan,
    UpdateKegiatan,
    DeleteKegiatan,

    ListKehadiran,
    GetKehadiran,
    CreateKehadiran,
    UpdateKehadiran,
    DeleteKehadiran,

    ListKategori,
    GetKategori,
    CreateKategori,
    UpdateKategori,
    DeleteKategori,

    Statistics,
}

impl Operation {
    /// Permission level the gates enforce for this operation.
    pub fn required_permission(self) -> PermissionLevel {
        use Operation::*;

        match self {
            // Public - health, credentials exchange and the kategori picker
            Health | OpenApiDocument | Register | Login | ListKategori => PermissionLevel::Public,

            // Authenticated - reads, plus members recording their own attendance
            Me
            | ListKegiatan
            | GetKegiatan
            | ListKehadiran
            | GetKehadiran
            | CreateKehadiran
            | GetKategori => PermissionLevel::Authenticated,

            // Admin - account management, mutations and statistics
            ListUsers
            | GetUser
            | CreateUser
            | UpdateUser
            | DeleteUser
            | CreateKegiatan
            | UpdateKegiatan
            | DeleteKegiatan
            | UpdateKehadiran
            | DeleteKehadiran
            | CreateKategori
            | UpdateKategori
            | DeleteKategori
            | Statistics => PermissionLevel::Admin,
        }
    }

    /// Short name for logging
    pub fn description(self) -> &'static str {
        use Operation::*;

        match self {
            Health => "Health check",
            OpenApiDocument => "OpenAPI document",
            Register => "Register account",
            Login => "Log in",
            Me => "Current identity",
            ListUsers => "List users",
            GetUser => "Get user",
            CreateUser => "Create user",
            UpdateUser => "Update user",
            DeleteUser => "Delete user",
            ListKegiatan => "List kegiatan",
            GetKegiatan => "Get kegiatan",
            CreateKegiatan => "Create kegiatan",
            UpdateKegiatan => "Update kegiatan",
            DeleteKegiatan => "Delete kegiatan",
            ListKehadiran => "List kehadiran",
            GetKehadiran => "Get kehadiran",
            CreateKehadiran => "Record kehadiran",
            UpdateKehadiran => "Update kehadiran",
            DeleteKehadiran => "Delete kehadiran",
            ListKategori => "List kategori",
            GetKategori => "Get kategori",
            CreateKategori => "Create kategori",
            UpdateKategori => "Update kategori",
            DeleteKategori => "Delete kategori",
            Statistics => "Statistics",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_operations() {
        for op in [
            Operation::Health,
            Operation::OpenApiDocument,
            Operation::Register,
            Operation::Login,
            Operation::ListKategori,
        ] {
            assert_eq!(op.required_permission(), PermissionLevel::Public, "{op:?}");
        }
    }

    #[test]
    fn test_members_can_read_and_record_attendance() {
        for op in [
            Operation::Me,
            Operation::ListKegiatan,
            Operation::GetKegiatan,
            Operation::CreateKehadiran,
            Operation::GetKategori,
        ] {
            assert_eq!(op.required_permission(), PermissionLevel::Authenticated, "{op:?}");
        }
    }

    #[test]
    fn test_admin_operations() {
        for op in [
            Operation::ListUsers,
            Operation::DeleteUser,
            Operation::CreateKegiatan,
            Operation::UpdateKehadiran,
            Operation::DeleteKategori,
            Operation::Statistics,
        ] {
            assert_eq!(op.required_permission(), PermissionLevel::Admin, "{op:?}");
        }
    }

    #[test]
    fn test_permission_ordering() {
        assert!(PermissionLevel::Admin > PermissionLevel::Authenticated);
        assert!(PermissionLevel::Authenticated > PermissionLevel::Public);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("member".parse::<Role>(), Ok(Role::Member));
        assert!("Admin".parse::<Role>().is_err());
        assert!("superuser".parse::<Role>().is_err());
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
