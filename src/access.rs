use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// back-office role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// full control, including user administration
    CoreAdmin,
    /// day-to-day administration and loan decisions
    Administrator,
    /// reviews applications, cannot commit decisions
    LoanOfficer,
    /// records savings transactions only
    Teller,
}

impl Role {
    /// check if the role may approve or reject loan applications
    pub fn can_process_loans(&self) -> bool {
        matches!(self, Role::CoreAdmin | Role::Administrator)
    }

    /// check if the role may register and edit members
    pub fn can_manage_members(&self) -> bool {
        matches!(self, Role::CoreAdmin | Role::Administrator)
    }

    /// check if the role may post savings entries
    pub fn can_record_savings(&self) -> bool {
        !matches!(self, Role::LoanOfficer)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Role::CoreAdmin => "core admin",
            Role::Administrator => "administrator",
            Role::LoanOfficer => "loan officer",
            Role::Teller => "teller",
        };
        write!(f, "{}", label)
    }
}

/// authenticated acting user, passed into every operation that needs one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    pub fn can_process_loans(&self) -> bool {
        self.role.can_process_loans()
    }
}
