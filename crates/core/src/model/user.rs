use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur while normalizing user data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserError {
    #[error("unknown role: {0:?}")]
    UnknownRole(String),
}

//
// ─── ROLE ─────────────────────────────────────────────────────────────────────
//

/// Normalized account role.
///
/// The backend is inconsistent about the wire shape (sometimes the bare
/// string `"STUDENT"`, sometimes an object with a `name` field); the gateway
/// maps both onto this enum once, at the API boundary, so nothing downstream
/// has to re-inspect the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Parent,
    Admin,
}

impl Role {
    /// Parses a role name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `UserError::UnknownRole` for names outside the known set.
    pub fn parse(name: &str) -> Result<Self, UserError> {
        match name.trim().to_ascii_uppercase().as_str() {
            "STUDENT" => Ok(Self::Student),
            "PARENT" => Ok(Self::Parent),
            "ADMIN" => Ok(Self::Admin),
            other => Err(UserError::UnknownRole(other.to_string())),
        }
    }

    /// Returns the canonical wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Parent => "PARENT",
            Role::Admin => "ADMIN",
        }
    }
}

//
// ─── USER ─────────────────────────────────────────────────────────────────────
//

/// Authenticated account as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
