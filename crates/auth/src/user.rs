//! User entity.
//!
//! Persistence belongs to the lifecycle owner (see the infra repository); this
//! module only holds the state and its invariants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hookline_core::{DomainError, DomainResult, Entity, EntityKind, UserId};

/// User account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UserStatus {
    /// User is active and can authenticate.
    #[default]
    Active,
    /// User is suspended and cannot authenticate.
    Suspended,
}

impl core::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "Active"),
            UserStatus::Suspended => write!(f, "Suspended"),
        }
    }
}

/// A registered user.
///
/// # Invariants
/// - `username` is non-blank.
/// - `email`, when set, contains an `@`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub status: UserStatus,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> DomainResult<Self> {
        Self::with_id(UserId::new(), username, email)
    }

    pub fn with_id(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> DomainResult<Self> {
        let username = username.into();
        let email = email.into();

        if username.trim().is_empty() {
            return Err(DomainError::validation("username must not be blank"));
        }
        validate_email(&email)?;

        Ok(Self {
            id,
            username,
            email,
            status: UserStatus::Active,
            date_joined: Utc::now(),
        })
    }

    pub fn change_email(&mut self, email: impl Into<String>) -> DomainResult<()> {
        let email = email.into();
        validate_email(&email)?;
        self.email = email;
        Ok(())
    }

    pub fn suspend(&mut self) -> DomainResult<()> {
        if self.status == UserStatus::Suspended {
            return Err(DomainError::invariant("user is already suspended"));
        }
        self.status = UserStatus::Suspended;
        Ok(())
    }

    pub fn activate(&mut self) -> DomainResult<()> {
        if self.status == UserStatus::Active {
            return Err(DomainError::invariant("user is already active"));
        }
        self.status = UserStatus::Active;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

fn validate_email(email: &str) -> DomainResult<()> {
    if !email.is_empty() && !email.contains('@') {
        return Err(DomainError::validation(format!("invalid email: {email}")));
    }
    Ok(())
}

impl Entity for User {
    type Id = UserId;
    const KIND: EntityKind = EntityKind::from_static("User");

    fn id(&self) -> &UserId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_is_active() {
        let user = User::new("alice", "alice@example.com").unwrap();
        assert!(user.is_active());
        assert_eq!(user.entity_kind().as_str(), "User");
    }

    #[test]
    fn blank_username_rejected() {
        let err = User::new("  ", "").unwrap_err();
        assert!(err.to_string().contains("username"));
    }

    #[test]
    fn email_is_optional_but_must_look_like_one() {
        assert!(User::new("bob", "").is_ok());
        assert!(User::new("bob", "bob.example.com").is_err());

        let mut user = User::new("bob", "bob@example.com").unwrap();
        assert!(user.change_email("nope").is_err());
        assert_eq!(user.email, "bob@example.com");
    }

    #[test]
    fn suspend_then_activate() {
        let mut user = User::new("carol", "carol@example.com").unwrap();

        user.suspend().unwrap();
        assert_eq!(user.status, UserStatus::Suspended);
        assert!(user.suspend().is_err());

        user.activate().unwrap();
        assert!(user.is_active());
        assert!(user.activate().is_err());
    }
}
