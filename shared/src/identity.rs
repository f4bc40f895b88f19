//! Identity resolution seam.
//!
//! The state machine only consumes the `User` a provider hands back. The
//! bundled `MockIdentityProvider` accepts any credentials and derives the role
//! from the email address; it is demo logic, not an authorization boundary.

use uuid::Uuid;

use crate::event::{Secret, UserId, ValidationError};
use crate::model::{Role, User};

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: Secret,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: Secret,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account already exists: {0}")]
    AlreadyRegistered(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

pub trait IdentityProvider: Send + Sync {
    fn sign_in(&self, credentials: &Credentials) -> Result<User, IdentityError>;

    fn register(&self, registration: &Registration) -> Result<User, IdentityError>;
}

/// First match wins: an address containing both "admin" and "doctor" is an admin.
#[must_use]
pub fn role_for_email(email: &str) -> Role {
    if email.contains("admin") {
        Role::Admin
    } else if email.contains("doctor") {
        Role::Doctor
    } else {
        Role::User
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MockIdentityProvider;

impl MockIdentityProvider {
    const DEMO_USER_ID: &'static str = "1";
    const DEMO_NAME: &'static str = "John Doe";
    const DEMO_PHONE: &'static str = "+1234567890";
    const DEMO_POINTS: u32 = 450;
    const DEMO_EMERGENCIES_HANDLED: u32 = 12;
}

impl IdentityProvider for MockIdentityProvider {
    fn sign_in(&self, credentials: &Credentials) -> Result<User, IdentityError> {
        Ok(User {
            id: UserId::new(Self::DEMO_USER_ID),
            name: Self::DEMO_NAME.to_string(),
            email: credentials.email.clone(),
            phone: Self::DEMO_PHONE.to_string(),
            role: role_for_email(&credentials.email),
            points: Self::DEMO_POINTS,
            emergencies_handled: Self::DEMO_EMERGENCIES_HANDLED,
        })
    }

    fn register(&self, registration: &Registration) -> Result<User, IdentityError> {
        Ok(User {
            id: UserId::new(Uuid::new_v4().to_string()),
            name: registration.name.clone(),
            email: registration.email.clone(),
            phone: registration.phone.clone(),
            role: Role::User,
            points: 0,
            emergencies_handled: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn credentials(email: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: Secret::new("anything"),
        }
    }

    #[test]
    fn role_examples() {
        assert_eq!(role_for_email("admin@x.com"), Role::Admin);
        assert_eq!(role_for_email("doctor@x.com"), Role::Doctor);
        assert_eq!(role_for_email("plain@x.com"), Role::User);
        assert_eq!(role_for_email("admin.doctor@x.com"), Role::Admin);
        assert_eq!(role_for_email(""), Role::User);
    }

    #[test]
    fn mock_sign_in_accepts_anything() {
        let user = MockIdentityProvider.sign_in(&credentials("doctor@x.com")).unwrap();
        assert_eq!(user.role, Role::Doctor);
        assert_eq!(user.email, "doctor@x.com");
        assert_eq!(user.points, 450);
        assert_eq!(user.emergencies_handled, 12);
    }

    #[test]
    fn registration_creates_fresh_plain_user() {
        let registration = Registration {
            name: "Ada".into(),
            email: "admin@x.com".into(),
            phone: "+100".into(),
            password: Secret::new("pw"),
        };
        let first = MockIdentityProvider.register(&registration).unwrap();
        let second = MockIdentityProvider.register(&registration).unwrap();

        // Registration never grants elevated roles, whatever the address says.
        assert_eq!(first.role, Role::User);
        assert_eq!(first.points, 0);
        assert_eq!(first.emergencies_handled, 0);
        assert_ne!(first.id, second.id);
    }

    proptest! {
        #[test]
        fn admin_substring_always_wins(prefix in "[a-z.]{0,8}", suffix in "[a-z.@]{0,8}") {
            let email = format!("{prefix}admin{suffix}");
            prop_assert_eq!(role_for_email(&email), Role::Admin);
        }

        #[test]
        fn addresses_without_keywords_are_plain_users(email in "[b-z0-9@.]{0,24}") {
            prop_assume!(!email.contains("admin") && !email.contains("doctor"));
            prop_assert_eq!(role_for_email(&email), Role::User);
        }
    }
}
