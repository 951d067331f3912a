use derive_more::{AsRef, Display};

/// Identifier of a user as issued by the auth provider.
#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserID(String);

impl UserID {
    pub fn new(id: &str) -> Result<Self, UserIDError> {
        let trimmed_id = id.trim();

        if trimmed_id.is_empty() {
            return Err(UserIDError::Empty);
        }

        Ok(Self(trimmed_id.to_string()))
    }
}

impl TryFrom<&str> for UserID {
    type Error = UserIDError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        UserID::new(value)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum UserIDError {
    #[error("User ID must not be empty")]
    Empty,
}

/// The signed-in user on whose behalf owner-scoped operations run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserID,
}

impl Session {
    #[must_use]
    pub fn new(user_id: UserID) -> Self {
        Self { user_id }
    }
}
