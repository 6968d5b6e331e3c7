pub mod interval;

pub use interval::TimeSlot;

use serde::{Deserialize, Serialize};

pub type UserId = i32;
pub type DeskId = i32;
pub type BookingId = i32;

/// Caller role as supplied by the identity collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            _ => Ok(Self::User),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// The identity making a call into the booking engine.
///
/// The engine never reads ambient session state; every operation takes the
/// acting user as an explicit argument and trusts the fields as given.
#[derive(Clone, Debug)]
pub struct Actor {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub can_book: bool,
}

impl Actor {
    #[must_use]
    pub fn new(user_id: UserId, email: impl Into<String>, role: Role, can_book: bool) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
            can_book,
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
