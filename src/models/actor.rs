// src/models/actor.rs

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Account kinds known to this backend, as stored in the token `role` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Instructor,
    Learner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Instructor => "instructor",
            Role::Learner => "learner",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instructor" => Ok(Role::Instructor),
            "learner" => Ok(Role::Learner),
            other => Err(AppError::AuthError(format!("Unknown role '{}'", other))),
        }
    }
}

/// The authenticated caller, resolved once from the token by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Instructor(i64),
    Learner(i64),
}

impl Actor {
    pub fn new(role: Role, id: i64) -> Self {
        match role {
            Role::Instructor => Actor::Instructor(id),
            Role::Learner => Actor::Learner(id),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Actor::Instructor(_) => Role::Instructor,
            Actor::Learner(_) => Role::Learner,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Actor::Instructor(id) | Actor::Learner(id) => *id,
        }
    }

    /// Returns the instructor id, or `Forbidden` for learners.
    pub fn instructor_id(&self) -> Result<i64, AppError> {
        match self {
            Actor::Instructor(id) => Ok(*id),
            Actor::Learner(_) => Err(AppError::Forbidden(
                "Only instructors can perform this action".to_string(),
            )),
        }
    }
}
