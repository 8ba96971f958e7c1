//! API Models
//!
//! This module defines the request and response bodies of the HTTP API and
//! the `utoipa` schemas generated from them.

use edtech_core::conversation::ConversationTurn;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Teacher,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Student => write!(f, "student"),
            UserRole::Teacher => write!(f, "teacher"),
        }
    }
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct LoginPayload {
    #[schema(example = "rhm")]
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct LoginResponse {
    #[schema(value_type = String, format = Uuid)]
    pub token: Uuid,
    pub role: UserRole,
    pub name: String,
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct RegisterPayload {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// A user's profile. `courses` lists enrolled courses for students and
/// taught courses for teachers.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct Profile {
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub courses: Vec<String>,
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct UpdateProfilePayload {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct EnrollPayload {
    #[schema(example = "Physics")]
    pub course: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct CourseSummary {
    pub name: String,
    pub description: String,
    pub teacher: String,
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct UpdateDescriptionPayload {
    pub description: String,
}

/// One folder of a course directory that holds PDFs or sub-folders.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct MaterialFolder {
    /// Path relative to the course directory; empty for the course root.
    #[schema(example = "Chapter 1")]
    pub folder: String,
    pub pdfs: Vec<String>,
    pub dirs: Vec<String>,
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct ChatPayload {
    #[schema(example = "Solve x^2-5x+6=0")]
    pub text: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ChatResponse {
    pub in_scope: bool,
    pub reply: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ChatTurn {
    #[schema(example = "assistant")]
    pub role: String,
    pub content: String,
}

impl From<&ConversationTurn> for ChatTurn {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            role: turn.role().to_string(),
            content: turn.content().to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_serialization() {
        assert_eq!(serde_json::to_string(&UserRole::Student).unwrap(), "\"student\"");
        let role: UserRole = serde_json::from_str("\"teacher\"").unwrap();
        assert_eq!(role, UserRole::Teacher);
        assert_eq!(format!("{}", UserRole::Teacher), "teacher");
    }

    #[test]
    fn test_invalid_role_deserialization() {
        let result: Result<UserRole, _> = serde_json::from_str("\"admin\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_login_payload_missing_field() {
        let result: Result<LoginPayload, _> =
            serde_json::from_str(r#"{"username": "rhm", "password": "rhm123"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_chat_turn_from_conversation_turn() {
        let turn = ChatTurn::from(&ConversationTurn::assistant("x = 2"));
        assert_eq!(turn.role, "assistant");
        assert_eq!(turn.content, "x = 2");
    }

    #[test]
    fn test_error_response_serialization() {
        let error = ErrorResponse {
            message: "Course not found".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"message":"Course not found"}"#);
    }
}
