use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Records ---

/// Difficulty
///
/// The fixed difficulty scale attached to every question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    /// Query strings arrive in whatever case the client typed, so parsing ignores case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// Question
///
/// A single interview question with its categorical tags and vote count.
/// Records are immutable once stored, except for `upvotes` which the repository
/// adjusts as viewers toggle their votes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Question {
    // Opaque identifier. Seeded records keep whatever id the source supplied.
    pub id: String,
    pub text: String,

    // Open vocabularies: new companies, topics and roles may appear at any time.
    pub company: String,
    pub topic: String,
    pub role: String,

    pub difficulty: Difficulty,
    pub upvotes: u32,

    // Only used for ordering.
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// CategorySet
///
/// Distinct companies, topics and roles used to populate filter choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CategorySet {
    pub companies: Vec<String>,
    pub topics: Vec<String>,
    pub roles: Vec<String>,
}

/// User
///
/// A known viewer. Bearer tokens only carry the user id, so the role is always
/// read from here and a role change takes effect on the next request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub display_name: String,
    // 'standard' or 'admin'. Anything else is treated as carrying no role.
    pub role: String,
}

// --- Request Payloads ---

/// CreateQuestionRequest
///
/// Input payload for submitting a new question (POST /questions).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateQuestionRequest {
    pub text: String,
    pub company: String,
    pub topic: String,
    pub role: String,
    pub difficulty: Difficulty,
}

impl CreateQuestionRequest {
    /// Every text field must carry something other than whitespace.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("text", &self.text),
            ("company", &self.company),
            ("topic", &self.topic),
            ("role", &self.role),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(format!("'{}' must not be empty", name)),
            None => Ok(()),
        }
    }
}

/// UpdateQuestionRequest
///
/// Partial update payload (PUT /admin/questions/{id}). Only the text, topic and
/// difficulty of a question may be edited after submission.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateQuestionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl UpdateQuestionRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.text.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err("'text' must not be empty".to_string());
        }
        if self.topic.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err("'topic' must not be empty".to_string());
        }
        Ok(())
    }
}

// --- Responses ---

/// UpvoteResponse
///
/// Result of toggling the caller's vote on a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpvoteResponse {
    pub question_id: String,
    /// True when the call recorded a vote, false when it withdrew one.
    pub upvoted: bool,
    pub upvotes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpvoteCount {
    pub question_id: String,
    pub upvotes: u32,
}

/// UserProfile
///
/// Output schema for the authenticated viewer (GET /me).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub display_name: String,
    pub role: String,
}

/// AdminDashboardStats
///
/// Output schema for the administrative dashboard (GET /admin/stats).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminDashboardStats {
    pub total_questions: u64,
    pub total_users: u64,
    /// Votes cast through this service. Seeded baseline counts are not included.
    pub total_votes: u64,
}

/// RegisterUserRequest
///
/// Input payload for the public registration endpoint (POST /register).
/// New accounts always start with the standard role.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterUserRequest {
    pub display_name: String,
}

/// RegisterUserResponse
///
/// The created profile plus a bearer token for it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterUserResponse {
    pub user: User,
    pub token: String,
}
