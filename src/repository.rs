use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::Arc,
};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    AdminDashboardStats, CategorySet, CreateQuestionRequest, Difficulty, Question,
    UpdateQuestionRequest, UpvoteResponse, User,
};

/// Repository Trait
///
/// The contract between the HTTP layer and wherever questions, votes and users
/// live. Handlers only see `Arc<dyn Repository>`, so tests can swap in stubs.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Questions ---
    // A snapshot of the full collection in insertion order.
    async fn all_questions(&self) -> Vec<Question>;
    async fn get_question(&self, id: &str) -> Option<Question>;
    async fn create_question(&self, req: CreateQuestionRequest) -> Question;
    async fn update_question(&self, id: &str, req: UpdateQuestionRequest) -> Option<Question>;
    async fn delete_question(&self, id: &str) -> bool;

    // --- Votes ---
    // Adds the user's vote if absent, removes it if present. None if the question is unknown.
    async fn toggle_upvote(&self, question_id: &str, user_id: Uuid) -> Option<UpvoteResponse>;

    // --- Categories ---
    // An independently maintained catalog, when one was supplied.
    async fn category_catalog(&self) -> Option<CategorySet>;

    // --- Users ---
    async fn get_user(&self, id: Uuid) -> Option<User>;
    async fn create_user(&self, user: User) -> User;
    async fn get_stats(&self) -> AdminDashboardStats;
}

/// RepositoryState
///
/// The shared handle stored in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;

/// SeedData
///
/// The on-disk format read from `QUESTIONS_SEED_PATH`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    pub questions: Vec<Question>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub categories: Option<CategorySet>,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Default)]
struct Store {
    questions: Vec<Question>,
    // One entry per (question id, voter).
    votes: HashSet<(String, Uuid)>,
    users: HashMap<Uuid, User>,
    catalog: Option<CategorySet>,
}

/// InMemoryRepository
///
/// Keeps everything in process memory behind a single lock, which also
/// serializes concurrent vote toggles on the same question.
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new(seed: SeedData) -> Self {
        let users = seed.users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            store: RwLock::new(Store {
                questions: seed.questions,
                votes: HashSet::new(),
                users,
                catalog: seed.categories,
            }),
        }
    }

    /// Loads a seed file in the `SeedData` JSON format.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        let seed: SeedData = serde_json::from_str(&raw)?;
        Ok(Self::new(seed))
    }

    /// The built-in data set used when no seed file is configured.
    pub fn sample() -> Self {
        Self::new(sample_seed())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn all_questions(&self) -> Vec<Question> {
        self.store.read().await.questions.clone()
    }

    async fn get_question(&self, id: &str) -> Option<Question> {
        let store = self.store.read().await;
        store.questions.iter().find(|q| q.id == id).cloned()
    }

    async fn create_question(&self, req: CreateQuestionRequest) -> Question {
        let question = Question {
            id: Uuid::new_v4().to_string(),
            text: req.text.trim().to_string(),
            company: req.company.trim().to_string(),
            topic: req.topic.trim().to_string(),
            role: req.role.trim().to_string(),
            difficulty: req.difficulty,
            upvotes: 0,
            created_at: Utc::now(),
        };

        self.store.write().await.questions.push(question.clone());
        question
    }

    async fn update_question(&self, id: &str, req: UpdateQuestionRequest) -> Option<Question> {
        let mut store = self.store.write().await;
        let question = store.questions.iter_mut().find(|q| q.id == id)?;

        if let Some(text) = req.text {
            question.text = text.trim().to_string();
        }
        if let Some(topic) = req.topic {
            question.topic = topic.trim().to_string();
        }
        if let Some(difficulty) = req.difficulty {
            question.difficulty = difficulty;
        }

        Some(question.clone())
    }

    async fn delete_question(&self, id: &str) -> bool {
        let mut store = self.store.write().await;
        let before = store.questions.len();
        store.questions.retain(|q| q.id != id);
        let removed = store.questions.len() != before;

        if removed {
            store.votes.retain(|(question_id, _)| question_id != id);
        }
        removed
    }

    async fn toggle_upvote(&self, question_id: &str, user_id: Uuid) -> Option<UpvoteResponse> {
        let mut store = self.store.write().await;
        let Store {
            questions, votes, ..
        } = &mut *store;

        let question = questions.iter_mut().find(|q| q.id == question_id)?;
        let key = (question_id.to_string(), user_id);

        let upvoted = if votes.remove(&key) {
            question.upvotes = question.upvotes.saturating_sub(1);
            false
        } else {
            votes.insert(key);
            question.upvotes = question.upvotes.saturating_add(1);
            true
        };

        Some(UpvoteResponse {
            question_id: question.id.clone(),
            upvoted,
            upvotes: question.upvotes,
        })
    }

    async fn category_catalog(&self) -> Option<CategorySet> {
        self.store.read().await.catalog.clone()
    }

    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.store.read().await.users.get(&id).cloned()
    }

    async fn create_user(&self, user: User) -> User {
        self.store.write().await.users.insert(user.id, user.clone());
        user
    }

    async fn get_stats(&self) -> AdminDashboardStats {
        let store = self.store.read().await;
        AdminDashboardStats {
            total_questions: store.questions.len() as u64,
            total_users: store.users.len() as u64,
            total_votes: store.votes.len() as u64,
        }
    }
}

/// Standard-role sample user.
pub const SAMPLE_STANDARD_USER: Uuid = Uuid::from_u128(0x1);
/// Admin-role sample user.
pub const SAMPLE_ADMIN_USER: Uuid = Uuid::from_u128(0x2);

fn sample_seed() -> SeedData {
    let at = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).single().unwrap_or_default();

    let question = |id: &str, text: &str, tags: [&str; 3], difficulty, upvotes, created_at| Question {
        id: id.to_string(),
        text: text.to_string(),
        company: tags[0].to_string(),
        topic: tags[1].to_string(),
        role: tags[2].to_string(),
        difficulty,
        upvotes,
        created_at,
    };

    let list = |values: &[&str]| -> Vec<String> { values.iter().map(|v| v.to_string()).collect() };

    SeedData {
        questions: vec![
            question(
                "1",
                "What is React?",
                ["Facebook", "Frontend", "Developer"],
                Difficulty::Easy,
                10,
                at(2025, 10, 1),
            ),
            question(
                "2",
                "Explain useEffect hook.",
                ["Google", "Frontend", "Engineer"],
                Difficulty::Medium,
                7,
                at(2025, 9, 28),
            ),
            question(
                "3",
                "How does Node.js handle async?",
                ["Amazon", "Backend", "Backend Developer"],
                Difficulty::Hard,
                15,
                at(2025, 9, 20),
            ),
        ],
        users: vec![
            User {
                id: SAMPLE_STANDARD_USER,
                display_name: "Sam Standard".to_string(),
                role: "standard".to_string(),
            },
            User {
                id: SAMPLE_ADMIN_USER,
                display_name: "Ada Admin".to_string(),
                role: "admin".to_string(),
            },
        ],
        categories: Some(CategorySet {
            companies: list(&["Facebook", "Google", "Amazon", "Microsoft", "Apple"]),
            topics: list(&["Frontend", "Backend", "Database", "DevOps", "System Design"]),
            roles: list(&["Developer", "Engineer", "Backend Developer", "Frontend Developer", "Full Stack"]),
        }),
    }
}
