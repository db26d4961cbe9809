//! Tourist-facing community boards: travel feed, local-guide Q&A and
//! recommendations. They have no backend collection and live in memory.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::text_enum;
use crate::panels::Filter;

text_enum! {
    Category as "question category" {
        General => "general",
        Food => "food",
        Safety => "safety",
        Transportation => "transportation",
        Attractions => "attractions",
        Shopping => "shopping",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: Uuid,
    pub author: String,
    pub location: Option<String>,
    pub content: String,
    pub likes: u32,
    pub comments: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewPost {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub content: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: Uuid,
    pub author: String,
    pub question: String,
    pub category: Category,
    pub likes: u32,
    pub answers: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewQuestion {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub question: String,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub id: Uuid,
    pub question_id: Uuid,
    pub author: String,
    pub answer: String,
    pub likes: u32,
    pub is_local: bool,
    pub created_at: DateTime<Utc>,
}

struct Board {
    posts: Vec<Post>,
    questions: Vec<Question>,
    answers: Vec<Answer>,
}

pub struct CommunityBoard {
    board: RwLock<Board>,
}

fn author_or(name: &str, fallback: &str) -> String {
    match name.trim() {
        "" => fallback.to_string(),
        name => name.to_string(),
    }
}

impl CommunityBoard {
    /// A board with a handful of recent posts and questions.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let post = |author: &str, location: &str, content: &str, likes, comments, hours| Post {
            id: Uuid::new_v4(),
            author: author.to_string(),
            location: Some(location.to_string()),
            content: content.to_string(),
            likes,
            comments,
            created_at: now - Duration::hours(hours),
        };
        let posts = vec![
            post("Emma Wilson", "Eiffel Tower, Paris",
                "Amazing sunset view from the Eiffel Tower! The city lights are incredible.", 24, 8, 2),
            post("John Smith", "Louvre Museum, Paris",
                "Just saw the Mona Lisa! The museum is packed but totally worth it. Pro tip: book your tickets online.", 15, 3, 4),
            post("Lisa Brown", "Montmartre District",
                "Street artists in Montmartre are incredible! Got my portrait done, such a unique experience.", 31, 12, 6),
        ];

        let question = |author: &str, text: &str, category, likes, hours| Question {
            id: Uuid::new_v4(),
            author: author.to_string(),
            question: text.to_string(),
            category,
            likes,
            answers: 0,
            created_at: now - Duration::hours(hours),
        };
        let mut questions = vec![
            question("Sarah Johnson", "What are the best restaurants near the Louvre Museum?", Category::Food, 7, 1),
            question("Mike Chen", "Is it safe to walk around Montmartre at night?", Category::Safety, 12, 3),
            question("Emma Wilson", "Best metro route from Charles de Gaulle Airport to city center?", Category::Transportation, 15, 5),
        ];

        let louvre = questions[0].id;
        let answers = vec![
            Answer {
                id: Uuid::new_v4(),
                question_id: louvre,
                author: "Local Guide Pierre".to_string(),
                answer: "I recommend Café Marly inside the Louvre, great views and food. For budget options, try the nearby Rue de Rivoli area.".to_string(),
                likes: 5,
                is_local: true,
                created_at: now - Duration::minutes(45),
            },
            Answer {
                id: Uuid::new_v4(),
                question_id: louvre,
                author: "Tourist Lisa".to_string(),
                answer: "We loved L'Ambassade d'Auvergne! Traditional French cuisine and very close to the museum.".to_string(),
                likes: 2,
                is_local: false,
                created_at: now - Duration::minutes(30),
            },
        ];
        questions[0].answers = answers.len();

        Self {
            board: RwLock::new(Board {
                posts,
                questions,
                answers,
            }),
        }
    }

    pub async fn feed(&self) -> Vec<Post> {
        let mut posts = self.board.read().await.posts.clone();
        posts.sort_by_key(|p| std::cmp::Reverse(p.created_at));
        posts
    }

    pub async fn share_post(&self, post: NewPost, now: DateTime<Utc>) -> AppResult<Post> {
        let content = post.content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Please write something to share.".to_string()));
        }

        let post = Post {
            id: Uuid::new_v4(),
            author: author_or(&post.author, "Traveler"),
            location: post
                .location
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
            content: content.to_string(),
            likes: 0,
            comments: 0,
            created_at: now,
        };
        self.board.write().await.posts.push(post.clone());

        info!("Travel post {} shared by {}", post.id, post.author);
        Ok(post)
    }

    pub async fn questions(&self, category: Filter<Category>) -> Vec<Question> {
        let mut questions: Vec<Question> = self
            .board
            .read()
            .await
            .questions
            .iter()
            .filter(|q| category.matches(&q.category))
            .cloned()
            .collect();
        questions.sort_by_key(|q| std::cmp::Reverse(q.created_at));
        questions
    }

    pub async fn ask(&self, question: NewQuestion, now: DateTime<Utc>) -> AppResult<Question> {
        let text = question.question.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Please enter your question.".to_string()));
        }

        let question = Question {
            id: Uuid::new_v4(),
            author: author_or(&question.author, "Traveler"),
            question: text.to_string(),
            category: question.category.unwrap_or(Category::General),
            likes: 0,
            answers: 0,
            created_at: now,
        };
        self.board.write().await.questions.push(question.clone());

        info!("Question {} asked in {}", question.id, question.category);
        Ok(question)
    }

    /// Answers to one question, oldest first.
    pub async fn answers(&self, question_id: Uuid) -> AppResult<Vec<Answer>> {
        let board = self.board.read().await;
        if !board.questions.iter().any(|q| q.id == question_id) {
            return Err(AppError::NotFound("question"));
        }
        let mut answers: Vec<Answer> = board
            .answers
            .iter()
            .filter(|a| a.question_id == question_id)
            .cloned()
            .collect();
        answers.sort_by_key(|a| a.created_at);
        Ok(answers)
    }
}

#[derive(Debug, Serialize)]
pub struct Attraction {
    pub name: &'static str,
    pub description: &'static str,
    pub rating: f32,
    pub estimated_time: &'static str,
    pub distance: &'static str,
    pub category: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Restaurant {
    pub name: &'static str,
    pub description: &'static str,
    pub rating: f32,
    pub price_range: &'static str,
    pub cuisine: &'static str,
    pub distance: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Event {
    pub name: &'static str,
    pub description: &'static str,
    pub date: &'static str,
    pub price: &'static str,
    pub availability: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Recommendations {
    pub attractions: &'static [Attraction],
    pub restaurants: &'static [Restaurant],
    pub events: &'static [Event],
}

pub static RECOMMENDATIONS: Recommendations = Recommendations {
    attractions: &[
        Attraction {
            name: "Notre-Dame Cathedral",
            description: "Gothic architectural masterpiece in the heart of Paris",
            rating: 4.6,
            estimated_time: "2-3 hours",
            distance: "1.2 km",
            category: "Historical",
        },
        Attraction {
            name: "Seine River Cruise",
            description: "Scenic boat tour along the Seine with city views",
            rating: 4.4,
            estimated_time: "1 hour",
            distance: "0.8 km",
            category: "Sightseeing",
        },
    ],
    restaurants: &[
        Restaurant {
            name: "Le Comptoir du Relais",
            description: "Traditional French bistro with authentic cuisine",
            rating: 4.5,
            price_range: "€€€",
            cuisine: "French",
            distance: "0.5 km",
        },
        Restaurant {
            name: "Breizh Café",
            description: "Modern crêperie with creative sweet and savory options",
            rating: 4.3,
            price_range: "€€",
            cuisine: "Crêpes",
            distance: "0.7 km",
        },
    ],
    events: &[
        Event {
            name: "Louvre Night Tours",
            description: "Special evening access to the museum with guided tours",
            date: "Today, 7:00 PM",
            price: "€25",
            availability: "Limited spots",
        },
        Event {
            name: "Montmartre Art Walk",
            description: "Walking tour through historic artist district",
            date: "Tomorrow, 2:00 PM",
            price: "€15",
            availability: "Available",
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_post_is_rejected() {
        let board = CommunityBoard::seeded(Utc::now());
        let post = NewPost {
            author: "Emma".into(),
            content: "   ".into(),
            location: Some("Paris".into()),
        };

        assert!(matches!(
            board.share_post(post, Utc::now()).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(board.feed().await.len(), 3);
    }

    #[tokio::test]
    async fn shared_post_leads_the_feed() {
        let board = CommunityBoard::seeded(Utc::now() - Duration::minutes(5));
        let post = NewPost {
            author: String::new(),
            content: "Crêpes by the canal".into(),
            location: Some("  ".into()),
        };

        let shared = board.share_post(post, Utc::now()).await.unwrap();
        assert_eq!(shared.author, "Traveler");
        assert!(shared.location.is_none());

        let feed = board.feed().await;
        assert_eq!(feed.len(), 4);
        assert_eq!(feed[0].id, shared.id);
    }

    #[tokio::test]
    async fn questions_filter_by_category() {
        let board = CommunityBoard::seeded(Utc::now());
        let asked = board
            .ask(
                NewQuestion {
                    author: "Mike".into(),
                    question: "Where can I buy a SIM card?".into(),
                    category: Some(Category::Shopping),
                },
                Utc::now(),
            )
            .await
            .unwrap();

        let shopping = board.questions(Filter::Only(Category::Shopping)).await;
        assert_eq!(shopping.len(), 1);
        assert_eq!(shopping[0].id, asked.id);
        assert_eq!(board.questions(Filter::All).await.len(), 4);
    }

    #[tokio::test]
    async fn answers_belong_to_their_question() {
        let board = CommunityBoard::seeded(Utc::now());
        let food = board.questions(Filter::Only(Category::Food)).await;
        let answers = board.answers(food[0].id).await.unwrap();

        assert_eq!(answers.len(), food[0].answers);
        assert!(answers.iter().all(|a| a.question_id == food[0].id));
        assert!(matches!(
            board.answers(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn recommendations_serialize_by_section() {
        let value = serde_json::to_value(&RECOMMENDATIONS).unwrap();
        assert_eq!(value["attractions"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["restaurants"][0]["price_range"], "€€€");
        assert_eq!(value["events"][1]["name"], "Montmartre Art Walk");
    }
}
