use std::str::FromStr;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivityType {
    #[serde(rename = "leitura")]
    Reading,
    #[serde(rename = "video")]
    Video,
    #[serde(rename = "questoes")]
    QuestionSet,
}

impl FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leitura" | "reading" => Ok(ActivityType::Reading),
            "video" => Ok(ActivityType::Video),
            "questoes" | "question-set" => Ok(ActivityType::QuestionSet),
            other => Err(format!("unknown activity type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub activity_type: ActivityType,

    /// relative order inside the block
    pub order: usize,

    /// html fragment, reading activities only
    pub content: Option<String>,

    pub video_url: Option<String>,

    /// ordered question ids, question-set activities only
    pub question_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockParent {
    pub id: String,
    pub title: String,
}

impl BlockParent {
    pub fn new(id: String, title: String) -> Self {
        Self { id, title }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockProgress {
    pub completed: bool,
    pub percent: f64,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub id: String,
    pub title: String,
    pub order: usize,

    /// learning track the block belongs to
    pub trail: Option<BlockParent>,

    /// path inside the track
    pub path: Option<BlockParent>,

    pub activities: Vec<Activity>,
    pub progress: Option<BlockProgress>,

    /// questions the server already holds an answer for
    pub answered_questions: Vec<String>,
}

impl Block {
    /// Every question id referenced by the block's activities, in order.
    pub fn question_ids(&self) -> Vec<&str> {
        self.activities
            .iter()
            .flat_map(|a| a.question_ids.iter().map(|id| id.as_str()))
            .collect()
    }
}
