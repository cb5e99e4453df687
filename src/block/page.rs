use serde::Serialize;

use super::activity::{Activity, ActivityType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageKind {
    #[serde(rename = "leitura")]
    Reading,
    #[serde(rename = "video")]
    Video,
    #[serde(rename = "questao")]
    Question,
}

impl PageKind {
    /// Reading and video pages complete themselves when the learner moves on.
    pub fn completes_on_leave(&self) -> bool {
        matches!(self, PageKind::Reading | PageKind::Video)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    Html(String),
    VideoUrl(String),
    Question(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// index of the parent activity in the block's activity list
    pub activity_index: usize,

    /// position of the page inside its activity
    pub sub_index: usize,

    pub content: PageContent,
}

impl Page {
    pub fn kind(&self) -> PageKind {
        match self.content {
            PageContent::Html(_) => PageKind::Reading,
            PageContent::VideoUrl(_) => PageKind::Video,
            PageContent::Question(_) => PageKind::Question,
        }
    }

    pub fn question_id(&self) -> Option<&str> {
        match &self.content {
            PageContent::Question(id) => Some(id),
            _ => None,
        }
    }
}

/// Flattens activities into navigable pages, ordered by activity order and
/// then by position inside the activity. Reading and video activities give one
/// page each, question sets one page per question. Empty content is kept; the
/// renderer shows a placeholder for it.
pub fn sequence(activities: &[Activity]) -> Vec<Page> {
    let mut order: Vec<usize> = (0..activities.len()).collect();
    order.sort_by_key(|&i| activities[i].order);

    let mut pages = Vec::new();
    for activity_index in order {
        let activity = &activities[activity_index];
        match activity.activity_type {
            ActivityType::Reading => pages.push(Page {
                activity_index,
                sub_index: 0,
                content: PageContent::Html(activity.content.clone().unwrap_or_default()),
            }),
            ActivityType::Video => pages.push(Page {
                activity_index,
                sub_index: 0,
                content: PageContent::VideoUrl(activity.video_url.clone().unwrap_or_default()),
            }),
            ActivityType::QuestionSet => {
                pages.extend(activity.question_ids.iter().enumerate().map(|(sub_index, id)| Page {
                    activity_index,
                    sub_index,
                    content: PageContent::Question(id.clone()),
                }))
            }
        }
    }
    pages
}
