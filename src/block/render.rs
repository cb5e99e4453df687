use serde::Serialize;

use super::{
    activity::Activity,
    page::{Page, PageContent},
};

/// What a screen should show for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageView {
    Reading { title: String, html: String },
    Video { title: String, url: String },
    Question { question_id: String },
    Placeholder { title: String, reason: String },
}

pub fn render_page(page: &Page, activity: &Activity) -> PageView {
    let title = activity.title.clone();
    match &page.content {
        PageContent::Html(html) if html.trim().is_empty() => PageView::Placeholder {
            title,
            reason: "Conteúdo de leitura indisponível.".to_string(),
        },
        PageContent::Html(html) => PageView::Reading {
            title,
            html: html.clone(),
        },
        PageContent::VideoUrl(url) if url.trim().is_empty() => PageView::Placeholder {
            title,
            reason: "Vídeo indisponível.".to_string(),
        },
        PageContent::VideoUrl(url) => PageView::Video {
            title,
            url: url.clone(),
        },
        PageContent::Question(id) => PageView::Question {
            question_id: id.clone(),
        },
    }
}
