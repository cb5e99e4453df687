use std::{collections::BTreeMap, sync::OnceLock};

use regex::Regex;
use serde::Serialize;

use super::{
    activity::{Block, BlockParent},
    page::{Page, PageKind},
    render::{render_page, PageView},
};
use crate::qbank::Question;

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum Frontmatter<'a> {
    Title(&'a str),
    Slug(&'a str),
    Parent(Option<&'a BlockParent>),
    Order(usize),
    Pages(Vec<PageMeta<'a>>),
}

#[derive(Serialize, Debug)]
struct PageMeta<'a> {
    index: usize,
    #[serde(rename = "type")]
    kind: PageKind,
    activity: &'a str,
    slug: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    headings: Vec<Heading>,
}

#[derive(Serialize, Debug)]
struct Heading {
    level: usize,
    slug: String,
    title: String,
}

/// Markdown rendition of a block: YAML front matter describing the page
/// sequence, then one section per page.
pub fn serialize_block(
    block: &Block,
    pages: &[Page],
    questions: &[Question],
) -> anyhow::Result<String> {
    let mut slugger = github_slugger::Slugger::default();

    let mut fm: BTreeMap<&str, Frontmatter> = BTreeMap::new();
    let block_slug = slugger.slug(&block.title);
    fm.insert("title", Frontmatter::Title(block.title.as_str()));
    fm.insert("slug", Frontmatter::Slug(block_slug.as_str()));
    fm.insert("order", Frontmatter::Order(block.order));
    fm.insert("trail", Frontmatter::Parent(block.trail.as_ref()));
    fm.insert("path", Frontmatter::Parent(block.path.as_ref()));

    let mut metas = Vec::<PageMeta>::with_capacity(pages.len());
    let mut body = String::with_capacity(800 * pages.len());

    for (index, page) in pages.iter().enumerate() {
        let Some(activity) = block.activities.get(page.activity_index) else {
            continue;
        };
        let heading = match page.kind() {
            PageKind::Question => format!("{} ({})", activity.title, page.sub_index + 1),
            _ => activity.title.clone(),
        };
        let slug = slugger.slug(&heading);
        let mut headings = vec![];

        let content = match render_page(page, activity) {
            PageView::Reading { html, .. } => add_heading_ids(&html, &mut slugger, &mut headings),
            PageView::Video { url, .. } => format!("<video src=\"{}\" controls></video>", url),
            PageView::Question { question_id } => {
                match questions.iter().find(|q| q.id == question_id) {
                    Some(q) => format!(
                        "<questao id=\"{}\" tipo=\"{}\">\n\n{}\n\n</questao>",
                        q.id, q.kind_tag, q.prompt
                    ),
                    None => format!("<questao id=\"{}\"></questao>", question_id),
                }
            }
            PageView::Placeholder { reason, .. } => format!("> {}", reason),
        };

        body.push_str(&format!("## {} {{#{}}}\n\n{}\n\n", heading, slug, content));
        metas.push(PageMeta {
            index,
            kind: page.kind(),
            activity: activity.id.as_str(),
            slug,
            headings,
        });
    }

    fm.insert("pages", Frontmatter::Pages(metas));

    Ok(format!(
        r#"---
{}---

{}"#,
        serde_yaml_ng::to_string(&fm)?,
        body
    ))
}

// give <h3> headings of reading pages an id so they can be linked from the outline
fn add_heading_ids(
    html: &str,
    slugger: &mut github_slugger::Slugger,
    headings: &mut Vec<Heading>,
) -> String {
    static H3: OnceLock<Regex> = OnceLock::new();
    let h3 = H3.get_or_init(|| Regex::new(r"(?is)<h3>(.+?)</h3>").expect("valid regex"));

    h3.replace_all(html, |caps: &regex::Captures| {
        let title = caps[1].trim();
        let id = slugger.slug(title);
        headings.push(Heading {
            level: 3,
            slug: id.clone(),
            title: title.to_string(),
        });
        format!("<h3 id=\"{}\">{}</h3>", id, title)
    })
    .to_string()
}
