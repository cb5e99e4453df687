use anyhow::Context;
use serde_json::Value;
use std::str::FromStr;

use super::activity::{Activity, ActivityType, Block, BlockParent, BlockProgress};
use crate::client::Transport;

pub fn get_block(api: &dyn Transport, block_id: &str) -> anyhow::Result<Block> {
    let body = api
        .get(&format!("/mobile/v1/blocos/{}", block_id))
        .context(format!("failed to fetch block {}", block_id))?;

    parse_block(&body).context(format!("failed to parse block {}", block_id))
}

pub fn parse_block(body: &Value) -> anyhow::Result<Block> {
    let id: String = get_attribute(body, "id").context("block must set id")?;
    let title: String =
        get_attribute(body, "titulo").context(format!("block '{}' must set titulo", id))?;

    let default_activities = Vec::new();
    let activities = body
        .get("atividades")
        .and_then(|v| v.as_array())
        .unwrap_or(&default_activities)
        .iter()
        .enumerate()
        .map(|(index, activity)| parse_activity(activity, index, &title))
        .collect::<anyhow::Result<Vec<Activity>>>()?;

    let progress = body.get("progresso").filter(|p| p.is_object()).map(|p| BlockProgress {
        completed: get_attribute(p, "concluido").unwrap_or_default(),
        percent: get_attribute(p, "percentual").unwrap_or_default(),
    });

    let answered_questions = body
        .get("respostas")
        .and_then(|r| r.as_array())
        .map(|answers| {
            answers
                .iter()
                .filter_map(|a| get_attribute::<String>(a, "questaoId"))
                .collect()
        })
        .unwrap_or_default();

    Ok(Block {
        order: get_attribute(body, "ordem").unwrap_or_default(),
        trail: parse_parent(body, "trilha")?,
        path: parse_parent(body, "caminho")?,
        id,
        title,
        activities,
        progress,
        answered_questions,
    })
}

fn parse_activity(activity: &Value, index: usize, block_title: &str) -> anyhow::Result<Activity> {
    let id: String = get_attribute(activity, "id").context(format!(
        "activity '{}' in block '{}' must set id",
        index, block_title
    ))?;
    let title: String = get_attribute(activity, "titulo").unwrap_or_default();

    let tag: String = get_attribute(activity, "tipo").context(format!(
        "activity '{}' in block '{}' must set tipo",
        id, block_title
    ))?;
    let activity_type = ActivityType::from_str(&tag)
        .map_err(anyhow::Error::msg)
        .context(format!("activity '{}' in block '{}'", id, block_title))?;

    let question_ids = activity
        .get("questaoIds")
        .and_then(|q| q.as_array())
        .map(|ids| ids.iter().filter_map(value_to_string).collect())
        .unwrap_or_default();

    Ok(Activity {
        order: get_attribute(activity, "ordem").unwrap_or(index),
        content: get_attribute(activity, "conteudo"),
        video_url: get_attribute(activity, "videoUrl"),
        id,
        title,
        activity_type,
        question_ids,
    })
}

fn parse_parent(body: &Value, field: &str) -> anyhow::Result<Option<BlockParent>> {
    match body.get(field).filter(|p| p.is_object()) {
        Some(p) => Ok(Some(BlockParent::new(
            get_attribute(p, "id").context(format!("{} must set id", field))?,
            get_attribute(p, "titulo").context(format!("{} must set titulo", field))?,
        ))),
        None => Ok(None),
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn get_attribute<T>(value: &Value, attribute: &str) -> Option<T>
where
    T: FromStr,
{
    value.get(attribute).and_then(|v| match v {
        Value::String(s) => T::from_str(s).ok(),
        Value::Number(n) => T::from_str(&n.to_string()).ok(),
        Value::Bool(b) => T::from_str(&b.to_string()).ok(),
        _ => None,
    })
}
