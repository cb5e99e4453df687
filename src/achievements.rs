use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    client::{ApiError, Transport},
    qbank::id_from_any,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Estudo,
    Questoes,
    Simulados,
    Trilhas,
    Sequencia,
    #[serde(other)]
    #[default]
    Outra,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Estudo => "Estudo",
            Category::Questoes => "Questões",
            Category::Simulados => "Simulados",
            Category::Trilhas => "Trilhas",
            Category::Sequencia => "Sequência",
            Category::Outra => "Outras",
        }
    }
}

/// Unlocking is decided by the server; the client only shows the result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Achievement {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,

    #[serde(rename = "titulo")]
    pub title: String,

    #[serde(rename = "categoria", default, deserialize_with = "null_as_default")]
    pub category: Category,

    #[serde(rename = "nivel", default, deserialize_with = "null_as_default")]
    pub level: u32,

    #[serde(rename = "descricao", default, deserialize_with = "null_as_default")]
    pub description: String,

    /// what the learner has to do, as text
    #[serde(rename = "criterio", default, deserialize_with = "null_as_default")]
    pub criterion: String,

    #[serde(rename = "imagem", default)]
    pub image: Option<String>,

    #[serde(rename = "especial", default, deserialize_with = "null_as_default")]
    pub special: bool,

    #[serde(rename = "desbloqueada", default, deserialize_with = "null_as_default")]
    pub unlocked: bool,
}

// the api sends `null` for fields it has no value for
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default)]
pub struct AchievementGroups {
    /// regular achievements by category, lowest level first
    pub by_category: BTreeMap<Category, Vec<Achievement>>,
    pub special: Vec<Achievement>,
    pub unlocked: usize,
    pub total: usize,
}

pub fn get_achievements(api: &dyn Transport) -> Result<Vec<Achievement>, ApiError> {
    let body = api.get("/mobile/v1/conquistas")?;
    parse_achievements(body)
}

/// Accepts a bare list or one wrapped as `{"conquistas": [...]}`.
pub(crate) fn parse_achievements(body: Value) -> Result<Vec<Achievement>, ApiError> {
    let list = match body {
        Value::Object(mut map) => map.remove("conquistas").unwrap_or(Value::Array(vec![])),
        Value::Null => Value::Array(vec![]),
        other => other,
    };
    Ok(serde_json::from_value(list)?)
}

pub fn group_achievements(achievements: Vec<Achievement>) -> AchievementGroups {
    let mut groups = AchievementGroups {
        total: achievements.len(),
        unlocked: achievements.iter().filter(|a| a.unlocked).count(),
        ..Default::default()
    };

    for achievement in achievements {
        if achievement.special {
            groups.special.push(achievement);
        } else {
            groups
                .by_category
                .entry(achievement.category)
                .or_default()
                .push(achievement);
        }
    }

    for list in groups.by_category.values_mut() {
        list.sort_by_key(|a| a.level);
    }
    groups
}
