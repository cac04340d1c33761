//! Raw record shapes as found in exported dataset documents.
//!
//! Exports produced by different scraping passes disagree on field names
//! (`imageUrl` vs `spriteUrl`, nested `preferences`/`evolution` objects vs
//! flat fields, string vs numeric ids). These structs accept every known
//! spelling; normalization into [`crate::model`] types happens in the loader.
//!
//! Every field is lenient: a value of the wrong type reads as absent instead
//! of rejecting the whole record, so the loader's fallbacks apply to it.

use serde::Deserialize;

mod lenient {
    use serde::{de::DeserializeOwned, Deserialize, Deserializer};
    use serde_json::Value;

    /// Strings as-is, numbers and booleans as their text, anything else absent.
    pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => Some(text),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        })
    }

    /// The value if it has the expected shape, otherwise absent.
    pub(crate) fn value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(serde_json::from_value(Value::deserialize(deserializer)?).ok())
    }

    /// Array elements of the expected shape; a non-array is absent.
    pub(crate) fn list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(values) => Some(
                values
                    .into_iter()
                    .filter_map(|value| serde_json::from_value(value).ok())
                    .collect(),
            ),
            _ => None,
        })
    }
}

/// An id that may have been exported as a string or a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    /// Canonical string form, or `None` for blank ids.
    pub(crate) fn normalized(&self) -> Option<String> {
        match self {
            Self::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::Number(number) => Some(number.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawItem {
    #[serde(default, deserialize_with = "lenient::value")]
    pub id: Option<RawId>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", alias = "item_code", alias = "code")]
    pub item_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", alias = "sprite_url", alias = "imageUrl")]
    pub sprite_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", alias = "qr_code_url", alias = "qrUrl")]
    pub qr_code_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCharacter {
    #[serde(default, deserialize_with = "lenient::value")]
    pub id: Option<RawId>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", alias = "sprite_url")]
    pub sprite_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub preferences: Option<RawPreferences>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub favorite_item_ids: Option<Vec<RawId>>,
    #[serde(default, deserialize_with = "lenient::list", alias = "preferredCategories")]
    pub prefered_categories: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub evolution: Option<RawEvolution>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub rarity: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::value",
        rename = "evolves_from",
        alias = "evolvesFrom"
    )]
    pub evolves_from: Option<RawId>,
    #[serde(
        default,
        deserialize_with = "lenient::list",
        rename = "evolves_to",
        alias = "evolvesTo"
    )]
    pub evolves_to: Option<Vec<RawId>>,
}

impl RawCharacter {
    /// First non-blank image field, `imageUrl` taking precedence.
    pub(crate) fn raw_image(&self) -> &str {
        [&self.image_url, &self.sprite_url]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPreferences {
    #[serde(default, deserialize_with = "lenient::list")]
    pub favorite_item_ids: Option<Vec<RawId>>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub likes_items: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEvolution {
    #[serde(default, deserialize_with = "lenient::text")]
    pub rarity: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub evolves_from: Option<Vec<RawId>>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub evolves_to: Option<Vec<RawId>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCategory {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", alias = "icon_family")]
    pub icon_family: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_id_normalization() {
        let text: RawId = serde_json::from_str("\" mametchi \"").expect("parse text id");
        assert_eq!(text.normalized().as_deref(), Some("mametchi"));

        let blank: RawId = serde_json::from_str("\"  \"").expect("parse blank id");
        assert_eq!(blank.normalized(), None);

        let number: RawId = serde_json::from_str("17").expect("parse numeric id");
        assert_eq!(number.normalized().as_deref(), Some("17"));
    }

    #[test]
    fn test_raw_item_aliases() {
        let item: RawItem = serde_json::from_str(
            r#"{"id": 3, "name": "Cake", "code": "C-01", "sprite_url": "a.png", "qrUrl": "q.png"}"#,
        )
        .expect("parse legacy item");

        assert_eq!(item.item_code.as_deref(), Some("C-01"));
        assert_eq!(item.sprite_url.as_deref(), Some("a.png"));
        assert_eq!(item.qr_code_url.as_deref(), Some("q.png"));
    }

    #[test]
    fn test_raw_character_image_precedence() {
        let character: RawCharacter =
            serde_json::from_str(r#"{"imageUrl": "", "spriteUrl": "b.png"}"#)
                .expect("parse character");
        assert_eq!(character.raw_image(), "b.png");

        let character: RawCharacter =
            serde_json::from_str(r#"{"imageUrl": "a.png", "spriteUrl": "b.png"}"#)
                .expect("parse character");
        assert_eq!(character.raw_image(), "a.png");

        assert_eq!(RawCharacter::default().raw_image(), "");
    }

    #[test]
    fn test_raw_character_nested_objects() {
        let character: RawCharacter = serde_json::from_str(
            r#"{
                "preferences": {"favoriteItemIds": ["i1", 2], "likesItems": ["food"]},
                "evolution": {"rarity": "rare", "evolvesFrom": ["babytchi"], "evolvesTo": ["x"]},
                "evolves_from": "ignored"
            }"#,
        )
        .expect("parse nested character");

        let preferences = character.preferences.expect("preferences present");
        assert_eq!(preferences.favorite_item_ids.map(|ids| ids.len()), Some(2));
        let evolution = character.evolution.expect("evolution present");
        assert_eq!(evolution.rarity.as_deref(), Some("rare"));
        assert!(character.evolves_from.is_some());
    }

    #[test]
    fn test_wrong_field_types_read_as_absent() {
        let item: RawItem = serde_json::from_str(
            r#"{"id": [1], "name": 12, "code": false, "category": null, "qrUrl": {}}"#,
        )
        .expect("parse mistyped item");

        assert!(item.id.is_none());
        assert_eq!(item.name.as_deref(), Some("12"));
        assert_eq!(item.item_code.as_deref(), Some("false"));
        assert!(item.category.is_none());
        assert!(item.qr_code_url.is_none());

        let character: RawCharacter = serde_json::from_str(
            r#"{"preferences": 3, "evolves_to": [null, "x", {}], "rarity": ["rare"]}"#,
        )
        .expect("parse mistyped character");

        assert!(character.preferences.is_none());
        assert_eq!(character.evolves_to.map(|ids| ids.len()), Some(1));
        assert!(character.rarity.is_none());
    }
}
