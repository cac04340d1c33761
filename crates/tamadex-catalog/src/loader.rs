//! Dataset loading and normalization.
//!
//! This module turns the exported dataset document into the canonical
//! [`Dataset`] collections. Loading is deterministic: the same document in
//! the same order always yields the same ids, which matters because ids are
//! persisted as favorites across restarts.

use crate::{
    error::{CatalogError, Result},
    images::{EmbeddedImages, ImageMapSource, ImageResolver},
    model::{Category, Character, Dataset, Item},
    raw::{RawCategory, RawCharacter, RawId, RawItem},
};
use indexmap::IndexSet;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tamadex_core::{CategoryId, DataConfig, EntityId, Rarity};
use tracing::{debug, info, warn};

/// Prefix of generated character ids.
pub const CHARACTER_ID_PREFIX: &str = "tama-";

/// Prefix of generated item ids.
pub const ITEM_ID_PREFIX: &str = "tama-item-";

const DEFAULT_CATEGORY_COLOR: &str = "#FF6B9D";
const DEFAULT_CATEGORY_ICON: &str = "help-circle";
const DEFAULT_ICON_FAMILY: &str = "Ionicons";

/// Loader for the catalog dataset.
#[derive(Debug)]
pub struct DatasetLoader {
    /// Primary dataset document
    dataset_path: PathBuf,
    /// Character image resolution chain
    images: ImageResolver,
}

impl DatasetLoader {
    /// Create a new loader for the given dataset file.
    ///
    /// # Errors
    /// Returns error if the dataset file doesn't exist.
    pub fn new(dataset_path: impl Into<PathBuf>, images: ImageResolver) -> Result<Self> {
        let dataset_path = dataset_path.into();

        if !dataset_path.is_file() {
            return Err(CatalogError::SourceNotFound {
                path: dataset_path.display().to_string(),
            });
        }

        Ok(Self {
            dataset_path,
            images,
        })
    }

    /// Create a loader from configuration.
    ///
    /// Optional image sources that are missing or unreadable are logged and
    /// replaced by empty maps; only the dataset itself is required.
    ///
    /// # Errors
    /// Returns error if the dataset file doesn't exist.
    pub fn from_config(config: &DataConfig) -> Result<Self> {
        let core = ImageMapSource::from_optional_path(config.embedded_core_path.as_ref())
            .load_or_empty("embedded-core");
        let extra = ImageMapSource::from_optional_path(config.embedded_extra_path.as_ref());
        let mapping = ImageMapSource::from_optional_path(config.image_map_path.as_ref())
            .load_or_empty("image-mapping");

        let images = ImageResolver::new(
            EmbeddedImages::new(core, extra),
            mapping,
            config.image_mirror_base.clone(),
        );

        Self::new(&config.dataset_path, images)
    }

    /// Path of the dataset document.
    #[must_use]
    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    /// Image resolver used for characters.
    #[must_use]
    pub fn images(&self) -> &ImageResolver {
        &self.images
    }

    /// Read and normalize the dataset file.
    ///
    /// # Errors
    /// Returns error if the file can't be read, is not JSON, or its root is
    /// not an object.
    pub fn load(&self) -> Result<Dataset> {
        let contents =
            std::fs::read_to_string(&self.dataset_path).map_err(|e| CatalogError::LoadError {
                path: self.dataset_path.display().to_string(),
                source: e,
            })?;

        let document: Value =
            serde_json::from_str(&contents).map_err(|e| CatalogError::ParseError {
                path: self.dataset_path.display().to_string(),
                source: e,
            })?;

        let dataset = self.load_value(&document)?;

        info!(
            items = dataset.items.len(),
            characters = dataset.characters.len(),
            categories = dataset.categories.len(),
            path = %self.dataset_path.display(),
            "loaded dataset"
        );

        Ok(dataset)
    }

    /// Normalize an already parsed dataset document.
    ///
    /// # Errors
    /// Returns error if the document root is not a JSON object.
    pub fn load_value(&self, document: &Value) -> Result<Dataset> {
        let root = document
            .as_object()
            .ok_or_else(|| CatalogError::MalformedSource {
                reason: format!("expected a JSON object at the root, found {}", kind(document)),
            })?;

        let categories = records::<RawCategory>(root, "categories")?
            .into_iter()
            .filter_map(|(index, raw)| normalize_category(index, raw))
            .collect::<Vec<_>>();
        let categories = dedup_by_id(categories, |c| c.id.as_str(), "category");

        let items = records::<RawItem>(root, "items")?
            .into_iter()
            .filter_map(|(index, raw)| normalize_item(index, raw))
            .collect::<Vec<_>>();
        let items = dedup_by_id(items, |i| i.id.as_str(), "item");

        let characters = records::<RawCharacter>(root, "characters")?
            .into_iter()
            .filter_map(|(index, raw)| self.normalize_character(index, &raw))
            .collect::<Vec<_>>();
        let characters = dedup_by_id(characters, |c| c.id.as_str(), "character");

        Ok(Dataset {
            items,
            characters,
            categories,
        })
    }

    fn normalize_character(&self, index: usize, raw: &RawCharacter) -> Option<Character> {
        let id = resolve_id(raw.id.as_ref(), CHARACTER_ID_PREFIX, index, "character")?;
        let name = non_blank(raw.name.as_deref()).map_or_else(|| format!("Unknown {id}"), str::to_string);

        let image = self.images.resolve(&name, raw.raw_image());
        debug!(character = %id, origin = ?image.origin, "resolved character image");

        let preferences = raw.preferences.as_ref();
        let evolution = raw.evolution.as_ref();

        let favorite_item_ids = preferences
            .and_then(|p| p.favorite_item_ids.as_ref())
            .or(raw.favorite_item_ids.as_ref())
            .map(|ids| entity_ids(ids))
            .unwrap_or_default();

        let preferred_categories = preferences
            .and_then(|p| p.likes_items.as_ref())
            .or(raw.prefered_categories.as_ref())
            .map(|ids| category_ids(ids, &id))
            .unwrap_or_default();

        let rarity = evolution
            .and_then(|e| non_blank(e.rarity.as_deref()))
            .or_else(|| non_blank(raw.rarity.as_deref()))
            .map_or(Rarity::Common, |value| {
                value.parse().unwrap_or_else(|_| {
                    debug!(character = %id, rarity = value, "unknown rarity, using common");
                    Rarity::Common
                })
            });

        let evolves_from = evolution
            .and_then(|e| e.evolves_from.as_ref())
            .and_then(|ids| ids.first())
            .and_then(to_entity_id)
            .or_else(|| raw.evolves_from.as_ref().and_then(to_entity_id));

        let evolves_to = evolution
            .and_then(|e| e.evolves_to.as_ref())
            .or(raw.evolves_to.as_ref())
            .map(|ids| ids.iter().filter_map(to_entity_id).collect())
            .unwrap_or_default();

        Some(Character {
            id,
            name,
            description: raw.description.clone().unwrap_or_default(),
            sprite_url: image.url,
            favorite_item_ids,
            preferred_categories,
            rarity,
            evolves_from,
            evolves_to,
        })
    }
}

/// Deserialize every record of a top-level array, skipping invalid ones.
///
/// A missing array loads as empty; a key holding something other than an
/// array is malformed.
fn records<T: DeserializeOwned>(root: &Map<String, Value>, key: &str) -> Result<Vec<(usize, T)>> {
    let Some(value) = root.get(key) else {
        warn!(collection = key, "collection missing from dataset, loading as empty");
        return Ok(Vec::new());
    };

    let array = match value {
        Value::Array(array) => array,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(CatalogError::MalformedSource {
                reason: format!("'{key}' must be an array, found {}", kind(other)),
            })
        }
    };

    let mut parsed = Vec::with_capacity(array.len());
    for (index, record) in array.iter().enumerate() {
        match serde_json::from_value::<T>(record.clone()) {
            Ok(raw) => parsed.push((index, raw)),
            Err(e) => warn!(
                collection = key,
                index,
                error = %e,
                "skipping invalid record"
            ),
        }
    }

    Ok(parsed)
}

/// Drop records whose id was already seen; the first occurrence wins.
fn dedup_by_id<T>(records: Vec<T>, id: impl Fn(&T) -> &str, kind: &str) -> Vec<T> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| {
            let fresh = seen.insert(id(record).to_string());
            if !fresh {
                warn!(kind, id = id(record), "skipping duplicate id");
            }
            fresh
        })
        .collect()
}

fn resolve_id(raw: Option<&RawId>, prefix: &str, index: usize, kind: &str) -> Option<EntityId> {
    let id = raw
        .and_then(RawId::normalized)
        .unwrap_or_else(|| format!("{prefix}{index}"));

    match EntityId::new(id) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(kind, index, error = %e, "skipping record with invalid id");
            None
        }
    }
}

fn normalize_item(index: usize, raw: RawItem) -> Option<Item> {
    let id = resolve_id(raw.id.as_ref(), ITEM_ID_PREFIX, index, "item")?;

    let Some(category) = non_blank(raw.category.as_deref()) else {
        warn!(item = %id, "skipping item without category");
        return None;
    };
    let category = match CategoryId::new(category) {
        Ok(category) => category,
        Err(e) => {
            warn!(item = %id, error = %e, "skipping item with invalid category");
            return None;
        }
    };

    let name = non_blank(raw.name.as_deref()).map_or_else(|| format!("Unknown {id}"), str::to_string);

    Some(Item {
        id,
        name,
        item_code: raw.item_code.unwrap_or_default(),
        category,
        sprite_url: raw.sprite_url.unwrap_or_default(),
        qr_code_url: raw.qr_code_url.unwrap_or_default(),
    })
}

fn normalize_category(index: usize, raw: RawCategory) -> Option<Category> {
    let id = match CategoryId::new(raw.id.unwrap_or_default().trim()) {
        Ok(id) => id,
        Err(e) => {
            warn!(index, error = %e, "skipping category with invalid id");
            return None;
        }
    };

    Some(Category {
        name: non_blank(raw.name.as_deref()).map_or_else(|| id.to_string(), str::to_string),
        color: non_blank(raw.color.as_deref()).unwrap_or(DEFAULT_CATEGORY_COLOR).to_string(),
        icon: non_blank(raw.icon.as_deref()).unwrap_or(DEFAULT_CATEGORY_ICON).to_string(),
        icon_family: non_blank(raw.icon_family.as_deref())
            .unwrap_or(DEFAULT_ICON_FAMILY)
            .to_string(),
        id,
    })
}

fn to_entity_id(raw: &RawId) -> Option<EntityId> {
    raw.normalized().and_then(|id| EntityId::new(id).ok())
}

fn entity_ids(raw: &[RawId]) -> IndexSet<EntityId> {
    raw.iter().filter_map(to_entity_id).collect()
}

fn category_ids(raw: &[String], owner: &EntityId) -> IndexSet<CategoryId> {
    raw.iter()
        .filter_map(|id| match CategoryId::new(id.trim()) {
            Ok(id) => Some(id),
            Err(e) => {
                debug!(character = %owner, error = %e, "ignoring invalid preferred category");
                None
            }
        })
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
