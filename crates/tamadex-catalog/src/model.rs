//! Normalized catalog entities.
//!
//! Every record is produced once by the [`DatasetLoader`](crate::DatasetLoader)
//! and never mutated afterwards. Favoriting an entity only changes set
//! membership in the favorites store, never the record itself.

use indexmap::IndexSet;
use serde::Serialize;
use tamadex_core::{CategoryId, EntityId, Rarity};

/// A collectible item with its QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique item identifier
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Short code printed under the item name
    pub item_code: String,
    /// Category the item belongs to
    pub category: CategoryId,
    /// Sprite image URL
    pub sprite_url: String,
    /// QR code image URL
    pub qr_code_url: String,
}

/// A character with preferences and evolution links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Unique character identifier
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Resolved display image (URL or embedded data URI)
    pub sprite_url: String,
    /// Items this character likes, in dataset order
    pub favorite_item_ids: IndexSet<EntityId>,
    /// Item categories this character prefers, in dataset order
    pub preferred_categories: IndexSet<CategoryId>,
    /// Rarity tier
    pub rarity: Rarity,
    /// Character this one evolves from
    pub evolves_from: Option<EntityId>,
    /// Characters this one can evolve into, in order
    pub evolves_to: Vec<EntityId>,
}

/// An item category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique category identifier
    pub id: CategoryId,
    /// Display name
    pub name: String,
    /// Accent color (hex)
    pub color: String,
    /// Icon name
    pub icon: String,
    /// Icon set the icon name belongs to
    pub icon_family: String,
}

/// Borrowed view over either kind of entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
pub enum Entity<'a> {
    /// An item record
    Item(&'a Item),
    /// A character record
    Character(&'a Character),
}

impl<'a> Entity<'a> {
    /// Entity identifier.
    #[must_use]
    pub fn id(&self) -> &'a EntityId {
        match self {
            Self::Item(item) => &item.id,
            Self::Character(character) => &character.id,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        match self {
            Self::Item(item) => &item.name,
            Self::Character(character) => &character.name,
        }
    }
}

/// The three normalized collections produced by one dataset load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dataset {
    /// Items in source order
    pub items: Vec<Item>,
    /// Characters in source order
    pub characters: Vec<Character>,
    /// Categories in source order
    pub categories: Vec<Category>,
}
