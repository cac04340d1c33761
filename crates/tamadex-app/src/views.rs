//! Serializable views joining catalog records with favorites state.

use crate::state::AppState;
use serde::Serialize;
use tamadex_catalog::{Category, Character, Item};

/// An item as shown on list and detail screens.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView<'a> {
    /// The item record
    #[serde(flatten)]
    pub item: &'a Item,
    /// Display name of the item's category, if declared
    pub category_name: Option<&'a str>,
    /// Whether the item is a favorite
    pub favorite: bool,
}

impl<'a> ItemView<'a> {
    /// Build the view for `item`.
    #[must_use]
    pub fn new(state: &'a AppState, item: &'a Item) -> Self {
        Self {
            item,
            category_name: state
                .catalog
                .get_category(item.category.as_str())
                .map(|c| c.name.as_str()),
            favorite: state.item_favorites.is_favorite(item.id.as_str()),
        }
    }
}

/// Compact reference to another entity.
#[derive(Debug, Serialize)]
pub struct EntityRef<'a> {
    /// Entity id
    pub id: &'a str,
    /// Display name, absent when the id is unknown
    pub name: Option<&'a str>,
}

/// A character as shown on the detail screen.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterView<'a> {
    /// The character record
    #[serde(flatten)]
    pub character: &'a Character,
    /// Human-readable rarity
    pub rarity_name: &'static str,
    /// Rarity badge color
    pub rarity_color: &'static str,
    /// Liked items that exist in the catalog
    pub favorite_items: Vec<EntityRef<'a>>,
    /// Previous evolution stage
    pub evolves_from_ref: Option<EntityRef<'a>>,
    /// Next evolution stages
    pub evolves_to_refs: Vec<EntityRef<'a>>,
    /// Whether the character is a favorite
    pub favorite: bool,
}

impl<'a> CharacterView<'a> {
    /// Build the view for `character`.
    #[must_use]
    pub fn new(state: &'a AppState, character: &'a Character) -> Self {
        let character_ref = move |id: &'a str| EntityRef {
            id,
            name: state.catalog.get_character(id).map(|c| c.name.as_str()),
        };

        Self {
            character,
            rarity_name: character.rarity.display_name(),
            rarity_color: character.rarity.color(),
            favorite_items: state
                .catalog
                .favorite_items_of(character)
                .into_iter()
                .map(|item| EntityRef {
                    id: item.id.as_str(),
                    name: Some(item.name.as_str()),
                })
                .collect(),
            evolves_from_ref: character
                .evolves_from
                .as_ref()
                .map(|id| character_ref(id.as_str())),
            evolves_to_refs: character
                .evolves_to
                .iter()
                .map(|id| character_ref(id.as_str()))
                .collect(),
            favorite: state
                .character_favorites
                .is_favorite(character.id.as_str()),
        }
    }
}

/// A category with its item count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView<'a> {
    /// The category record
    #[serde(flatten)]
    pub category: &'a Category,
    /// Number of items in the category
    pub item_count: usize,
}

/// Catalog and favorites totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Number of items
    pub items: usize,
    /// Number of characters
    pub characters: usize,
    /// Number of categories
    pub categories: usize,
    /// Number of favorited items
    pub favorite_items: usize,
    /// Number of favorited characters
    pub favorite_characters: usize,
}

impl Stats {
    /// Collect totals from `state`.
    #[must_use]
    pub fn collect(state: &AppState) -> Self {
        Self {
            items: state.catalog.items().len(),
            characters: state.catalog.characters().len(),
            categories: state.catalog.categories().len(),
            favorite_items: state.item_favorites.len(),
            favorite_characters: state.character_favorites.len(),
        }
    }
}
