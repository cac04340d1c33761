//! Command-line interface.
//!
//! Every command prints one JSON document on stdout; logs go to stderr.

use crate::{
    error::{AppError, Result},
    state::{entity_kind, AppState},
    views::{CategoryView, CharacterView, ItemView, Stats},
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use tamadex_catalog::Entity;
use tamadex_core::{AppConfig, Rarity, SearchPolicy};
use tamadex_favorites::FavoritesDomain;
use tracing::info;

/// Browse the Tamadex catalog and manage favorites.
#[derive(Debug, Parser)]
#[command(name = "tamadex", version)]
pub struct Cli {
    /// Configuration file (defaults to the XDG config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Dataset document, overriding the configuration
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,

    /// Favorites database, overriding the configuration
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// What to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchScope {
    /// Items by name
    Items,
    /// Characters by name or description
    Characters,
    /// Items, then characters
    All,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Catalog and favorites totals
    Stats,

    /// List categories with item counts
    Categories,

    /// List the items in a category
    Category {
        /// Category id
        id: String,
    },

    /// Show an item
    Item {
        /// Item id
        id: String,
    },

    /// Show a character with likes and evolutions
    Character {
        /// Character id
        id: String,
    },

    /// List characters of a rarity
    Rarity {
        /// Rarity name (e.g. `rare`, `very-rare`)
        rarity: Rarity,
    },

    /// Search the catalog
    Search {
        /// Text to look for; may be empty
        #[arg(default_value = "")]
        query: String,

        /// What to search
        #[arg(long, value_enum, default_value_t = SearchScope::Items)]
        scope: SearchScope,

        /// Minimum query length; shorter queries return nothing
        #[arg(long)]
        min_chars: Option<usize>,
    },

    /// Toggle a favorite
    Toggle {
        /// `items` or `characters`
        domain: FavoritesDomain,
        /// Entity id
        id: String,
    },

    /// List favorites
    Favorites {
        /// `items` or `characters`
        domain: FavoritesDomain,
    },

    /// Remove all favorites of a domain
    ClearFavorites {
        /// `items` or `characters`
        domain: FavoritesDomain,
    },

    /// Show the effective configuration
    Config {
        /// Also write it as TOML to this file
        #[arg(long)]
        save_to: Option<PathBuf>,
    },
}

impl Cli {
    /// Load configuration, then apply environment and flag overrides.
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_from(path)?,
            None => AppConfig::load()?,
        };
        config.apply_env_overrides();
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// Apply command-line overrides to `config`.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dataset) = &self.dataset {
            config.data.dataset_path.clone_from(dataset);
        }
        if let Some(database) = &self.database {
            config.storage.database_path = Some(database.clone());
        }
    }
}

fn render<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Run `command` against `state`.
pub fn execute(state: &AppState, command: &Command) -> Result<Value> {
    match command {
        Command::Stats => render(&Stats::collect(state)),

        Command::Categories => {
            let counts = state.catalog.count_by_category();
            let views: Vec<CategoryView<'_>> = state
                .catalog
                .categories()
                .iter()
                .map(|category| CategoryView {
                    category,
                    item_count: counts.get(&category.id).copied().unwrap_or(0),
                })
                .collect();
            render(&views)
        }

        Command::Category { id } => {
            let category = state
                .catalog
                .get_category(id)
                .ok_or_else(|| AppError::not_found("category", id.as_str()))?;
            let items: Vec<ItemView<'_>> = state
                .catalog
                .items_by_category(id)
                .into_iter()
                .map(|item| ItemView::new(state, item))
                .collect();
            render(&json!({ "category": render(category)?, "items": render(&items)? }))
        }

        Command::Item { id } => {
            let item = state
                .catalog
                .get_item(id)
                .ok_or_else(|| AppError::not_found("item", id.as_str()))?;
            render(&ItemView::new(state, item))
        }

        Command::Character { id } => {
            let character = state
                .catalog
                .get_character(id)
                .ok_or_else(|| AppError::not_found("character", id.as_str()))?;
            render(&CharacterView::new(state, character))
        }

        Command::Rarity { rarity } => {
            let names: Vec<&str> = state
                .catalog
                .characters_by_rarity(*rarity)
                .into_iter()
                .map(|c| c.name.as_str())
                .collect();
            render(&json!({ "rarity": rarity.as_str(), "characters": names }))
        }

        Command::Search {
            query,
            scope,
            min_chars,
        } => search(state, query, *scope, *min_chars),

        Command::Toggle { domain, id } => {
            let favorite = state.toggle_favorite(*domain, id)?;
            render(&json!({ "domain": domain.as_str(), "id": id, "favorite": favorite }))
        }

        Command::Favorites { domain } => favorites(state, *domain),

        Command::ClearFavorites { domain } => {
            let removed = state.favorites(*domain).clear();
            render(&json!({ "domain": domain.as_str(), "removed": removed }))
        }

        Command::Config { save_to } => {
            if let Some(path) = save_to {
                state.config.save_to(path)?;
                info!(path = %path.display(), "configuration written");
            }
            render(&state.config)
        }
    }
}

fn search(
    state: &AppState,
    query: &str,
    scope: SearchScope,
    min_chars: Option<usize>,
) -> Result<Value> {
    let configured = |default: &SearchPolicy| match min_chars {
        Some(min_chars) => SearchPolicy::strict(min_chars),
        None => *default,
    };

    let results: Vec<Value> = match scope {
        SearchScope::Items => state
            .search
            .search_items(query, &configured(&state.config.search.items))
            .into_iter()
            .map(|item| render(&ItemView::new(state, item)))
            .collect::<Result<_>>()?,
        SearchScope::Characters => state
            .search
            .search_characters(query, &configured(&state.config.search.characters))
            .into_iter()
            .map(|character| render(&CharacterView::new(state, character)))
            .collect::<Result<_>>()?,
        SearchScope::All => state
            .search
            .search(query, &configured(&SearchPolicy::browse()))
            .into_iter()
            .map(|entity| match entity {
                Entity::Item(item) => render(&ItemView::new(state, item)),
                Entity::Character(character) => render(&CharacterView::new(state, character)),
            })
            .collect::<Result<_>>()?,
    };

    render(&json!({ "query": query, "count": results.len(), "results": results }))
}

fn favorites(state: &AppState, domain: FavoritesDomain) -> Result<Value> {
    let store = state.favorites(domain);
    let entities = match domain {
        FavoritesDomain::Items => state
            .favorite_items()
            .into_iter()
            .map(|item| render(&ItemView::new(state, item)))
            .collect::<Result<Vec<_>>>()?,
        FavoritesDomain::Characters => state
            .favorite_characters()
            .into_iter()
            .map(|character| render(&CharacterView::new(state, character)))
            .collect::<Result<Vec<_>>>()?,
    };

    render(&json!({
        "domain": domain.as_str(),
        "kind": entity_kind(domain),
        "ids": store.favorites(),
        "entities": entities,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::sample_state;
    use std::sync::Arc;
    use tamadex_db::MemoryStore;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tamadex").chain(args.iter().copied()))
            .expect("parse arguments")
    }

    #[test]
    fn test_parse_commands() {
        let cli = parse(&["search", "cake", "--scope", "all", "--min-chars", "3"]);
        assert!(matches!(
            cli.command,
            Command::Search {
                scope: SearchScope::All,
                min_chars: Some(3),
                ..
            }
        ));

        let cli = parse(&["--dataset", "/tmp/d.json", "toggle", "characters", "tama-0"]);
        assert_eq!(cli.dataset, Some(PathBuf::from("/tmp/d.json")));
        assert!(matches!(
            cli.command,
            Command::Toggle {
                domain: FavoritesDomain::Characters,
                ..
            }
        ));

        let cli = parse(&["rarity", "very_rare"]);
        assert!(matches!(
            cli.command,
            Command::Rarity {
                rarity: Rarity::VeryRare
            }
        ));

        assert!(Cli::try_parse_from(["tamadex", "toggle", "places", "x"]).is_err());
    }

    #[test]
    fn test_flag_overrides() {
        let cli = parse(&["--database", "/tmp/fav.db", "stats"]);
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(
            config.storage.database_path,
            Some(PathBuf::from("/tmp/fav.db"))
        );
        assert_eq!(config.data.dataset_path, PathBuf::from("data/tamadex.json"));
    }

    #[tokio::test]
    async fn test_execute_lookup_commands() {
        let state = sample_state(Arc::new(MemoryStore::new()));
        state.wait_until_hydrated().await.expect("hydrate");

        let stats = execute(&state, &Command::Stats).expect("stats");
        assert_eq!(stats["items"], 3);
        assert_eq!(stats["characters"], 2);

        let categories = execute(&state, &Command::Categories).expect("categories");
        assert_eq!(categories[0]["id"], "food");
        assert_eq!(categories[0]["itemCount"], 2);

        let food = execute(
            &state,
            &Command::Category {
                id: "food".to_string(),
            },
        )
        .expect("category");
        assert_eq!(food["items"][1]["id"], "onigiri");
        assert_eq!(food["items"][1]["categoryName"], "Food");

        let character = execute(
            &state,
            &Command::Character {
                id: "mametchi".to_string(),
            },
        )
        .expect("character");
        assert_eq!(character["rarityName"], "Rare");
        assert_eq!(character["favoriteItems"][0]["name"], "Strawberry Cake");
        assert_eq!(character["evolvesToRefs"][0]["name"], "Kuchipatchi");

        assert!(matches!(
            execute(
                &state,
                &Command::Item {
                    id: "missing".to_string()
                }
            ),
            Err(AppError::NotFound { kind: "item", .. })
        ));
    }

    #[tokio::test]
    async fn test_execute_search_scopes() {
        let state = sample_state(Arc::new(MemoryStore::new()));

        let strict = execute(
            &state,
            &Command::Search {
                query: String::new(),
                scope: SearchScope::Items,
                min_chars: None,
            },
        )
        .expect("item search");
        assert_eq!(strict["count"], 0);

        let all = execute(
            &state,
            &Command::Search {
                query: String::new(),
                scope: SearchScope::All,
                min_chars: None,
            },
        )
        .expect("search all");
        assert_eq!(all["count"], 5);

        let cake = execute(
            &state,
            &Command::Search {
                query: "cake".to_string(),
                scope: SearchScope::All,
                min_chars: Some(2),
            },
        )
        .expect("search cake");
        assert_eq!(cake["count"], 2);
    }

    #[tokio::test]
    async fn test_execute_favorite_commands() {
        let state = sample_state(Arc::new(MemoryStore::new()));
        state.wait_until_hydrated().await.expect("hydrate");

        let toggled = execute(
            &state,
            &Command::Toggle {
                domain: FavoritesDomain::Items,
                id: "ball".to_string(),
            },
        )
        .expect("toggle");
        assert_eq!(toggled["favorite"], true);

        let listed = execute(
            &state,
            &Command::Favorites {
                domain: FavoritesDomain::Items,
            },
        )
        .expect("favorites");
        assert_eq!(listed["ids"], json!(["ball"]));
        assert_eq!(listed["entities"][0]["favorite"], true);

        let cleared = execute(
            &state,
            &Command::ClearFavorites {
                domain: FavoritesDomain::Items,
            },
        )
        .expect("clear");
        assert_eq!(cleared["removed"], 1);
        assert!(state.item_favorites.is_empty());
    }

    #[tokio::test]
    async fn test_config_command_writes_effective_config() {
        let state = sample_state(Arc::new(MemoryStore::new()));
        let tmp = tempfile::TempDir::new().expect("create temp dir");
        let path = tmp.path().join("config.toml");

        let shown = execute(
            &state,
            &Command::Config {
                save_to: Some(path.clone()),
            },
        )
        .expect("config");
        assert_eq!(shown["search"]["items"]["min_chars"], 2);

        let saved = AppConfig::load_from(&path).expect("load saved config");
        assert_eq!(saved, state.config);
    }
}
