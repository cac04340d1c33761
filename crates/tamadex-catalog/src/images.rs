//! Character image resolution.
//!
//! A character's display image is looked up through an ordered chain; the
//! first source that knows the character wins:
//!
//! 1. embedded images keyed by character name (core tier, then extra tier)
//! 2. an external name -> URL mapping
//! 3. the raw field, when it already is an `http(s)` URL
//! 4. a URL built from the raw field on the image mirror
//!
//! All sources except the raw field are optional enrichment data. A missing
//! or unreadable source degrades to an empty map and never fails loading.

use crate::error::{CatalogError, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Name -> image map.
pub type ImageMap = HashMap<String, String>;

/// Where an image map comes from.
#[derive(Debug, Clone, Default)]
pub enum ImageMapSource {
    /// JSON object file mapping names to images
    File(PathBuf),
    /// Map already in memory
    Inline(ImageMap),
    /// No source configured
    #[default]
    Missing,
}

impl ImageMapSource {
    /// Source for an optional configured path.
    #[must_use]
    pub fn from_optional_path(path: Option<&PathBuf>) -> Self {
        path.map_or(Self::Missing, |p| Self::File(p.clone()))
    }

    /// Load the map.
    ///
    /// # Errors
    /// Returns error if the file is missing, unreadable, or not a JSON object
    /// of strings. `Missing` loads as an empty map.
    pub fn load(&self) -> Result<ImageMap> {
        match self {
            Self::File(path) => {
                if !path.exists() {
                    return Err(CatalogError::SourceNotFound {
                        path: path.display().to_string(),
                    });
                }

                let contents =
                    std::fs::read_to_string(path).map_err(|e| CatalogError::LoadError {
                        path: path.display().to_string(),
                        source: e,
                    })?;

                serde_json::from_str(&contents).map_err(|e| CatalogError::ParseError {
                    path: path.display().to_string(),
                    source: e,
                })
            }
            Self::Inline(map) => Ok(map.clone()),
            Self::Missing => Ok(ImageMap::new()),
        }
    }

    /// Load the map, substituting an empty one on any failure.
    pub fn load_or_empty(&self, label: &str) -> ImageMap {
        match self.load() {
            Ok(map) => {
                debug!(source = label, count = map.len(), "loaded image map");
                map
            }
            Err(e) => {
                warn!(source = label, error = %e, "image map unavailable, continuing without it");
                ImageMap::new()
            }
        }
    }
}

/// Load state of the extra embedded tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierState {
    /// Not requested yet
    Pending,
    /// Loaded and cached
    Loaded,
    /// Load was attempted and failed; not retried
    Unavailable,
}

#[derive(Debug)]
enum ExtraTier {
    Pending(ImageMapSource),
    Loaded(Arc<ImageMap>),
    Unavailable,
}

/// Two-tier embedded image store.
///
/// The core tier is loaded at construction. The extra tier stays `Pending`
/// until the first core miss (or an explicit [`preload`](Self::preload)),
/// at which point it is promoted to `Loaded` or `Unavailable` exactly once.
#[derive(Debug)]
pub struct EmbeddedImages {
    core: ImageMap,
    extra: Mutex<ExtraTier>,
}

impl EmbeddedImages {
    /// Create a store from a loaded core tier and a lazily loaded extra source.
    #[must_use]
    pub fn new(core: ImageMap, extra: ImageMapSource) -> Self {
        Self {
            core,
            extra: Mutex::new(ExtraTier::Pending(extra)),
        }
    }

    /// Store with no embedded images at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            core: ImageMap::new(),
            extra: Mutex::new(ExtraTier::Unavailable),
        }
    }

    /// Look up an embedded image by character name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        if let Some(image) = self.core.get(name) {
            return Some(image.clone());
        }

        self.extra_tier()
            .and_then(|extra| extra.get(name).cloned())
    }

    /// Promote the extra tier now instead of on the first miss.
    pub fn preload(&self) {
        let _ = self.extra_tier();
    }

    /// Current state of the extra tier.
    #[must_use]
    pub fn extra_state(&self) -> TierState {
        let extra = self.extra.lock().expect("extra image tier lock poisoned");
        match *extra {
            ExtraTier::Pending(_) => TierState::Pending,
            ExtraTier::Loaded(_) => TierState::Loaded,
            ExtraTier::Unavailable => TierState::Unavailable,
        }
    }

    fn extra_tier(&self) -> Option<Arc<ImageMap>> {
        let mut extra = self.extra.lock().expect("extra image tier lock poisoned");

        match &*extra {
            ExtraTier::Loaded(map) => Some(Arc::clone(map)),
            ExtraTier::Unavailable => None,
            ExtraTier::Pending(source) => {
                let promoted = match source {
                    ImageMapSource::Missing => {
                        debug!("no extra embedded image source configured");
                        ExtraTier::Unavailable
                    }
                    source => match source.load() {
                        Ok(map) => {
                            info!(count = map.len(), "promoted extra embedded image tier");
                            ExtraTier::Loaded(Arc::new(map))
                        }
                        Err(e) => {
                            warn!(error = %e, "extra embedded images unavailable");
                            ExtraTier::Unavailable
                        }
                    },
                };

                *extra = promoted;
                match &*extra {
                    ExtraTier::Loaded(map) => Some(Arc::clone(map)),
                    _ => None,
                }
            }
        }
    }
}

impl Default for EmbeddedImages {
    fn default() -> Self {
        Self::empty()
    }
}

/// Which step of the chain produced an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    /// Embedded image (core or extra tier)
    Embedded,
    /// External name mapping
    Mapping,
    /// Raw field was already a URL
    Direct,
    /// Built from the raw field on the mirror
    Mirror,
    /// Nothing to resolve from
    Unresolved,
}

/// A resolved image and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// URL or data URI; empty when unresolved
    pub url: String,
    /// Resolution step that produced `url`
    pub origin: ImageOrigin,
}

/// Resolves character display images through the fallback chain.
#[derive(Debug)]
pub struct ImageResolver {
    embedded: EmbeddedImages,
    mapping: ImageMap,
    mirror_base: String,
}

impl ImageResolver {
    /// Create a resolver.
    #[must_use]
    pub fn new(embedded: EmbeddedImages, mapping: ImageMap, mirror_base: impl Into<String>) -> Self {
        Self {
            embedded,
            mapping,
            mirror_base: mirror_base.into(),
        }
    }

    /// Resolver with no enrichment data, only direct and mirror URLs.
    #[must_use]
    pub fn mirror_only(mirror_base: impl Into<String>) -> Self {
        Self::new(EmbeddedImages::empty(), ImageMap::new(), mirror_base)
    }

    /// Resolve the display image for a character.
    #[must_use]
    pub fn resolve(&self, name: &str, raw_field: &str) -> ResolvedImage {
        if let Some(url) = self.embedded.get(name) {
            return ResolvedImage {
                url,
                origin: ImageOrigin::Embedded,
            };
        }

        if let Some(url) = self.mapping.get(name) {
            return ResolvedImage {
                url: url.clone(),
                origin: ImageOrigin::Mapping,
            };
        }

        let raw_field = raw_field.trim();
        if raw_field.is_empty() {
            return ResolvedImage {
                url: String::new(),
                origin: ImageOrigin::Unresolved,
            };
        }

        if raw_field.starts_with("http://") || raw_field.starts_with("https://") {
            return ResolvedImage {
                url: raw_field.to_string(),
                origin: ImageOrigin::Direct,
            };
        }

        ResolvedImage {
            url: format!(
                "{}/{}",
                self.mirror_base.trim_end_matches('/'),
                raw_field.trim_start_matches('/')
            ),
            origin: ImageOrigin::Mirror,
        }
    }
}
