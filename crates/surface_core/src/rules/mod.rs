//! Tile rules and the rule catalog.
//!
//! A [`Rule`] pairs two square color grids of the same tile: a coarse
//! *logical* grid that drives adjacency, and a high-resolution *detailed*
//! grid that gets painted into textures. Adjacency is an exact-match model:
//! two touching sides are compatible iff their sample sequences are equal.
//!
//! Grid coordinates put `(0, 0)` at the bottom-left. Sides are read along
//! ascending coordinates:
//!
//! ```text
//!            Top (2): y = n-1, x = 0..n
//!          ┌───────────────┐
//!   Left   │               │  Right
//!   (1)    │               │  (3)
//!   x = 0  │               │  x = n-1
//!   y=0..n │               │  y = 0..n
//!          └───────────────┘
//!          Bottom (0): y = 0, x = 0..n
//! ```

pub mod loader;

pub use loader::{
    blit_tile, load, load_family, load_manifest, slice_tiles, CatalogManifest, RuleFamily,
};

use bevy_log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// RGBA color sample.
pub type Rgba = [u8; 4];

/// Fully transparent black.
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Index of a rule inside its [`RuleCatalog`].
pub type RuleId = usize;

/// Errors raised while building a rule catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// No usable rules were left after dropping transparent tiles.
    EmptyCatalog,
    /// A grid's pixel buffer does not match its declared size.
    GridSize { expected: usize, found: usize },
    /// A rule's grids disagree with the catalog's resolutions.
    ResolutionMismatch {
        rule: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// An image does not divide into whole tiles, or the image pair disagrees on tile count.
    TileLayout(String),
    /// Image decoding failed.
    Image(String),
    /// The catalog manifest could not be read or parsed.
    Manifest(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::EmptyCatalog => write!(f, "rule catalog is empty"),
            CatalogError::GridSize { expected, found } => {
                write!(f, "grid needs {} pixels, got {}", expected, found)
            }
            CatalogError::ResolutionMismatch {
                rule,
                expected,
                found,
            } => write!(
                f,
                "rule {} has resolution {:?}, catalog uses {:?}",
                rule, found, expected
            ),
            CatalogError::TileLayout(msg) => write!(f, "tile layout error: {}", msg),
            CatalogError::Image(msg) => write!(f, "image error: {}", msg),
            CatalogError::Manifest(msg) => write!(f, "manifest error: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<image::ImageError> for CatalogError {
    fn from(e: image::ImageError) -> Self {
        CatalogError::Image(e.to_string())
    }
}

/// One of the four canonical sides of a square grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Bottom = 0,
    Left = 1,
    Top = 2,
    Right = 3,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Bottom, Side::Left, Side::Top, Side::Right];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Side for index `i` (taken modulo 4).
    pub fn from_index(i: usize) -> Side {
        Side::ALL[i % 4]
    }

    #[inline]
    pub fn opposite(self) -> Side {
        Side::from_index(self.index() + 2)
    }

    /// Grid coordinate of sample `k` along this side of an `n x n` grid.
    pub fn coords(self, n: usize, k: usize) -> (usize, usize) {
        let last = n.saturating_sub(1);
        match self {
            Side::Bottom => (k, 0),
            Side::Left => (0, k),
            Side::Top => (k, last),
            Side::Right => (last, k),
        }
    }
}

/// A square grid of colors, row-major from the bottom row up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorGrid {
    size: usize,
    pixels: Vec<Rgba>,
}

impl ColorGrid {
    /// Wrap a pixel buffer of `size * size` samples.
    pub fn new(size: usize, pixels: Vec<Rgba>) -> Result<Self, CatalogError> {
        if pixels.len() != size * size {
            return Err(CatalogError::GridSize {
                expected: size * size,
                found: pixels.len(),
            });
        }
        Ok(Self { size, pixels })
    }

    pub fn filled(size: usize, color: Rgba) -> Self {
        Self {
            size,
            pixels: vec![color; size * size],
        }
    }

    pub fn from_fn(size: usize, f: impl Fn(usize, usize) -> Rgba) -> Self {
        let mut pixels = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                pixels.push(f(x, y));
            }
        }
        Self { size, pixels }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgba {
        self.pixels[x + y * self.size]
    }

    pub fn set(&mut self, x: usize, y: usize, color: Rgba) {
        self.pixels[x + y * self.size] = color;
    }

    /// True when every sample has zero alpha.
    pub fn is_transparent(&self) -> bool {
        self.pixels.iter().all(|p| p[3] == 0)
    }

    /// Samples along `side`, in ascending coordinate order.
    pub fn side(&self, side: Side) -> Vec<Rgba> {
        (0..self.size)
            .map(|k| {
                let (x, y) = side.coords(self.size, k);
                self.get(x, y)
            })
            .collect()
    }
}

/// Exact-match side compatibility.
#[inline]
pub fn sides_compatible(a: &[Rgba], b: &[Rgba]) -> bool {
    a == b
}

/// A candidate tile: paired logical and detailed grids.
///
/// Rules are immutable once placed in a catalog.
#[derive(Debug, Clone)]
pub struct Rule {
    id: RuleId,
    name: Option<String>,
    tags: Vec<String>,
    logical: ColorGrid,
    detailed: ColorGrid,
}

impl Rule {
    pub fn new(logical: ColorGrid, detailed: ColorGrid) -> Self {
        Self {
            id: 0,
            name: None,
            tags: Vec::new(),
            logical,
            detailed,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Name or tag match.
    pub fn matches(&self, label: &str) -> bool {
        self.name() == Some(label) || self.has_tag(label)
    }

    pub fn logical(&self) -> &ColorGrid {
        &self.logical
    }

    pub fn detailed(&self) -> &ColorGrid {
        &self.detailed
    }

    /// Logical samples along canonical side `side`.
    pub fn side(&self, side: Side) -> Vec<Rgba> {
        self.logical.side(side)
    }

    /// Detailed samples along canonical side `side`.
    pub fn detailed_side(&self, side: Side) -> Vec<Rgba> {
        self.detailed.side(side)
    }
}

/// The immutable set of rules a cell can be assigned.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
    logical_resolution: usize,
    detailed_resolution: usize,
    fallback: Option<RuleId>,
    excluded: Vec<bool>,
}

impl RuleCatalog {
    /// Build a catalog, numbering rules in order.
    ///
    /// All rules must share the first rule's logical and detailed resolutions.
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self, CatalogError> {
        let first = rules.first().ok_or(CatalogError::EmptyCatalog)?;
        let expected = (first.logical.size(), first.detailed.size());

        let mut numbered = Vec::with_capacity(rules.len());
        for (id, mut rule) in rules.into_iter().enumerate() {
            let found = (rule.logical.size(), rule.detailed.size());
            if found != expected {
                return Err(CatalogError::ResolutionMismatch {
                    rule: id,
                    expected,
                    found,
                });
            }
            rule.id = id;
            numbered.push(rule);
        }

        let excluded = vec![false; numbered.len()];
        Ok(Self {
            rules: numbered,
            logical_resolution: expected.0,
            detailed_resolution: expected.1,
            fallback: None,
            excluded,
        })
    }

    /// Mark the first rule whose name or tag equals `label` as the fallback.
    pub fn with_fallback(mut self, label: &str) -> Self {
        self.fallback = self.find(label);
        if self.fallback.is_none() {
            warn!("fallback rule '{}' not found in catalog", label);
        }
        self
    }

    /// Exclude every rule whose name or tag equals `label` from free placement.
    ///
    /// Excluded rules never enter a cell's possibility set on their own, but
    /// can still be pinned.
    pub fn with_excluded(mut self, label: &str) -> Self {
        for rule in &self.rules {
            if rule.matches(label) {
                self.excluded[rule.id] = true;
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id]
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id)
    }

    pub fn find(&self, label: &str) -> Option<RuleId> {
        self.rules.iter().position(|r| r.matches(label))
    }

    pub fn fallback(&self) -> Option<&Rule> {
        self.fallback.map(|id| &self.rules[id])
    }

    pub fn fallback_id(&self) -> Option<RuleId> {
        self.fallback
    }

    pub fn is_excluded(&self, id: RuleId) -> bool {
        self.excluded.get(id).copied().unwrap_or(true)
    }

    /// Rules available for free placement.
    pub fn placeable(&self) -> impl Iterator<Item = RuleId> + '_ {
        (0..self.rules.len()).filter(move |id| !self.excluded[*id])
    }

    pub fn logical_resolution(&self) -> usize {
        self.logical_resolution
    }

    pub fn detailed_resolution(&self) -> usize {
        self.detailed_resolution
    }
}
