//! Rule catalog loading from sample images.
//!
//! A rule family is a pair of images with the same tile layout: a low-res
//! *logical* image and a high-res *detailed* image. Both are cut into square
//! tiles in raster order (left to right, top to bottom). Tile `i` of the
//! logical image pairs with tile `i` of the detailed image. Slots whose
//! logical tile is fully transparent are authoring placeholders and are
//! skipped.
//!
//! A JSON manifest ties families together and names the fallback rule:
//!
//! ```json
//! {
//!   "logical_tile": 3,
//!   "detailed_tile": 12,
//!   "fallback": "blank",
//!   "excluded": ["decal"],
//!   "families": [
//!     { "logical": "wires_logical.png", "detailed": "wires_detailed.png",
//!       "names": ["blank", "straight", "corner"],
//!       "tags": { "blank": ["border"] } }
//!   ]
//! }
//! ```

use super::{CatalogError, ColorGrid, Rgba, Rule, RuleCatalog};
use bevy_log::{debug, info};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One logical/detailed image pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleFamily {
    /// Logical image path, relative to the manifest.
    pub logical: PathBuf,
    /// Detailed image path, relative to the manifest.
    pub detailed: PathBuf,
    /// Rule names by raster slot. Slots past the end stay unnamed.
    #[serde(default)]
    pub names: Vec<String>,
    /// Extra tags by rule name.
    #[serde(default)]
    pub tags: HashMap<String, Vec<String>>,
}

/// Catalog metadata stored next to the sample images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogManifest {
    /// Logical tile edge length in pixels.
    pub logical_tile: usize,
    /// Detailed tile edge length in pixels.
    pub detailed_tile: usize,
    /// Name or tag of the fallback ("blank") rule.
    #[serde(default)]
    pub fallback: Option<String>,
    /// Names or tags kept out of free placement.
    #[serde(default)]
    pub excluded: Vec<String>,
    pub families: Vec<RuleFamily>,
}

impl CatalogManifest {
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(|e| CatalogError::Manifest(e.to_string()))
    }
}

/// Cut an image into `tile x tile` grids in raster order.
///
/// Image rows run top-down while grids run bottom-up, so each tile is
/// flipped vertically on the way in.
pub fn slice_tiles(img: &RgbaImage, tile: usize) -> Result<Vec<ColorGrid>, CatalogError> {
    let (width, height) = (img.width() as usize, img.height() as usize);
    if tile == 0 || width % tile != 0 || height % tile != 0 {
        return Err(CatalogError::TileLayout(format!(
            "{}x{} image does not divide into {}px tiles",
            width, height, tile
        )));
    }

    let columns = width / tile;
    let rows = height / tile;
    let mut tiles = Vec::with_capacity(columns * rows);

    for row in 0..rows {
        for column in 0..columns {
            let grid = ColorGrid::from_fn(tile, |x, y| {
                let px = (column * tile + x) as u32;
                let py = (row * tile + (tile - 1 - y)) as u32;
                img.get_pixel(px, py).0
            });
            tiles.push(grid);
        }
    }

    Ok(tiles)
}

/// Turn one image pair into rules, skipping transparent logical slots.
///
/// Returned rules carry `(slot, rule)` so callers can apply per-slot metadata.
pub fn load_family(
    logical: &RgbaImage,
    detailed: &RgbaImage,
    logical_tile: usize,
    detailed_tile: usize,
) -> Result<Vec<(usize, Rule)>, CatalogError> {
    let logical_tiles = slice_tiles(logical, logical_tile)?;
    let detailed_tiles = slice_tiles(detailed, detailed_tile)?;

    if logical_tiles.len() != detailed_tiles.len() {
        return Err(CatalogError::TileLayout(format!(
            "logical image has {} tiles, detailed image has {}",
            logical_tiles.len(),
            detailed_tiles.len()
        )));
    }

    let rules: Vec<(usize, Rule)> = logical_tiles
        .into_iter()
        .zip(detailed_tiles)
        .enumerate()
        .filter(|(_, (l, _))| !l.is_transparent())
        .map(|(slot, (l, d))| (slot, Rule::new(l, d)))
        .collect();

    debug!("rule family: {} usable tiles", rules.len());
    Ok(rules)
}

/// Build a catalog from image pairs.
pub fn load(
    pairs: &[(RgbaImage, RgbaImage)],
    logical_tile: usize,
    detailed_tile: usize,
) -> Result<RuleCatalog, CatalogError> {
    let mut rules = Vec::new();
    for (logical, detailed) in pairs {
        rules.extend(
            load_family(logical, detailed, logical_tile, detailed_tile)?
                .into_iter()
                .map(|(_, rule)| rule),
        );
    }
    RuleCatalog::from_rules(rules)
}

/// Load a catalog described by a JSON manifest on disk.
pub fn load_manifest(path: &Path) -> Result<RuleCatalog, CatalogError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| CatalogError::Manifest(format!("{}: {}", path.display(), e)))?;
    let manifest = CatalogManifest::from_json_str(&json)?;
    let base = path.parent().unwrap_or(Path::new("."));

    let mut rules = Vec::new();
    for family in &manifest.families {
        let logical = open_rgba(&base.join(&family.logical))?;
        let detailed = open_rgba(&base.join(&family.detailed))?;

        for (slot, mut rule) in load_family(
            &logical,
            &detailed,
            manifest.logical_tile,
            manifest.detailed_tile,
        )? {
            if let Some(name) = family.names.get(slot) {
                for tag in family.tags.get(name).into_iter().flatten() {
                    rule = rule.with_tag(tag.clone());
                }
                rule = rule.with_name(name.clone());
            }
            rules.push(rule);
        }
    }

    let mut catalog = RuleCatalog::from_rules(rules)?;
    if let Some(fallback) = &manifest.fallback {
        catalog = catalog.with_fallback(fallback);
    }
    for label in &manifest.excluded {
        catalog = catalog.with_excluded(label);
    }

    info!(
        "loaded {} rules from {} ({} families)",
        catalog.len(),
        path.display(),
        manifest.families.len()
    );
    Ok(catalog)
}

fn open_rgba(path: &Path) -> Result<RgbaImage, CatalogError> {
    let img = image::open(path)
        .map_err(|e| CatalogError::Image(format!("{}: {}", path.display(), e)))?;
    Ok(img.to_rgba8())
}

/// Write a grid back into an image at tile position `(column, row)`.
///
/// Inverse of [`slice_tiles`]; used to author catalogs from code.
pub fn blit_tile(img: &mut RgbaImage, grid: &ColorGrid, column: usize, row: usize) {
    let tile = grid.size();
    for y in 0..tile {
        for x in 0..tile {
            let px = (column * tile + x) as u32;
            let py = (row * tile + (tile - 1 - y)) as u32;
            if px < img.width() && py < img.height() {
                let color: Rgba = grid.get(x, y);
                img.put_pixel(px, py, image::Rgba(color));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Side, TRANSPARENT};

    const RED: Rgba = [255, 0, 0, 255];
    const BLUE: Rgba = [0, 0, 255, 255];

    #[test]
    fn test_slice_flips_rows() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgba(RED)); // top-left in image space
        img.put_pixel(0, 1, image::Rgba(BLUE)); // bottom-left

        let tiles = slice_tiles(&img, 2).unwrap();
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].get(0, 0), BLUE);
        assert_eq!(tiles[0].get(0, 1), RED);
    }

    #[test]
    fn test_slice_raster_order() {
        let mut img = RgbaImage::new(4, 2);
        img.put_pixel(2, 0, image::Rgba(RED));
        let tiles = slice_tiles(&img, 2).unwrap();
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[1].get(0, 1), RED);
    }

    #[test]
    fn test_slice_rejects_partial_tiles() {
        let img = RgbaImage::new(5, 4);
        assert!(matches!(
            slice_tiles(&img, 2),
            Err(CatalogError::TileLayout(_))
        ));
    }

    #[test]
    fn test_blit_round_trip() {
        let grid = ColorGrid::from_fn(3, |x, y| [x as u8, y as u8, 0, 255]);
        let mut img = RgbaImage::new(6, 3);
        blit_tile(&mut img, &grid, 1, 0);
        let tiles = slice_tiles(&img, 3).unwrap();
        assert_eq!(tiles[1], grid);
        assert!(tiles[0].is_transparent());
    }

    #[test]
    fn test_family_skips_transparent_slots() {
        let mut logical = RgbaImage::new(3, 1);
        logical.put_pixel(0, 0, image::Rgba(RED));
        logical.put_pixel(2, 0, image::Rgba(BLUE));
        let detailed = RgbaImage::new(6, 2);

        let rules = load_family(&logical, &detailed, 1, 2).unwrap();
        let slots: Vec<usize> = rules.iter().map(|(slot, _)| *slot).collect();
        assert_eq!(slots, vec![0, 2]);
        assert_eq!(rules[1].1.side(Side::Bottom), vec![BLUE]);
    }

    #[test]
    fn test_family_tile_count_mismatch() {
        let logical = RgbaImage::new(2, 1);
        let detailed = RgbaImage::new(2, 2);
        assert!(matches!(
            load_family(&logical, &detailed, 1, 2),
            Err(CatalogError::TileLayout(_))
        ));
    }

    #[test]
    fn test_all_transparent_is_empty_catalog() {
        let logical = RgbaImage::from_pixel(2, 2, image::Rgba(TRANSPARENT));
        let detailed = RgbaImage::new(4, 4);
        assert!(matches!(
            load(&[(logical, detailed)], 2, 4),
            Err(CatalogError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_manifest_on_disk() {
        let dir = tempfile::tempdir().unwrap();

        let mut logical = RgbaImage::new(2, 1);
        logical.put_pixel(0, 0, image::Rgba(RED));
        logical.put_pixel(1, 0, image::Rgba(BLUE));
        logical.save(dir.path().join("logical.png")).unwrap();
        RgbaImage::new(4, 2)
            .save(dir.path().join("detailed.png"))
            .unwrap();

        let manifest = r#"{
            "logical_tile": 1,
            "detailed_tile": 2,
            "fallback": "border",
            "families": [{
                "logical": "logical.png",
                "detailed": "detailed.png",
                "names": ["red", "blue"],
                "tags": { "blue": ["border"] }
            }]
        }"#;
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, manifest).unwrap();

        let catalog = load_manifest(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.rule(0).name(), Some("red"));
        assert_eq!(catalog.fallback_id(), Some(1));
    }

    #[test]
    fn test_manifest_parse_error() {
        assert!(matches!(
            CatalogManifest::from_json_str("{ not json"),
            Err(CatalogError::Manifest(_))
        ));
    }
}
