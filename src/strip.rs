use crate::catalog::Catalog;
use crate::config::SynthesisConfig;
use crate::error::{Result, SynthesisError};
use image::{imageops, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::PathBuf;
use tracing::debug;

/// Supplies the rasterized tile (PNG bytes) of one icon.
pub trait TileSource {
    fn tile(&self, type_name: &str, icon_id: &str) -> std::io::Result<Vec<u8>>;
}

/// Tiles laid out as `<root>/<TypeName>/<iconId>.png`.
#[derive(Debug, Clone)]
pub struct DirectoryTiles {
    root: PathBuf,
}

impl DirectoryTiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self, type_name: &str, icon_id: &str) -> PathBuf {
        self.root.join(type_name).join(format!("{icon_id}.png"))
    }
}

impl TileSource for DirectoryTiles {
    fn tile(&self, type_name: &str, icon_id: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.path(type_name, icon_id))
    }
}

fn tile_error(collection: &str, id: &str, message: impl ToString) -> SynthesisError {
    SynthesisError::Tile {
        collection: collection.to_string(),
        id: id.to_string(),
        message: message.to_string(),
    }
}

/// True when every pixel of the tile is fully transparent, which is what a
/// failed SVG conversion produces.
pub fn is_blank(png: &[u8]) -> image::ImageResult<bool> {
    let tile = image::load_from_memory(png)?.to_rgba8();
    Ok(tile.pixels().all(|p| p[3] == 0))
}

/// Clear the `valid` flag of icons whose tile is missing, undecodable or blank.
/// Returns how many icons were flagged.
pub fn flag_blank_tiles(
    catalog: &mut Catalog,
    tiles: &dyn TileSource,
    config: &SynthesisConfig,
) -> usize {
    let mut flagged = 0;
    for collection in &mut catalog.collections {
        let type_name = config.normalize(&collection.name);
        for icon in collection.icons.iter_mut().filter(|i| i.valid) {
            let blank = match tiles.tile(&type_name, &icon.id) {
                Ok(bytes) => is_blank(&bytes).unwrap_or(true),
                Err(_) => true,
            };
            if blank {
                debug!("Blank or missing tile: {}.{}", type_name, icon.id);
                icon.valid = false;
                flagged += 1;
            }
        }
    }
    flagged
}

/// Compose one strip: tiles of `used` placed left to right, each
/// `tile_size` square. Returns PNG bytes.
pub fn pack(
    type_name: &str,
    used: &[String],
    tiles: &dyn TileSource,
    tile_size: u32,
) -> Result<Vec<u8>> {
    if used.is_empty() {
        return Err(tile_error(type_name, "", "strip has no icons"));
    }

    let mut strip = RgbaImage::new(tile_size * used.len() as u32, tile_size);
    for (index, id) in used.iter().enumerate() {
        let bytes = tiles
            .tile(type_name, id)
            .map_err(|e| tile_error(type_name, id, e))?;
        let tile = image::load_from_memory(&bytes)
            .map_err(|e| tile_error(type_name, id, e))?
            .to_rgba8();

        if tile.dimensions() != (tile_size, tile_size) {
            let (w, h) = tile.dimensions();
            return Err(tile_error(
                type_name,
                id,
                format!("expected {tile_size}x{tile_size}, got {w}x{h}"),
            ));
        }

        imageops::replace(&mut strip, &tile, index as i64 * tile_size as i64, 0);
    }

    let mut png = Cursor::new(Vec::new());
    strip
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| tile_error(type_name, "", e))?;
    Ok(png.into_inner())
}
