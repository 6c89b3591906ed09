//! Species sprites: load requests, decoding and half-block pixel data

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::GenericImageView;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Sprites are shrunk to fit this many pixels (two pixel rows per terminal row)
pub const SPRITE_MAX_WIDTH: u32 = 32;
pub const SPRITE_MAX_HEIGHT: u32 = 32;

/// One sprite load, tagged with the token of the cursor session that asked for it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SpriteRequest {
    pub token: u64,
    pub species_id: u16,
    pub female: bool,
    pub form_index: usize,
    pub shiny: bool,
}

impl SpriteRequest {
    /// Candidate files, most specific first
    pub fn candidate_paths(&self, assets_dir: &Path) -> Vec<PathBuf> {
        let dir = assets_dir.join("sprites");
        let mut stems = Vec::new();
        let form = if self.form_index > 0 {
            format!("-{}", self.form_index)
        } else {
            String::new()
        };
        let female = if self.female { "_f" } else { "" };
        let shiny = if self.shiny { "_s" } else { "" };
        stems.push(format!("{}{form}{female}{shiny}", self.species_id));
        stems.push(format!("{}{form}{shiny}", self.species_id));
        stems.push(format!("{}{form}", self.species_id));
        stems.push(self.species_id.to_string());
        stems.dedup();
        stems
            .into_iter()
            .map(|stem| dir.join(format!("{stem}.png")))
            .collect()
    }
}

/// RGBA pixels, row-major
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpriteData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 4]>,
}

impl SpriteData {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    /// Whether the pixel is visible enough to draw
    pub fn is_opaque(&self, x: u32, y: u32) -> bool {
        self.pixel(x, y).is_some_and(|p| p[3] >= 128)
    }
}

pub fn decode_sprite(bytes: &[u8]) -> Result<SpriteData, String> {
    let image = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err("empty image".to_string());
    }
    let image = if width > SPRITE_MAX_WIDTH || height > SPRITE_MAX_HEIGHT {
        image.resize(SPRITE_MAX_WIDTH, SPRITE_MAX_HEIGHT, FilterType::Nearest)
    } else {
        image
    };
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba.pixels().map(|p| p.0).collect();
    Ok(SpriteData {
        width,
        height,
        pixels,
    })
}

pub async fn load_sprite(request: &SpriteRequest, assets_dir: &Path) -> Result<SpriteData, String> {
    for path in request.candidate_paths(assets_dir) {
        match tokio::fs::read(&path).await {
            Ok(bytes) => return decode_sprite(&bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
            Err(err) => return Err(format!("Failed to read {}: {}", path.display(), err)),
        }
    }
    Err(format!("No sprite for #{:03}", request.species_id))
}
