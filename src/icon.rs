//! Icon lookup and scaling
//!
//! Icons are named by the `IMG:` prefix of an input line. Names that are
//! not explicit paths are searched for in the `ICONPATH` directories.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::RgbaImage;

use crate::tree::expand_home;

/// Colon-separated icon search directories
pub const ICONPATH_ENV: &str = "ICONPATH";

/// Loads icons as square RGBA images of one size, caching by name
#[derive(Debug, Default)]
pub struct IconLoader {
    search: Vec<PathBuf>,
    size: u32,
    cache: HashMap<String, Option<RgbaImage>>,
}

impl IconLoader {
    pub fn new(size: u32) -> Self {
        Self {
            search: Vec::new(),
            size,
            cache: HashMap::new(),
        }
    }

    /// Loader searching `$ICONPATH`
    pub fn from_env(size: u32) -> Self {
        let search = std::env::var_os(ICONPATH_ENV)
            .map(|paths| std::env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self::new(size).with_search_path(search)
    }

    pub fn with_search_path(mut self, search: Vec<PathBuf>) -> Self {
        self.search = search;
        self
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Change the target size, dropping cached images
    pub fn set_size(&mut self, size: u32) {
        if size != self.size {
            self.size = size;
            self.cache.clear();
        }
    }

    /// File an icon name refers to.
    ///
    /// Explicit paths are taken as-is. Other names go through the search
    /// directories in order and stop at the first one holding the file.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let path = expand_home(name);
        if path.is_absolute() || name.starts_with("./") || name.starts_with("../") {
            return path;
        }
        self.search
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.exists())
            .unwrap_or(path)
    }

    /// The scaled icon, or `None` when it cannot be loaded
    pub fn load(&mut self, name: &str) -> Option<&RgbaImage> {
        if !self.cache.contains_key(name) {
            let path = self.resolve(name);
            let icon = match load_square(&path, self.size) {
                Ok(icon) => Some(icon),
                Err(err) => {
                    tracing::warn!(icon = name, path = %path.display(), error = %err, "could not load icon");
                    None
                }
            };
            self.cache.insert(name.to_string(), icon);
        }
        self.cache.get(name).and_then(Option::as_ref)
    }
}

/// Crop to the top-left square and scale to `size`
fn load_square(path: &Path, size: u32) -> image::ImageResult<RgbaImage> {
    let img = image::open(path)?;
    let side = img.width().min(img.height());
    let square = img.crop_imm(0, 0, side, side);
    Ok(square
        .resize_exact(size.max(1), size.max(1), FilterType::Triangle)
        .to_rgba8())
}
