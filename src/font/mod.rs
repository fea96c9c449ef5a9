//! # Font Management
//!
//! Resolving a (style, pixel size) pair to a font handle that can measure
//! and rasterize text.
//!
//! Loading is delegated to a [`FontProvider`]; the crate ships
//! [`TrueTypeProvider`] for real font files. Handles are immutable once
//! created and are cached by `(path, pixel size)` for the life of the
//! [`FontResolver`] that owns the cache. The key space is small (two files
//! times a bounded range of integer sizes), so the cache never evicts.

pub mod truetype;

pub use truetype::TrueTypeProvider;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::{FontPaths, RenderConfig};
use crate::error::Result;
use crate::style::TextStyle;

/// A glyph coverage bitmap positioned relative to a run's pen origin and
/// the top of its line.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphBitmap {
    /// Horizontal offset of the bitmap's left edge from the run start.
    pub left: f64,
    /// Vertical offset of the bitmap's top edge from the line top.
    pub top: i32,
    pub width: usize,
    pub height: usize,
    /// Row-major coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
}

/// A font at one fixed pixel size.
pub trait GlyphFont: Send + Sync {
    /// The nominal size used for line height and highlight-box math. Not a
    /// tight ascent/descent bound.
    fn pixel_size(&self) -> u32;

    /// Sum of glyph advances for `text`, in pixels.
    fn advance_width(&self, text: &str) -> f64;

    /// Coverage bitmaps for every inked glyph of `text`. The pen advances by
    /// the same widths [`GlyphFont::advance_width`] reports.
    fn rasterize(&self, text: &str) -> Vec<GlyphBitmap>;
}

/// Shared, immutable font handle.
pub type FontHandle = Arc<dyn GlyphFont>;

/// Loads font handles from font files.
pub trait FontProvider: Send + Sync {
    /// Load the font at `path` sized to `pixel_size`. Missing or corrupt
    /// files are a [`crate::CardError::FontLoad`].
    fn load_font(&self, path: &Path, pixel_size: u32) -> Result<FontHandle>;
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub path: PathBuf,
    pub pixel_size: u32,
}

impl FontKey {
    pub fn new(path: impl Into<PathBuf>, pixel_size: u32) -> Self {
        FontKey {
            path: path.into(),
            pixel_size,
        }
    }
}

/// Unbounded `(path, size) -> handle` cache, safe to share between threads.
#[derive(Default)]
pub struct FontCache {
    entries: Mutex<HashMap<FontKey, FontHandle>>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &FontKey) -> Option<FontHandle> {
        self.lock().get(key).cloned()
    }

    /// Insert `handle` unless the key is already present, and return the
    /// handle now stored. A handle that lost a loading race is dropped.
    pub fn put(&self, key: FontKey, handle: FontHandle) -> FontHandle {
        self.lock().entry(key).or_insert(handle).clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<FontKey, FontHandle>> {
        // Entries are immutable, so a panic elsewhere cannot leave one torn.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Maps styles and sizes to cached font handles.
pub struct FontResolver {
    provider: Arc<dyn FontProvider>,
    cache: FontCache,
    paths: FontPaths,
}

impl FontResolver {
    pub fn new(provider: Arc<dyn FontProvider>, paths: FontPaths) -> Self {
        FontResolver {
            provider,
            cache: FontCache::new(),
            paths,
        }
    }

    pub fn paths(&self) -> &FontPaths {
        &self.paths
    }

    pub fn cache(&self) -> &FontCache {
        &self.cache
    }

    /// The handle for `path` at `pixel_size`, loading it on first use.
    pub fn resolve(&self, path: &Path, pixel_size: u32) -> Result<FontHandle> {
        let key = FontKey::new(path, pixel_size);
        if let Some(handle) = self.cache.get(&key) {
            return Ok(handle);
        }
        log::debug!("font cache miss: {} @ {}px", path.display(), pixel_size);
        let handle = self.provider.load_font(path, pixel_size)?;
        Ok(self.cache.put(key, handle))
    }

    pub fn resolve_style(&self, style: TextStyle, pixel_size: u32) -> Result<FontHandle> {
        self.resolve(self.paths.for_style(style), pixel_size)
    }

    /// One handle per style, each sized `max(min_font_size, floor(base * scale))`.
    pub fn font_set(&self, config: &RenderConfig, scale: f64) -> Result<FontSet> {
        let fonts = TextStyle::ALL
            .iter()
            .map(|&style| self.resolve_style(style, config.scaled_size(style, scale)))
            .collect::<Result<Vec<_>>>()?;
        Ok(FontSet { fonts, scale })
    }
}

/// A handle for every style, all shrunk by the same factor.
#[derive(Clone)]
pub struct FontSet {
    fonts: Vec<FontHandle>,
    scale: f64,
}

impl FontSet {
    pub fn get(&self, style: TextStyle) -> &FontHandle {
        &self.fonts[style.index()]
    }

    /// The factor this set was built with; 1.0 for the base set.
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A synthetic provider so layout can be tested without font files.
    //!
    //! Every char advances `pixel_size / 2` pixels and inks a solid box from
    //! the line top down to `pixel_size * 3 / 4`.

    use super::*;
    use crate::error::CardError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub struct BlockFont {
        pixel_size: u32,
    }

    impl BlockFont {
        pub fn new(pixel_size: u32) -> Self {
            BlockFont { pixel_size }
        }
    }

    impl GlyphFont for BlockFont {
        fn pixel_size(&self) -> u32 {
            self.pixel_size
        }

        fn advance_width(&self, text: &str) -> f64 {
            text.chars().count() as f64 * self.pixel_size as f64 / 2.0
        }

        fn rasterize(&self, text: &str) -> Vec<GlyphBitmap> {
            let advance = self.pixel_size as f64 / 2.0;
            let width = (self.pixel_size / 2).saturating_sub(1).max(1) as usize;
            let height = (self.pixel_size * 3 / 4) as usize;
            text.chars()
                .enumerate()
                .filter(|(_, c)| !c.is_whitespace())
                .map(|(i, _)| GlyphBitmap {
                    left: i as f64 * advance,
                    top: 0,
                    width,
                    height,
                    coverage: vec![255; width * height],
                })
                .collect()
        }
    }

    /// Counts loads so tests can observe cache behavior. Paths containing
    /// `missing` fail to load.
    #[derive(Default)]
    pub struct BlockFontProvider {
        pub loads: AtomicUsize,
    }

    impl FontProvider for BlockFontProvider {
        fn load_font(&self, path: &Path, pixel_size: u32) -> Result<FontHandle> {
            if path.to_string_lossy().contains("missing") {
                return Err(CardError::font_load(path, "No such file or directory"));
            }
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(BlockFont::new(pixel_size)))
        }
    }

    pub fn block_resolver() -> (Arc<BlockFontProvider>, FontResolver) {
        let provider = Arc::new(BlockFontProvider::default());
        let resolver = FontResolver::new(provider.clone(), FontPaths::default());
        (provider, resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::error::CardError;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_resolve_caches_by_path_and_size() {
        let (provider, resolver) = block_resolver();
        let a = resolver.resolve(Path::new("fonts/a.ttf"), 28).unwrap();
        let b = resolver.resolve(Path::new("fonts/a.ttf"), 28).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(provider.loads.load(Ordering::SeqCst), 1);

        resolver.resolve(Path::new("fonts/a.ttf"), 18).unwrap();
        resolver.resolve(Path::new("fonts/b.ttf"), 28).unwrap();
        assert_eq!(provider.loads.load(Ordering::SeqCst), 3);
        assert_eq!(resolver.cache().len(), 3);
    }

    #[test]
    fn test_base_font_set_shares_bold_handles() {
        let (provider, resolver) = block_resolver();
        let config = RenderConfig::default();
        let set = resolver.font_set(&config, 1.0).unwrap();
        assert_eq!(set.get(TextStyle::Normal).pixel_size(), 28);
        assert_eq!(set.get(TextStyle::Emph).pixel_size(), 32);
        assert_eq!(set.get(TextStyle::Title).pixel_size(), 46);
        // Regular@28, Bold@28, Bold@32, Bold@46, Bold@34.
        assert_eq!(provider.loads.load(Ordering::SeqCst), 5);

        resolver.font_set(&config, 1.0).unwrap();
        assert_eq!(provider.loads.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_scaled_font_set_respects_floor() {
        let (_, resolver) = block_resolver();
        let config = RenderConfig::default();
        let set = resolver.font_set(&config, 0.1).unwrap();
        for style in TextStyle::ALL {
            assert_eq!(set.get(style).pixel_size(), 12);
        }
        assert!((set.scale() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_font_is_an_error() {
        let provider = Arc::new(BlockFontProvider::default());
        let resolver = FontResolver::new(provider, FontPaths::in_dir("missing"));
        let err = resolver.resolve_style(TextStyle::Normal, 28).err().unwrap();
        assert!(matches!(err, CardError::FontLoad { .. }));
        assert!(resolver.cache().is_empty());
    }

    #[test]
    fn test_cache_put_keeps_first_handle() {
        let cache = FontCache::new();
        let key = FontKey::new("x.ttf", 12);
        let first: FontHandle = Arc::new(BlockFont::new(12));
        let second: FontHandle = Arc::new(BlockFont::new(12));
        let stored = cache.put(key.clone(), first.clone());
        assert!(Arc::ptr_eq(&stored, &first));
        let stored = cache.put(key.clone(), second);
        assert!(Arc::ptr_eq(&stored, &first));
        assert!(Arc::ptr_eq(&cache.get(&key).unwrap(), &first));
    }
}
