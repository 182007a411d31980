//! File filtering logic for the pipeline.

use super::ImageFormat;
use std::collections::HashSet;
use std::path::Path;

/// Extensions accepted when nothing else is configured
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Filters files to determine if they are supported images
#[derive(Debug, Clone)]
pub struct ImageFilter {
    /// Lowercase file extensions to include, without the dot
    extensions: HashSet<String>,
}

impl ImageFilter {
    /// Create a new filter with default supported extensions
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Override the list of extensions to accept.
    ///
    /// Leading dots and case are ignored, so `".JPG"` and `"jpg"` are the same.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    /// Check if a file name has an accepted extension
    pub fn should_include(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    /// Get the image format for a path
    pub fn get_format(&self, path: &Path) -> ImageFormat {
        path.extension()
            .and_then(|e| e.to_str())
            .map(ImageFormat::from_extension)
            .unwrap_or(ImageFormat::Unknown)
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_includes_supported_set() {
        let filter = ImageFilter::new();
        assert!(filter.should_include(Path::new("/drop/image.jpg")));
        assert!(filter.should_include(Path::new("/drop/image.JPEG")));
        assert!(filter.should_include(Path::new("/drop/image.Png")));
        assert!(filter.should_include(Path::new("/drop/image.webp")));
    }

    #[test]
    fn filter_excludes_everything_else() {
        let filter = ImageFilter::new();
        assert!(!filter.should_include(Path::new("/drop/IMG_1234.HEIC")));
        assert!(!filter.should_include(Path::new("/drop/document.pdf")));
        assert!(!filter.should_include(Path::new("/drop/photo.jpg.part")));
    }

    #[test]
    fn filter_handles_no_extension() {
        let filter = ImageFilter::new();
        assert!(!filter.should_include(Path::new("/drop/no_extension")));
        assert!(!filter.should_include(Path::new("/drop/.jpg")));
    }

    #[test]
    fn custom_extensions_are_normalized() {
        let filter = ImageFilter::new().with_extensions([".TIFF", "gif"]);
        assert!(filter.should_include(Path::new("/drop/scan.tiff")));
        assert!(filter.should_include(Path::new("/drop/anim.GIF")));
        assert!(!filter.should_include(Path::new("/drop/photo.jpg")));
    }

    #[test]
    fn format_lookup() {
        let filter = ImageFilter::new();
        assert_eq!(filter.get_format(Path::new("a.jpeg")), ImageFormat::Jpeg);
        assert_eq!(filter.get_format(Path::new("a")), ImageFormat::Unknown);
    }
}
