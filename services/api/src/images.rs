use std::path::{Component, Path, PathBuf};
use tracing::debug;
use wheelchair_advisor::config::ImageConfig;

/// Public prefix the image route is mounted under.
pub(crate) const IMAGE_ROUTE_PREFIX: &str = "/static/images";
pub(crate) const IMAGE_CACHE_CONTROL: &str = "public, max-age=3600";

/// Result of looking up a requested image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ImageLookup {
    Found(PathBuf),
    TooLarge { bytes: u64 },
    Missing,
}

/// Maps product names to image files on disk.
#[derive(Debug, Clone)]
pub(crate) struct ImageResolver {
    directory: PathBuf,
    max_bytes: u64,
}

impl ImageResolver {
    pub(crate) fn new(config: &ImageConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            max_bytes: config.max_bytes,
        }
    }

    pub(crate) fn directory(&self) -> &Path {
        &self.directory
    }

    /// Public URL for the product's image, if a servable file exists.
    pub(crate) fn resolve(&self, product_name: &str) -> Option<String> {
        let found = candidate_file_names(product_name)
            .into_iter()
            .find(|file_name| matches!(self.lookup(file_name), ImageLookup::Found(_)));

        match found {
            Some(file_name) => {
                debug!(product = product_name, file = %file_name, "product image resolved");
                Some(format!(
                    "{IMAGE_ROUTE_PREFIX}/{}",
                    urlencoding::encode(&file_name)
                ))
            }
            None => {
                debug!(product = product_name, "no product image");
                None
            }
        }
    }

    /// Locate a file below the image directory. Paths leaving the directory are reported missing.
    pub(crate) fn lookup(&self, relative: &str) -> ImageLookup {
        let relative = Path::new(relative);
        let contained = relative.components().next().is_some()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !contained {
            return ImageLookup::Missing;
        }

        let path = self.directory.join(relative);
        match std::fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() && metadata.len() > self.max_bytes => {
                ImageLookup::TooLarge {
                    bytes: metadata.len(),
                }
            }
            Ok(metadata) if metadata.is_file() => ImageLookup::Found(path),
            _ => ImageLookup::Missing,
        }
    }
}

/// `{name}.png`, then `MSL-T(24)` style names as `MSL-T-24.png`.
fn candidate_file_names(product_name: &str) -> Vec<String> {
    let mut names = vec![format!("{product_name}.png")];
    if product_name.contains('(') && product_name.contains(')') {
        let converted = product_name.replace('(', "-").replace(')', "");
        names.push(format!("{converted}.png"));
    }
    names
}
