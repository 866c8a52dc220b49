//! Read-only wheelchair catalog and the normalization of its free-text cells.

mod normalizer;
mod parser;

pub use normalizer::{
    parse_min_seat_width, parse_weight, WeightCell, WeightRange, UNPARSEABLE_SEAT_WIDTH_CM,
    UNPARSEABLE_WEIGHT_KG,
};

use parser::ProductRow;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Keyword tags the engine looks for in the recommendation keyword columns.
pub mod tags {
    pub const BASIC: &str = "기본형";
    pub const LIGHTWEIGHT: &str = "경량형";
    pub const LARGE_WHEEL: &str = "대형휠";
    pub const VEHICLE_MOUNT: &str = "차량탑재";
}

/// Products at or above this weight count as large frames.
pub const LARGE_FRAME_MIN_WEIGHT_KG: f64 = 16.5;

/// A catalog product with its derived numeric fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    pub manufacturer: String,
    pub weight: WeightCell,
    pub seat_width: Option<String>,
    pub keywords: Vec<String>,
    pub weight_range: WeightRange,
    pub seat_width_min: u32,
}

impl CatalogEntry {
    pub fn new(
        name: impl Into<String>,
        manufacturer: impl Into<String>,
        weight: WeightCell,
        seat_width: Option<String>,
        keywords: Vec<String>,
    ) -> Self {
        let weight_range = parse_weight(&weight);
        let seat_width_min = parse_min_seat_width(seat_width.as_deref());
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            weight,
            seat_width,
            keywords,
            weight_range,
            seat_width_min,
        }
    }

    fn from_row(row: ProductRow) -> Self {
        let keywords = row.keywords();
        let weight = WeightCell::from_raw(row.weight.as_deref());
        let entry = Self::new(
            row.name,
            row.manufacturer.unwrap_or_default(),
            weight,
            row.seat_width,
            keywords,
        );

        if entry.weight_range.is_unparseable() {
            debug!(product = %entry.name, weight = ?entry.weight, "unparseable weight cell");
        }
        if entry.seat_width_min == UNPARSEABLE_SEAT_WIDTH_CM {
            debug!(product = %entry.name, seat_width = ?entry.seat_width, "unparseable seat width cell");
        }

        entry
    }

    /// Substring match against any of the recommendation keywords.
    pub fn has_keyword(&self, tag: &str) -> bool {
        self.keywords.iter().any(|keyword| keyword.contains(tag))
    }

    pub fn weight_max(&self) -> f64 {
        self.weight_range.max
    }

    pub fn is_large_frame(&self) -> bool {
        self.weight_range.max >= LARGE_FRAME_MIN_WEIGHT_KG
    }
}

/// Normalized product table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let entries = parser::parse_rows(reader)?
            .into_iter()
            .map(CatalogEntry::from_row)
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Failure to obtain the catalog table.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog source {} unavailable: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid catalog data: {0}")]
    Csv(#[from] csv::Error),
}

/// Source of the catalog for a single request.
pub trait CatalogProvider: Send + Sync {
    fn load(&self) -> Result<Arc<Catalog>, CatalogError>;
}

/// Reads and normalizes a CSV file on every call, so edits show up on the next request.
#[derive(Debug, Clone)]
pub struct CsvCatalog {
    path: PathBuf,
}

impl CsvCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogProvider for CsvCatalog {
    fn load(&self) -> Result<Arc<Catalog>, CatalogError> {
        let catalog = Catalog::from_path(&self.path)?;
        debug!(path = %self.path.display(), rows = catalog.len(), "catalog loaded");
        Ok(Arc::new(catalog))
    }
}

/// Pre-loaded catalog shared across calls.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    catalog: Arc<Catalog>,
}

impl StaticCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

impl CatalogProvider for StaticCatalog {
    fn load(&self) -> Result<Arc<Catalog>, CatalogError> {
        Ok(Arc::clone(&self.catalog))
    }
}
