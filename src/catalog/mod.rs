pub mod word;
pub mod loader;

pub use word::{AssetAvailability, CatalogKey, WordEntry, IMAGE_EXTENSIONS};
pub use loader::{AssetListFallback, Catalog, CatalogLoader};
