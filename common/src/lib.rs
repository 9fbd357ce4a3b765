//! Tray AI Common Library
//!
//! お皿・料理の検出結果をペアにし、料理マスタから会計用メニューを解決する。

pub mod association;
pub mod catalog;
pub mod error;
pub mod resolver;
pub mod size;
pub mod table;
pub mod totals;
pub mod types;

pub use association::{associate, AssociationPair, DEFAULT_DISTANCE_THRESHOLD};
pub use catalog::{CatalogIndex, CatalogSchema, MatchMode};
pub use error::{Error, Result};
pub use resolver::{resolve, ResolveOptions, ResolvedEntry, ResolvedItem, UnknownEntry};
pub use size::{classify, SizeBucket, SizeLabels, SizeTable};
pub use table::CatalogTable;
pub use totals::{summarize, CheckoutTotals, NutritionTotals};
pub use types::{BBox, CachedEntry, CatalogEntry, CatalogField, Detection, DetectionFrame, Nutrition};
