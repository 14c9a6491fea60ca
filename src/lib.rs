pub mod annotate;
pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod pricing;

pub use annotate::Annotator;
pub use config::{PipelineConfig, PriceFilter, PriceStrategy, QueryTemplate, SelectionPolicy};
pub use detection::{LabelSelector, LabelSource};
pub use error::{Error, ParseError, ServiceError};
pub use models::{BoundingBox, DetectedLabel, PriceResult};
pub use pipeline::{Outcome, Pipeline};
pub use pricing::{PriceLookup, PriceSource, ShoppingResult};
