pub mod serpapi;

pub use serpapi::SerpApiSource;

use log::{debug, warn};
use serde::Deserialize;

use crate::config::{PriceFilter, PriceStrategy, QueryTemplate};
use crate::error::{ParseError, ServiceError};
use crate::models::PriceResult;

/// One entry of a shopping-search response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ShoppingResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
}

impl ShoppingResult {
    pub fn priced(price: impl Into<String>) -> Self {
        Self {
            title: None,
            price: Some(price.into()),
        }
    }
}

/// Remote shopping-search service
pub trait PriceSource {
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<ShoppingResult>, ServiceError>>;

    fn name(&self) -> &str;
}

/// Parse a `$`-prefixed price such as `"$1,299.99"`
pub fn parse_price(raw: &str) -> Result<f64, ParseError> {
    let digits = raw
        .trim()
        .strip_prefix('$')
        .ok_or_else(|| ParseError::NotDollar(raw.to_string()))?;
    let value: f64 = digits
        .trim()
        .replace(',', "")
        .parse()
        .map_err(|_| ParseError::BadNumber(raw.to_string()))?;
    if !value.is_finite() {
        return Err(ParseError::BadNumber(raw.to_string()));
    }
    Ok(value)
}

/// Reduce a result list to one price according to `filter`
pub fn pick_price(results: &[ShoppingResult], filter: &PriceFilter) -> PriceResult {
    let candidates = results.iter().filter_map(|result| {
        let raw = match result.price.as_deref() {
            Some(raw) => raw,
            None => {
                debug!("Skipping result: {}", ParseError::MissingField("price"));
                return None;
            }
        };
        match parse_price(raw) {
            Ok(value) if filter.accepts(value) => Some((raw, value)),
            Ok(value) => {
                debug!("Skipping out-of-range price {} ({})", raw, value);
                None
            }
            Err(e) => {
                debug!("Skipping result: {}", e);
                None
            }
        }
    });

    match filter.strategy {
        PriceStrategy::FirstAboveFloor => candidates
            .map(|(raw, _)| PriceResult::Found(raw.trim().to_string()))
            .next()
            .unwrap_or(PriceResult::Unknown),
        PriceStrategy::Cheapest => candidates
            .map(|(_, value)| value)
            .min_by(|a, b| a.total_cmp(b))
            .map(|value| PriceResult::Found(format!("${:.2}", value)))
            .unwrap_or(PriceResult::Unknown),
    }
}

/// Shopping search plus filtering, never failing outward
pub struct PriceLookup<P> {
    source: P,
    template: QueryTemplate,
    filter: PriceFilter,
}

impl<P: PriceSource> PriceLookup<P> {
    pub fn new(source: P, template: QueryTemplate, filter: PriceFilter) -> Self {
        Self {
            source,
            template,
            filter,
        }
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    pub fn query_for(&self, label: &str) -> String {
        self.template.render(label)
    }

    pub async fn find_price(&self, label: &str) -> PriceResult {
        let query = self.query_for(label);
        debug!("Searching {} for {:?}", self.source.name(), query);

        match self.source.search(&query).await {
            Ok(results) if results.is_empty() => {
                debug!("No shopping results for {:?}", query);
                PriceResult::Unknown
            }
            Ok(results) => pick_price(&results, &self.filter),
            Err(e) => {
                warn!("Price lookup for {:?} failed: {}", query, e);
                PriceResult::Unknown
            }
        }
    }
}
