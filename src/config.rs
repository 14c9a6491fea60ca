use std::path::PathBuf;

use clap::ValueEnum;

use crate::error::Error;

/// Broad categories that say nothing useful about what to price
pub const DEFAULT_DENY_LIST: &[&str] = &[
    "Accessories",
    "Animal",
    "Appliance",
    "Art",
    "Bowl",
    "Clothing",
    "Computer Hardware",
    "Device",
    "Dish",
    "Electronics",
    "Fast Food",
    "Food",
    "Fruit",
    "Furniture",
    "Hardware",
    "Indoors",
    "Machine",
    "Meal",
    "Object",
    "Outdoors",
    "Person",
    "Plant",
    "Produce",
    "Tool",
    "Vegetable",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SelectionPolicy {
    /// Highest confidence over every returned label
    HighestConfidence,
    /// Prefer labels outside the deny-list, fall back to highest confidence
    #[default]
    SpecificFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PriceStrategy {
    /// First in-bounds price, as the service wrote it
    #[default]
    FirstAboveFloor,
    /// Lowest in-bounds price, reformatted to two decimals
    Cheapest,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceFilter {
    pub floor: f64,
    pub ceiling: Option<f64>,
    pub strategy: PriceStrategy,
}

impl PriceFilter {
    pub fn accepts(&self, value: f64) -> bool {
        value >= self.floor && self.ceiling.is_none_or(|ceiling| value <= ceiling)
    }
}

impl Default for PriceFilter {
    fn default() -> Self {
        Self {
            floor: 6.0,
            ceiling: None,
            strategy: PriceStrategy::default(),
        }
    }
}

/// Search query built from a label name, e.g. `"{label} price"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate(String);

impl QueryTemplate {
    pub const PLACEHOLDER: &'static str = "{label}";

    pub fn new(template: impl Into<String>) -> Result<Self, Error> {
        let template = template.into();
        if !template.contains(Self::PLACEHOLDER) {
            return Err(Error::Config(format!(
                "query template {:?} has no {} placeholder",
                template,
                Self::PLACEHOLDER
            )));
        }
        Ok(Self(template))
    }

    pub fn render(&self, label: &str) -> String {
        self.0.replace(Self::PLACEHOLDER, label).trim().to_string()
    }
}

impl Default for QueryTemplate {
    fn default() -> Self {
        Self("{label} price".to_string())
    }
}

/// Everything the orchestrator needs besides the two service clients
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_labels: i32,
    pub min_confidence: f32,
    pub policy: SelectionPolicy,
    pub deny_list: Vec<String>,
    pub query_template: QueryTemplate,
    pub price_filter: PriceFilter,
    pub output_path: PathBuf,
    pub font_path: Option<PathBuf>,
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_labels: 10,
            min_confidence: 50.0,
            policy: SelectionPolicy::default(),
            deny_list: DEFAULT_DENY_LIST.iter().map(|s| s.to_string()).collect(),
            query_template: QueryTemplate::default(),
            price_filter: PriceFilter::default(),
            output_path: PathBuf::from("output_image.jpg"),
            font_path: None,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_requires_placeholder() {
        assert!(QueryTemplate::new("regular pizza affordable").is_err());
        let template = QueryTemplate::new("{label} affordable").unwrap();
        assert_eq!(template.render("Pizza"), "Pizza affordable");
    }

    #[test]
    fn filter_bounds_are_inclusive() {
        let filter = PriceFilter {
            floor: 6.0,
            ceiling: Some(10.0),
            strategy: PriceStrategy::Cheapest,
        };
        assert!(filter.accepts(6.0));
        assert!(filter.accepts(10.0));
        assert!(!filter.accepts(5.99));
        assert!(!filter.accepts(10.01));
    }
}
