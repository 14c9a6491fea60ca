use std::path::{Path, PathBuf};

use log::debug;

use crate::annotate::Annotator;
use crate::config::PipelineConfig;
use crate::detection::{LabelSelector, LabelSource};
use crate::error::Result;
use crate::models::{DetectedLabel, PriceResult};
use crate::pricing::{PriceLookup, PriceSource};

/// Result of a single pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The labelling service found nothing; downstream steps were skipped
    NoneDetected,
    Annotated {
        label: DetectedLabel,
        price: PriceResult,
        output: PathBuf,
    },
}

/// Detect -> Select -> Lookup -> Annotate, one step at a time
pub struct Pipeline<L, P> {
    labels: L,
    selector: LabelSelector,
    prices: PriceLookup<P>,
    annotator: Annotator,
    verbose: bool,
}

impl<L: LabelSource, P: PriceSource> Pipeline<L, P> {
    /// Fails when `config.font_path` is set but is not a readable font.
    /// Without a font path the first usable system font is taken.
    pub fn new(labels: L, prices: P, config: &PipelineConfig) -> Result<Self> {
        let annotator = Annotator::new(&config.output_path);
        let annotator = match &config.font_path {
            Some(font) => annotator.with_font_file(font)?,
            None => annotator.with_system_font(),
        };

        Ok(Self {
            labels,
            selector: LabelSelector::new(config.policy, &config.deny_list),
            prices: PriceLookup::new(prices, config.query_template.clone(), config.price_filter),
            annotator,
            verbose: config.verbose,
        })
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn label_source(&self) -> &L {
        &self.labels
    }

    pub fn price_source(&self) -> &P {
        self.prices.source()
    }

    /// Read the image at `image_path` and run every step on it
    pub async fn run_file(&self, image_path: &Path) -> Result<Outcome> {
        if self.verbose {
            println!("Loading image: {:?}", image_path);
        }
        let image = std::fs::read(image_path)?;
        self.run(&image).await
    }

    pub async fn run(&self, image: &[u8]) -> Result<Outcome> {
        println!("Detecting objects...");
        if self.verbose {
            println!("  using {} ({} bytes)", self.labels.name(), image.len());
        }
        let labels = self.labels.detect(image).await?;

        if !labels.is_empty() {
            println!("Detected objects:");
            for label in &labels {
                println!("  Name: {}, Confidence: {:.2}%", label.name, label.confidence);
            }
        }

        let Some(best) = self.selector.select_best(&labels) else {
            println!("No objects detected.");
            return Ok(Outcome::NoneDetected);
        };

        println!(
            "Selected: {} ({:.2}%, {:?} policy)",
            best.name,
            best.confidence,
            self.selector.policy()
        );

        if self.verbose {
            println!("Searching price for {:?}...", self.prices.query_for(&best.name));
        }
        let price = self.prices.find_price(&best.name).await;
        println!("Price: {}", price);

        debug!("Drawing {} instance(s) of {}", best.instances.len(), best.name);
        let output = self.annotator.annotate(image, best, &price)?;
        println!("Output image saved as {}", output.display());

        Ok(Outcome::Annotated {
            label: best.clone(),
            price,
            output,
        })
    }
}
