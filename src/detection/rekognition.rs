use aws_config::{BehaviorVersion, Region};
use aws_sdk_rekognition::{
    Client,
    error::DisplayErrorContext,
    primitives::Blob,
    types::{Image, Label},
};
use log::{debug, info};

use crate::detection::LabelSource;
use crate::error::{ParseError, ServiceError};
use crate::models::{BoundingBox, DetectedLabel};

/// AWS Rekognition `DetectLabels`
pub struct RekognitionSource {
    client: Client,
    max_labels: i32,
    min_confidence: f32,
}

impl RekognitionSource {
    /// Build a client from the standard AWS credential chain
    pub async fn from_env(region: impl Into<String>) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.into()))
            .load()
            .await;
        Self::new(Client::new(&config))
    }

    pub fn new(client: Client) -> Self {
        Self {
            client,
            max_labels: 10,
            min_confidence: 50.0,
        }
    }

    pub fn with_max_labels(mut self, max_labels: i32) -> Self {
        self.max_labels = max_labels;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }
}

impl LabelSource for RekognitionSource {
    async fn detect(&self, image: &[u8]) -> Result<Vec<DetectedLabel>, ServiceError> {
        if image.is_empty() {
            return Err(ServiceError::InvalidRequest("image is empty".to_string()));
        }

        let response = self
            .client
            .detect_labels()
            .image(Image::builder().bytes(Blob::new(image.to_vec())).build())
            .max_labels(self.max_labels)
            .min_confidence(self.min_confidence)
            .send()
            .await
            .map_err(|e| ServiceError::Aws(DisplayErrorContext(e).to_string()))?;

        let labels: Vec<DetectedLabel> = response
            .labels()
            .iter()
            .filter_map(|label| match convert_label(label) {
                Ok(label) => Some(label),
                Err(e) => {
                    debug!("Skipping label: {}", e);
                    None
                }
            })
            .collect();

        if labels.is_empty() {
            info!("Labelling service reported no objects");
        }
        Ok(labels)
    }

    fn name(&self) -> &str {
        "AWS Rekognition"
    }
}

fn convert_label(label: &Label) -> Result<DetectedLabel, ParseError> {
    let name = label.name().ok_or(ParseError::MissingField("Name"))?;
    let confidence = label
        .confidence()
        .ok_or(ParseError::MissingField("Confidence"))?;

    let instances = label
        .instances()
        .iter()
        .filter_map(|instance| {
            let bbox = instance.bounding_box()?;
            Some(BoundingBox {
                left: bbox.left()?,
                top: bbox.top()?,
                width: bbox.width()?,
                height: bbox.height()?,
            })
        })
        .collect();

    Ok(DetectedLabel {
        name: name.to_string(),
        confidence,
        instances,
    })
}

#[cfg(test)]
mod tests {
    use aws_sdk_rekognition::types::{BoundingBox as AwsBox, Instance};

    use super::*;

    #[test]
    fn converts_label_with_instances() {
        let label = Label::builder()
            .name("Pizza")
            .confidence(92.5)
            .instances(
                Instance::builder()
                    .bounding_box(
                        AwsBox::builder()
                            .left(0.1)
                            .top(0.2)
                            .width(0.3)
                            .height(0.4)
                            .build(),
                    )
                    .build(),
            )
            .instances(Instance::builder().build())
            .build();

        let converted = convert_label(&label).unwrap();
        assert_eq!(converted.name, "Pizza");
        assert_eq!(converted.confidence, 92.5);
        assert_eq!(converted.instances.len(), 1);
        assert_eq!(converted.instances[0].width, 0.3);
    }

    #[test]
    fn label_without_name_is_skipped() {
        let label = Label::builder().confidence(70.0).build();
        assert_eq!(
            convert_label(&label),
            Err(ParseError::MissingField("Name"))
        );
    }

    #[tokio::test]
    async fn empty_image_is_rejected_before_sending() {
        let config = aws_sdk_rekognition::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        let source = RekognitionSource::new(Client::from_conf(config));

        let err = source.detect(&[]).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(msg) if msg == "image is empty"));
    }
}
