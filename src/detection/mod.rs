pub mod rekognition;
pub mod selector;

pub use rekognition::RekognitionSource;
pub use selector::LabelSelector;

use crate::error::ServiceError;
use crate::models::DetectedLabel;

/// Remote image-labelling service
pub trait LabelSource {
    /// Label the objects in `image`, in the order the service ranks them
    fn detect(
        &self,
        image: &[u8],
    ) -> impl Future<Output = Result<Vec<DetectedLabel>, ServiceError>>;

    /// Human-readable name for this source (used in verbose output)
    fn name(&self) -> &str;
}
