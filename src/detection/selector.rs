use crate::config::SelectionPolicy;
use crate::models::DetectedLabel;

/// Picks the single label worth pricing
#[derive(Debug, Clone)]
pub struct LabelSelector {
    policy: SelectionPolicy,
    deny_list: Vec<String>,
}

impl LabelSelector {
    pub fn new<I, S>(policy: SelectionPolicy, deny_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            policy,
            deny_list: deny_list
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn is_denied(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.deny_list.iter().any(|denied| *denied == name)
    }

    pub fn select_best<'a>(&self, labels: &'a [DetectedLabel]) -> Option<&'a DetectedLabel> {
        match self.policy {
            SelectionPolicy::HighestConfidence => highest_confidence(labels.iter()),
            SelectionPolicy::SpecificFirst => {
                highest_confidence(labels.iter().filter(|label| !self.is_denied(&label.name)))
                    .or_else(|| highest_confidence(labels.iter()))
            }
        }
    }
}

/// First occurrence wins on ties; NaN never beats a number
fn highest_confidence<'a>(
    labels: impl Iterator<Item = &'a DetectedLabel>,
) -> Option<&'a DetectedLabel> {
    labels.fold(None, |best: Option<&DetectedLabel>, label| match best {
        Some(current) if !(label.confidence > current.confidence || current.confidence.is_nan()) => {
            Some(current)
        }
        _ => Some(label),
    })
}
