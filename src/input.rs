use serde::Deserialize;
use thiserror::Error;

/// Untyped problem as it arrives on the wire.
///
/// Weights may be numbers or numeric strings; the declared counts are
/// optional and only checked against the list lengths when present.
/// Unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct RawProblem {
    #[serde(rename = "itemCount", default)]
    pub item_count: Option<usize>,
    pub items: Vec<String>,
    pub weights: Vec<RawWeight>,
    #[serde(rename = "tierCount", default)]
    pub tier_count: Option<usize>,
    pub tiers: Vec<String>,
    #[serde(rename = "laneCount", default)]
    pub lane_count: Option<usize>,
    pub lanes: Vec<String>,
}

/// A weight before numeric validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawWeight {
    Number(f64),
    Text(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("declared {field} count {declared} does not match the {actual} entries supplied")]
    CountMismatch {
        field: &'static str,
        declared: usize,
        actual: usize,
    },
    #[error("{names} item names but {weights} weights supplied")]
    WeightLengthMismatch { names: usize, weights: usize },
    #[error("weight {raw:?} for item {item:?} is not a real number")]
    NonNumericWeight { item: String, raw: String },
    #[error("duplicate item name {0:?}")]
    DuplicateItem(String),
    #[error("duplicate tier id {0:?}")]
    DuplicateTier(String),
    #[error("duplicate lane id {0:?}")]
    DuplicateLane(String),
    #[error("at least one tier is required")]
    NoTiers,
    #[error("at least one lane is required")]
    NoLanes,
}

/// A named, weighted unit to be assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    pub weight: f64,
}

/// Validated, immutable input for one optimization run.
///
/// Tier order is the order supplied on the wire and drives the
/// non-increasing load relation. Tier and lane ids are opaque; the core
/// only compares them for equality.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub items: Vec<Item>,
    pub tiers: Vec<String>,
    pub lanes: Vec<String>,
}

impl RawProblem {
    /// Checks the raw payload and produces the typed problem record.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] on any malformed, missing, or inconsistent
    /// field. Nothing downstream of validation can fail on input shape.
    pub fn validate(self) -> Result<Problem, InputError> {
        check_count("item", self.item_count, self.items.len())?;
        check_count("tier", self.tier_count, self.tiers.len())?;
        check_count("lane", self.lane_count, self.lanes.len())?;

        if self.items.len() != self.weights.len() {
            return Err(InputError::WeightLengthMismatch {
                names: self.items.len(),
                weights: self.weights.len(),
            });
        }
        if self.tiers.is_empty() {
            return Err(InputError::NoTiers);
        }
        if self.lanes.is_empty() {
            return Err(InputError::NoLanes);
        }

        check_distinct(&self.items, InputError::DuplicateItem)?;
        check_distinct(&self.tiers, InputError::DuplicateTier)?;
        check_distinct(&self.lanes, InputError::DuplicateLane)?;

        let items = self
            .items
            .into_iter()
            .zip(self.weights)
            .map(|(name, raw)| {
                let weight = raw.parse(&name)?;
                Ok(Item { name, weight })
            })
            .collect::<Result<Vec<_>, InputError>>()?;

        Ok(Problem {
            items,
            tiers: self.tiers,
            lanes: self.lanes,
        })
    }
}

impl RawWeight {
    fn parse(&self, item: &str) -> Result<f64, InputError> {
        let parsed = match self {
            RawWeight::Number(value) => Some(*value),
            RawWeight::Text(text) => text.trim().parse::<f64>().ok(),
        };

        // NaN and infinities are as unusable in the model as a word.
        match parsed {
            Some(value) if value.is_finite() => Ok(value),
            _ => Err(InputError::NonNumericWeight {
                item: item.to_owned(),
                raw: match self {
                    RawWeight::Number(value) => value.to_string(),
                    RawWeight::Text(text) => text.clone(),
                },
            }),
        }
    }
}

fn check_count(
    field: &'static str,
    declared: Option<usize>,
    actual: usize,
) -> Result<(), InputError> {
    match declared {
        Some(declared) if declared != actual => Err(InputError::CountMismatch {
            field,
            declared,
            actual,
        }),
        _ => Ok(()),
    }
}

fn check_distinct(
    values: &[String],
    error: impl Fn(String) -> InputError,
) -> Result<(), InputError> {
    let mut seen = std::collections::BTreeSet::new();
    for value in values {
        if !seen.insert(value.as_str()) {
            return Err(error(value.clone()));
        }
    }
    Ok(())
}
