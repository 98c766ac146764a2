use crate::foundation::{
    core::validate_secs,
    error::{StagehandError, StagehandResult},
};

/// Which element of a collection starts first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaggerFrom {
    /// Collection order: element 0 first.
    #[default]
    Start,
    /// Reverse stagger: the last element first, element 0 last.
    End,
    /// Middle outwards.
    Center,
    /// Outwards from the given collection index.
    Index(usize),
}

/// Per-element delay increment applied across a collection target.
///
/// Exactly one of `each` (seconds between neighbours) or `amount` (whole window,
/// split evenly per element) must be set.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stagger {
    /// Seconds between neighbouring elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub each: Option<f64>,
    /// Whole stagger window in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Element that starts first.
    #[serde(default)]
    pub from: StaggerFrom,
}

impl Stagger {
    /// Fixed delay between neighbouring elements.
    pub fn each(secs: f64) -> Self {
        Self {
            each: Some(secs),
            amount: None,
            from: StaggerFrom::Start,
        }
    }

    /// Total stagger window, divided by the element count.
    pub fn amount(secs: f64) -> Self {
        Self {
            each: None,
            amount: Some(secs),
            from: StaggerFrom::Start,
        }
    }

    /// Set the origin element.
    pub fn from(mut self, from: StaggerFrom) -> Self {
        self.from = from;
        self
    }

    /// Exactly one of `each`/`amount`, finite and non-negative.
    pub fn validate(&self) -> StagehandResult<()> {
        match (self.each, self.amount) {
            (Some(each), None) => validate_secs(each, "stagger.each"),
            (None, Some(amount)) => validate_secs(amount, "stagger.amount"),
            _ => Err(StagehandError::validation(
                "stagger must set exactly one of 'each' or 'amount'",
            )),
        }
    }

    /// Start offset of every element, indexed like the collection.
    ///
    /// The delay of element `i` is its distance from the origin times the per-element step,
    /// so with [`StaggerFrom::End`] the last element has offset 0 and element 0 has the
    /// largest offset.
    pub fn offsets(&self, count: usize) -> StagehandResult<Vec<f64>> {
        self.validate()?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let step = match (self.each, self.amount) {
            (Some(each), _) => each,
            (None, Some(amount)) => amount / count as f64,
            (None, None) => 0.0,
        };

        let last = (count - 1) as f64;
        let origin = match self.from {
            StaggerFrom::Start => 0.0,
            StaggerFrom::End => last,
            StaggerFrom::Center => last / 2.0,
            StaggerFrom::Index(i) => {
                if i >= count {
                    return Err(StagehandError::validation(format!(
                        "stagger origin index {i} is out of range for {count} targets"
                    )));
                }
                i as f64
            }
        };

        Ok((0..count)
            .map(|i| (i as f64 - origin).abs() * step)
            .collect())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/stagger.rs"]
mod tests;
