use indexmap::IndexMap;
use rand::Rng;

use crate::{
    foundation::core::{ElementId, validate_finite},
    foundation::error::{StagehandError, StagehandResult},
    scene::surface::{RestValues, Surface},
};

/// A rest value drawn uniformly from `[min, max)` once per mount.
///
/// The same draw persists across repeat cycles of one mount; a fresh mount draws anew.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeometrySpec {
    /// Element whose rest value is drawn.
    pub element: ElementId,
    /// Property whose rest value is drawn.
    pub property: String,
    /// Inclusive lower bound.
    pub min: f64,
    /// Exclusive upper bound; equal to `min` for a fixed value.
    pub max: f64,
}

impl GeometrySpec {
    /// Draw `property` of `element` from `[min, max)`.
    pub fn new(element: impl Into<ElementId>, property: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            element: element.into(),
            property: property.into(),
            min,
            max,
        }
    }

    /// Finite bounds with `min <= max`.
    pub fn validate(&self) -> StagehandResult<()> {
        validate_finite(self.min, "geometry.min")?;
        validate_finite(self.max, "geometry.max")?;
        if self.min > self.max {
            return Err(StagehandError::validation(format!(
                "geometry range for '{}.{}' has min > max",
                self.element, self.property
            )));
        }
        Ok(())
    }
}

/// Rest values drawn for one mount, not yet written to the surface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawnGeometry {
    values: IndexMap<(ElementId, String), f64>,
}

impl DrawnGeometry {
    /// Draw every spec from `rng`, in declaration order.
    ///
    /// Fails without drawing anything when a spec names an element absent from `surface`.
    pub fn draw<R, V>(specs: &[GeometrySpec], surface: &V, rng: &mut R) -> StagehandResult<Self>
    where
        R: Rng + ?Sized,
        V: RestValues + ?Sized,
    {
        for spec in specs {
            spec.validate()?;
            if !surface.contains_element(&spec.element) {
                return Err(StagehandError::construction(format!(
                    "geometry references unknown element '{}'",
                    spec.element
                )));
            }
        }

        let mut values = IndexMap::with_capacity(specs.len());
        for spec in specs {
            let v = if spec.max > spec.min {
                rng.random_range(spec.min..spec.max)
            } else {
                spec.min
            };
            values.insert((spec.element.clone(), spec.property.clone()), v);
        }
        Ok(Self { values })
    }

    /// Drawn value for one element property.
    pub fn get(&self, element: &ElementId, property: &str) -> Option<f64> {
        self.values
            .get(&(element.clone(), property.to_owned()))
            .copied()
    }

    /// Number of drawn values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// No geometry was declared.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// View of `base` with the drawn values layered over its rest state.
    pub fn overlay<'a, V: RestValues + ?Sized>(&'a self, base: &'a V) -> GeometryOverlay<'a, V> {
        GeometryOverlay { drawn: self, base }
    }

    /// Commit the drawn values as the surface's rest state.
    pub fn apply<S: Surface + ?Sized>(&self, surface: &mut S) {
        for ((element, property), value) in &self.values {
            surface.set_rest_value(element, property, *value);
        }
    }
}

/// [`RestValues`] view combining drawn geometry with a base surface.
pub struct GeometryOverlay<'a, V: ?Sized> {
    drawn: &'a DrawnGeometry,
    base: &'a V,
}

impl<V: RestValues + ?Sized> RestValues for GeometryOverlay<'_, V> {
    fn contains_element(&self, id: &ElementId) -> bool {
        self.base.contains_element(id)
    }

    fn rest_value(&self, id: &ElementId, property: &str) -> Option<f64> {
        self.drawn
            .get(id, property)
            .or_else(|| self.base.rest_value(id, property))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/geometry.rs"]
mod tests;
