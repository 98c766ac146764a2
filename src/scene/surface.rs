use indexmap::IndexMap;

use crate::foundation::core::ElementId;

/// Read access to the declared rest state of a set of Visual Elements.
///
/// Timeline resolution only needs this view; it never writes.
pub trait RestValues {
    /// Whether `id` names an element on the surface.
    fn contains_element(&self, id: &ElementId) -> bool;
    /// Declared rest value of `property` on `id`, if any.
    fn rest_value(&self, id: &ElementId, property: &str) -> Option<f64>;
}

/// Host Visual Surface: the container owning every Visual Element.
///
/// The sequencer never creates or destroys elements; it only reads rest values and
/// writes computed property values.
pub trait Surface: RestValues {
    /// Whether the container is mounted and safe to operate on.
    fn is_mounted(&self) -> bool;
    /// Replace the rest value of `property` and reset its current value to it.
    fn set_rest_value(&mut self, id: &ElementId, property: &str, value: f64);
    /// Write the current value of `property`.
    fn write(&mut self, id: &ElementId, property: &str, value: f64);
}

/// A Visual Element: an identifier plus named numeric properties.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VisualElement {
    /// Identifier unique within its surface.
    pub id: ElementId,
    /// Declared baseline values, before any transition has applied.
    #[serde(default)]
    pub rest: IndexMap<String, f64>,
    #[serde(skip)]
    current: IndexMap<String, f64>,
}

impl VisualElement {
    /// An element with no properties.
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            rest: IndexMap::new(),
            current: IndexMap::new(),
        }
    }

    /// Declare a rest value.
    pub fn with(mut self, property: impl Into<String>, rest: f64) -> Self {
        self.rest.insert(property.into(), rest);
        self
    }

    /// Current value, falling back to the rest value when never written.
    pub fn value(&self, property: &str) -> Option<f64> {
        self.current
            .get(property)
            .or_else(|| self.rest.get(property))
            .copied()
    }

    /// Every property with a value, rest-declared ones first.
    pub fn values(&self) -> IndexMap<String, f64> {
        let mut out = self.rest.clone();
        for (k, v) in &self.current {
            out.insert(k.clone(), *v);
        }
        out
    }
}

/// In-memory [`Surface`] backed by an ordered element table.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "SceneDef", into = "SceneDef")]
pub struct Scene {
    mounted: bool,
    elements: IndexMap<ElementId, VisualElement>,
    writes: u64,
}

#[derive(Clone, serde::Serialize, serde::Deserialize)]
struct SceneDef {
    #[serde(default = "mounted_default")]
    mounted: bool,
    elements: Vec<VisualElement>,
}

fn mounted_default() -> bool {
    true
}

impl From<SceneDef> for Scene {
    fn from(def: SceneDef) -> Self {
        let mut scene = if def.mounted {
            Self::new()
        } else {
            Self::unmounted()
        };
        for el in def.elements {
            scene.insert(el);
        }
        scene
    }
}

impl From<Scene> for SceneDef {
    fn from(scene: Scene) -> Self {
        Self {
            mounted: scene.mounted,
            elements: scene.elements.into_values().collect(),
        }
    }
}

impl Scene {
    /// An empty, mounted scene.
    pub fn new() -> Self {
        Self {
            mounted: true,
            elements: IndexMap::new(),
            writes: 0,
        }
    }

    /// An empty scene whose container has not been mounted yet.
    pub fn unmounted() -> Self {
        Self {
            mounted: false,
            ..Self::new()
        }
    }

    /// Mark the container as mounted.
    pub fn mount(&mut self) {
        self.mounted = true;
    }

    /// Mark the container as removed.
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    /// Builder form of [`Scene::insert`].
    pub fn with_element(mut self, element: VisualElement) -> Self {
        self.insert(element);
        self
    }

    /// Insert or replace an element.
    pub fn insert(&mut self, element: VisualElement) {
        self.elements.insert(element.id.clone(), element);
    }

    /// Look up one element.
    pub fn element(&self, id: &ElementId) -> Option<&VisualElement> {
        self.elements.get(id)
    }

    /// Every element in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &VisualElement> {
        self.elements.values()
    }

    /// Current value of `property` on `id`.
    pub fn value(&self, id: impl Into<ElementId>, property: &str) -> Option<f64> {
        self.elements.get(&id.into())?.value(property)
    }

    /// Number of property writes performed through [`Surface::write`].
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Current values of every element, keyed by element id.
    pub fn snapshot(&self) -> IndexMap<ElementId, IndexMap<String, f64>> {
        self.elements
            .iter()
            .map(|(id, el)| (id.clone(), el.values()))
            .collect()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl RestValues for Scene {
    fn contains_element(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    fn rest_value(&self, id: &ElementId, property: &str) -> Option<f64> {
        self.elements.get(id)?.rest.get(property).copied()
    }
}

impl Surface for Scene {
    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn set_rest_value(&mut self, id: &ElementId, property: &str, value: f64) {
        if let Some(el) = self.elements.get_mut(id) {
            el.rest.insert(property.to_owned(), value);
            el.current.shift_remove(property);
        }
    }

    fn write(&mut self, id: &ElementId, property: &str, value: f64) {
        if let Some(el) = self.elements.get_mut(id) {
            el.current.insert(property.to_owned(), value);
            self.writes += 1;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/surface.rs"]
mod tests;
