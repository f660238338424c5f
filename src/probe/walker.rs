//! Recursive resolution of a unit and every unit it references.
//!
//! [`Walker::resolve`] produces one [`Document`] covering the whole
//! [`PropertySet`] of a unit. While reading multi-valued properties, every value
//! naming a registered unit is resolved in turn and embedded as a nested
//! document, so the result is a tree in traversal order. Shared dependencies
//! appear once per path that reaches them.

use anyhow::{Context, Result};
use log::{debug, trace};

use super::property::PropertySet;
use super::value::{PropertyValue, is_placeholder, rejoin_placeholders};
use crate::discovery::{UnitHandle, UnitRegistry};
use crate::document::{Document, Element};

/// Which references are left unexpanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePolicy {
    /// A unit never expands a reference to itself. A cycle through other units
    /// (A -> B -> A) is followed without bound.
    #[default]
    SelfOnly,
    /// A reference to any unit on the current resolution chain is kept as a
    /// plain string.
    Ancestors,
}

pub struct Walker<'a, R: UnitRegistry + ?Sized> {
    registry: &'a R,
    properties: &'a PropertySet,
    policy: CyclePolicy,
}

impl<'a, R: UnitRegistry + ?Sized> Walker<'a, R> {
    pub fn new(registry: &'a R, properties: &'a PropertySet) -> Self {
        Self {
            registry,
            properties,
            policy: CyclePolicy::default(),
        }
    }

    pub fn with_cycle_policy(self, policy: CyclePolicy) -> Self {
        Self { policy, ..self }
    }

    /// Resolve the full property set of `unit`.
    pub fn resolve(&self, unit: &UnitHandle) -> Result<Document> {
        self.resolve_in(unit, &mut Vec::new())
    }

    /// Read one property of `unit`, resolving the units it references.
    ///
    /// Placeholders are dropped; the remaining values keep their native order.
    pub fn read_property(&self, unit: &UnitHandle, property: &str) -> Result<Vec<Element>> {
        self.read_property_in(unit, property, &mut vec![unit.clone()])
    }

    fn resolve_in(&self, unit: &UnitHandle, chain: &mut Vec<UnitHandle>) -> Result<Document> {
        debug!("Resolving unit {} at depth {}", unit.name(), chain.len());
        chain.push(unit.clone());
        let document = self.build_document(unit, chain);
        chain.pop();
        document
    }

    fn build_document(&self, unit: &UnitHandle, chain: &mut Vec<UnitHandle>) -> Result<Document> {
        let mut document = Document::new();

        for property in self.properties.single_valued() {
            if let Some(value) = self.read_scalar(unit, property)? {
                document.set_scalar(property.as_str(), value);
            }
        }

        for property in self.properties.multi_valued() {
            let elements = self.read_property_in(unit, property, chain)?;
            if !elements.is_empty() {
                document.set_array(property.as_str(), elements);
            }
        }

        Ok(document)
    }

    /// Single-valued properties are never expanded; list values are joined back
    /// with `;`.
    fn read_scalar(&self, unit: &UnitHandle, property: &str) -> Result<Option<String>> {
        let values: Vec<String> = self
            .fetch(unit, property)?
            .into_iter()
            .filter(|value| {
                let placeholder = is_placeholder(value);
                if placeholder {
                    trace!("Dropping {} from {} of {}", value, property, unit.name());
                }
                !placeholder
            })
            .collect();

        let value = values.join(";");
        Ok((!value.is_empty()).then_some(value))
    }

    fn read_property_in(
        &self,
        unit: &UnitHandle,
        property: &str,
        chain: &mut Vec<UnitHandle>,
    ) -> Result<Vec<Element>> {
        let mut elements = Vec::new();

        for raw in self.fetch(unit, property)? {
            match self.classify(raw, chain) {
                PropertyValue::UnitReference(dependency) => {
                    let nested = self.resolve_in(&dependency, chain)?;
                    elements.push(Element::Document(nested));
                }
                PropertyValue::Scalar(value) => elements.push(Element::Text(value)),
                PropertyValue::Ignorable => {
                    trace!("Dropping placeholder from {} of {}", property, unit.name());
                }
            }
        }

        Ok(elements)
    }

    /// `chain` ends with the unit whose property is being read.
    fn classify(&self, raw: String, chain: &[UnitHandle]) -> PropertyValue {
        if let Some(handle) = self.registry.lookup(&raw) {
            let guarded = match self.policy {
                CyclePolicy::SelfOnly => chain.last() == Some(&handle),
                CyclePolicy::Ancestors => chain.contains(&handle),
            };
            if !guarded {
                return PropertyValue::UnitReference(handle);
            }
            debug!("Not expanding {}: already being resolved", raw);
        }

        if is_placeholder(&raw) {
            PropertyValue::Ignorable
        } else {
            PropertyValue::Scalar(raw)
        }
    }

    fn fetch(&self, unit: &UnitHandle, property: &str) -> Result<Vec<String>> {
        self.registry
            .property(unit, property)
            .map(rejoin_placeholders)
            .with_context(|| format!("Failed to read {} of {}", property, unit.name()))
    }
}
