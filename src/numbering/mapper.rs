//! Strategies deciding whether a numbering reference reuses template numbering

use std::collections::BTreeMap;
use std::fmt;

use super::{ExistingNumbering, ListType};

/// Where a reference's numbering comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberingMapping {
    pub original_reference: String,
    /// Template id when `is_existing`; otherwise the id the reference would
    /// take if it had a single instance
    pub target_num_id: String,
    /// `true` when `target_num_id` names numbering already in the template
    pub is_existing: bool,
}

/// Mappings produced by a [`NumberingStrategy`], keyed by reference
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NumberingMappings {
    mappings: BTreeMap<String, NumberingMapping>,
}

impl NumberingMappings {
    /// Mapping for `reference`
    pub fn get(&self, reference: &str) -> Option<&NumberingMapping> {
        self.mappings.get(reference)
    }

    /// Target numbering id for `reference`
    pub fn mapped_num_id(&self, reference: &str) -> Option<&str> {
        self.get(reference).map(|m| m.target_num_id.as_str())
    }

    /// Whether `reference` reuses template numbering
    pub fn is_existing(&self, reference: &str) -> bool {
        self.get(reference).is_some_and(|m| m.is_existing)
    }

    /// Iterate over all mappings
    pub fn iter(&self) -> impl Iterator<Item = &NumberingMapping> {
        self.mappings.values()
    }

    fn insert(&mut self, mapping: NumberingMapping) {
        self.mappings
            .insert(mapping.original_reference.clone(), mapping);
    }
}

/// Resolves numbering references against numbering found in the template
pub trait NumberingStrategy: fmt::Debug + Send + Sync {
    fn resolve(&self, references: &[String], existing: &[ExistingNumbering]) -> NumberingMappings;
}

/// Always generate new numbering
#[derive(Clone, Copy, Debug, Default)]
pub struct FreshAllocation;

impl NumberingStrategy for FreshAllocation {
    fn resolve(&self, references: &[String], existing: &[ExistingNumbering]) -> NumberingMappings {
        let mut ids = NewIds::after(existing);
        let mut mappings = NumberingMappings::default();
        for reference in references {
            mappings.insert(NumberingMapping {
                original_reference: reference.clone(),
                target_num_id: ids.allocate(),
                is_existing: false,
            });
        }
        mappings
    }
}

/// Reuse the first template numbering whose first level has the same shape
/// (bullet or not) as the reference; allocate a new id otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompatibilityMapper;

impl CompatibilityMapper {
    fn find_compatible<'a>(
        reference: &str,
        existing: &'a [ExistingNumbering],
    ) -> Option<&'a ExistingNumbering> {
        let wants_bullet = ListType::from_reference(reference) == ListType::Bullet;
        existing
            .iter()
            .filter(|num| !num.levels.is_empty())
            .find(|num| num.is_bullet() == wants_bullet)
    }
}

impl NumberingStrategy for CompatibilityMapper {
    fn resolve(&self, references: &[String], existing: &[ExistingNumbering]) -> NumberingMappings {
        let mut ids = NewIds::after(existing);
        let mut mappings = NumberingMappings::default();

        for reference in references {
            let mapping = match Self::find_compatible(reference, existing) {
                Some(compatible) => NumberingMapping {
                    original_reference: reference.clone(),
                    target_num_id: compatible.num_id.clone(),
                    is_existing: true,
                },
                None => NumberingMapping {
                    original_reference: reference.clone(),
                    target_num_id: ids.allocate(),
                    is_existing: false,
                },
            };
            mappings.insert(mapping);
        }

        mappings
    }
}

/// Sequential ids starting at `1 + max(existing numeric ids, 0)`
struct NewIds(u32);

impl NewIds {
    fn after(existing: &[ExistingNumbering]) -> Self {
        let max = existing
            .iter()
            .map(|n| n.num_id.parse::<u32>().unwrap_or(0))
            .max()
            .unwrap_or(0);
        Self(max + 1)
    }

    fn allocate(&mut self) -> String {
        let id = self.0;
        self.0 += 1;
        id.to_string()
    }
}
