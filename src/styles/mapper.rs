//! Style id mapping between patch content and the output document

use std::collections::{BTreeMap, BTreeSet};

use super::StyleRecord;

/// Accumulated mapping from patch-local style ids to emitted style ids.
///
/// Lives for one patch run. Mappings are only ever added: once an id is
/// resolved, later patches see the same target.
#[derive(Clone, Debug, Default)]
pub struct StyleMapper {
    mapping: BTreeMap<String, String>,
    /// Definitions that must be added to styles.xml, keyed by emitted id
    definitions: BTreeMap<String, StyleRecord>,
    /// Emitted ids whose definition was already handed out
    written: BTreeSet<String>,
}

impl StyleMapper {
    /// Create an empty mapper
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the definitions supplied with a patch against the master styles.
    ///
    /// A definition that matches a master style of the same id (same type and
    /// properties) maps to that style. A definition whose id collides with an
    /// incompatible master style is renamed to `{id}_{n}`. Anything else keeps
    /// its id and is queued for writing.
    pub fn build_mapping(&mut self, patch_styles: &[StyleRecord], master: &[StyleRecord]) {
        for style in patch_styles {
            if self.mapping.contains_key(&style.id) {
                continue;
            }

            let target = match master.iter().find(|m| m.id == style.id) {
                Some(existing) if existing.is_compatible_with(style) => style.id.clone(),
                Some(_) => {
                    let fresh = self.fresh_id(&style.id, master);
                    log::debug!("Style '{}' collides with template, renamed to '{}'", style.id, fresh);
                    self.definitions.insert(
                        fresh.clone(),
                        StyleRecord {
                            id: fresh.clone(),
                            ..style.clone()
                        },
                    );
                    fresh
                }
                None => {
                    self.definitions.insert(style.id.clone(), style.clone());
                    style.id.clone()
                }
            };

            self.mapping.insert(style.id.clone(), target);
        }
    }

    /// Emitted id for a patch-local style id (the id itself when unmapped)
    pub fn map<'a>(&'a self, id: &'a str) -> &'a str {
        self.mapping.get(id).map(String::as_str).unwrap_or(id)
    }

    /// All resolved mappings
    pub fn mapping(&self) -> &BTreeMap<String, String> {
        &self.mapping
    }

    /// Definitions for `ids` that still have to be written, each handed out
    /// once. Parent references are rewritten to their emitted ids.
    pub fn take_definitions<'a>(
        &mut self,
        ids: impl IntoIterator<Item = &'a String>,
    ) -> Vec<StyleRecord> {
        let mut taken = Vec::new();
        for id in ids {
            let target = self.map(id).to_string();
            if self.written.contains(&target) {
                continue;
            }
            let Some(definition) = self.definitions.get(&target) else {
                continue;
            };

            let mut definition = definition.clone();
            if let Some(parent) = &definition.based_on {
                definition.based_on = Some(self.map(parent).to_string());
            }
            self.written.insert(target);
            taken.push(definition);
        }
        taken
    }

    fn fresh_id(&self, id: &str, master: &[StyleRecord]) -> String {
        let is_taken = |candidate: &str| {
            master.iter().any(|m| m.id == candidate)
                || self.definitions.contains_key(candidate)
                || self.mapping.contains_key(candidate)
        };

        (1u32..)
            .map(|n| format!("{}_{}", id, n))
            .find(|candidate| !is_taken(candidate))
            .unwrap_or_else(|| id.to_string())
    }
}
