//! List definitions generated for one patch run

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::xml::RawXmlElement;

use super::{
    AbstractNum, Level, LevelOverride, ListConfig, ListConfigs, ListType, NumberFormat, Numbering,
};

/// Generated definitions always cover at least levels `0..=MIN_GENERATED_DEPTH`,
/// even when the content only uses level 0.
pub const MIN_GENERATED_DEPTH: u8 = 2;

/// Deepest level a definition may hold
pub const MAX_LEVEL: u8 = 8;

/// Bullet glyphs, cycled by level
pub const BULLET_GLYPHS: [&str; 3] = ["●", "○", "■"];

/// Left indentation added per level, in twips
pub const INDENT_STEP: i32 = 720;

/// Hanging indentation of every generated level, in twips
pub const HANGING_INDENT: i32 = 360;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Unconfigured,
    Configured,
    Instantiated,
}

/// A definition generated for one reference
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberingDefinition {
    pub reference: String,
    pub abstract_num_id: u32,
    pub levels: Vec<Level>,
}

/// A `(reference, instance)` pair bound to a numbering id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConcreteNumbering {
    pub reference: String,
    pub instance: u32,
    pub num_id: u32,
}

/// Generates numbering definitions and concrete instances.
///
/// The manager starts *unconfigured*; [`generate_from_configs`] moves it to
/// *configured* and the first concrete instance to *instantiated*.
///
/// [`generate_from_configs`]: NumberingManager::generate_from_configs
#[derive(Clone, Debug)]
pub struct NumberingManager {
    numbering: Numbering,
    definitions: Vec<NumberingDefinition>,
    concrete: Vec<ConcreteNumbering>,
    reused: BTreeMap<String, u32>,
    state: State,
}

impl Default for NumberingManager {
    fn default() -> Self {
        Self::with_existing(Numbering::new())
    }
}

impl NumberingManager {
    /// Create a manager that writes a fresh numbering part
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager seeded with a template's numbering; generated ids
    /// continue after the ids already in use.
    pub fn with_existing(numbering: Numbering) -> Self {
        Self {
            numbering,
            definitions: Vec::new(),
            concrete: Vec::new(),
            reused: BTreeMap::new(),
            state: State::Unconfigured,
        }
    }

    /// Generate a definition for every reference in `configs`.
    ///
    /// Each call replaces the previous configuration: definitions and
    /// concrete instances from earlier calls are dropped. Template numbering
    /// and references bound with [`bind_existing`] are kept.
    ///
    /// [`bind_existing`]: NumberingManager::bind_existing
    pub fn generate_from_configs(&mut self, configs: &ListConfigs) {
        self.discard_generated();

        for (reference, config) in configs {
            let levels = generate_levels(config);
            let abstract_num_id = self
                .numbering
                .add_abstract_num(AbstractNum::with_levels(0, levels.clone()));
            self.definitions.push(NumberingDefinition {
                reference: reference.clone(),
                abstract_num_id,
                levels,
            });
        }

        log::debug!("Generated {} numbering definitions", configs.len());
        self.state = State::Configured;
    }

    fn discard_generated(&mut self) {
        let abstract_ids: BTreeSet<u32> = self
            .definitions
            .drain(..)
            .map(|d| d.abstract_num_id)
            .collect();
        let num_ids: BTreeSet<u32> = self.concrete.drain(..).map(|c| c.num_id).collect();

        self.numbering
            .abstract_nums
            .retain(|a| !abstract_ids.contains(&a.abstract_num_id));
        self.numbering.nums.retain(|n| !num_ids.contains(&n.num_id));
    }

    /// Create instance 0 for every reference in `configs` that lacks it
    pub fn create_concrete_instances(&mut self, configs: &ListConfigs) -> Result<()> {
        if self.state == State::Unconfigured {
            return Err(Error::NumberingUnconfigured);
        }
        for reference in configs.keys() {
            self.create_concrete_instance(reference, 0)?;
        }
        Ok(())
    }

    /// Bind `(reference, instance)` to a numbering id, creating the instance
    /// on first request. Each instance restarts level 0 at the definition's
    /// start value.
    pub fn create_concrete_instance(&mut self, reference: &str, instance: u32) -> Result<u32> {
        if self.state == State::Unconfigured {
            return Err(Error::NumberingUnconfigured);
        }
        if let Some(existing) = self.concrete_instance(reference, instance) {
            return Ok(existing.num_id);
        }

        let definition = self
            .definitions
            .iter()
            .find(|d| d.reference == reference)
            .ok_or_else(|| Error::UnknownNumberingReference(reference.to_string()))?;
        let start = definition
            .levels
            .first()
            .and_then(|l| l.start)
            .unwrap_or(1);

        let num_id = self.numbering.add_num(
            definition.abstract_num_id,
            vec![LevelOverride::restart(0, start)],
        );
        self.concrete.push(ConcreteNumbering {
            reference: reference.to_string(),
            instance,
            num_id,
        });
        self.state = State::Instantiated;

        Ok(num_id)
    }

    /// Resolve every instance of `reference` to a numbering id that already
    /// exists in the template
    pub fn bind_existing(&mut self, reference: &str, num_id: u32) {
        self.reused.insert(reference.to_string(), num_id);
    }

    /// Look up a concrete instance
    pub fn concrete_instance(&self, reference: &str, instance: u32) -> Option<&ConcreteNumbering> {
        self.concrete
            .iter()
            .find(|c| c.reference == reference && c.instance == instance)
    }

    /// All concrete instances, in creation order
    pub fn concrete_instances(&self) -> &[ConcreteNumbering] {
        &self.concrete
    }

    /// Live definitions and instances
    pub fn get_numbering(&self) -> Result<&Numbering> {
        match self.state {
            State::Unconfigured => Err(Error::NumberingNotGenerated),
            _ => Ok(&self.numbering),
        }
    }

    /// Generated configuration (empty while unconfigured)
    pub fn get_numbering_config(&self) -> &[NumberingDefinition] {
        &self.definitions
    }

    /// Snapshot of every resolvable reference
    pub fn reference_map(&self) -> NumberingReferenceMap {
        NumberingReferenceMap {
            instances: self
                .concrete
                .iter()
                .map(|c| ((c.reference.clone(), c.instance), c.num_id))
                .collect(),
            reused: self.reused.clone(),
        }
    }
}

/// Synthesize levels `0..=max(config.level, MIN_GENERATED_DEPTH)`
fn generate_levels(config: &ListConfig) -> Vec<Level> {
    let depth = config.level.max(MIN_GENERATED_DEPTH).min(MAX_LEVEL);
    let start_number = config.start_number.unwrap_or(1);

    (0..=depth)
        .map(|i| {
            let indent = INDENT_STEP * (i32::from(i) + 1);
            match config.list_type {
                ListType::Numbered => Level::new(i)
                    .with_format(NumberFormat::Decimal)
                    .with_text(format!("%{}.", i + 1))
                    .with_justification("start")
                    .with_start(if i == 0 { start_number } else { 1 })
                    .with_indent(indent, HANGING_INDENT),
                ListType::Bullet => Level::new(i)
                    .with_format(NumberFormat::Bullet)
                    .with_text(BULLET_GLYPHS[usize::from(i) % BULLET_GLYPHS.len()])
                    .with_justification("left")
                    .with_indent(indent, HANGING_INDENT),
            }
        })
        .collect()
}

/// Placeholder written into `w:numId` while rendering, rewritten once the
/// concrete instances exist
pub fn numbering_token(reference: &str, instance: u32) -> String {
    format!("{{{}-{}}}", reference, instance)
}

/// Read-only map from numbering references to resolved numbering ids
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NumberingReferenceMap {
    instances: BTreeMap<(String, u32), u32>,
    reused: BTreeMap<String, u32>,
}

impl NumberingReferenceMap {
    /// Numbering id for `(reference, instance)`
    pub fn resolve(&self, reference: &str, instance: u32) -> Option<u32> {
        self.instances
            .get(&(reference.to_string(), instance))
            .or_else(|| self.reused.get(reference))
            .copied()
    }

    /// Whether nothing can be resolved
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty() && self.reused.is_empty()
    }

    /// Replace every numbering token in `w:numId` values below `root` with
    /// its numbering id. Returns whether anything changed.
    pub fn replace_tokens(&self, root: &mut RawXmlElement) -> bool {
        if self.is_empty() {
            return false;
        }

        let mut changed = false;
        root.visit_mut(&mut |elem| {
            if elem.name != "w:numId" {
                return;
            }
            let Some(num_id) = elem.attr("w:val").and_then(|v| self.resolve_token(v)) else {
                return;
            };
            changed |= elem.set_attr("w:val", &num_id.to_string());
        });
        changed
    }

    /// Numbering id for a `{reference-instance}` token
    fn resolve_token(&self, token: &str) -> Option<u32> {
        let inner = token.strip_prefix('{')?.strip_suffix('}')?;
        let (reference, instance) = inner.rsplit_once('-')?;
        self.resolve(reference, instance.parse().ok()?)
    }
}
