//! Admission policy: forbidden attribute combinations.

use shelf_db::criteria::{matches, Criteria, Fields};

/// A rule that flags entities it applies to.
pub trait Predicate<E>: Send + Sync {
    /// Short label used in logs when the rule fires.
    fn name(&self) -> &str;

    fn matches(&self, entity: &E) -> bool;
}

/// Forbids any entity matching all of the given criteria at once.
#[derive(Debug, Clone)]
pub struct ForbiddenCombination<F: Ord> {
    name: String,
    criteria: Criteria<F>,
}

impl<F: Ord + Copy> ForbiddenCombination<F> {
    pub fn new(name: impl Into<String>, criteria: Criteria<F>) -> Self {
        Self {
            name: name.into(),
            criteria,
        }
    }
}

impl<E: Fields> Predicate<E> for ForbiddenCombination<E::Field> {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, entity: &E) -> bool {
        matches(entity, &self.criteria)
    }
}

/// Ordered list of forbidding predicates. An entity is allowed unless some
/// predicate matches it.
pub struct PolicyEngine<E> {
    rules: Vec<Box<dyn Predicate<E>>>,
}

impl<E> PolicyEngine<E> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: impl Predicate<E> + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// The first rule that forbids `entity`, if any.
    pub fn violation(&self, entity: &E) -> Option<&dyn Predicate<E>> {
        self.rules
            .iter()
            .find(|rule| rule.matches(entity))
            .map(|rule| rule.as_ref())
    }

    pub fn is_allowed(&self, entity: &E) -> bool {
        self.violation(entity).is_none()
    }
}

impl<E> Default for PolicyEngine<E> {
    fn default() -> Self {
        Self::new()
    }
}
