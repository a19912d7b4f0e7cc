use std::collections::HashMap;
use super::{VarId, VarSet};

/// Accumulated gradients, one vector per variable.
///
/// Only variables added to the gradient receive gradients; sequences consult
/// [`Gradient::intersects`] to skip work for everything else.
#[derive(Debug, Clone, Default)]
pub struct Gradient<V> {
    values: HashMap<VarId, V>,
}

impl<V> Gradient<V> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Starts accumulating for `id` from `zero`, replacing any previous value
    pub fn insert(&mut self, id: VarId, zero: V) -> Option<V> {
        self.values.insert(id, zero)
    }

    pub fn get(&self, id: &VarId) -> Option<&V> {
        self.values.get(id)
    }

    pub fn get_mut(&mut self, id: &VarId) -> Option<&mut V> {
        self.values.get_mut(id)
    }

    pub fn contains(&self, id: &VarId) -> bool {
        self.values.contains_key(id)
    }

    /// The variables being accumulated
    pub fn vars(&self) -> VarSet {
        self.values.keys().copied().collect()
    }

    /// Whether any variable of `vars` is being accumulated
    pub fn intersects(&self, vars: &VarSet) -> bool {
        vars.iter().any(|id| self.values.contains_key(id))
    }
}
