use std::collections::BTreeSet;
use uuid::Uuid;

/// Identity of a learnable variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(Uuid);

impl VarId {
    /// Creates a fresh, globally unique variable identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VarId {
    fn default() -> Self {
        Self::new()
    }
}

/// The set of variables a sequence's outputs depend on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarSet {
    vars: BTreeSet<VarId>,
}

impl VarSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: VarId) -> bool {
        self.vars.insert(id)
    }

    pub fn contains(&self, id: &VarId) -> bool {
        self.vars.contains(id)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VarId> {
        self.vars.iter()
    }

    /// Whether the two sets share a variable
    pub fn intersects(&self, other: &VarSet) -> bool {
        let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
        small.iter().any(|id| large.contains(id))
    }

    /// Union of the two sets
    pub fn merge(&self, other: &VarSet) -> VarSet {
        VarSet {
            vars: self.vars.union(&other.vars).copied().collect(),
        }
    }
}

impl FromIterator<VarId> for VarSet {
    fn from_iter<I: IntoIterator<Item = VarId>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}
