use std::sync::Arc;
use tokio::sync::watch;
use crate::autodiff::VarSet;
use crate::error::{Result, SeqError};

/// Per-input bookkeeping of a pack, known once its forward pass completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackLayout {
    lanes_per_seq: Vec<usize>,
    lens: Vec<usize>,
    vars: VarSet,
}

impl PackLayout {
    pub(crate) fn new(lanes_per_seq: Vec<usize>, lens: Vec<usize>, vars: VarSet) -> Self {
        Self { lanes_per_seq, lens, vars }
    }

    /// Lane count of each input's last real batch
    pub fn lanes_per_seq(&self) -> &[usize] {
        &self.lanes_per_seq
    }

    /// Number of real steps of each input
    pub fn lens(&self) -> &[usize] {
        &self.lens
    }

    /// Union of the inputs' variables
    pub fn vars(&self) -> &VarSet {
        &self.vars
    }

    /// Number of steps the pack emitted
    pub fn steps(&self) -> usize {
        self.lens.iter().copied().max().unwrap_or(0)
    }
}

/// Lifecycle of a pack's forward pass.
#[derive(Debug, Clone)]
pub(crate) enum PackState {
    Pending,
    Finalized(Arc<PackLayout>),
    Failed(SeqError),
}

impl PackState {
    fn resolve(&self) -> Option<Result<Arc<PackLayout>>> {
        match self {
            PackState::Pending => None,
            PackState::Finalized(layout) => Some(Ok(layout.clone())),
            PackState::Failed(e) => Some(Err(e.clone())),
        }
    }
}

/// Read side of the lifecycle, held by the pack.
pub(crate) struct Lifecycle {
    state: watch::Receiver<PackState>,
}

impl Lifecycle {
    /// Creates a pending lifecycle and the sender the forward task finalizes it with.
    pub fn new() -> (watch::Sender<PackState>, Self) {
        let (tx, state) = watch::channel(PackState::Pending);
        (tx, Self { state })
    }

    /// The layout if the forward pass already finished, without waiting.
    pub fn now(&self) -> Result<Arc<PackLayout>> {
        self.state.borrow().resolve().unwrap_or(Err(SeqError::NotFinalized))
    }

    /// Waits for the forward pass to finish.
    pub async fn wait(&self) -> Result<Arc<PackLayout>> {
        let mut state = self.state.clone();
        let resolved = state
            .wait_for(|s| !matches!(s, PackState::Pending))
            .await
            .map(|s| s.resolve());
        match resolved {
            Ok(Some(res)) => res,
            _ => Err(SeqError::worker("pack forward task exited before finalizing")),
        }
    }
}
