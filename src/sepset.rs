use parking_lot::Mutex;

use crate::types::VarId;

/// p×p store of the witness sets that justified edge deletions. Each
/// unordered pair is written at most once: the first worker to reject the
/// edge installs its conditioning set into both orientations, later writers
/// keep theirs to themselves.
#[derive(Debug)]
pub struct SeparationSets {
    dim: usize,
    slots: Box<[Mutex<Option<Box<[VarId]>>>]>,
}

impl SeparationSets {
    pub fn new(dim: usize) -> Self {
        let slots = (0..dim * dim).map(|_| Mutex::new(None)).collect();
        Self { dim, slots }
    }

    #[inline]
    fn slot(&self, i: VarId, j: VarId) -> &Mutex<Option<Box<[VarId]>>> {
        &self.slots[i.index() * self.dim + j.index()]
    }

    /// Installs `witness` for `{x, y}` unless a witness is already present.
    /// All writers lock the lower-index orientation first, so the two mirror
    /// slots can never disagree. Returns whether this call won the install.
    pub fn set_if_empty(&self, x: VarId, y: VarId, witness: &[VarId]) -> bool {
        let (lo, hi) = if x < y { (x, y) } else { (y, x) };
        let mut primary = self.slot(lo, hi).lock();
        if primary.is_some() {
            return false;
        }
        *primary = Some(witness.into());
        *self.slot(hi, lo).lock() = Some(witness.into());
        true
    }

    pub fn get(&self, x: VarId, y: VarId) -> Option<Vec<VarId>> {
        self.slot(x, y).lock().as_ref().map(|set| set.to_vec())
    }

    /// Number of unordered pairs holding a witness.
    pub fn witness_count(&self) -> usize {
        let mut count = 0;
        for i in 0..self.dim {
            for j in (i + 1)..self.dim {
                if self.slots[i * self.dim + j].lock().is_some() {
                    count += 1;
                }
            }
        }
        count
    }

    /// All recorded witnesses as `(i, j, set)` with `i < j`, ascending.
    pub fn witnesses(&self) -> Vec<(VarId, VarId, Vec<VarId>)> {
        let mut out = Vec::new();
        for i in 0..self.dim {
            for j in (i + 1)..self.dim {
                if let Some(set) = self.slots[i * self.dim + j].lock().as_ref() {
                    out.push((VarId(i as u32), VarId(j as u32), set.to_vec()));
                }
            }
        }
        out
    }
}
