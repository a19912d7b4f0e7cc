use super::Batch;
use crate::backend::{Creator, Vector};
use crate::error::{Result, SeqError};

/// Joins per-input batches into one wider batch.
///
/// Presence flags are concatenated in input order. Filler batches contribute
/// lanes but no packed data.
pub fn join<C>(creator: &C, batches: &[Batch<C::Vector>]) -> Result<Batch<C::Vector>>
where
    C: Creator,
{
    let mut present = Vec::with_capacity(batches.iter().map(Batch::lanes).sum());
    let mut packed = vec![];
    for batch in batches {
        present.extend_from_slice(&batch.present);
        if batch.num_present() != 0 {
            if let Some(vec) = &batch.packed {
                packed.push(vec.clone());
            }
        }
    }
    let packed = if packed.is_empty() {
        None
    } else {
        Some(creator.concat(&packed)?)
    };
    Ok(Batch { present, packed })
}

/// Splits a joined batch back into the batches of its former inputs.
///
/// `lane_counts[i]` is the number of lanes input `i` contributed. Inputs with
/// no present lane in `batch` get `None`.
pub fn split<V>(batch: &Batch<V>, lane_counts: &[usize]) -> Result<Vec<Option<Batch<V>>>>
where
    V: Vector,
{
    let total: usize = lane_counts.iter().sum();
    if total != batch.lanes() {
        return Err(SeqError::LaneMismatch {
            expected: total,
            actual: batch.lanes(),
        });
    }

    let num_present = batch.num_present();
    let width = match (&batch.packed, num_present) {
        (Some(packed), n) if n > 0 => packed.len() / n,
        _ => 0,
    };

    let mut res = Vec::with_capacity(lane_counts.len());
    let mut lane_offset = 0;
    let mut vec_offset = 0;
    for &lanes in lane_counts {
        let present = batch.present[lane_offset..lane_offset + lanes].to_vec();
        lane_offset += lanes;

        let sub_present = present.iter().filter(|p| **p).count();
        if sub_present == 0 {
            res.push(None);
            continue;
        }
        let packed = match &batch.packed {
            Some(packed) => packed.slice(vec_offset * width, (vec_offset + sub_present) * width)?,
            None => return Err(SeqError::backend("present lanes without packed data")),
        };
        vec_offset += sub_present;
        res.push(Some(Batch::new(present, packed)));
    }
    Ok(res)
}

/// Creates a placeholder batch signifying that a sequence has ended.
pub fn filler<V>(lanes: usize) -> Batch<V> {
    Batch {
        present: vec![false; lanes],
        packed: None,
    }
}
