//! Batch submitter
//!
//! Splits a plan into consecutive batches of at most `batch_size` mutations,
//! in plan order. Batch boundaries only respect the provider's
//! mutations-per-call limit; they carry no other meaning.

use crate::error::{Error, Result};
use crate::model::MutationAction;

/// Splits mutation plans into provider-sized batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSubmitter {
    batch_size: usize,
}

impl BatchSubmitter {
    /// Create a submitter
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if `batch_size` is zero.
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::config("Batch size must be > 0"));
        }
        Ok(Self { batch_size })
    }

    /// Maximum mutations per batch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches a plan of `len` mutations splits into
    pub fn batch_count(&self, len: usize) -> usize {
        len.div_ceil(self.batch_size)
    }

    /// Iterate the batches of a plan in order
    pub fn batches<'a>(
        &self,
        plan: &'a [MutationAction],
    ) -> impl ExactSizeIterator<Item = &'a [MutationAction]> + 'a {
        plan.chunks(self.batch_size)
    }

    /// Call `apply` once per batch, in order, collecting each result
    ///
    /// Every batch is offered to `apply` regardless of earlier failures;
    /// callers that must stop at the first failure iterate
    /// [`batches`](Self::batches) themselves. An empty plan makes no calls.
    pub fn submit<T, E, F>(&self, plan: &[MutationAction], mut apply: F) -> Vec<std::result::Result<T, E>>
    where
        F: FnMut(&[MutationAction]) -> std::result::Result<T, E>,
    {
        self.batches(plan).map(|batch| apply(batch)).collect()
    }
}
