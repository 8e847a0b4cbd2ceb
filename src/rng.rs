//! Randomness for shuffling, sampling and dealing.
//!
//! Every random decision made during a script run goes through a
//! [`ScriptRng`]. Production callers use [`ScriptRng::from_entropy`]; tests
//! seed it with [`ScriptRng::new`] so runs are reproducible.
//!
//! ```
//! use dealscript::ScriptRng;
//!
//! let mut a = ScriptRng::new(7);
//! let mut b = ScriptRng::new(7);
//!
//! let mut left = vec![1, 2, 3, 4, 5];
//! let mut right = left.clone();
//! a.shuffle(&mut left);
//! b.shuffle(&mut right);
//! assert_eq!(left, right);
//! ```

use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Cryptographically strong, seedable generator owned by one script run.
#[derive(Clone, Debug)]
pub struct ScriptRng {
    inner: ChaCha20Rng,
}

impl ScriptRng {
    /// Create a deterministic generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Create a generator seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha20Rng::from_entropy(),
        }
    }

    /// Uniformly shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }

    /// Pick `amount` distinct positions out of `0..len`, in random order.
    ///
    /// Callers must ensure `amount <= len`.
    pub fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        debug_assert!(amount <= len);
        index::sample(&mut self.inner, len, amount.min(len)).into_vec()
    }

    /// Pick one position out of `0..len` uniformly. Returns `None` when `len` is zero.
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.inner.gen_range(0..len))
        }
    }

    /// Clone out `amount` distinct elements of `items` in random order.
    pub fn sample<T: Clone>(&mut self, items: &[T], amount: usize) -> Vec<T> {
        self.sample_indices(items.len(), amount.min(items.len()))
            .into_iter()
            .map(|i| items[i].clone())
            .collect()
    }
}
