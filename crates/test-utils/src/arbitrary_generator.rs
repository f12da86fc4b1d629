use std::collections::HashSet;

use arbitrary::{Arbitrary, Unstructured};
use rand_core::{OsRng, RngCore};
use tapstake_primitives::Utxo;

/// Entropy drawn per generated value. Large enough for a UTXO with a parent tx.
const ENTROPY_PER_VALUE: usize = 4_096;

/// Draws [`Arbitrary`] values from fresh OS entropy.
#[derive(Debug)]
pub struct ArbitraryGenerator {
    entropy: Vec<u8>,
}

impl Default for ArbitraryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ArbitraryGenerator {
    pub fn new() -> Self {
        Self {
            entropy: vec![0; ENTROPY_PER_VALUE],
        }
    }

    /// One value of type `T`.
    ///
    /// # Panics
    ///
    /// If `T` rejects several fresh entropy buffers in a row.
    pub fn generate<T>(&mut self) -> T
    where
        T: for<'a> Arbitrary<'a>,
    {
        let mut rejected = 0;
        loop {
            OsRng.fill_bytes(&mut self.entropy);
            match T::arbitrary(&mut Unstructured::new(&self.entropy)) {
                Ok(value) => return value,
                Err(err) if rejected >= 8 => panic!("arbitrary generation keeps failing: {err}"),
                Err(_) => rejected += 1,
            }
        }
    }

    /// `n` random UTXOs with pairwise distinct outpoints.
    pub fn utxo_set(&mut self, n: usize) -> Vec<Utxo> {
        let mut seen = HashSet::with_capacity(n);
        let mut utxos = Vec::with_capacity(n);
        while utxos.len() < n {
            let utxo: Utxo = self.generate();
            if seen.insert(utxo.outpoint) {
                utxos.push(utxo);
            }
        }
        utxos
    }
}
