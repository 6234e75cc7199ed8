use crate::error::{WfResult, WindForgeError};
use serde::{Deserialize, Serialize};

/// A candidate turbine placement: one bit per grid cell, `1` = turbine.
///
/// Index `i` refers to the `i`-th cell of the [`Grid`](crate::site::Grid)
/// the run was built on. Bits are stored as `u8` restricted to `{0, 1}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genome {
    bits: Vec<u8>,
}

impl Genome {
    pub fn zeros(len: usize) -> Self {
        Self { bits: vec![0; len] }
    }

    pub fn ones(len: usize) -> Self {
        Self { bits: vec![1; len] }
    }

    pub fn from_bits(bits: Vec<u8>) -> WfResult<Self> {
        if let Some(pos) = bits.iter().position(|&b| b > 1) {
            return Err(WindForgeError::Validation(format!(
                "genome bit {} has value {}, expected 0 or 1",
                pos, bits[pos]
            )));
        }
        Ok(Self { bits })
    }

    pub fn from_indices(len: usize, occupied: &[usize]) -> WfResult<Self> {
        let mut genome = Self::zeros(len);
        for &i in occupied {
            if i >= len {
                return Err(WindForgeError::Validation(format!(
                    "cell index {} out of range for genome of length {}",
                    i, len
                )));
            }
            genome.bits[i] = 1;
        }
        Ok(genome)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        self.bits[i] == 1
    }

    #[inline]
    pub fn set(&mut self, i: usize, on: bool) {
        self.bits[i] = on as u8;
    }

    #[inline]
    pub fn flip(&mut self, i: usize) {
        self.bits[i] ^= 1;
    }

    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b == 1).count()
    }

    /// Indices of the occupied cells, ascending.
    pub fn occupied(&self) -> Vec<usize> {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &b)| b == 1)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn vacant(&self) -> Vec<usize> {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &b)| b == 0)
            .map(|(i, _)| i)
            .collect()
    }

    pub(crate) fn bits_mut(&mut self) -> &mut [u8] {
        &mut self.bits
    }
}
