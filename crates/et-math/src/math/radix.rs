//! Mixed-radix packing between flat observation ids and coordinate tuples.
//!
//! A cube with dimension sizes `[s_0, .., s_{n-1}]` is laid out row-major:
//! the last dimension varies fastest, so
//! `id = Σ i_k * Π(sizes[k+1..])`. All functions here are pure and can be
//! applied independently to every id of a cube.

use thiserror::Error;

/// Errors raised by the coordinate codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("observation id {id} outside [0, {cardinality})")]
    IdOutOfRange { id: u64, cardinality: u64 },

    #[error("coordinate {coordinate} outside dimension {axis} of size {size}")]
    CoordinateOutOfRange {
        axis: usize,
        coordinate: usize,
        size: usize,
    },

    #[error("coordinate tuple has {actual} entries, shape has {expected}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("shape {sizes:?} overflows a 64-bit observation space")]
    Overflow { sizes: Vec<usize> },
}

/// Product of all dimension sizes, i.e. the number of addressable cells.
///
/// An empty shape addresses exactly one cell (the scalar cube).
pub fn cardinality(sizes: &[usize]) -> Result<u64, CodecError> {
    sizes.iter().try_fold(1u64, |acc, &size| {
        acc.checked_mul(size as u64).ok_or_else(|| CodecError::Overflow {
            sizes: sizes.to_vec(),
        })
    })
}

/// Suffix products of `sizes`: `strides[k] = Π(sizes[k+1..])`.
pub fn strides(sizes: &[usize]) -> Result<Vec<u64>, CodecError> {
    let mut out = vec![1u64; sizes.len()];
    let mut acc = 1u64;
    for k in (0..sizes.len()).rev() {
        out[k] = acc;
        acc = acc
            .checked_mul(sizes[k] as u64)
            .ok_or_else(|| CodecError::Overflow {
                sizes: sizes.to_vec(),
            })?;
    }
    Ok(out)
}

/// Decode a flat id into one coordinate per dimension.
pub fn decode(id: u64, sizes: &[usize]) -> Result<Vec<usize>, CodecError> {
    RadixCodec::new(sizes)?.decode(id)
}

/// Encode a coordinate tuple into its flat id.
pub fn encode(coords: &[usize], sizes: &[usize]) -> Result<u64, CodecError> {
    RadixCodec::new(sizes)?.encode(coords)
}

/// Codec bound to one shape, with the cardinality computed once.
///
/// Building a table decodes every present id of a document against the same
/// shape, so the overflow check and range bound are hoisted here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RadixCodec {
    sizes: Vec<usize>,
    cardinality: u64,
}

impl RadixCodec {
    pub fn new(sizes: &[usize]) -> Result<Self, CodecError> {
        Ok(Self {
            sizes: sizes.to_vec(),
            cardinality: cardinality(sizes)?,
        })
    }

    pub fn cardinality(&self) -> u64 {
        self.cardinality
    }

    /// Decode `id`, walking from the last dimension to the first.
    pub fn decode(&self, id: u64) -> Result<Vec<usize>, CodecError> {
        let mut coords = vec![0usize; self.sizes.len()];
        self.decode_into(id, &mut coords)?;
        Ok(coords)
    }

    /// Decode into a caller-provided buffer with one slot per dimension.
    pub fn decode_into(&self, id: u64, coords: &mut [usize]) -> Result<(), CodecError> {
        if id >= self.cardinality {
            return Err(CodecError::IdOutOfRange {
                id,
                cardinality: self.cardinality,
            });
        }
        if coords.len() != self.sizes.len() {
            return Err(CodecError::ArityMismatch {
                expected: self.sizes.len(),
                actual: coords.len(),
            });
        }
        let mut rest = id;
        for (slot, &size) in coords.iter_mut().zip(&self.sizes).rev() {
            // size > 0 here: a zero-sized axis makes the cardinality 0 and
            // every id is rejected above.
            let size = size as u64;
            *slot = (rest % size) as usize;
            rest /= size;
        }
        Ok(())
    }

    /// Weighted sum of `coords` using suffix products of the shape.
    pub fn encode(&self, coords: &[usize]) -> Result<u64, CodecError> {
        if coords.len() != self.sizes.len() {
            return Err(CodecError::ArityMismatch {
                expected: self.sizes.len(),
                actual: coords.len(),
            });
        }
        let mut id = 0u64;
        for (axis, (&coordinate, &size)) in coords.iter().zip(&self.sizes).enumerate() {
            if coordinate >= size {
                return Err(CodecError::CoordinateOutOfRange {
                    axis,
                    coordinate,
                    size,
                });
            }
            // Cannot overflow: id < cardinality, which fit in u64.
            id = id * size as u64 + coordinate as u64;
        }
        Ok(id)
    }
}
