//! Contains the declaration of [`OffsetsBuilder`].

use arrow_buffer::OffsetBuffer;

use crate::error::{GeoFeatherError, Result};

/// A wrapper type of `Vec<i32>` representing the invariants of Arrow's offsets:
///
/// * always contains at least one element, the zero
/// * every element is `>= 0`
/// * element at position `i` is >= than element at position `i - 1`
///
/// `offsets[i + 1] - offsets[i]` is the number of child elements belonging to parent `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetsBuilder(Vec<i32>);

impl Default for OffsetsBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl OffsetsBuilder {
    /// Returns an empty [`OffsetsBuilder`] (i.e. with a single element, the zero).
    #[inline]
    pub fn new() -> Self {
        Self(vec![0])
    }

    /// Returns an [`OffsetsBuilder`] with capacity for `capacity` parent elements,
    /// allocating at least `capacity + 1` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut offsets = Vec::with_capacity(capacity + 1);
        offsets.push(0);
        Self(offsets)
    }

    /// Reserves `additional` entries.
    pub fn reserve(&mut self, additional: usize) {
        self.0.reserve(additional);
    }

    /// Reserves exactly `additional` entries.
    pub fn reserve_exact(&mut self, additional: usize) {
        self.0.reserve_exact(additional);
    }

    /// Pushes a new parent element with a given child length.
    ///
    /// # Errors
    ///
    /// This function errors iff the new last offset overflows `i32`.
    #[inline]
    pub fn try_push_usize(&mut self, length: usize) -> Result<()> {
        let length = i32::try_from(length).map_err(|_| GeoFeatherError::Overflow)?;
        let new_length = self
            .last()
            .checked_add(length)
            .ok_or(GeoFeatherError::Overflow)?;
        self.0.push(new_length);
        Ok(())
    }

    /// Extends itself with `additional` elements equal to the last offset.
    /// This is useful to extend offsets with empty values, e.g. for null slots.
    #[inline]
    pub fn extend_constant(&mut self, additional: usize) {
        let offset = self.last();
        if additional == 1 {
            self.0.push(offset)
        } else {
            self.0.resize(self.0.len() + additional, offset)
        }
    }

    /// Try to create a new [`OffsetsBuilder`] from a sequence of child lengths.
    ///
    /// # Errors
    ///
    /// This function errors iff the cumulative sum overflows `i32`.
    pub fn try_from_lengths<I: Iterator<Item = usize>>(lengths: I) -> Result<Self> {
        let mut offsets = Self::with_capacity(lengths.size_hint().0);
        for length in lengths {
            offsets.try_push_usize(length)?;
        }
        Ok(offsets)
    }

    /// Returns the last offset.
    #[inline]
    pub fn last(&self) -> i32 {
        // The buffer is never empty; it always starts with a zero.
        *self.0.last().unwrap()
    }

    /// Returns a range (start, end) corresponding to the parent at position `index`.
    ///
    /// # Panics
    ///
    /// This function panics iff `index >= self.len_proxy()`.
    #[inline]
    pub fn start_end(&self, index: usize) -> (usize, usize) {
        assert!(index < self.len_proxy());
        (self.0[index] as usize, self.0[index + 1] as usize)
    }

    /// Returns the length an array with these offsets would be.
    #[inline]
    pub fn len_proxy(&self) -> usize {
        self.0.len() - 1
    }

    /// Returns the number of offsets in this container.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len_proxy() == 0
    }

    /// Returns the offsets as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[i32] {
        self.0.as_slice()
    }

    pub fn finish(self) -> OffsetBuffer<i32> {
        self.into()
    }
}

impl From<OffsetsBuilder> for OffsetBuffer<i32> {
    fn from(value: OffsetsBuilder) -> Self {
        OffsetBuffer::new(value.0.into())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn push_lengths() {
        let mut offsets = OffsetsBuilder::new();
        offsets.try_push_usize(2).unwrap();
        offsets.try_push_usize(3).unwrap();
        assert_eq!(offsets.as_slice(), &[0, 2, 5]);
        assert_eq!(offsets.len_proxy(), 2);
        assert_eq!(offsets.start_end(1), (2, 5));
    }

    #[test]
    fn extend_constant_for_nulls() {
        let mut offsets = OffsetsBuilder::new();
        offsets.try_push_usize(2).unwrap();
        offsets.extend_constant(2);
        assert_eq!(offsets.as_slice(), &[0, 2, 2, 2]);
    }

    #[test]
    fn from_lengths() {
        let offsets = OffsetsBuilder::try_from_lengths([1, 0, 4].into_iter()).unwrap();
        assert_eq!(offsets.as_slice(), &[0, 1, 1, 5]);
    }

    #[test]
    fn monotonically_non_decreasing() {
        let offsets = OffsetsBuilder::try_from_lengths([3, 0, 2, 0].into_iter()).unwrap();
        let slice = offsets.as_slice();
        assert_eq!(slice[0], 0);
        assert!(slice.windows(2).all(|w| w[0] <= w[1]));
    }
}
