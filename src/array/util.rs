use arrow_buffer::OffsetBuffer;

/// Helpers for reading Arrow offset buffers as parent/child ranges.
pub(crate) trait OffsetBufferUtils {
    /// Returns the length an array with these offsets would be.
    fn len_proxy(&self) -> usize;

    /// Returns a range (start, end) corresponding to the parent at position `index`.
    fn start_end(&self, index: usize) -> (usize, usize);

    /// Returns the last offset.
    fn last_offset(&self) -> usize;
}

impl OffsetBufferUtils for OffsetBuffer<i32> {
    #[inline]
    fn len_proxy(&self) -> usize {
        self.len() - 1
    }

    #[inline]
    fn start_end(&self, index: usize) -> (usize, usize) {
        assert!(index < self.len_proxy());
        let start = self[index] as usize;
        let end = self[index + 1] as usize;
        (start, end)
    }

    #[inline]
    fn last_offset(&self) -> usize {
        *self.last().unwrap() as usize
    }
}
