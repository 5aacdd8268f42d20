//! Image chunking.
//!
//! The bootloader programs flash one page at a time, so the host slices the
//! image into page-sized chunks and marks the final one. Chunking is a pure
//! function of the image and the page size; iterating twice yields the same
//! sequence.

use crate::protocol::frame::MAX_PAYLOAD;

/// Page size of the device flash buffer, and the default chunk size.
pub const PAGE_SIZE: usize = MAX_PAYLOAD;

/// One page-sized slice of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Byte offset of this chunk within the image.
    pub offset: usize,
    /// The chunk's bytes; at most the page size.
    pub data: &'a [u8],
    /// True iff this chunk ends at the image length.
    pub is_last: bool,
}

/// Split `image` into `page_size` chunks, lazily.
///
/// Chunks partition the image exactly: offsets are contiguous and their
/// concatenation equals the image. An empty image yields no chunks.
///
/// # Panics
///
/// Panics if `page_size` is zero.
pub fn chunks(image: &[u8], page_size: usize) -> Chunks<'_> {
    assert!(page_size > 0, "page_size must be non-zero");
    Chunks {
        image,
        page_size,
        offset: 0,
    }
}

/// Iterator over the pages of an image. Created by [`chunks`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    image: &'a [u8],
    page_size: usize,
    offset: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        if self.offset >= self.image.len() {
            return None;
        }

        let end = usize::min(self.offset + self.page_size, self.image.len());
        let chunk = Chunk {
            offset: self.offset,
            data: &self.image[self.offset..end],
            is_last: end == self.image.len(),
        };
        self.offset = end;

        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.image.len() - self.offset.min(self.image.len()))
            .div_ceil(self.page_size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chunks<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_image_yields_no_chunks() {
        assert_eq!(chunks(&[], PAGE_SIZE).count(), 0);
    }

    #[test]
    fn test_chunk_count_is_ceiling_of_length() {
        for (len, expected) in [(1, 1), (511, 1), (512, 1), (513, 2), (1024, 2), (1200, 3)] {
            let image = vec![0u8; len];
            assert_eq!(
                chunks(&image, PAGE_SIZE).count(),
                expected,
                "wrong chunk count for {len}-byte image"
            );
        }
    }

    #[test]
    fn test_chunks_partition_the_image_exactly() {
        // Safe cast: value is masked to one byte
        #[allow(clippy::cast_possible_truncation)]
        let image: Vec<u8> = (0..1200).map(|i| (i % 256) as u8).collect();

        let mut reassembled = Vec::new();
        let mut expected_offset = 0;
        for chunk in chunks(&image, PAGE_SIZE) {
            assert_eq!(chunk.offset, expected_offset);
            assert!(chunk.data.len() <= PAGE_SIZE);
            reassembled.extend_from_slice(chunk.data);
            expected_offset += chunk.data.len();
        }

        assert_eq!(reassembled, image);
    }

    #[test]
    fn test_is_last_set_on_exactly_the_final_chunk() {
        let image = vec![0u8; 1200];
        let flags: Vec<bool> = chunks(&image, PAGE_SIZE).map(|c| c.is_last).collect();
        assert_eq!(flags, vec![false, false, true]);
    }

    #[test]
    fn test_exact_multiple_of_page_size() {
        let image = vec![0u8; 2 * PAGE_SIZE];
        let sizes: Vec<usize> = chunks(&image, PAGE_SIZE).map(|c| c.data.len()).collect();
        assert_eq!(sizes, vec![PAGE_SIZE, PAGE_SIZE]);
        assert!(chunks(&image, PAGE_SIZE).last().unwrap().is_last);
    }

    #[test]
    fn test_iteration_is_restartable() {
        let image: Vec<u8> = (0u8..=255).collect();
        let first: Vec<_> = chunks(&image, 100).collect();
        let second: Vec<_> = chunks(&image, 100).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_size_hint_matches_count() {
        let image = vec![0u8; 1200];
        let iter = chunks(&image, PAGE_SIZE);
        assert_eq!(iter.len(), 3);
    }
}
