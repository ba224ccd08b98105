/// Chunk size used when the caller does not override it, matching the server's
/// reassembly expectations.
pub const DEFAULT_CHUNK_SIZE: u64 = 50_000_000;

/// Byte range `[start, end)` of one chunk within a file of `total` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl ChunkRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Header value the server uses to place the chunk. The end offset is
    /// exclusive, not the RFC 7233 inclusive form; the server reassembles
    /// from exactly this shape.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// Plans the chunk ranges for a file of `total` bytes: successive ranges of at
/// most `chunk_size` bytes exactly covering `[0, total)`. An empty file yields
/// no ranges.
pub fn chunk_ranges(total: u64, chunk_size: u64) -> Vec<ChunkRange> {
    assert!(chunk_size > 0, "chunk size must be positive");
    let mut ranges = Vec::new();
    let mut start = 0;
    while start < total {
        let end = total.min(start + chunk_size);
        ranges.push(ChunkRange { start, end, total });
        start = end;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_cover_file_exactly() {
        let ranges = chunk_ranges(6_000_000, 2_000_000);
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].start, 0);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(ranges.last().unwrap().end, 6_000_000);
    }

    #[test]
    fn uneven_tail_chunk_is_short() {
        let ranges = chunk_ranges(5, 2);
        assert_eq!(
            ranges,
            vec![
                ChunkRange { start: 0, end: 2, total: 5 },
                ChunkRange { start: 2, end: 4, total: 5 },
                ChunkRange { start: 4, end: 5, total: 5 },
            ]
        );
        assert_eq!(ranges[2].len(), 1);
    }

    #[test]
    fn empty_file_yields_no_ranges() {
        assert!(chunk_ranges(0, DEFAULT_CHUNK_SIZE).is_empty());
    }

    #[test]
    fn single_chunk_when_file_fits() {
        let ranges = chunk_ranges(10, 50);
        assert_eq!(ranges, vec![ChunkRange { start: 0, end: 10, total: 10 }]);
    }

    #[test]
    fn content_range_header_shape() {
        let range = ChunkRange {
            start: 2_000_000,
            end: 4_000_000,
            total: 6_000_000,
        };
        assert_eq!(range.content_range(), "bytes 2000000-4000000/6000000");
    }
}
