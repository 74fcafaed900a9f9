//! A per-job bump arena.
//!
//! One typesetting job owns one [`Arena`]. Allocations are bump-pointer
//! from the current chunk, falling back to a size-binned free list before a
//! new chunk is requested. Chunks grow geometrically from 4 KiB up to a
//! configurable cap (64 KiB by default). Freeing individual blocks is
//! optional; the normal lifecycle is "allocate all job state, then
//! [`Arena::reset`] or drop".
//!
//! Blocks are addressed by [`Handle`], a (chunk, offset, length) triple, so
//! the whole API is safe: the arena hands out `&[u8]`/`&mut [u8]` views on
//! demand instead of raw pointers.

use std::fmt::Write as _;

/// Hard ceiling on a single request and on any chunk, 1 GiB.
const MAX_REQUEST: usize = 1 << 30;

/// Free-list bins cover power-of-two block sizes 8..=2048; the last bin
/// collects everything larger.
const BIN_COUNT: usize = 10;

const MIN_CHUNK: usize = 4 * 1024;
const DEFAULT_MAX_CHUNK: usize = 64 * 1024;

/// A block of arena memory: which chunk it lives in, where, and how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    chunk: u32,
    offset: u32,
    len: u32,
}

impl Handle {
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A handle known to contain valid UTF-8, produced by [`Arena::alloc_str`]
/// or [`Arena::alloc_fmt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrHandle(Handle);

impl StrHandle {
    pub fn handle(&self) -> Handle {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Error returned for over-large requests, bad alignments, and handles
/// passed back to the wrong arena state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaError {
    /// Request exceeds 1 GiB, or would push a chunk past 1 GiB.
    TooLarge { requested: usize },
    /// Alignment was not a power of two.
    BadAlign { align: usize },
}

impl std::fmt::Display for ArenaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArenaError::TooLarge { requested } => {
                write!(f, "arena request of {requested} bytes exceeds the 1 GiB limit")
            }
            ArenaError::BadAlign { align } => {
                write!(f, "arena alignment {align} is not a power of two")
            }
        }
    }
}

impl std::error::Error for ArenaError {}

#[derive(Debug)]
struct Chunk {
    data: Vec<u8>,
    used: usize,
}

impl Chunk {
    fn with_capacity(capacity: usize) -> Chunk {
        Chunk {
            data: vec![0; capacity],
            used: 0,
        }
    }
}

/// The arena itself. Not `Sync`: one arena belongs to one job on one thread.
#[derive(Debug)]
pub struct Arena {
    chunks: Vec<Chunk>,
    current: usize,
    max_chunk: usize,
    // bins[i] holds freed blocks of size in (2^(i+2), 2^(i+3)] for i <
    // BIN_COUNT-1; the final bin is open-ended.
    bins: [Vec<Handle>; BIN_COUNT],
    allocated: usize,
}

impl Default for Arena {
    fn default() -> Self {
        Arena::new()
    }
}

impl Arena {
    pub fn new() -> Arena {
        Arena::with_max_chunk(DEFAULT_MAX_CHUNK)
    }

    /// An arena whose chunks grow up to `max_chunk` bytes. Values below
    /// 4 KiB are raised to 4 KiB.
    pub fn with_max_chunk(max_chunk: usize) -> Arena {
        Arena {
            chunks: vec![Chunk::with_capacity(MIN_CHUNK)],
            current: 0,
            max_chunk: max_chunk.clamp(MIN_CHUNK, MAX_REQUEST),
            bins: Default::default(),
            allocated: 0,
        }
    }

    /// Total bytes handed out since the last reset.
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Allocates `n` bytes at the given alignment. The block's contents are
    /// unspecified (possibly recycled).
    pub fn alloc(&mut self, n: usize, align: usize) -> Result<Handle, ArenaError> {
        if !align.is_power_of_two() {
            return Err(ArenaError::BadAlign { align });
        }
        if n > MAX_REQUEST {
            return Err(ArenaError::TooLarge { requested: n });
        }
        if let Some(h) = self.take_from_bin(n, align) {
            self.allocated += n;
            return Ok(h);
        }
        let h = self.bump(n, align)?;
        self.allocated += n;
        Ok(h)
    }

    /// Allocates `n` zeroed bytes.
    pub fn alloc_zeroed(&mut self, n: usize, align: usize) -> Result<Handle, ArenaError> {
        let h = self.alloc(n, align)?;
        self.bytes_mut(h).fill(0);
        Ok(h)
    }

    /// Copies a string into the arena.
    pub fn alloc_str(&mut self, s: &str) -> Result<StrHandle, ArenaError> {
        let h = self.alloc(s.len(), 1)?;
        self.bytes_mut(h).copy_from_slice(s.as_bytes());
        Ok(StrHandle(h))
    }

    /// Copies a byte slice into the arena.
    pub fn alloc_bytes(&mut self, b: &[u8]) -> Result<Handle, ArenaError> {
        let h = self.alloc(b.len(), 1)?;
        self.bytes_mut(h).copy_from_slice(b);
        Ok(h)
    }

    /// Formats into the arena, like `sprintf` into arena storage.
    pub fn alloc_fmt(&mut self, args: std::fmt::Arguments<'_>) -> Result<StrHandle, ArenaError> {
        let mut s = String::new();
        // Writing to a String cannot fail.
        let _ = s.write_fmt(args);
        self.alloc_str(&s)
    }

    /// Grows or shrinks a block to `new_len`, preserving the common prefix.
    ///
    /// If the block is the most recent allocation at the tail of its chunk
    /// and the chunk has room, it grows in place; otherwise the contents
    /// are copied to a fresh block and the old one goes back to a bin.
    pub fn realloc(&mut self, h: Handle, new_len: usize, align: usize) -> Result<Handle, ArenaError> {
        if new_len > MAX_REQUEST {
            return Err(ArenaError::TooLarge { requested: new_len });
        }
        if new_len <= h.len() {
            return Ok(Handle {
                len: new_len as u32,
                ..h
            });
        }
        let chunk = &mut self.chunks[h.chunk as usize];
        let tail = h.offset as usize + h.len();
        if tail == chunk.used && h.offset as usize + new_len <= chunk.data.len() {
            chunk.used = h.offset as usize + new_len;
            self.allocated += new_len - h.len();
            return Ok(Handle {
                len: new_len as u32,
                ..h
            });
        }
        let saved = self.bytes(h).to_vec();
        let fresh = self.alloc(new_len, align)?;
        self.bytes_mut(fresh)[..saved.len()].copy_from_slice(&saved);
        self.free(h);
        Ok(fresh)
    }

    /// Returns a block to the free list for reuse. Never required; dropping
    /// the arena reclaims everything.
    pub fn free(&mut self, h: Handle) {
        if h.len() < 8 {
            return; // too small to track
        }
        self.bins[bin_for(h.len())].push(h);
    }

    /// Keeps every chunk but forgets all allocations.
    pub fn reset(&mut self) {
        for c in &mut self.chunks {
            c.used = 0;
        }
        for b in &mut self.bins {
            b.clear();
        }
        self.current = 0;
        self.allocated = 0;
    }

    /// Frees every chunk but the first and forgets all allocations.
    pub fn clear(&mut self) {
        self.chunks.truncate(1);
        self.reset();
    }

    /// Read access to a block.
    pub fn bytes(&self, h: Handle) -> &[u8] {
        let c = &self.chunks[h.chunk as usize];
        &c.data[h.offset as usize..h.offset as usize + h.len()]
    }

    /// Write access to a block.
    pub fn bytes_mut(&mut self, h: Handle) -> &mut [u8] {
        let c = &mut self.chunks[h.chunk as usize];
        &mut c.data[h.offset as usize..h.offset as usize + h.len()]
    }

    /// The string a [`StrHandle`] refers to.
    pub fn str(&self, h: StrHandle) -> &str {
        // StrHandles are only minted from &str input.
        std::str::from_utf8(self.bytes(h.0)).unwrap_or("")
    }

    fn take_from_bin(&mut self, n: usize, align: usize) -> Option<Handle> {
        if n < 8 {
            return None;
        }
        let bin = &mut self.bins[bin_for(n)];
        // Take the first block that fits both size and alignment; linear
        // scan is fine, bins stay short.
        let pos = bin
            .iter()
            .position(|h| h.len() >= n && (h.offset as usize) % align == 0)?;
        let found = bin.swap_remove(pos);
        Some(Handle {
            len: n as u32,
            ..found
        })
    }

    fn bump(&mut self, n: usize, align: usize) -> Result<Handle, ArenaError> {
        loop {
            let chunk = &mut self.chunks[self.current];
            let offset = round_up(chunk.used, align);
            if offset + n <= chunk.data.len() {
                chunk.used = offset + n;
                return Ok(Handle {
                    chunk: self.current as u32,
                    offset: offset as u32,
                    len: n as u32,
                });
            }
            if self.current + 1 < self.chunks.len() {
                self.current += 1;
                continue;
            }
            // Grow: double the last chunk size up to the cap, but always
            // enough for this request.
            let last = self.chunks[self.chunks.len() - 1].data.len();
            let mut size = (last * 2).min(self.max_chunk).max(MIN_CHUNK);
            if size < n + align {
                size = n + align;
            }
            if size > MAX_REQUEST {
                return Err(ArenaError::TooLarge { requested: n });
            }
            log::trace!("arena grows: new chunk of {size} bytes");
            self.chunks.push(Chunk::with_capacity(size));
            self.current = self.chunks.len() - 1;
        }
    }

}

fn round_up(v: usize, align: usize) -> usize {
    (v + align - 1) & !(align - 1)
}

fn bin_for(len: usize) -> usize {
    // len >= 8. Bin i covers (2^(i+2), 2^(i+3)]; sizes above 2048 land in
    // the last, open-ended bin.
    let b = (len.next_power_of_two().trailing_zeros() as usize).saturating_sub(3);
    b.min(BIN_COUNT - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_and_read_back() {
        let mut a = Arena::new();
        let h = a.alloc_bytes(b"hello").unwrap();
        assert_eq!(a.bytes(h), b"hello");
        let s = a.alloc_str("world").unwrap();
        assert_eq!(a.str(s), "world");
    }

    #[test]
    fn alignment_is_honored() {
        let mut a = Arena::new();
        a.alloc(3, 1).unwrap();
        let h = a.alloc(16, 8).unwrap();
        assert_eq!(h.offset as usize % 8, 0);
        assert!(matches!(
            a.alloc(8, 3),
            Err(ArenaError::BadAlign { align: 3 })
        ));
    }

    #[test]
    fn oversize_requests_fail() {
        let mut a = Arena::new();
        assert!(matches!(
            a.alloc((1 << 30) + 1, 1),
            Err(ArenaError::TooLarge { .. })
        ));
    }

    #[test]
    fn chunks_grow_geometrically() {
        let mut a = Arena::new();
        // Exhaust several chunks; each allocation fits in a fresh chunk.
        for _ in 0..64 {
            a.alloc(3000, 1).unwrap();
        }
        assert!(a.chunks.len() > 1);
        assert!(a.chunks.iter().all(|c| c.data.len() <= DEFAULT_MAX_CHUNK));
    }

    #[test]
    fn free_list_recycles() {
        let mut a = Arena::new();
        let h = a.alloc(64, 1).unwrap();
        a.free(h);
        let h2 = a.alloc(64, 1).unwrap();
        assert_eq!(h.chunk, h2.chunk);
        assert_eq!(h.offset, h2.offset);
    }

    #[test]
    fn realloc_in_place_at_tail() {
        let mut a = Arena::new();
        let h = a.alloc_bytes(b"abc").unwrap();
        let h2 = a.realloc(h, 6, 1).unwrap();
        assert_eq!(h2.chunk, h.chunk);
        assert_eq!(h2.offset, h.offset);
        assert_eq!(&a.bytes(h2)[..3], b"abc");
    }

    #[test]
    fn realloc_copies_when_not_at_tail() {
        let mut a = Arena::new();
        let h = a.alloc_bytes(b"abc").unwrap();
        a.alloc_bytes(b"block in between").unwrap();
        let h2 = a.realloc(h, 100, 1).unwrap();
        assert_ne!((h2.chunk, h2.offset), (h.chunk, h.offset));
        assert_eq!(&a.bytes(h2)[..3], b"abc");
    }

    #[test]
    fn reset_keeps_chunks_clear_drops_them() {
        let mut a = Arena::new();
        for _ in 0..64 {
            a.alloc(3000, 1).unwrap();
        }
        let n = a.chunks.len();
        assert!(n > 1);
        a.reset();
        assert_eq!(a.chunks.len(), n);
        assert_eq!(a.allocated(), 0);
        a.clear();
        assert_eq!(a.chunks.len(), 1);
    }

    #[test]
    fn alloc_fmt() {
        let mut a = Arena::new();
        let s = a.alloc_fmt(format_args!("{}+{}", 1, 2)).unwrap();
        assert_eq!(a.str(s), "1+2");
    }
}
