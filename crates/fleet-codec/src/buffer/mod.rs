//! Growable byte container with independent pack (write) and unpack (read) cursors.
//!
//! Ownership rules:
//! - [`Buffer::load`] takes the given region by value and installs it as the backing memory (no copy);
//! - [`Buffer::unload`] hands the backing region back untouched when nothing has been read yet,
//!   otherwise copies only the unread tail into a fresh region;
//! - both leave the buffer in a fresh empty state, so the previous backing memory is never half-owned.
mod region;
pub use region::Region;

use std::fmt;

use tracing::trace;

use crate::{CodecError, CodecResult};

/// Declared payload type of a [`Buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferType {
    /// Every packed item is preceded by its data type.
    #[default]
    Described,
    /// Raw packed items without type descriptors.
    NonDescribed,
}

impl BufferType {
    /// Returns the type as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BufferType::Described => "described",
            BufferType::NonDescribed => "non-described",
        }
    }
}

/// Byte buffer with exclusive ownership of its backing region.
///
/// Invariant: `0 <= unpack_cursor <= pack_cursor == len() <= capacity()`.
#[derive(Default)]
pub struct Buffer<R: Region = Vec<u8>> {
    kind: BufferType,
    base: Option<R>,
    bytes_used: usize,
    unpack: usize,
}

impl<R: Region> Buffer<R> {
    /// Create an empty buffer of the default type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer of the given type.
    pub fn with_type(kind: BufferType) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Declared payload type.
    #[inline]
    pub fn buffer_type(&self) -> BufferType {
        self.kind
    }

    /// Number of packed bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes_used
    }

    /// Returns `true` if nothing has been packed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes_used == 0
    }

    /// Bytes the backing region can hold without growing.
    pub fn capacity(&self) -> usize {
        self.base.as_ref().map_or(0, Region::capacity)
    }

    /// Offset of the next write.
    #[inline]
    pub fn pack_cursor(&self) -> usize {
        self.bytes_used
    }

    /// Offset of the next read.
    #[inline]
    pub fn unpack_cursor(&self) -> usize {
        self.unpack
    }

    /// Packed bytes that have not been read yet.
    pub fn unread(&self) -> &[u8] {
        match &self.base {
            Some(region) => &region.bytes()[self.unpack..self.bytes_used],
            None => &[],
        }
    }

    /// Append raw bytes at the pack cursor, growing the backing region as needed.
    pub fn pack(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.extend(bytes)
    }

    /// Read `len` raw bytes at the unpack cursor and advance it.
    ///
    /// Fails with [`CodecError::ReadPastEnd`] without moving the cursor when fewer bytes remain.
    pub fn unpack(&mut self, len: usize) -> CodecResult<&[u8]> {
        let available = self.bytes_used - self.unpack;
        if len > available {
            return Err(CodecError::ReadPastEnd {
                requested: len,
                available,
            });
        }
        let start = self.unpack;
        self.unpack += len;
        match &self.base {
            Some(region) => Ok(&region.bytes()[start..start + len]),
            None => Ok(&[]),
        }
    }

    /// Take the buffer's payload out, leaving the buffer empty.
    ///
    /// - empty buffer: returns `None`;
    /// - nothing read yet: the backing region itself is returned and the caller becomes its sole owner;
    /// - partially read: only the unread tail is copied into a freshly sized region (`None` if the tail is empty).
    ///
    /// The returned region's length is the payload length.
    pub fn unload(&mut self) -> Option<R> {
        let old = std::mem::take(self);

        let region = match old.base {
            Some(region) if old.bytes_used > 0 => region,
            _ => return None,
        };
        if old.unpack == 0 {
            trace!(len = old.bytes_used, "handing over backing region");
            return Some(region);
        }

        let tail = &region.bytes()[old.unpack..old.bytes_used];
        if tail.is_empty() {
            return None;
        }
        trace!(len = tail.len(), consumed = old.unpack, "copying unread tail");
        Some(R::copy_from(tail))
    }

    /// Replace the buffer's contents with `payload`, taking ownership of it.
    ///
    /// Any current contents (and any in-flight unpack position) are discarded first.
    /// `None` leaves the buffer empty. Otherwise the region becomes the backing memory as-is:
    /// pack cursor at its end, unpack cursor at its start.
    pub fn load(&mut self, payload: Option<R>) {
        *self = Self::default();

        let Some(region) = payload else {
            return;
        };
        self.bytes_used = region.bytes().len();
        self.base = Some(region);
    }

    /// Append the unread tail of `src` to this buffer.
    ///
    /// If this buffer already holds data, both buffers must share a [`BufferType`]; otherwise this buffer adopts `src`'s type.
    /// The already-consumed prefix of `src` is never copied and `src` itself is not modified,
    /// so calling this twice without advancing `src` appends the same tail twice.
    pub fn copy_payload<S: Region>(&mut self, src: &Buffer<S>) -> CodecResult<()> {
        if self.bytes_used != 0 && self.kind != src.kind {
            return Err(CodecError::TypeMismatch {
                expected: self.kind.as_str(),
                actual: src.kind.as_str(),
            });
        }
        self.kind = src.kind;

        let tail = src.unread();
        if tail.is_empty() {
            return Ok(());
        }
        self.extend(tail)
    }

    fn extend(&mut self, bytes: &[u8]) -> CodecResult<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let region = self.base.get_or_insert_with(R::default);
        region
            .try_reserve(bytes.len())
            .map_err(|_| CodecError::OutOfResource(bytes.len()))?;
        region.extend_from_slice(bytes);
        self.bytes_used += bytes.len();
        Ok(())
    }
}

impl<R: Region> fmt::Debug for Buffer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("type", &self.kind)
            .field("used", &self.bytes_used)
            .field("unpack", &self.unpack)
            .field("capacity", &self.capacity())
            .finish()
    }
}
