use std::collections::TryReserveError;

/// Backing memory owned by a [`crate::Buffer`].
///
/// A region is always "full": its visible bytes are exactly the packed extent of the buffer that owns it.
/// Moving a region in or out of a buffer is an ownership transfer and never copies;
/// [`Region::copy_from`] is the only operation that allocates a fresh region from borrowed bytes.
pub trait Region: Default {
    /// Visible bytes of the region.
    fn bytes(&self) -> &[u8];

    /// Number of bytes the region can hold without reallocating.
    fn capacity(&self) -> usize;

    /// Allocate a new region holding a copy of `bytes`.
    fn copy_from(bytes: &[u8]) -> Self;

    /// Reserve room for `additional` more bytes, reporting allocation failure instead of aborting.
    fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError>;

    /// Append `bytes` to the end of the region.
    fn extend_from_slice(&mut self, bytes: &[u8]);
}

impl Region for Vec<u8> {
    #[inline]
    fn bytes(&self) -> &[u8] {
        self.as_slice()
    }

    #[inline]
    fn capacity(&self) -> usize {
        Vec::capacity(self)
    }

    #[inline]
    fn copy_from(bytes: &[u8]) -> Self {
        bytes.to_vec()
    }

    #[inline]
    fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        Vec::try_reserve(self, additional)
    }

    #[inline]
    fn extend_from_slice(&mut self, bytes: &[u8]) {
        Vec::extend_from_slice(self, bytes)
    }
}
