//! Position save/restore for seekable byte sources.
//!
//! The validators probe an upload that a later stage must read again from the
//! start. [`Rewind`] records the position on creation and seeks back to it
//! when dropped, so the restore happens on every exit path, including early
//! returns and unwinding out of a codec.

use std::io::{self, Seek, SeekFrom};
use std::ops::{Deref, DerefMut};

/// Borrow of a seekable source that restores the original position on drop.
#[derive(Debug)]
pub struct Rewind<'a, R: Seek> {
    inner: &'a mut R,
    origin: u64,
}

impl<'a, R: Seek> Rewind<'a, R> {
    /// Record the current position of `inner`.
    pub fn new(inner: &'a mut R) -> io::Result<Self> {
        let origin = inner.stream_position()?;
        Ok(Self { inner, origin })
    }

    /// Position the source will be returned to.
    pub fn origin(&self) -> u64 {
        self.origin
    }
}

impl<R: Seek> Deref for Rewind<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        &*self.inner
    }
}

impl<R: Seek> DerefMut for Rewind<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut *self.inner
    }
}

impl<R: Seek> Drop for Rewind<'_, R> {
    fn drop(&mut self) {
        // Errors cannot be reported from drop.
        let _ = self.inner.seek(SeekFrom::Start(self.origin));
    }
}
