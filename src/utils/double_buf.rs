use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A pair of buffers that swap roles at every frame boundary. The producer
/// side records into `write()` while the consumer drains `back_mut()`; `swap`
/// is only ever called while both threads are parked at the frame handshake.
pub struct DoubleBuf<T> {
    wbuf: RwLock<T>,
    rbuf: RwLock<T>,
}

impl<T: Default> Default for DoubleBuf<T> {
    fn default() -> Self {
        DoubleBuf {
            wbuf: RwLock::new(Default::default()),
            rbuf: RwLock::new(Default::default()),
        }
    }
}

impl<T> DoubleBuf<T> {
    #[inline]
    pub fn new(w: T, r: T) -> Self {
        DoubleBuf {
            wbuf: RwLock::new(w),
            rbuf: RwLock::new(r),
        }
    }

    /// The producer buffer of the current frame.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<T> {
        self.wbuf.write().unwrap()
    }

    /// The consumer buffer, drained by the render thread.
    #[inline]
    pub fn back(&self) -> RwLockReadGuard<T> {
        self.rbuf.read().unwrap()
    }

    /// The consumer buffer, mutably.
    #[inline]
    pub fn back_mut(&self) -> RwLockWriteGuard<T> {
        self.rbuf.write().unwrap()
    }

    #[inline]
    pub fn swap(&self) {
        let mut wbuf = self.wbuf.write().unwrap();
        let mut rbuf = self.rbuf.write().unwrap();
        ::std::mem::swap::<T>(&mut wbuf, &mut rbuf);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn swap() {
        let buf = DoubleBuf::new(vec![1], vec![2]);
        assert_eq!(*buf.write(), vec![1]);
        assert_eq!(*buf.back(), vec![2]);

        buf.swap();
        assert_eq!(*buf.write(), vec![2]);
        assert_eq!(*buf.back(), vec![1]);
    }
}
