//!
//! # Shared-Pointer Type
//!

// Std-lib
use std::hash::{Hash, Hasher};
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, RwLock};

// Crates.io
use by_address::ByAddress;

///
/// # Ptr
///
/// Thread-safe, reference-counted smart pointer for shared cell definitions.
///
/// Attribute access is forwarded through [Deref], so after grabbing `read()`
/// or `write()` access the underlying data reads naturally:
///
/// ```text
/// let cell = ptr.read()?;
/// let name = &cell.name;
/// ```
///
/// [Ptr] wraps its contents in [ByAddress], so equality and hashing operate
/// *by address* rather than by value. Cell pointers are commonly used as
/// hash-map keys when walking hierarchical trees in which many nodes are
/// shared; address-identity is exactly the notion of "same cell" we want.
///
#[derive(Debug, Default)]
pub struct Ptr<T: ?Sized>(ByAddress<Arc<RwLock<T>>>);

impl<T> Ptr<T> {
    /// Pointer constructor
    pub fn new(i: T) -> Self {
        Self(ByAddress(Arc::new(RwLock::new(i))))
    }
}
impl<T> From<T> for Ptr<T> {
    fn from(t: T) -> Self {
        Self::new(t)
    }
}
impl<T> Deref for Ptr<T> {
    type Target = ByAddress<Arc<RwLock<T>>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<T> DerefMut for Ptr<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
// The [Deref] implementation interferes with the auto-`derive`d versions
// of these traits, so each gets a short manual implementation.
impl<T> Clone for Ptr<T> {
    fn clone(&self) -> Self {
        Self(ByAddress::clone(&self.0))
    }
}
impl<T> PartialEq for Ptr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}
impl<T> Eq for Ptr<T> {}
impl<T> Hash for Ptr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ptr_identity() {
        // Two pointers to equal values are nonetheless distinct
        let p1 = Ptr::new(5);
        let p2 = Ptr::new(5);
        assert_ne!(p1, p2);

        // While clones compare equal
        let p3 = p1.clone();
        assert_eq!(p3, p1);
        assert_ne!(p3, p2);
    }
    #[test]
    fn ptr_read_write() {
        let p = Ptr::new(String::from("cell0"));
        {
            let mut guard = p.write().unwrap();
            guard.push('a');
        }
        assert_eq!(*p.read().unwrap(), "cell0a");
    }
}
