//! Identity capability: the string a key contributes as its sole notion of
//! equality inside an `IdentityMap`.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Derives the identity string of a key.
///
/// Two keys with the same identity are the same key. The result must be
/// deterministic for a given key for as long as it is stored in a map; the
/// map never re-derives identities of stored keys, so a key whose identity
/// changes after insertion simply stops being reachable by lookup.
///
/// A panic inside `identity` propagates to the caller. The map always derives
/// the identity before touching its own structure, so it stays consistent.
pub trait Identity {
    fn identity(&self) -> Cow<'_, str>;
}

impl Identity for str {
    #[inline]
    fn identity(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Identity for String {
    #[inline]
    fn identity(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl Identity for Cow<'_, str> {
    #[inline]
    fn identity(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_ref())
    }
}

// Primitives fall back to their default string rendering.
macro_rules! identity_via_display {
    ($($t:ty),* $(,)?) => {
        $(
            impl Identity for $t {
                #[inline]
                fn identity(&self) -> Cow<'_, str> {
                    Cow::Owned(self.to_string())
                }
            }
        )*
    };
}

identity_via_display!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
);

impl<T: Identity + ?Sized> Identity for &T {
    #[inline]
    fn identity(&self) -> Cow<'_, str> {
        (**self).identity()
    }
}

impl<T: Identity + ?Sized> Identity for &mut T {
    #[inline]
    fn identity(&self) -> Cow<'_, str> {
        (**self).identity()
    }
}

impl<T: Identity + ?Sized> Identity for Box<T> {
    #[inline]
    fn identity(&self) -> Cow<'_, str> {
        (**self).identity()
    }
}

impl<T: Identity + ?Sized> Identity for Rc<T> {
    #[inline]
    fn identity(&self) -> Cow<'_, str> {
        (**self).identity()
    }
}

impl<T: Identity + ?Sized> Identity for Arc<T> {
    #[inline]
    fn identity(&self) -> Cow<'_, str> {
        (**self).identity()
    }
}

/// Adapter keying any `Display` type by its rendered string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByDisplay<T>(pub T);

impl<T: fmt::Display> Identity for ByDisplay<T> {
    fn identity(&self) -> Cow<'_, str> {
        Cow::Owned(self.0.to_string())
    }
}

impl<T> ByDisplay<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}
