//! Dart and embedding handles.
//!
//! Every array of a [`CMap2`](super::CMap2) is addressed by one of three
//! handles. A [`Dart`] is a slot of the dart arena; a [`VertexId`] or
//! [`FaceId`] is a row of the vertex or face attribute container.
//!
//! Handles are stored as `u16`, `u32` or `u64` ([`MeshIndex`]). The largest
//! value of the storage type is reserved: it marks a dart that has no
//! embedding yet, or a face embedding that was never assigned. A map over
//! `u16` therefore holds at most 65 535 darts, and creating a handle past
//! that bound panics instead of wrapping onto the reserved value.

use std::any::type_name;
use std::fmt::{self, Debug};
use std::hash::Hash;

/// Integer storage for map handles.
pub trait MeshIndex: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// Number of usable values; valid handles lie in `0..CAPACITY`.
    const CAPACITY: usize;

    /// Reserved value marking an unset handle.
    const NIL: Self;

    /// Narrow `v`, or `None` if it does not fit below [`NIL`](Self::NIL).
    fn try_from_usize(v: usize) -> Option<Self>;

    /// Widen to an array index.
    fn to_usize(self) -> usize;
}

macro_rules! impl_storage {
    ($($t:ty),*) => {$(
        impl MeshIndex for $t {
            const CAPACITY: usize = <$t>::MAX as usize;
            const NIL: Self = <$t>::MAX;

            #[inline]
            fn try_from_usize(v: usize) -> Option<Self> {
                <$t>::try_from(v).ok().filter(|&x| x != Self::NIL)
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    )*};
}

impl_storage!(u16, u32, u64);

macro_rules! handle {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name<I: MeshIndex = u32>(I);

        impl<I: MeshIndex> $name<I> {
            /// Handle for slot `index`.
            ///
            /// # Panics
            ///
            /// If `index` is not below `I::CAPACITY`.
            #[inline]
            pub fn new(index: usize) -> Self {
                match I::try_from_usize(index) {
                    Some(i) => Self(i),
                    None => panic!(
                        "{}{} exceeds the capacity of {} handles",
                        $prefix,
                        index,
                        type_name::<I>()
                    ),
                }
            }

            /// The unset handle.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::NIL)
            }

            /// Slot addressed by this handle.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Whether this handle is set.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != I::NIL
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}{}", $prefix, self.index())
                } else {
                    write!(f, "{}-", $prefix)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }
    };
}

handle!(
    /// A slot of the dart arena: one side of one edge inside one face.
    Dart,
    "d"
);
handle!(
    /// A row of the vertex attribute container.
    VertexId,
    "v"
);
handle!(
    /// A row of the face attribute container.
    FaceId,
    "f"
);
