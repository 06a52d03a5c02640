//! Stable integer handles and the id-keyed tables that own every entity.
//!
//! Points, segments, wires and polygons reference each other cyclically, so they
//! live in flat tables and refer to each other by handle. Ids come from a
//! per-table monotonic counter and are never reused, which keeps handles held by
//! callers unambiguous after deletions. Tables iterate in ascending id order.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

macro_rules! handle {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(id: usize) -> Self {
                Self(id)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(id: $name) -> usize {
                id.0
            }
        }
    };
}

handle!(PointId);
handle!(SegmentId);
handle!(WireId);
handle!(PolygonId);

/// Table of `T` keyed by handle `K`.
#[derive(Clone, Debug)]
pub struct IdMap<K, T> {
    items: BTreeMap<usize, T>,
    next: usize,
    _key: PhantomData<K>,
}

impl<K, T> Default for IdMap<K, T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            next: 0,
            _key: PhantomData,
        }
    }
}

impl<K, T> IdMap<K, T>
where
    K: Copy + From<usize> + Into<usize>,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle the next `insert` will return.
    #[inline]
    pub fn next_id(&self) -> K {
        K::from(self.next)
    }

    pub fn insert(&mut self, item: T) -> K {
        let id = self.next;
        self.next += 1;
        self.items.insert(id, item);
        K::from(id)
    }

    pub fn remove(&mut self, id: K) -> Option<T> {
        self.items.remove(&id.into())
    }

    #[inline]
    pub fn get(&self, id: K) -> Option<&T> {
        self.items.get(&id.into())
    }

    #[inline]
    pub fn get_mut(&mut self, id: K) -> Option<&mut T> {
        self.items.get_mut(&id.into())
    }

    #[inline]
    pub fn contains(&self, id: K) -> bool {
        self.items.contains_key(&id.into())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.items.keys().map(|k| K::from(*k))
    }

    pub fn values(&self) -> btree_map::Values<'_, usize, T> {
        self.items.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.items.iter().map(|(k, v)| (K::from(*k), v))
    }
}

impl<K, T> Index<K> for IdMap<K, T>
where
    K: Copy + Into<usize> + fmt::Debug,
{
    type Output = T;

    /// Panics on a dangling handle; public entry points validate caller handles first.
    fn index(&self, id: K) -> &T {
        match self.items.get(&id.into()) {
            Some(item) => item,
            None => panic!("dangling handle {id:?}"),
        }
    }
}

impl<K, T> IndexMut<K> for IdMap<K, T>
where
    K: Copy + Into<usize> + fmt::Debug,
{
    fn index_mut(&mut self, id: K) -> &mut T {
        match self.items.get_mut(&id.into()) {
            Some(item) => item,
            None => panic!("dangling handle {id:?}"),
        }
    }
}
