use core::any::{Any, type_name};
use core::hash::{BuildHasher, Hash};
use std::collections::{BTreeMap, HashMap};

use crate::{
    Access, Def, MapDef, MapIter, Shape, ShapeMismatch, Shaped, downcast_mut, downcast_ref,
};

fn unbox_key<K: Any>(key: Box<dyn Any>) -> Access<K> {
    key.downcast::<K>()
        .map(|key| *key)
        .map_err(|_| ShapeMismatch {
            expected: type_name::<K>(),
        })
}

mod hash_map {
    use super::*;

    pub(super) fn len<K: Any, V: Any, S: Any>(map: &dyn Any) -> Access<usize> {
        Ok(downcast_ref::<HashMap<K, V, S>>(map)?.len())
    }

    pub(super) fn is_unset<K: Any, V: Any, S: Any>(map: &dyn Any) -> Access<bool> {
        Ok(downcast_ref::<HashMap<K, V, S>>(map)?.capacity() == 0)
    }

    pub(super) fn init<K, V, S>(map: &mut dyn Any) -> Access<()>
    where
        K: Any + Eq + Hash,
        V: Any,
        S: Any + BuildHasher,
    {
        let map = downcast_mut::<HashMap<K, V, S>>(map)?;
        if map.capacity() == 0 {
            map.reserve(1);
        }
        Ok(())
    }

    pub(super) fn reset<K: Any, V: Any, S: Any + Default>(map: &mut dyn Any) -> Access<()> {
        *downcast_mut::<HashMap<K, V, S>>(map)? = HashMap::default();
        Ok(())
    }

    pub(super) fn insert_default<K, V, S>(
        map: &mut dyn Any,
        key: Box<dyn Any>,
    ) -> Access<&mut dyn Any>
    where
        K: Any + Eq + Hash,
        V: Any + Default,
        S: Any + BuildHasher,
    {
        let map = downcast_mut::<HashMap<K, V, S>>(map)?;
        let key = unbox_key::<K>(key)?;
        let slot = map.entry(key).or_default();
        *slot = V::default();
        Ok(slot)
    }

    pub(super) fn iter<'a, K: Any, V: Any, S: Any>(map: &'a dyn Any) -> Access<MapIter<'a>> {
        let map = downcast_ref::<HashMap<K, V, S>>(map)?;
        Ok(Box::new(
            map.iter()
                .map(|(k, v)| (k as &dyn Any, v as &dyn Any)),
        ))
    }
}

mod btree_map {
    use super::*;

    pub(super) fn len<K: Any, V: Any>(map: &dyn Any) -> Access<usize> {
        Ok(downcast_ref::<BTreeMap<K, V>>(map)?.len())
    }

    // A BTreeMap has no allocation to observe, so it is always considered set.
    pub(super) fn is_unset<K: Any, V: Any>(map: &dyn Any) -> Access<bool> {
        downcast_ref::<BTreeMap<K, V>>(map)?;
        Ok(false)
    }

    pub(super) fn init<K: Any, V: Any>(map: &mut dyn Any) -> Access<()> {
        downcast_mut::<BTreeMap<K, V>>(map)?;
        Ok(())
    }

    pub(super) fn reset<K: Any, V: Any>(map: &mut dyn Any) -> Access<()> {
        downcast_mut::<BTreeMap<K, V>>(map)?.clear();
        Ok(())
    }

    pub(super) fn insert_default<K, V>(
        map: &mut dyn Any,
        key: Box<dyn Any>,
    ) -> Access<&mut dyn Any>
    where
        K: Any + Ord,
        V: Any + Default,
    {
        let map = downcast_mut::<BTreeMap<K, V>>(map)?;
        let key = unbox_key::<K>(key)?;
        let slot = map.entry(key).or_default();
        *slot = V::default();
        Ok(slot)
    }

    pub(super) fn iter<'a, K: Any, V: Any>(map: &'a dyn Any) -> Access<MapIter<'a>> {
        let map = downcast_ref::<BTreeMap<K, V>>(map)?;
        Ok(Box::new(
            map.iter()
                .map(|(k, v)| (k as &dyn Any, v as &dyn Any)),
        ))
    }
}

impl<K, V, S> Shaped for HashMap<K, V, S>
where
    K: Shaped + Eq + Hash,
    V: Shaped + Default,
    S: BuildHasher + Default + 'static,
{
    fn shape() -> Shape {
        Shape::of::<Self>(Def::Map(MapDef {
            key: K::shape,
            value: V::shape,
            len: hash_map::len::<K, V, S>,
            is_unset: hash_map::is_unset::<K, V, S>,
            init: hash_map::init::<K, V, S>,
            reset: hash_map::reset::<K, V, S>,
            insert_default: hash_map::insert_default::<K, V, S>,
            iter: hash_map::iter::<K, V, S>,
        }))
    }
}

impl<K, V> Shaped for BTreeMap<K, V>
where
    K: Shaped + Ord,
    V: Shaped + Default,
{
    fn shape() -> Shape {
        Shape::of::<Self>(Def::Map(MapDef {
            key: K::shape,
            value: V::shape,
            len: btree_map::len::<K, V>,
            is_unset: btree_map::is_unset::<K, V>,
            init: btree_map::init::<K, V>,
            reset: btree_map::reset::<K, V>,
            insert_default: btree_map::insert_default::<K, V>,
            iter: btree_map::iter::<K, V>,
        }))
    }
}
