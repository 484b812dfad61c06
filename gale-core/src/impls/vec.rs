use core::any::Any;

use crate::{Access, Def, ListDef, Shape, Shaped, downcast_mut, downcast_ref};

fn len<T: Any>(list: &dyn Any) -> Access<usize> {
    Ok(downcast_ref::<Vec<T>>(list)?.len())
}

fn capacity<T: Any>(list: &dyn Any) -> Access<usize> {
    Ok(downcast_ref::<Vec<T>>(list)?.capacity())
}

fn get<T: Any>(list: &dyn Any, index: usize) -> Access<Option<&dyn Any>> {
    Ok(downcast_ref::<Vec<T>>(list)?
        .get(index)
        .map(|item| item as &dyn Any))
}

fn clear<T: Any>(list: &mut dyn Any) -> Access<()> {
    downcast_mut::<Vec<T>>(list)?.clear();
    Ok(())
}

fn release<T: Any>(list: &mut dyn Any) -> Access<()> {
    *downcast_mut::<Vec<T>>(list)? = Vec::new();
    Ok(())
}

fn reserve_exact<T: Any>(list: &mut dyn Any, additional: usize) -> Access<()> {
    downcast_mut::<Vec<T>>(list)?.reserve_exact(additional);
    Ok(())
}

fn push_default<T: Any + Default>(list: &mut dyn Any) -> Access<&mut dyn Any> {
    let list = downcast_mut::<Vec<T>>(list)?;
    list.push(T::default());
    let index = list.len() - 1;
    Ok(&mut list[index])
}

impl<T: Shaped + Default> Shaped for Vec<T> {
    fn shape() -> Shape {
        Shape::of::<Self>(Def::List(ListDef {
            item: T::shape,
            len: len::<T>,
            capacity: capacity::<T>,
            get: get::<T>,
            clear: clear::<T>,
            release: release::<T>,
            reserve_exact: reserve_exact::<T>,
            push_default: push_default::<T>,
        }))
    }
}
