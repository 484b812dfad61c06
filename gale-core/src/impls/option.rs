use core::any::Any;

use crate::{Access, Def, OptionDef, Shape, Shaped, downcast_mut, downcast_ref};

fn get<T: Any>(opt: &dyn Any) -> Access<Option<&dyn Any>> {
    Ok(downcast_ref::<Option<T>>(opt)?
        .as_ref()
        .map(|inner| inner as &dyn Any))
}

fn set_none<T: Any>(opt: &mut dyn Any) -> Access<()> {
    *downcast_mut::<Option<T>>(opt)? = None;
    Ok(())
}

fn get_or_insert_default<T: Any + Default>(opt: &mut dyn Any) -> Access<&mut dyn Any> {
    Ok(downcast_mut::<Option<T>>(opt)?.get_or_insert_with(T::default))
}

impl<T: Shaped + Default> Shaped for Option<T> {
    fn shape() -> Shape {
        Shape::of::<Self>(Def::Option(OptionDef {
            inner: T::shape,
            get: get::<T>,
            set_none: set_none::<T>,
            get_or_insert_default: get_or_insert_default::<T>,
        }))
    }
}
