use core::any::Any;

use crate::{Access, Def, PointerDef, Shape, Shaped, downcast_mut, downcast_ref};

fn get<T: Any>(ptr: &dyn Any) -> Access<&dyn Any> {
    Ok(&**downcast_ref::<Box<T>>(ptr)?)
}

fn get_mut<T: Any>(ptr: &mut dyn Any) -> Access<&mut dyn Any> {
    Ok(&mut **downcast_mut::<Box<T>>(ptr)?)
}

impl<T: Shaped> Shaped for Box<T> {
    fn shape() -> Shape {
        Shape::of::<Self>(Def::Pointer(PointerDef {
            pointee: T::shape,
            get: get::<T>,
            get_mut: get_mut::<T>,
        }))
    }
}
