mod scalar;
mod vec;
mod option;
mod boxed;
mod map;
