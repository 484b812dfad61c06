mod shape;
pub use shape::*;

mod scalar;
pub use scalar::*;

mod field;
pub use field::*;

mod def;
pub use def::*;
