mod compare;
mod pack;

pub use compare::*;
pub use pack::*;
