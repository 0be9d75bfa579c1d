mod into_iter;
mod vec;

pub use into_iter::IntoIter;
pub use vec::Vec;
