mod animation;
mod plotting;

pub use animation::*;
pub use plotting::*;
