pub mod normalize;
pub mod stem;

pub use normalize::{clean, parse, split};
pub use stem::Stemmer;
