pub use self::{board::*, position::*, square::*};

pub(crate) mod board;
pub(crate) mod position;
pub(crate) mod square;
