pub mod lookup;
pub mod notebook;
pub mod reference;
