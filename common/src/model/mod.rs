pub mod achievement;
pub mod directory;
pub mod reference;
pub mod views;
