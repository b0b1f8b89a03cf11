pub mod command;
pub mod reversible;
