pub mod character;
pub mod child;
pub mod feeling_log;
pub mod parent;
