pub mod case;
pub mod client;
pub mod document;
pub mod serve;
