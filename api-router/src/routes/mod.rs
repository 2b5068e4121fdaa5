pub mod info;
pub mod messages;
pub mod probes;
pub mod vote;
