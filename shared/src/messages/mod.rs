pub mod action;
pub mod packet_type;
pub mod world;
