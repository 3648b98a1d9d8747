pub mod host_world;
