pub mod kinds;
pub mod storage;
