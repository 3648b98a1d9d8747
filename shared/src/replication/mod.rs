pub mod diff_mask;
pub mod replica;
