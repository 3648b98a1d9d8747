/// Transport-assigned identity of one connected user.
pub type UserId = u64;
