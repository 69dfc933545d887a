pub mod boards;
pub mod comments;
pub mod goals;
pub mod mini_goals;
pub mod users;
