//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod activity_repo;
pub mod board_repo;
pub mod comment_repo;
pub mod goal_member_repo;
pub mod goal_repo;
pub mod invite_repo;
pub mod mini_goal_repo;
pub mod notification_repo;
pub mod reaction_repo;
pub mod reflection_repo;
pub mod user_repo;

pub use activity_repo::ActivityRepo;
pub use board_repo::{BoardMemberRepo, BoardRepo};
pub use comment_repo::CommentRepo;
pub use goal_member_repo::GoalMemberRepo;
pub use goal_repo::GoalRepo;
pub use invite_repo::InviteRepo;
pub use mini_goal_repo::{MiniGoalMemberRepo, MiniGoalRepo};
pub use notification_repo::NotificationRepo;
pub use reaction_repo::ReactionRepo;
pub use reflection_repo::ReflectionRepo;
pub use user_repo::UserRepo;
