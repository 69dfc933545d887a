//! Row structs and insert DTOs, one module per table group.

pub mod activity;
pub mod board;
pub mod comment;
pub mod goal;
pub mod goal_member;
pub mod invite;
pub mod mini_goal;
pub mod notification;
pub mod reaction;
pub mod reflection;
pub mod user;

pub use activity::{action_types, Activity, NewActivity};
pub use board::{Board, BoardMember, NewBoard};
pub use comment::Comment;
pub use goal::Goal;
pub use goal_member::GoalMember;
pub use invite::{BoardInvite, NewInvite};
pub use mini_goal::{MiniGoal, MiniGoalMember};
pub use notification::{NewNotification, Notification};
pub use reaction::Reaction;
pub use reflection::Reflection;
pub use user::{NewUser, User};
