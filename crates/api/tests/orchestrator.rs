//! Collaboration engine tests over the in-memory store.
//!
//! Cover the toggle pipeline (persist, milestones, rewards, reflection,
//! realtime), per-member overlays on shared boards, mini-goal recompute,
//! owner-only definitions, invites, reactions and the error taxonomy
//! surfaced to callers.

mod common;

use assert_matches::assert_matches;
use axum::extract::ws::Message;
use bingoals_api::engine::{
    AddMember, CreateBoard, CreateInvite, CreateMiniGoal, ReactToGoal, UpdateGoal,
    UpdateMiniGoal, UpdateReflection,
};
use bingoals_api::state::AppState;
use bingoals_core::error::CoreError;
use bingoals_core::milestone::Milestone;
use bingoals_core::reaction::ReactionKind;
use bingoals_core::status::GoalStatus;
use bingoals_core::types::{new_id, DbId};
use bingoals_db::models::{Board, NewInvite, User};
use bingoals_db::StoreError;
use bingoals_events::event_types;
use chrono::{Duration, Utc};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_board(state: &AppState, owner: &User, grid_size: i32, board_type: &str) -> Board {
    state
        .engine
        .create_board(
            owner.id,
            CreateBoard {
                title: "2026 goals".into(),
                year: Some(2026),
                grid_size: Some(grid_size),
                board_type: Some(board_type.into()),
                max_members: Some(3),
            },
        )
        .await
        .expect("board creation should succeed")
}

async fn join(state: &AppState, board: &Board, user: &User) {
    state
        .engine
        .add_member(board.user_id, board.id, AddMember { user_id: user.id })
        .await
        .expect("adding a member should succeed");
}

async fn titled(state: &AppState, actor: DbId, board: &Board, position: i32) -> DbId {
    state
        .engine
        .update_goal(
            actor,
            board.id,
            position,
            UpdateGoal {
                title: Some(format!("Goal {position}")),
                ..Default::default()
            },
        )
        .await
        .expect("goal write should succeed")
        .id
}

async fn add_mini(state: &AppState, actor: DbId, board: &Board, position: i32, pct: i32) -> DbId {
    let goal = state
        .engine
        .create_mini_goal(
            actor,
            board.id,
            position,
            CreateMiniGoal {
                title: format!("{pct}% step"),
                percentage: pct,
            },
        )
        .await
        .expect("mini-goal creation should succeed");
    goal.mini_goals
        .iter()
        .find(|m| m.percentage == pct)
        .map(|m| m.id)
        .expect("created mini-goal should be listed")
}

async fn rewards(state: &AppState, user: &User) -> i64 {
    state
        .store
        .get_user(user.id)
        .await
        .unwrap()
        .expect("user should exist")
        .total_rewards
}

// ---------------------------------------------------------------------------
// Test: completing a cell on a personal board runs the whole pipeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn personal_toggle_awards_base_reward_and_reflection() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let board = new_board(&state, &alice, 3, "personal").await;

    let outcome = state.engine.toggle_goal(alice.id, board.id, 4).await.unwrap();

    assert_eq!(outcome.reward_delta, 5);
    assert!(outcome.milestones.is_empty());
    assert_eq!(outcome.goal.effective.status, GoalStatus::Completed);
    assert!(outcome.goal.effective.completed_at.is_some());

    let user = state.store.get_user(alice.id).await.unwrap().unwrap();
    assert_eq!(user.total_rewards, 5);
    assert_eq!(user.daily_streak, 1);
    assert!(user.last_active_date.is_some());

    let reflection = state.engine.reflection(alice.id, board.id, 4).await.unwrap();
    assert!(reflection.reflection_prompt.is_some());
}

// ---------------------------------------------------------------------------
// Test: the row milestone fires on the last cell of the row, not before
// ---------------------------------------------------------------------------

#[tokio::test]
async fn row_awarded_only_on_last_cell() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let board = new_board(&state, &alice, 3, "personal").await;

    let first = state.engine.toggle_goal(alice.id, board.id, 1).await.unwrap();
    let second = state.engine.toggle_goal(alice.id, board.id, 0).await.unwrap();
    assert!(first.milestones.is_empty());
    assert!(second.milestones.is_empty());

    let last = state.engine.toggle_goal(alice.id, board.id, 2).await.unwrap();
    assert_eq!(last.milestones, vec![Milestone::Row]);
    assert_eq!(last.reward_delta, 5 + 10);
    assert_eq!(rewards(&state, &alice).await, 5 + 5 + 15);
}

// ---------------------------------------------------------------------------
// Test: un-completing never revokes rewards
// ---------------------------------------------------------------------------

#[tokio::test]
async fn uncomplete_keeps_rewards() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let board = new_board(&state, &alice, 5, "personal").await;

    state.engine.toggle_goal(alice.id, board.id, 7).await.unwrap();
    let undo = state.engine.toggle_goal(alice.id, board.id, 7).await.unwrap();

    assert_eq!(undo.reward_delta, 0);
    assert!(undo.milestones.is_empty());
    assert_eq!(undo.goal.effective.status, GoalStatus::NotStarted);
    assert_eq!(undo.goal.effective.completed_at, None);
    assert_eq!(rewards(&state, &alice).await, 3);

    // Completing again is a fresh edge.
    let again = state.engine.toggle_goal(alice.id, board.id, 7).await.unwrap();
    assert_eq!(again.reward_delta, 3);
    assert_eq!(rewards(&state, &alice).await, 6);
}

// ---------------------------------------------------------------------------
// Test: shared-board members hold independent state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shared_members_are_independent() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    let board = new_board(&state, &alice, 3, "shared").await;
    join(&state, &board, &bob).await;

    state.engine.toggle_goal(alice.id, board.id, 0).await.unwrap();

    let for_alice = state.engine.effective_status(alice.id, board.id, 0).await.unwrap();
    let for_bob = state.engine.effective_status(bob.id, board.id, 0).await.unwrap();
    assert_eq!(for_alice.status, GoalStatus::Completed);
    assert_eq!(for_bob.status, GoalStatus::NotStarted);
    assert!(!for_bob.is_completed);

    state.engine.toggle_goal(bob.id, board.id, 0).await.unwrap();
    state.engine.toggle_goal(alice.id, board.id, 0).await.unwrap();

    let for_alice = state.engine.effective_status(alice.id, board.id, 0).await.unwrap();
    let for_bob = state.engine.effective_status(bob.id, board.id, 0).await.unwrap();
    assert_eq!(for_alice.status, GoalStatus::NotStarted);
    assert_eq!(for_bob.status, GoalStatus::Completed);

    let view = state.engine.board_view(alice.id, board.id).await.unwrap();
    assert_eq!(view.goals.len(), 1);
    assert_eq!(view.goals[0].completed_by_count, Some(1));
    assert_eq!(view.members.len(), 2);

    // Canonical fields on a shared board are never written.
    let goal = state.store.get_goal(view.goals[0].id).await.unwrap().unwrap();
    assert!(!goal.is_completed);
}

// ---------------------------------------------------------------------------
// Test: milestones on a shared board count only the actor's completions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shared_milestones_are_per_member() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    let board = new_board(&state, &alice, 3, "shared").await;
    join(&state, &board, &bob).await;

    state.engine.toggle_goal(alice.id, board.id, 0).await.unwrap();
    state.engine.toggle_goal(alice.id, board.id, 1).await.unwrap();
    let bob_last = state.engine.toggle_goal(bob.id, board.id, 2).await.unwrap();
    assert!(bob_last.milestones.is_empty());
    assert_eq!(bob_last.reward_delta, 5);

    let alice_last = state.engine.toggle_goal(alice.id, board.id, 2).await.unwrap();
    assert_eq!(alice_last.milestones, vec![Milestone::Row]);
}

// ---------------------------------------------------------------------------
// Test: realtime events reach other members but not the actor
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completion_is_published_to_other_members() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    let board = new_board(&state, &alice, 5, "shared").await;
    join(&state, &board, &bob).await;

    let mut alice_rx = state.hub.join(board.id, "alice".into(), alice.id).await;
    let mut bob_rx = state.hub.join(board.id, "bob".into(), bob.id).await;

    state.engine.toggle_goal(alice.id, board.id, 12).await.unwrap();

    let msg = bob_rx.recv().await.expect("bob should be notified");
    let json: serde_json::Value = match msg {
        Message::Text(t) => serde_json::from_str(t.as_str()).unwrap(),
        other => panic!("Expected text frame, got: {other:?}"),
    };
    assert_eq!(json["type"], "goal_completed");
    assert_eq!(json["userId"], alice.id.to_string());
    assert_eq!(json["data"]["position"], 12);
    assert_eq!(json["data"]["userName"], "alice");
    assert!(alice_rx.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: personal boards publish nothing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn personal_board_has_no_audience() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let board = new_board(&state, &alice, 5, "personal").await;
    let mut observer = state.hub.join(board.id, "observer".into(), uuid::Uuid::nil()).await;

    state.engine.toggle_goal(alice.id, board.id, 0).await.unwrap();

    assert!(observer.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: quota overflow is rejected without a partial write
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mini_goal_quota_rejects_without_write() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let board = new_board(&state, &alice, 5, "personal").await;
    let goal_id = titled(&state, alice.id, &board, 3).await;

    add_mini(&state, alice.id, &board, 3, 50).await;
    add_mini(&state, alice.id, &board, 3, 40).await;

    let err = state
        .engine
        .create_mini_goal(
            alice.id,
            board.id,
            3,
            CreateMiniGoal {
                title: "too much".into(),
                percentage: 20,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(
        err,
        StoreError::Core(CoreError::QuotaExceeded {
            requested: 110,
            allocated: 90
        })
    );

    let minis = state.store.list_mini_goals(&[goal_id]).await.unwrap();
    assert_eq!(minis.len(), 2);
}

// ---------------------------------------------------------------------------
// Test: updating a mini-goal excludes its own weight from the quota
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mini_goal_update_excludes_itself_from_quota() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let board = new_board(&state, &alice, 5, "personal").await;
    titled(&state, alice.id, &board, 0).await;

    let a = add_mini(&state, alice.id, &board, 0, 60).await;
    add_mini(&state, alice.id, &board, 0, 30).await;

    let goal = state
        .engine
        .update_mini_goal(
            alice.id,
            board.id,
            0,
            a,
            UpdateMiniGoal {
                title: None,
                percentage: Some(70),
            },
        )
        .await
        .unwrap();
    assert_eq!(goal.mini_goals.iter().map(|m| m.percentage).sum::<i32>(), 100);

    let err = state
        .engine
        .update_mini_goal(
            alice.id,
            board.id,
            0,
            a,
            UpdateMiniGoal {
                title: None,
                percentage: Some(71),
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::QuotaExceeded { .. }));
}

// ---------------------------------------------------------------------------
// Test: mini-goal toggles drive progress and the completion edge
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mini_goal_recompute_crosses_into_completed() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let board = new_board(&state, &alice, 3, "personal").await;
    titled(&state, alice.id, &board, 4).await;
    let a = add_mini(&state, alice.id, &board, 4, 60).await;
    let b = add_mini(&state, alice.id, &board, 4, 40).await;

    let first = state.engine.toggle_mini_goal(alice.id, board.id, 4, a).await.unwrap();
    assert!(first.mini_goal.is_complete);
    assert_eq!(first.goal.effective.status, GoalStatus::InProgress);
    assert_eq!(first.goal.effective.progress, 60);
    assert_eq!(first.reward_delta, 0);

    let second = state.engine.toggle_mini_goal(alice.id, board.id, 4, b).await.unwrap();
    assert_eq!(second.goal.effective.status, GoalStatus::Completed);
    assert_eq!(second.goal.effective.progress, 100);
    assert_eq!(second.reward_delta, 5);
    assert_eq!(rewards(&state, &alice).await, 5);

    let undo = state.engine.toggle_mini_goal(alice.id, board.id, 4, b).await.unwrap();
    assert_eq!(undo.goal.effective.status, GoalStatus::InProgress);
    assert_eq!(rewards(&state, &alice).await, 5);
}

// ---------------------------------------------------------------------------
// Test: direct toggle with mini-goals forces completion, progress untouched
// ---------------------------------------------------------------------------

#[tokio::test]
async fn direct_toggle_with_mini_goals_forces_completion() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let board = new_board(&state, &alice, 5, "personal").await;
    titled(&state, alice.id, &board, 2).await;
    let a = add_mini(&state, alice.id, &board, 2, 30).await;
    state.engine.toggle_mini_goal(alice.id, board.id, 2, a).await.unwrap();

    let outcome = state.engine.toggle_goal(alice.id, board.id, 2).await.unwrap();

    assert_eq!(outcome.goal.effective.status, GoalStatus::Completed);
    assert_eq!(outcome.goal.effective.progress, 30);
    assert_eq!(outcome.reward_delta, 3);
}

// ---------------------------------------------------------------------------
// Test: a definition change recomputes every member holding an overlay
// ---------------------------------------------------------------------------

#[tokio::test]
async fn definition_change_recomputes_holders() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    let board = new_board(&state, &alice, 5, "shared").await;
    join(&state, &board, &bob).await;
    titled(&state, alice.id, &board, 6).await;
    let step = add_mini(&state, alice.id, &board, 6, 50).await;

    let toggled = state.engine.toggle_mini_goal(bob.id, board.id, 6, step).await.unwrap();
    assert_eq!(toggled.goal.effective.progress, 50);
    assert_eq!(toggled.goal.effective.status, GoalStatus::InProgress);

    // Alice reweights the step; Bob's completed step now covers the goal.
    state
        .engine
        .update_mini_goal(
            alice.id,
            board.id,
            6,
            step,
            UpdateMiniGoal {
                title: None,
                percentage: Some(100),
            },
        )
        .await
        .unwrap();

    let for_bob = state.engine.effective_status(bob.id, board.id, 6).await.unwrap();
    assert_eq!(for_bob.status, GoalStatus::Completed);
    assert_eq!(for_bob.progress, 100);
    assert_eq!(rewards(&state, &bob).await, 3);

    let for_alice = state.engine.effective_status(alice.id, board.id, 6).await.unwrap();
    assert_eq!(for_alice.status, GoalStatus::NotStarted);
    assert_eq!(rewards(&state, &alice).await, 0);
}

// ---------------------------------------------------------------------------
// Test: clearing a goal drops mini-goals, overlays and the reflection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clearing_goal_resets_everything() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let board = new_board(&state, &alice, 3, "personal").await;
    let goal_id = titled(&state, alice.id, &board, 8).await;
    add_mini(&state, alice.id, &board, 8, 100).await;
    state.engine.toggle_goal(alice.id, board.id, 8).await.unwrap();

    let cleared = state
        .engine
        .update_goal(
            alice.id,
            board.id,
            8,
            UpdateGoal {
                title: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(cleared.id, goal_id);
    assert_eq!(cleared.title, None);
    assert_eq!(cleared.effective.status, GoalStatus::NotStarted);
    assert_eq!(cleared.effective.progress, 0);
    assert!(cleared.mini_goals.is_empty());

    let err = state.engine.reflection(alice.id, board.id, 8).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { .. }));
}

#[tokio::test]
async fn clearing_shared_goal_drops_member_overlays() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    let board = new_board(&state, &alice, 3, "shared").await;
    join(&state, &board, &bob).await;
    let goal_id = titled(&state, alice.id, &board, 1).await;
    state.engine.toggle_goal(bob.id, board.id, 1).await.unwrap();

    state
        .engine
        .update_goal(
            alice.id,
            board.id,
            1,
            UpdateGoal {
                title: Some("   ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(state.store.list_goal_member_holders(goal_id).await.unwrap().is_empty());
    let for_bob = state.engine.effective_status(bob.id, board.id, 1).await.unwrap();
    assert_eq!(for_bob.status, GoalStatus::NotStarted);
}

// ---------------------------------------------------------------------------
// Test: error taxonomy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_members_get_not_found() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let mallory = common::seed_user(&state, "mallory").await;
    let board = new_board(&state, &alice, 5, "shared").await;

    let err = state.engine.board_view(mallory.id, board.id).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { entity: "Board", .. }));

    let err = state.engine.toggle_goal(mallory.id, board.id, 0).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { .. }));
}

#[tokio::test]
async fn out_of_grid_position_is_rejected() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let board = new_board(&state, &alice, 3, "personal").await;

    let err = state.engine.toggle_goal(alice.id, board.id, 9).await.unwrap_err();
    assert_matches!(
        err,
        StoreError::Core(CoreError::InvalidPosition {
            position: 9,
            grid_size: 3
        })
    );
    let err = state.engine.toggle_goal(alice.id, board.id, -1).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::InvalidPosition { .. }));
}

#[tokio::test]
async fn untouched_cell_reads_not_started() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let board = new_board(&state, &alice, 7, "personal").await;

    let status = state.engine.effective_status(alice.id, board.id, 48).await.unwrap();
    assert_eq!(status.status, GoalStatus::NotStarted);
    assert_eq!(status.progress, 0);
}

// ---------------------------------------------------------------------------
// Test: membership rules
// ---------------------------------------------------------------------------

#[tokio::test]
async fn membership_rules() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    let carol = common::seed_user(&state, "carol").await;
    let dave = common::seed_user(&state, "dave").await;

    let personal = new_board(&state, &alice, 5, "personal").await;
    let err = state
        .engine
        .add_member(alice.id, personal.id, AddMember { user_id: bob.id })
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Validation(_)));

    // max_members = 3, owner included.
    let shared = new_board(&state, &alice, 5, "shared").await;
    join(&state, &shared, &bob).await;
    let err = state
        .engine
        .add_member(alice.id, shared.id, AddMember { user_id: bob.id })
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));
    join(&state, &shared, &carol).await;
    let err = state
        .engine
        .add_member(alice.id, shared.id, AddMember { user_id: dave.id })
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));

    let err = state
        .engine
        .remove_member(alice.id, shared.id, alice.id)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Validation(_)));

    let err = state
        .engine
        .remove_member(bob.id, shared.id, carol.id)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Forbidden(_)));

    // Bob leaves; his board view disappears.
    let mut bob_rx = state.hub.join(shared.id, "bob".into(), bob.id).await;
    state.engine.remove_member(bob.id, shared.id, bob.id).await.unwrap();
    assert!(matches!(bob_rx.recv().await, Some(Message::Close(None))));
    let err = state.engine.board_view(bob.id, shared.id).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Test: members cannot change shared definitions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn members_cannot_change_shared_definitions() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    let board = new_board(&state, &alice, 3, "shared").await;
    join(&state, &board, &bob).await;

    state.engine.toggle_goal(alice.id, board.id, 0).await.unwrap();

    // A 40% mini-goal would drop Alice's completed cell back to in progress.
    let err = state
        .engine
        .create_mini_goal(
            bob.id,
            board.id,
            0,
            CreateMiniGoal {
                title: "sneaky".into(),
                percentage: 40,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Forbidden(_)));
    let for_alice = state.engine.effective_status(alice.id, board.id, 0).await.unwrap();
    assert_eq!(for_alice.status, GoalStatus::Completed);

    let err = state
        .engine
        .update_goal(
            bob.id,
            board.id,
            0,
            UpdateGoal {
                title: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Forbidden(_)));
    let for_alice = state.engine.effective_status(alice.id, board.id, 0).await.unwrap();
    assert_eq!(for_alice.status, GoalStatus::Completed);

    titled(&state, alice.id, &board, 1).await;
    let step = add_mini(&state, alice.id, &board, 1, 50).await;
    let err = state
        .engine
        .update_mini_goal(
            bob.id,
            board.id,
            1,
            step,
            UpdateMiniGoal {
                title: None,
                percentage: Some(100),
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Forbidden(_)));
    let err = state
        .engine
        .delete_mini_goal(bob.id, board.id, 1, step)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Forbidden(_)));
    let err = state
        .engine
        .update_reflection(bob.id, board.id, 0, UpdateReflection::default())
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Forbidden(_)));

    // Members still drive their own progress.
    let toggled = state.engine.toggle_mini_goal(bob.id, board.id, 1, step).await.unwrap();
    assert_eq!(toggled.goal.effective.progress, 50);
    let toggled = state.engine.toggle_goal(bob.id, board.id, 0).await.unwrap();
    assert_eq!(toggled.goal.effective.status, GoalStatus::Completed);
}

// ---------------------------------------------------------------------------
// Test: a ledger failure does not abort the completion pipeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completion_survives_missing_profile() {
    let state = common::test_state();
    let ghost = new_id();
    let board = state
        .engine
        .create_board(
            ghost,
            CreateBoard {
                title: "No profile".into(),
                year: Some(2026),
                grid_size: Some(3),
                board_type: Some("personal".into()),
                max_members: None,
            },
        )
        .await
        .unwrap();

    let outcome = state.engine.toggle_goal(ghost, board.id, 4).await.unwrap();

    assert_eq!(outcome.reward_delta, 5);
    assert_eq!(outcome.goal.effective.status, GoalStatus::Completed);
    assert!(state.store.get_user(ghost).await.unwrap().is_none());
    let reflection = state.engine.reflection(ghost, board.id, 4).await.unwrap();
    assert!(reflection.reflection_prompt.is_some());
}

// ---------------------------------------------------------------------------
// Test: invite codes admit members until spent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invite_codes_admit_until_spent() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    let carol = common::seed_user(&state, "carol").await;
    let dave = common::seed_user(&state, "dave").await;
    let board = new_board(&state, &alice, 3, "shared").await;

    let single = state
        .engine
        .create_invite(
            alice.id,
            board.id,
            CreateInvite {
                max_uses: Some(1),
                expires_in: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(single.invite_code.len(), 12);
    assert_eq!(single.expires_at, None);

    let member = state.engine.join_board(bob.id, &single.invite_code).await.unwrap();
    assert_eq!(member.board_id, board.id);
    state.engine.board_view(bob.id, board.id).await.unwrap();

    let err = state
        .engine
        .join_board(carol.id, &single.invite_code)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Gone(_)));

    let open = state
        .engine
        .create_invite(alice.id, board.id, CreateInvite::default())
        .await
        .unwrap();
    assert_eq!(open.max_uses, 0);
    let err = state.engine.join_board(bob.id, &open.invite_code).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));
    state.engine.join_board(carol.id, &open.invite_code).await.unwrap();

    // max_members = 3, owner included.
    let err = state.engine.join_board(dave.id, &open.invite_code).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));

    let err = state.engine.join_board(dave.id, "000000000000").await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { .. }));

    let joined = state.engine.activity_feed(alice.id, board.id).await.unwrap();
    assert_eq!(joined.len(), 2);
}

#[tokio::test]
async fn expired_invite_is_gone() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    let board = new_board(&state, &alice, 3, "shared").await;

    let invite = state
        .store
        .create_invite(NewInvite {
            board_id: board.id,
            inviter_id: alice.id,
            invite_code: "deadbeef0001".into(),
            expires_at: Some(Utc::now() - Duration::hours(1)),
            max_uses: 0,
        })
        .await
        .unwrap();

    let err = state.engine.join_board(bob.id, &invite.invite_code).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Gone(_)));
    assert!(state.store.get_board_member(board.id, bob.id).await.unwrap().is_none());
}

#[tokio::test]
async fn invites_are_owner_only_and_shared_only() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    let shared = new_board(&state, &alice, 3, "shared").await;
    let personal = new_board(&state, &alice, 3, "personal").await;
    join(&state, &shared, &bob).await;

    let err = state
        .engine
        .create_invite(bob.id, shared.id, CreateInvite::default())
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Forbidden(_)));

    let err = state
        .engine
        .create_invite(alice.id, personal.id, CreateInvite::default())
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Validation(_)));
}

// ---------------------------------------------------------------------------
// Test: board list and member list are resolved per viewer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn board_list_counts_are_per_viewer() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    new_board(&state, &alice, 3, "personal").await;
    let shared = new_board(&state, &alice, 3, "shared").await;
    join(&state, &shared, &bob).await;
    titled(&state, alice.id, &shared, 2).await;
    state.engine.toggle_goal(alice.id, shared.id, 2).await.unwrap();
    state.engine.toggle_goal(alice.id, shared.id, 0).await.unwrap();

    let for_alice = state.engine.list_boards(alice.id).await.unwrap();
    assert_eq!(for_alice.len(), 2);
    let entry = for_alice.iter().find(|b| b.board.id == shared.id).unwrap();
    assert_eq!(entry.completed_positions, vec![0, 2]);
    assert_eq!(entry.completed_count, 2);
    assert_eq!(entry.goal_count, 1);
    assert_eq!(entry.member_count, 2);

    let for_bob = state.engine.list_boards(bob.id).await.unwrap();
    assert_eq!(for_bob.len(), 1);
    assert_eq!(for_bob[0].board.id, shared.id);
    assert_eq!(for_bob[0].completed_count, 0);

    let members = state.engine.list_members(bob.id, shared.id).await.unwrap();
    let names: Vec<(&str, &str)> = members
        .iter()
        .map(|m| (m.name.as_str(), m.role.as_str()))
        .collect();
    assert_eq!(names, vec![("alice", "owner"), ("bob", "member")]);
}

// ---------------------------------------------------------------------------
// Test: reflections are edited in place and created on demand
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reflection_edit_keeps_prompt_and_fills_fields() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let board = new_board(&state, &alice, 3, "personal").await;
    state.engine.toggle_goal(alice.id, board.id, 4).await.unwrap();
    let before = state.engine.reflection(alice.id, board.id, 4).await.unwrap();

    let edited = state
        .engine
        .update_reflection(
            alice.id,
            board.id,
            4,
            UpdateReflection {
                victories: Some("Ran the half".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.id, before.id);
    assert_eq!(edited.reflection_prompt, before.reflection_prompt);
    assert_eq!(edited.victories.as_deref(), Some("Ran the half"));
    assert_eq!(edited.notes, None);

    // A titled but never-completed goal gets a reflection on first edit.
    titled(&state, alice.id, &board, 1).await;
    let created = state
        .engine
        .update_reflection(
            alice.id,
            board.id,
            1,
            UpdateReflection {
                notes: Some("halfway".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(created.reflection_prompt.is_some());

    let err = state
        .engine
        .update_reflection(alice.id, board.id, 7, UpdateReflection::default())
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Test: reactions toggle and notify the completers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reactions_toggle_and_notify_completers() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    let carol = common::seed_user(&state, "carol").await;
    let board = new_board(&state, &alice, 3, "shared").await;
    join(&state, &board, &bob).await;
    join(&state, &board, &carol).await;
    let goal_id = titled(&state, alice.id, &board, 4).await;
    state.engine.toggle_goal(alice.id, board.id, 4).await.unwrap();

    let mut events = state.event_bus.subscribe();
    let added = state
        .engine
        .toggle_reaction(bob.id, goal_id, ReactToGoal { reaction_type: "fire".into() })
        .await
        .unwrap();
    assert!(added.added);
    assert_eq!(added.kind, ReactionKind::Fire);
    assert_eq!(added.reaction.as_ref().unwrap().user_id, bob.id);

    let event = events.try_recv().expect("reaction should be published");
    assert_eq!(event.event_type, event_types::REACTION_ADDED);
    assert_eq!(event.recipients, Some(vec![alice.id]));
    assert_eq!(event.notice.unwrap().kind, "reaction_received");

    let reactions = state.engine.list_reactions(carol.id, goal_id).await.unwrap();
    assert_eq!(reactions.len(), 1);

    let removed = state
        .engine
        .toggle_reaction(bob.id, goal_id, ReactToGoal { reaction_type: "fire".into() })
        .await
        .unwrap();
    assert!(!removed.added);
    assert!(removed.reaction.is_none());
    assert!(events.try_recv().is_err());
    assert!(state.engine.list_reactions(bob.id, goal_id).await.unwrap().is_empty());

    let err = state
        .engine
        .toggle_reaction(bob.id, goal_id, ReactToGoal { reaction_type: "thumbs".into() })
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Validation(_)));
}

#[tokio::test]
async fn reacting_to_own_completion_notifies_nobody() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    let board = new_board(&state, &alice, 3, "shared").await;
    join(&state, &board, &bob).await;
    let goal_id = titled(&state, alice.id, &board, 0).await;
    state.engine.toggle_goal(alice.id, board.id, 0).await.unwrap();

    let mut events = state.event_bus.subscribe();
    state
        .engine
        .toggle_reaction(alice.id, goal_id, ReactToGoal { reaction_type: "star".into() })
        .await
        .unwrap();
    assert!(events.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: notification read state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notifications_are_marked_read() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    for title in ["one", "two", "three"] {
        state
            .store
            .create_notification(bingoals_db::models::NewNotification {
                user_id: alice.id,
                notification_type: "goal_completed".into(),
                title: title.into(),
                body: String::new(),
                metadata: None,
            })
            .await
            .unwrap();
    }
    let first = state.engine.notifications(alice.id).await.unwrap()[0].id;

    let err = state
        .engine
        .mark_notification_read(bob.id, first)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { .. }));

    state.engine.mark_notification_read(alice.id, first).await.unwrap();
    assert_eq!(state.engine.mark_all_notifications_read(alice.id).await.unwrap(), 2);
    assert!(state
        .engine
        .notifications(alice.id)
        .await
        .unwrap()
        .iter()
        .all(|n| n.is_read));
}
