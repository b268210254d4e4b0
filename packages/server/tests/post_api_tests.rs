//! Integration tests for the viewer-scoped feed and post engagement.

mod common;

use chrono::{Duration, Utc};
use common::{create_identity, create_post_at, create_post_by, create_user, TestHarness};
use test_context::test_context;

use social_core::common::ApiError;
use social_core::domains::posts::actions::{self, UpdatePostInput};
use social_core::domains::posts::models::ToggleOutcome;
use social_core::domains::profiles::actions as profile_actions;

#[test_context(TestHarness)]
#[tokio::test]
async fn feed_contains_own_and_followed_posts_only(ctx: &TestHarness) {
    let (alice_id, alice) = create_user(&ctx.db_pool, "alice").await.unwrap();
    let (bob_id, bob) = create_user(&ctx.db_pool, "bob").await.unwrap();
    let (_, carol) = create_user(&ctx.db_pool, "carol").await.unwrap();

    let mine = create_post_by(&ctx.db_pool, &alice, "Mine", "alpha")
        .await
        .unwrap();
    let followed = create_post_by(&ctx.db_pool, &bob, "Followed", "beta")
        .await
        .unwrap();
    let hidden = create_post_by(&ctx.db_pool, &carol, "Hidden", "gamma")
        .await
        .unwrap();

    profile_actions::follow(alice_id, bob.id, &ctx.db_pool)
        .await
        .unwrap();

    let feed = actions::list_posts(alice_id, None, None, &ctx.db_pool)
        .await
        .unwrap();
    let ids: Vec<&str> = feed.iter().map(|post| post.id.as_str()).collect();

    assert!(ids.contains(&mine.id.to_string().as_str()));
    assert!(ids.contains(&followed.id.to_string().as_str()));
    assert!(!ids.contains(&hidden.id.to_string().as_str()));

    // Bob follows nobody, so he only sees his own post
    let bob_feed = actions::list_posts(bob_id, None, None, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(bob_feed.len(), 1);
    assert_eq!(bob_feed[0].id, followed.id.to_string());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn feed_is_newest_first(ctx: &TestHarness) {
    let (alice_id, alice) = create_user(&ctx.db_pool, "alice").await.unwrap();

    // Explicit timestamps; consecutive clock reads can land on the same
    // microsecond once Postgres truncates them.
    let now = Utc::now();
    create_post_at(&ctx.db_pool, &alice, "Older", "first", now - Duration::minutes(1))
        .await
        .unwrap();
    create_post_at(&ctx.db_pool, &alice, "Newer", "second", now)
        .await
        .unwrap();

    let feed = actions::list_posts(alice_id, None, None, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(feed[0].title, "Newer");
    assert_eq!(feed[1].title, "Older");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn filters_narrow_the_feed(ctx: &TestHarness) {
    let (alice_id, alice) = create_user(&ctx.db_pool, "alice").await.unwrap();
    let (_, bob) = create_user(&ctx.db_pool, "bob").await.unwrap();

    create_post_by(&ctx.db_pool, &alice, "Roses are red", "a")
        .await
        .unwrap();
    create_post_by(&ctx.db_pool, &bob, "Violets are blue", "b")
        .await
        .unwrap();

    profile_actions::follow(alice_id, bob.id, &ctx.db_pool)
        .await
        .unwrap();

    // Title filter is a case-insensitive substring match
    let by_title = actions::list_posts(alice_id, None, Some("vIoLeTs"), &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].title, "Violets are blue");

    // Author filter restricts to matching usernames within the feed
    let by_author = actions::list_posts(alice_id, Some(&bob.username), None, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].author, bob.username);

    // Both filters compose
    let none = actions::list_posts(
        alice_id,
        Some(&bob.username),
        Some("Roses"),
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert!(none.is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn retrieval_is_gated_by_the_same_visibility_rule(ctx: &TestHarness) {
    let (alice_id, _) = create_user(&ctx.db_pool, "alice").await.unwrap();
    let (_, bob) = create_user(&ctx.db_pool, "bob").await.unwrap();
    let (_, carol) = create_user(&ctx.db_pool, "carol").await.unwrap();

    let visible = create_post_by(&ctx.db_pool, &bob, "Visible", "body")
        .await
        .unwrap();
    let invisible = create_post_by(&ctx.db_pool, &carol, "Invisible", "body")
        .await
        .unwrap();

    profile_actions::follow(alice_id, bob.id, &ctx.db_pool)
        .await
        .unwrap();

    let detail = actions::get_post(alice_id, visible.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(detail.title, "Visible");

    // A post outside the feed reads as absent, not forbidden
    let err = actions::get_post(alice_id, invisible.id, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn like_toggles_between_states(ctx: &TestHarness) {
    let (alice_id, alice) = create_user(&ctx.db_pool, "alice").await.unwrap();
    let post = create_post_by(&ctx.db_pool, &alice, "Likeable", "body")
        .await
        .unwrap();

    let first = actions::like_unlike(alice_id, post.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(first, ToggleOutcome::Liked);

    let detail = actions::get_post(alice_id, post.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(detail.likes, vec![alice.username]);

    let second = actions::like_unlike(alice_id, post.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(second, ToggleOutcome::Unliked);

    let detail = actions::get_post(alice_id, post.id, &ctx.db_pool)
        .await
        .unwrap();
    assert!(detail.likes.is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn liked_posts_tracks_the_toggle(ctx: &TestHarness) {
    let (alice_id, alice) = create_user(&ctx.db_pool, "alice").await.unwrap();
    let post = create_post_by(&ctx.db_pool, &alice, "Bookmark", "body")
        .await
        .unwrap();

    actions::like_unlike(alice_id, post.id, &ctx.db_pool)
        .await
        .unwrap();
    let liked = actions::liked_posts(alice_id, &ctx.db_pool).await.unwrap();
    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0].id, post.id.to_string());

    actions::like_unlike(alice_id, post.id, &ctx.db_pool)
        .await
        .unwrap();
    let liked = actions::liked_posts(alice_id, &ctx.db_pool).await.unwrap();
    assert!(liked.is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn comments_carry_the_callers_username(ctx: &TestHarness) {
    let (alice_id, alice) = create_user(&ctx.db_pool, "alice").await.unwrap();
    let (bob_id, bob) = create_user(&ctx.db_pool, "bob").await.unwrap();

    let post = create_post_by(&ctx.db_pool, &bob, "Discussable", "body")
        .await
        .unwrap();
    profile_actions::follow(alice_id, bob.id, &ctx.db_pool)
        .await
        .unwrap();

    let reply = actions::comment_on_post(alice_id, post.id, "first!", &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(reply.author, alice.username);
    actions::comment_on_post(bob_id, post.id, "thanks", &ctx.db_pool)
        .await
        .unwrap();

    let detail = actions::get_post(bob_id, post.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(detail.comments.len(), 2);
    // Oldest first
    assert_eq!(detail.comments[0].content, "first!");
    assert_eq!(detail.comments[1].author, bob.username);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn empty_comment_rejected(ctx: &TestHarness) {
    let (alice_id, alice) = create_user(&ctx.db_pool, "alice").await.unwrap();
    let post = create_post_by(&ctx.db_pool, &alice, "Quiet", "body")
        .await
        .unwrap();

    let err = actions::comment_on_post(alice_id, post.id, "   ", &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn only_the_author_can_update_or_delete(ctx: &TestHarness) {
    let (alice_id, _) = create_user(&ctx.db_pool, "alice").await.unwrap();
    let (_, bob) = create_user(&ctx.db_pool, "bob").await.unwrap();

    let post = create_post_by(&ctx.db_pool, &bob, "Theirs", "body")
        .await
        .unwrap();
    profile_actions::follow(alice_id, bob.id, &ctx.db_pool)
        .await
        .unwrap();

    let err = actions::update_post(
        alice_id,
        post.id,
        UpdatePostInput {
            title: Some("Mine now".to_string()),
            content: None,
        },
        &ctx.db_pool,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let err = actions::delete_post(alice_id, post.id, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn callers_without_a_profile_cannot_use_the_feed(ctx: &TestHarness) {
    let identity_id = create_identity(&ctx.db_pool, "profileless")
        .await
        .unwrap();

    let err = actions::list_posts(identity_id, None, None, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}
