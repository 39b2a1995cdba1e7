//! Integration tests for request-scoped batching
//!
//! Runs GraphQL documents through the executor over an in-memory store and
//! counts store round trips:
//! - Nested relations cost one batched call per relation, not one per parent
//! - Relations joined by the root planner cost no call at all
//! - Missing relations resolve to null / empty lists
//! - A failed batch is reported at every path that waited on it
//! - Concurrent requests never share loaders

mod common;

use futures_util::future::join;
use serde_json::json;

use common::*;
use trellis_api::models::MemberTypeId;

#[tokio::test]
async fn test_users_with_posts_cost_two_calls() {
    let api = TestApi::new();
    let u1 = api.user("u1").await;
    let u2 = api.user("u2").await;
    let _u3 = api.user("u3").await;
    api.post(&u1, "first").await;
    api.post(&u1, "second").await;
    api.post(&u2, "third").await;
    api.start_counting();

    let response = execute(&api.executor, "{ users { id posts { title } } }").await;
    let data = expect_data(&response);

    assert_eq!(api.store.calls("find_users"), 1);
    assert_eq!(api.store.calls("posts_by_author_ids"), 1);
    assert_eq!(api.store.total_calls(), 2);

    let users = data["users"].as_array().unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(users[0]["id"], json!(u1.id.to_string()));
    assert_eq!(
        users[0]["posts"],
        json!([{ "title": "first" }, { "title": "second" }])
    );
    assert_eq!(users[1]["posts"], json!([{ "title": "third" }]));
    assert_eq!(users[2]["posts"], json!([]));
}

#[tokio::test]
async fn test_shared_member_type_fetched_once() {
    let api = TestApi::new();
    for name in ["a", "b", "c", "d"] {
        let user = api.user(name).await;
        api.profile(&user, MemberTypeId::Basic).await;
    }
    api.start_counting();

    let response = execute(
        &api.executor,
        "{ profiles { id memberType { id discount postsLimitPerMonth } } }",
    )
    .await;
    let data = expect_data(&response);

    assert_eq!(api.store.calls("list_profiles"), 1);
    assert_eq!(api.store.calls("member_types_by_ids"), 1);
    for profile in data["profiles"].as_array().unwrap() {
        assert_eq!(
            profile["memberType"],
            json!({ "id": "BASIC", "discount": 2.3, "postsLimitPerMonth": 20 })
        );
    }
}

#[tokio::test]
async fn test_planned_relations_cost_no_extra_calls() {
    let api = TestApi::new();
    let alice = api.user("alice").await;
    let bob = api.user("bob").await;
    api.profile(&alice, MemberTypeId::Business).await;
    api.subscribe(&bob, &alice).await;
    api.start_counting();

    let response = execute(
        &api.executor,
        "{ users { name profile { yearOfBirth } userSubscribedTo { name } subscribedToUser { name } } }",
    )
    .await;
    let data = expect_data(&response);

    assert_eq!(api.store.calls("find_users"), 1);
    assert_eq!(api.store.total_calls(), 1);
    assert_eq!(
        data["users"],
        json!([
            {
                "name": "alice",
                "profile": { "yearOfBirth": 1990 },
                "userSubscribedTo": [],
                "subscribedToUser": [{ "name": "bob" }]
            },
            {
                "name": "bob",
                "profile": null,
                "userSubscribedTo": [{ "name": "alice" }],
                "subscribedToUser": []
            }
        ])
    );
}

#[tokio::test]
async fn test_planned_profile_still_batches_member_types() {
    let api = TestApi::new();
    for (name, tier) in [
        ("a", MemberTypeId::Basic),
        ("b", MemberTypeId::Business),
        ("c", MemberTypeId::Basic),
    ] {
        let user = api.user(name).await;
        api.profile(&user, tier).await;
    }
    api.start_counting();

    let response = execute(
        &api.executor,
        "{ users { profile { memberType { id } } } }",
    )
    .await;
    expect_data(&response);

    assert_eq!(api.store.calls("find_users"), 1);
    assert_eq!(api.store.calls("profiles_by_user_ids"), 0);
    assert_eq!(api.store.calls("member_types_by_ids"), 1);
}

#[tokio::test]
async fn test_relations_below_planned_level_are_batched() {
    let api = TestApi::new();
    let author = api.user("author").await;
    api.post(&author, "hello").await;
    for name in ["r1", "r2", "r3"] {
        let reader = api.user(name).await;
        api.subscribe(&reader, &author).await;
    }
    api.start_counting();

    let response = execute(
        &api.executor,
        "{ users { name userSubscribedTo { name posts { title } profile { id } } } }",
    )
    .await;
    let data = expect_data(&response);

    assert_eq!(api.store.calls("find_users"), 1);
    // The same author under three readers is one key in one batch
    assert_eq!(api.store.calls("posts_by_author_ids"), 1);
    assert_eq!(api.store.calls("profiles_by_user_ids"), 1);
    assert_eq!(api.store.total_calls(), 3);

    let readers = data["users"].as_array().unwrap();
    assert_eq!(
        readers[1]["userSubscribedTo"],
        json!([{ "name": "author", "posts": [{ "title": "hello" }], "profile": null }])
    );
}

#[tokio::test]
async fn test_far_side_users_read_from_primed_identity_entries() {
    let api = TestApi::new();
    let author = api.user("author").await;
    let reader = api.user("reader").await;
    api.subscribe(&reader, &author).await;
    api.start_counting();

    let response = execute(
        &api.executor,
        "{ users { name userSubscribedTo { name subscribedToUser { name } } } }",
    )
    .await;
    let data = expect_data(&response);

    assert_eq!(api.store.calls("find_users"), 1);
    assert_eq!(api.store.calls("subscribers_by_author_ids"), 1);
    assert_eq!(api.store.calls("users_by_ids"), 0);
    assert_eq!(
        data["users"][1],
        json!({
            "name": "reader",
            "userSubscribedTo": [{ "name": "author", "subscribedToUser": [{ "name": "reader" }] }]
        })
    );
}

#[tokio::test]
async fn test_user_lookups_without_relations_share_one_call() {
    let api = TestApi::new();
    let alice = api.user("alice").await;
    let bob = api.user("bob").await;
    api.start_counting();

    let response = execute_with(
        &api.executor,
        "query ($a: UUID!, $b: UUID!) {
            first: user(id: $a) { name }
            again: user(id: $a) { name }
            other: user(id: $b) { name }
        }",
        json!({ "a": alice.id, "b": bob.id }),
    )
    .await;
    let data = expect_data(&response);

    assert_eq!(api.store.calls("find_users"), 0);
    assert_eq!(api.store.calls("users_by_ids"), 1);
    assert_eq!(data["first"], json!({ "name": "alice" }));
    assert_eq!(data["again"], json!({ "name": "alice" }));
    assert_eq!(data["other"], json!({ "name": "bob" }));
}

#[tokio::test]
async fn test_missing_relations_resolve_to_null_and_empty() {
    let api = TestApi::new();
    let loner = api.user("loner").await;
    api.start_counting();

    let response = execute_with(
        &api.executor,
        "query ($id: UUID!) { user(id: $id) { profile { id } posts { id } userSubscribedTo { id } } }",
        json!({ "id": loner.id }),
    )
    .await;
    let data = expect_data(&response);

    assert_eq!(
        data["user"],
        json!({ "profile": null, "posts": [], "userSubscribedTo": [] })
    );
}

#[tokio::test]
async fn test_unknown_user_is_null() {
    let api = TestApi::new();

    let response = execute(
        &api.executor,
        r#"{ user(id: "00000000-0000-0000-0000-000000000000") { id } }"#,
    )
    .await;

    assert_eq!(expect_data(&response)["user"], json!(null));
}

#[tokio::test]
async fn test_failed_batch_reported_at_every_waiting_path() {
    let api = TestApi::new();
    let a = api.user("a").await;
    let b = api.user("b").await;
    api.start_counting();
    api.store.fail("posts_by_author_ids");

    let response = execute_with(
        &api.executor,
        "query ($a: UUID!, $b: UUID!) {
            first: user(id: $a) { posts { id } }
            second: user(id: $b) { posts { id } }
            memberTypes { id }
        }",
        json!({ "a": a.id, "b": b.id }),
    )
    .await;

    // One window, one failed call, reported independently at both paths
    assert_eq!(api.store.calls("posts_by_author_ids"), 1);
    assert_eq!(
        error_messages(&response),
        vec![
            "store unavailable: posts_by_author_ids failed".to_string(),
            "store unavailable: posts_by_author_ids failed".to_string(),
        ]
    );
    assert_eq!(error_codes(&response), vec!["STORE_UNAVAILABLE", "STORE_UNAVAILABLE"]);

    let mut paths: Vec<_> = response["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].clone())
        .collect();
    paths.sort_by_key(|p| p.to_string());
    assert_eq!(paths, vec![json!(["first", "posts"]), json!(["second", "posts"])]);

    // Non-null posts null out the nullable parent; siblings still resolve
    assert_eq!(response["data"]["first"], json!(null));
    assert_eq!(response["data"]["second"], json!(null));
    assert_eq!(response["data"]["memberTypes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_concurrent_requests_do_not_share_batches() {
    let api = TestApi::new();
    let author = api.user("author").await;
    api.post(&author, "hello").await;
    api.start_counting();

    let query = "{ users { posts { title } } }";
    let (first, second) = join(
        execute(&api.executor, query),
        execute(&api.executor, query),
    )
    .await;

    assert_eq!(expect_data(&first), expect_data(&second));
    assert_eq!(api.store.calls("find_users"), 2);
    assert_eq!(api.store.calls("posts_by_author_ids"), 2);
}
