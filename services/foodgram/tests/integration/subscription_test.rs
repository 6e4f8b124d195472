use foodgram::error::FoodgramError;
use foodgram::usecase::subscription::{
    ListSubscriptionsUseCase, SubscribeUseCase, UnsubscribeUseCase,
};
use foodgram_domain::pagination::PageRequest;

use crate::helpers::MemStore;

fn subscribe(store: &MemStore) -> SubscribeUseCase<MemStore, MemStore, MemStore, MemStore> {
    SubscribeUseCase {
        reader: store.reader(),
    }
}

// ── Subscribe ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_subscribe_and_preview_limited_recipes() {
    let store = MemStore::new();
    let reader = store.seed_user("reader");
    let author = store.seed_user("author");
    let first = store.seed_recipe(author.id, "first", &[], &[]);
    let second = store.seed_recipe(author.id, "second", &[], &[]);
    let third = store.seed_recipe(author.id, "third", &[], &[]);

    let view = subscribe(&store)
        .execute(reader.id, author.id, Some(2))
        .await
        .unwrap();

    assert!(view.author.is_subscribed);
    assert_eq!(view.recipes_count, 3);
    let ids: Vec<i32> = view.recipes.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![third.id, second.id]);
    assert_ne!(ids[0], first.id);
}

#[tokio::test]
async fn should_refuse_self_subscription_without_writing() {
    let store = MemStore::new();
    let user = store.seed_user("me");

    let err = subscribe(&store)
        .execute(user.id, user.id, None)
        .await
        .unwrap_err();

    assert!(matches!(err, FoodgramError::SelfSubscription));
    assert!(store.with(|t| t.subscriptions.is_empty()));
}

#[tokio::test]
async fn should_refuse_duplicate_subscription() {
    let store = MemStore::new();
    let reader = store.seed_user("reader");
    let author = store.seed_user("author");
    subscribe(&store)
        .execute(reader.id, author.id, None)
        .await
        .unwrap();

    let err = subscribe(&store)
        .execute(reader.id, author.id, None)
        .await
        .unwrap_err();

    assert!(matches!(err, FoodgramError::AlreadySubscribed));
    assert_eq!(store.with(|t| t.subscriptions.len()), 1);
}

#[tokio::test]
async fn should_return_not_found_for_unknown_author() {
    let store = MemStore::new();
    let reader = store.seed_user("reader");

    let err = subscribe(&store)
        .execute(reader.id, 999, None)
        .await
        .unwrap_err();

    assert!(matches!(err, FoodgramError::UserNotFound));
}

// ── Unsubscribe ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_missing_subscription_on_unsubscribe() {
    let store = MemStore::new();
    let reader = store.seed_user("reader");
    let author = store.seed_user("author");
    let usecase = UnsubscribeUseCase {
        users: store.clone(),
        subscriptions: store.clone(),
    };

    let err = usecase.execute(reader.id, author.id).await.unwrap_err();
    assert!(matches!(err, FoodgramError::NotSubscribed));

    store.with(|t| t.subscriptions.push((reader.id, author.id)));
    usecase.execute(reader.id, author.id).await.unwrap();
    assert!(store.with(|t| t.subscriptions.is_empty()));
}

// ── ListSubscriptions ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_newest_subscriptions_first() {
    let store = MemStore::new();
    let reader = store.seed_user("reader");
    let older = store.seed_user("older");
    let newer = store.seed_user("newer");
    store.seed_recipe(newer.id, "dish", &[], &[]);
    store.with(|t| {
        t.subscriptions.push((reader.id, older.id));
        t.subscriptions.push((reader.id, newer.id));
    });

    let (authors, count) = ListSubscriptionsUseCase {
        reader: store.reader(),
    }
    .execute(reader.id, PageRequest::default(), Some(0))
    .await
    .unwrap();

    assert_eq!(count, 2);
    assert_eq!(authors[0].author.user.id, newer.id);
    assert_eq!(authors[0].recipes_count, 1);
    assert!(authors[0].recipes.is_empty());
    assert!(authors.iter().all(|a| a.author.is_subscribed));
}
