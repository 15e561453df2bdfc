mod common;

use jobhub::{ApiError, chat};

#[tokio::test]
async fn conversation_is_shared_between_both_sides() {
    let pool = common::test_pool().await;
    let a = common::signup(&pool, "aysel@example.com", "Aysel", "Əliyeva").await;
    let b = common::signup(&pool, "babek@example.com", "Babək", "Quliyev").await;

    let from_a = chat::get_or_create_conversation(&pool, a, b).await.unwrap();
    let from_b = chat::get_or_create_conversation(&pool, b, a).await.unwrap();
    assert_eq!(from_a, from_b);

    // repeated opens from either side never create a second row
    chat::get_or_create_conversation(&pool, a, b).await.unwrap();

    let (conversations,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(conversations, 1);

    let (participants,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM conversation_participants WHERE conversation_id=?")
            .bind(&from_a)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(participants, 2);
}

#[tokio::test]
async fn self_conversation_is_rejected() {
    let pool = common::test_pool().await;
    let a = common::signup(&pool, "a@example.com", "Aysel", "Əliyeva").await;

    let err = chat::get_or_create_conversation(&pool, a, a)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn sending_floats_conversation_to_top_of_inbox() {
    let pool = common::test_pool().await;
    let a = common::signup(&pool, "a@example.com", "Aysel", "Əliyeva").await;
    let b = common::signup(&pool, "b@example.com", "Babək", "Quliyev").await;
    let c = common::signup(&pool, "c@example.com", "Cavid", "Məmmədov").await;

    let with_b = chat::get_or_create_conversation(&pool, a, b).await.unwrap();
    let with_c = chat::get_or_create_conversation(&pool, a, c).await.unwrap();

    chat::send_message(&pool, a, &with_b, "salam Babək").await.unwrap();
    chat::send_message(&pool, a, &with_c, "salam Cavid").await.unwrap();

    let inbox = chat::list_conversations(&pool, a).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].id, with_c);

    // another message into the older conversation floats it back up
    chat::send_message(&pool, b, &with_b, "salam Aysel").await.unwrap();

    let inbox = chat::list_conversations(&pool, a).await.unwrap();
    assert_eq!(inbox[0].id, with_b);
    assert_eq!(inbox[0].other.name, "Babək Quliyev");
    assert_eq!(
        inbox[0].last_message.as_ref().unwrap().content,
        "salam Aysel"
    );
}

#[tokio::test]
async fn unread_counting_and_mark_as_read() {
    let pool = common::test_pool().await;
    let x = common::signup(&pool, "x@example.com", "Xəyal", "Həsənov").await;
    let y = common::signup(&pool, "y@example.com", "Yusif", "Əsgərov").await;

    let conversation = chat::get_or_create_conversation(&pool, x, y).await.unwrap();
    chat::send_message(&pool, x, &conversation, "Salam").await.unwrap();

    // the sender's own message never counts as unread for them
    assert_eq!(chat::unread_count(&pool, x).await.unwrap(), 0);
    assert_eq!(chat::unread_count(&pool, y).await.unwrap(), 1);

    let messages = chat::get_messages(&pool, y, &conversation).await.unwrap();
    let unread_ids: Vec<String> = messages
        .iter()
        .filter(|m| !m.read && m.sender_id != y.to_string())
        .map(|m| m.id.clone())
        .collect();

    chat::mark_as_read(&pool, y, &unread_ids).await.unwrap();
    assert_eq!(chat::unread_count(&pool, y).await.unwrap(), 0);

    // re-marking already-read messages changes nothing and never errors
    chat::mark_as_read(&pool, y, &unread_ids).await.unwrap();
    chat::mark_as_read(&pool, y, &[]).await.unwrap();
    assert_eq!(chat::unread_count(&pool, y).await.unwrap(), 0);
}

#[tokio::test]
async fn outsiders_cannot_mark_messages_read() {
    let pool = common::test_pool().await;
    let a = common::signup(&pool, "a@example.com", "Aysel", "Əliyeva").await;
    let b = common::signup(&pool, "b@example.com", "Babək", "Quliyev").await;
    let stranger = common::signup(&pool, "s@example.com", "Samir", "Rəhimov").await;

    let conversation = chat::get_or_create_conversation(&pool, a, b).await.unwrap();
    chat::send_message(&pool, a, &conversation, "Salam").await.unwrap();

    let ids: Vec<String> = chat::get_messages(&pool, b, &conversation)
        .await
        .unwrap()
        .iter()
        .map(|m| m.id.clone())
        .collect();

    // a user outside the conversation cannot clear b's unread state
    chat::mark_as_read(&pool, stranger, &ids).await.unwrap();
    assert_eq!(chat::unread_count(&pool, b).await.unwrap(), 1);

    chat::mark_as_read(&pool, b, &ids).await.unwrap();
    assert_eq!(chat::unread_count(&pool, b).await.unwrap(), 0);
}

#[tokio::test]
async fn outsiders_cannot_read_or_send() {
    let pool = common::test_pool().await;
    let a = common::signup(&pool, "a@example.com", "Aysel", "Əliyeva").await;
    let b = common::signup(&pool, "b@example.com", "Babək", "Quliyev").await;
    let stranger = common::signup(&pool, "s@example.com", "Samir", "Rəhimov").await;

    let conversation = chat::get_or_create_conversation(&pool, a, b).await.unwrap();

    let err = chat::get_messages(&pool, stranger, &conversation)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let err = chat::send_message(&pool, stranger, &conversation, "salam")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn blank_messages_are_rejected() {
    let pool = common::test_pool().await;
    let a = common::signup(&pool, "a@example.com", "Aysel", "Əliyeva").await;
    let b = common::signup(&pool, "b@example.com", "Babək", "Quliyev").await;

    let conversation = chat::get_or_create_conversation(&pool, a, b).await.unwrap();
    let err = chat::send_message(&pool, a, &conversation, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let messages = chat::get_messages(&pool, a, &conversation).await.unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn messages_come_back_oldest_first() {
    let pool = common::test_pool().await;
    let a = common::signup(&pool, "a@example.com", "Aysel", "Əliyeva").await;
    let b = common::signup(&pool, "b@example.com", "Babək", "Quliyev").await;

    let conversation = chat::get_or_create_conversation(&pool, a, b).await.unwrap();
    for content in ["bir", "iki", "üç"] {
        chat::send_message(&pool, a, &conversation, content).await.unwrap();
    }

    let messages = chat::get_messages(&pool, b, &conversation).await.unwrap();
    let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["bir", "iki", "üç"]);
}
