#![allow(clippy::unwrap_used, reason = "test code")]

use chrono::{Datelike as _, TimeZone as _, Utc};

use super::*;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 12, 16, 43, 18).unwrap()
}

#[test]
fn decodes_minimal_author_content_message() {
    let tweet = RawTweet::from_json(r#"{"author":"u","content":"hello"}"#)
        .unwrap()
        .into_tweet(fixed_now())
        .unwrap();
    assert_eq!(tweet.author, "u");
    assert_eq!(tweet.content, "hello");
    assert_eq!(tweet.author_id, "u");
    assert_eq!(tweet.lang, "en");
    assert_eq!(tweet.created_at, fixed_now());
    assert_eq!(tweet.metrics, EngagementMetrics::default());
    assert!(uuid::Uuid::parse_str(&tweet.tweet_id).is_ok());
}

#[test]
fn decodes_engagement_counts() {
    let tweet = RawTweet::from_json(
        r#"{"author":"u","content":"hi","retweet_count":3,"like_count":"7"}"#,
    )
    .unwrap()
    .into_tweet(fixed_now())
    .unwrap();
    assert_eq!(tweet.metrics.retweets, 3);
    assert_eq!(tweet.metrics.likes, 7);
}

#[test]
fn decodes_legacy_username_text_message() {
    let payload = r#"{
        "id": "abc",
        "text": "legacy format",
        "username": "user_1234",
        "retweets": 10,
        "likes": 20.0,
        "timestamp": 1741797798.5
    }"#;
    let tweet = RawTweet::from_json(payload).unwrap().into_tweet(fixed_now()).unwrap();
    assert_eq!(tweet.tweet_id, "abc");
    assert_eq!(tweet.author, "user_1234");
    assert_eq!(tweet.content, "legacy format");
    assert_eq!(tweet.metrics.retweets, 10);
    assert_eq!(tweet.metrics.likes, 20);
    assert_eq!(tweet.created_at.timestamp_millis(), 1_741_797_798_500);
}

#[test]
fn decodes_api_tweet_with_public_metrics() {
    let payload = r#"{
        "id": "1899",
        "text": "from the api",
        "author_id": 42,
        "created_at": "2025-03-10T08:00:00.000Z",
        "lang": "fr",
        "public_metrics": {"retweet_count": 1, "like_count": 2, "reply_count": 3,
                           "quote_count": 4, "bookmark_count": 5, "impression_count": 6}
    }"#;
    let tweet = RawTweet::from_json(payload).unwrap().into_tweet(fixed_now()).unwrap();
    assert_eq!(tweet.author, "42");
    assert_eq!(tweet.author_id, "42");
    assert_eq!(tweet.lang, "fr");
    assert_eq!(tweet.created_at.day(), 10);
    assert_eq!(
        tweet.metrics,
        EngagementMetrics {
            retweets: 1,
            likes: 2,
            replies: 3,
            quotes: 4,
            bookmarks: 5,
            impressions: 6
        }
    );
}

#[test]
fn top_level_counts_win_over_nested_metrics() {
    let payload = r#"{"author":"u","content":"x","likes":9,"public_metrics":{"like_count":1}}"#;
    let tweet = RawTweet::from_json(payload).unwrap().into_tweet(fixed_now()).unwrap();
    assert_eq!(tweet.metrics.likes, 9);
}

#[test]
fn both_spellings_of_a_field_are_accepted() {
    let tweet = decode_tweet(r#"{"author":"u","content":"hi","id":"1","tweet_id":"2"}"#).unwrap();
    assert_eq!(tweet.tweet_id, "2");

    let payload = r#"{"author":"u","content":"hi","likes":3,"like_count":4,"retweets":1,"retweet_count":2}"#;
    let tweet = decode_tweet(payload).unwrap();
    assert_eq!(tweet.metrics.likes, 4);
    assert_eq!(tweet.metrics.retweets, 2);

    let tweet = decode_tweet(r#"{"author":"u","content":"hi","id":7,"likes":5}"#).unwrap();
    assert_eq!(tweet.tweet_id, "7");
    assert_eq!(tweet.metrics.likes, 5);
}

#[test]
fn author_preferred_over_username() {
    let payload = r#"{"author":"a","username":"b","content":"x"}"#;
    let tweet = RawTweet::from_json(payload).unwrap().into_tweet(fixed_now()).unwrap();
    assert_eq!(tweet.author, "a");
}

#[test]
fn missing_content_is_rejected() {
    let err = RawTweet::from_json(r#"{"author":"u"}"#)
        .unwrap()
        .into_tweet(fixed_now())
        .unwrap_err();
    assert!(matches!(err, InvalidTweet::MissingField("content")));
}

#[test]
fn blank_content_is_rejected() {
    let err = decode_tweet(r#"{"author":"u","content":"   "}"#).unwrap_err();
    assert!(matches!(err, InvalidTweet::MissingField("content")));
}

#[test]
fn missing_author_is_rejected() {
    let err = decode_tweet(r#"{"content":"orphan"}"#).unwrap_err();
    assert!(matches!(err, InvalidTweet::MissingField("author")));
}

#[test]
fn malformed_json_is_rejected() {
    let err = decode_tweet("{not json").unwrap_err();
    assert!(matches!(err, InvalidTweet::Json(_)));
}

#[test]
fn non_object_payload_is_rejected() {
    let err = decode_tweet(r#"["u","hello"]"#).unwrap_err();
    assert!(matches!(err, InvalidTweet::NotAnObject));
}

#[test]
fn wrong_field_type_is_rejected() {
    let err = decode_tweet(r#"{"author":"u","content":5}"#).unwrap_err();
    assert!(matches!(err, InvalidTweet::Json(_)));
}

#[test]
fn negative_count_is_rejected() {
    let err = decode_tweet(r#"{"author":"u","content":"x","likes":-1}"#).unwrap_err();
    assert!(matches!(err, InvalidTweet::Json(_)));
}

#[test]
fn unparseable_timestamp_falls_back_to_now() {
    let tweet = RawTweet::from_json(r#"{"author":"u","content":"x","created_at":"yesterday"}"#)
        .unwrap()
        .into_tweet(fixed_now())
        .unwrap();
    assert_eq!(tweet.created_at, fixed_now());
}

#[test]
fn naive_iso_timestamp_is_utc() {
    let ts = parse_timestamp(&Value::String("2025-03-12T16:43:18".to_owned())).unwrap();
    assert_eq!(ts, fixed_now());
}

#[test]
fn content_is_trimmed_and_nfc_normalized() {
    let tweet = decode_tweet("{\"author\":\"u\",\"content\":\"  cafe\\u0301  \"}").unwrap();
    assert_eq!(tweet.content, "caf\u{e9}");
}

#[test]
fn message_roundtrip_preserves_fields() {
    let mut tweet = Tweet::new("alice", "round trip");
    tweet.metrics.likes = 5;
    let json = tweet.to_message().to_json().unwrap();
    let decoded = decode_tweet(&json).unwrap();
    assert_eq!(decoded.tweet_id, tweet.tweet_id);
    assert_eq!(decoded.metrics.likes, 5);
    assert_eq!(
        decoded.created_at.timestamp_millis(),
        tweet.created_at.timestamp_millis()
    );
}

#[test]
fn minimal_message_omits_optional_fields() {
    let json = TweetMessage::new("u", "hello").to_json().unwrap();
    assert_eq!(json, r#"{"author":"u","content":"hello"}"#);
}

#[test]
fn retweet_detection() {
    assert!(Tweet::new("u", "RT @someone: hi").is_retweet());
    assert!(!Tweet::new("u", "not RT @someone").is_retweet());
}
