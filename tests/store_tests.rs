use anyhow::Result;
use testcontainers::{
    GenericImage,
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
};
use wxpush_service::{
    clients::{redis::RedisStore, store::ContentStore},
    models::message::AlertMessage,
    utils::MESSAGE_TTL_SECONDS,
};

/// Test: Redis round-trips the stored record and applies the retention TTL
#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_redis_store_put_get_and_ttl() -> Result<()> {
    let container = GenericImage::new("redis", "7.2.4")
        .with_exposed_port(6379.tcp())
        .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
        .start()
        .await?;

    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(6379.tcp()).await?;
    let redis_url = format!("redis://{}:{}", host, port);

    let store = RedisStore::connect(&redis_url).await?;
    store.ping().await?;

    let alert = AlertMessage::new("Sell alert".to_string(), "Price: 99".to_string());
    let payload = serde_json::to_string(&alert.to_stored())?;

    store.put(&alert.id, &payload, MESSAGE_TTL_SECONDS).await?;

    assert_eq!(store.get(&alert.id).await?, Some(payload));
    assert_eq!(store.get("missing-id").await?, None);

    let client = redis::Client::open(redis_url.as_str())?;
    let mut conn = client.get_multiplexed_async_connection().await?;
    let ttl: i64 = redis::cmd("TTL").arg(&alert.id).query_async(&mut conn).await?;

    assert!(ttl > 0 && ttl <= MESSAGE_TTL_SECONDS as i64, "unexpected ttl {}", ttl);

    Ok(())
}
