//! Docker-backed test harness, shared by the integration test binaries.
//! Mirrors the teacher's `db/tests/harness.rs` redis container helper.

use testcontainers_modules::{
    redis::Redis,
    testcontainers::{ContainerAsync, runners::AsyncRunner},
};

/// Start a Redis container and return its connection URL and the container
/// handle. The container stays alive as long as the handle is held.
pub async fn create_redis_container() -> (String, ContainerAsync<Redis>) {
    let container = Redis::default()
        .start()
        .await
        .expect("failed to start redis container");

    let host = container.get_host().await.expect("failed to get host");
    let port = container
        .get_host_port_ipv4(6379)
        .await
        .expect("failed to get port");

    (format!("redis://{host}:{port}"), container)
}
