use crate::config::AppConfig;
use crate::processor::message_processor;
use crate::state::AppState;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Consumes device SOS triggers with SASL authentication. After
/// `kafka_max_retries` consecutive receive errors the consumer backs off for
/// the circuit-breaker cooldown.
pub async fn start_kafka_consumer(
    config: &AppConfig,
    state: Arc<AppState>,
) -> anyhow::Result<()> {
    info!("Initializing Kafka consumer for topic: {}", config.kafka_topic);

    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", &config.kafka_bootstrap_servers)
        .set("group.id", &config.kafka_group_id)
        .set("auto.offset.reset", &config.kafka_auto_offset_reset)
        .set("security.protocol", &config.kafka_security_protocol)
        .set("sasl.mechanism", &config.kafka_sasl_mechanism)
        .set("sasl.username", &config.kafka_username)
        .set("sasl.password", &config.kafka_password);

    let consumer: StreamConsumer = client_config.create()?;

    consumer.subscribe(&[&config.kafka_topic])?;
    info!("Subscribed to topic: {}", config.kafka_topic);

    let mut consecutive_failures = 0;
    let max_retries = config.kafka_max_retries;
    let cooldown_duration = Duration::from_secs(config.kafka_circuit_breaker_cooldown);

    loop {
        if consecutive_failures >= max_retries {
            warn!(
                "Circuit breaker tripped ({} consecutive failures)! Sleeping for {} seconds...",
                consecutive_failures, config.kafka_circuit_breaker_cooldown
            );
            tokio::time::sleep(cooldown_duration).await;
            consecutive_failures = 0;
            info!("Circuit breaker reset. Resuming consumption.");
        }

        match consumer.recv().await {
            Ok(m) => {
                consecutive_failures = 0;

                let payload = match m.payload() {
                    None => {
                        warn!("Received empty payload from Kafka");
                        continue;
                    }
                    Some(p) => p.to_vec(),
                };

                let state = state.clone();
                // an SOS must not wait behind the next receive
                tokio::spawn(async move {
                    if let Err(e) = message_processor::process_message(
                        state.store.as_ref(),
                        &state.settings,
                        &payload,
                    )
                    .await
                    {
                        error!("Error processing device SOS: {}", e);
                    }
                });
            }
            Err(e) => {
                consecutive_failures += 1;
                error!(
                    "Kafka error: {}. Failure count ({} / {})",
                    e, consecutive_failures, max_retries
                );

                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }
}
