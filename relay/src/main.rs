mod kafka;

use frame_gate_common::config::Config;
use frame_gate_detector::{ChangeDetector, Relay};
use kafka::{KafkaSink, KafkaSource};
use std::path::PathBuf;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    info!(
        brokers = config.kafka.brokers,
        input_topic = config.kafka.input_topic,
        output_topic = config.kafka.output_topic,
        group_id = config.kafka.group_id,
        diff_threshold = config.detector.diff_threshold,
        accept_fraction = config.detector.accept_fraction,
        "starting frame-gate relay"
    );

    let mut source = match KafkaSource::new(&config.kafka) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to set up Kafka input");
            std::process::exit(1);
        }
    };
    info!(topic = config.kafka.input_topic, "subscribed to Kafka topic");

    let sink = match KafkaSink::new(&config.kafka) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to set up Kafka output");
            std::process::exit(1);
        }
    };

    let mut relay = Relay::new(ChangeDetector::new(config.detector), sink);

    info!("entering main relay loop");
    tokio::select! {
        _ = relay.run(&mut source) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutdown requested");
        }
    }

    let stats = relay.stats();
    info!(
        received = stats.received,
        forwarded = stats.forwarded,
        unchanged = stats.unchanged,
        rejected = stats.rejected,
        publish_failures = stats.publish_failures,
        "frame-gate relay stopped"
    );
}
