use annotation_events::{AnnotationPlugin, CustomEvent, EventTarget, PluginError, PluginOptions};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Reads one JSON event per line from stdin, e.g.
/// `{"type": "openAnnotation", "detail": {"id": 1}}`, triggers it on the
/// plugin and prints every event the plugin sees as a JSON line.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), PluginError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "annotation_events=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = match std::env::var("ANNOTATION_OPTIONS") {
        Ok(path) => {
            info!(path = %path, "Loading plugin options");
            PluginOptions::from_path(path)?
        }
        Err(_) => PluginOptions::default(),
    };

    let plugin = AnnotationPlugin::new(options);

    let mut events = plugin.subscribe_events();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!(error = %e, "Failed to serialize event"),
                },
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event printer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<CustomEvent>(line) {
            Ok(event) => {
                plugin.trigger(event);
                // Let the printer drain before the next event
                tokio::task::yield_now().await;
            }
            Err(e) => warn!(error = %e, "Skipping invalid event line"),
        }
    }

    info!(
        annotations = plugin.annotation_state().annotations().len(),
        "Input closed, shutting down"
    );
    drop(plugin);
    if let Err(e) = printer.await {
        warn!(error = %e, "Event printer task failed");
    }
    Ok(())
}
