use widgetstore::{StoreConfig, WidgetStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = StoreConfig::from_env();
    let store = match WidgetStore::init(config.clone()).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, path = %config.path.display(), "widget store init failed");
            std::process::exit(1);
        }
    };

    let widgets = store.get_widget_list().await;
    tracing::info!(count = widgets.len(), path = %config.path.display(), "widgets listed");
    match serde_json::to_string_pretty(&widgets) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "failed to render widget list"),
    }

    if let Err(e) = store.close().await {
        tracing::error!(error = %e, "final flush failed");
        std::process::exit(1);
    }
}
