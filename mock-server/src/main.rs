use tokio::net::TcpListener;

/// Listen address, from `BIND_ADDR` (default `127.0.0.1`) and `PORT`
/// (default `8000`).
struct ServerConfig {
    bind: String,
    port: u16,
}

impl ServerConfig {
    fn from_env() -> Self {
        let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);
        ServerConfig { bind, port }
    }

    fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mock_server=info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let listener = TcpListener::bind(config.addr()).await?;
    mock_server::run(listener).await
}
