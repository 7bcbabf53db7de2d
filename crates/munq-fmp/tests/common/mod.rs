#![allow(dead_code)]

use munq_fmp::Config;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Loopback HTTP server answering every request with one canned response and
/// recording each request line it saw.
pub struct CannedServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl CannedServer {
    pub async fn start(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
        let addr = listener.local_addr().expect("local address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();
        let body = body.to_string();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut head = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => head.extend_from_slice(&chunk[..n]),
                    }
                    if head.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let request_line = String::from_utf8_lossy(&head)
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .to_string();
                seen.lock().expect("request log").push(request_line);

                let response = format!(
                    "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    reason(status),
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self {
            base_url: format!("http://{addr}/api/v3"),
            requests,
        }
    }

    pub fn config(&self) -> Config {
        Config::new(&self.base_url, "XYZ").expect("loopback config")
    }

    /// Request lines, e.g. `GET /api/v3/search?query=tsla&limit=9&apikey=XYZ HTTP/1.1`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("request log").clone()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Error",
    }
}

/// Client that ignores proxy settings from the environment.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("test client")
}

/// A base URL on a port nothing listens on.
pub fn closed_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let port = listener.local_addr().expect("local address").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/api/v3")
}

pub const TSLA_1MIN: &str = r#"[
  {"date":"2021-01-05 09:32:00","open":726.10,"low":725.50,"high":727.00,"close":726.80,"volume":98000},
  {"date":"2021-01-05 09:31:00","open":725.00,"low":724.10,"high":726.40,"close":726.10,"volume":120500},
  {"date":"2021-01-05 09:30:00","open":723.66,"low":722.00,"high":725.20,"close":725.00,"volume":310200}
]"#;

pub const TSLA_EOD: &str = r#"{
  "symbol":"TSLA",
  "historical":[
    {"date":"2021-01-05","open":723.66,"high":740.84,"low":719.2,"close":735.11,"adjClose":245.04,"volume":32245200,"unadjustedVolume":32245200,"change":11.45,"changePercent":1.582,"vwap":731.72,"label":"January 05, 21","changeOverTime":0.01582},
    {"date":"2021-01-04","open":719.46,"high":744.49,"low":717.19,"close":729.77,"adjClose":243.26,"volume":48638200,"unadjustedVolume":48638200,"change":10.31,"changePercent":1.433,"vwap":730.48,"label":"January 04, 21","changeOverTime":0.01433}
  ]
}"#;
