//! In-process WebSocket server for exercising the client end to end

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

pub struct MockServer {
    pub url: String,
    pub handle: JoinHandle<ServerLog>,
}

/// What the server saw over the life of the connection
#[derive(Debug)]
pub struct ServerLog {
    /// Every text frame received, in order
    pub received: Vec<String>,
    /// The stream ended with `None` rather than a transport error, i.e. the
    /// client completed the closing handshake
    pub clean_end: bool,
}

/// Accept one connection, wait for the first client frame, send `frames`,
/// then either close or keep the connection open until the client leaves.
pub async fn mock_server(frames: Vec<String>, close_after: bool) -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let mut received = Vec::new();

        if let Some(Ok(Message::Text(text))) = ws.next().await {
            received.push(text);
        }

        for frame in frames {
            ws.send(Message::Text(frame)).await.unwrap();
        }

        if close_after {
            let _ = ws.close(None).await;
        }

        let clean_end = loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => received.push(text),
                Some(Ok(_)) => {}
                Some(Err(_)) => break false,
                None => break true,
            }
        };

        ServerLog {
            received,
            clean_end,
        }
    });

    MockServer { url, handle }
}

/// An address nothing is listening on
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("ws://127.0.0.1:{port}")
}
