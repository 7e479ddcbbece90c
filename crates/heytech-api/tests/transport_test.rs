#![allow(clippy::unwrap_used)]
// Integration tests for the TCP line transport against a local listener.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use heytech_api::protocol::{Action, encode};
use heytech_api::transport::{self, TransportConfig};
use heytech_api::{DeviceEvent, Error, decode};

// ── Helpers ─────────────────────────────────────────────────────────

async fn listener() -> (TcpListener, TransportConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, TransportConfig::new("127.0.0.1", port))
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_lines_flow_both_ways() {
    let (listener, config) = listener().await;

    let device = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (rd, mut wr) = socket.into_split();
        let mut rd = BufReader::new(rd);
        let mut received = Vec::new();
        for _ in 0..8 {
            let mut line = String::new();
            rd.read_line(&mut line).await.unwrap();
            received.push(line);
        }
        wr.write_all(b"start_sop0,0,ende_sop\r\n").await.unwrap();
        received
    });

    let (mut reader, mut writer) = transport::connect(&config).await.unwrap();
    for line in encode(&Action::Close, &[1], None) {
        writer.write_line(&line).await.unwrap();
    }

    let line = reader.next_line().await.unwrap().unwrap();
    assert_eq!(line, "start_sop0,0,ende_sop");
    assert!(matches!(decode(&line), Some(DeviceEvent::PositionsUpdated(_))));

    let received = device.await.unwrap();
    assert_eq!(received[0], "rhi\r\n");
    assert_eq!(received[3], "1\r\n");
    assert_eq!(received[4], "down\r\n");
}

#[tokio::test]
async fn test_latin1_names_survive() {
    let (listener, config) = listener().await;

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        // "Küche" in Latin-1
        socket
            .write_all(b"start_smn2,K\xfcche,0,ende_smn\r\n")
            .await
            .unwrap();
    });

    let (mut reader, _writer) = transport::connect(&config).await.unwrap();
    let line = reader.next_line().await.unwrap().unwrap();
    assert_eq!(
        decode(&line),
        Some(DeviceEvent::ChannelNamed {
            channel: 2,
            name: "Küche".into(),
        })
    );
}

#[tokio::test]
async fn test_eof_is_none() {
    let (listener, config) = listener().await;

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        drop(socket);
    });

    let (mut reader, _writer) = transport::connect(&config).await.unwrap();
    assert!(reader.next_line().await.unwrap().is_none());
}

#[tokio::test]
async fn test_connect_refused() {
    // Bind and drop to get a port nobody listens on.
    let (listener, mut config) = listener().await;
    drop(listener);
    config.connect_timeout = Duration::from_secs(2);

    let result = transport::connect(&config).await;
    assert!(
        matches!(result, Err(Error::Io(_) | Error::ConnectTimeout { .. })),
        "expected connect failure"
    );
}

#[tokio::test]
async fn test_unterminated_line_is_bounded() {
    let (listener, config) = listener().await;

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let junk = vec![b'x'; transport::MAX_LINE_LEN + 100];
        socket.write_all(&junk).await.unwrap();
        // Keep the socket open so the reader cannot fall back to EOF.
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let (mut reader, _writer) = transport::connect(&config).await.unwrap();
    let result = reader.next_line().await;
    assert!(
        matches!(result, Err(Error::LineTooLong { limit }) if limit == transport::MAX_LINE_LEN),
        "expected an oversized line error, got {result:?}"
    );
}

#[tokio::test]
async fn test_line_at_the_limit_is_accepted() {
    let (listener, config) = listener().await;

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut line = vec![b'a'; transport::MAX_LINE_LEN - 2];
        line.extend_from_slice(b"\r\n");
        socket.write_all(&line).await.unwrap();
    });

    let (mut reader, _writer) = transport::connect(&config).await.unwrap();
    let line = reader.next_line().await.unwrap().unwrap();
    assert_eq!(line.len(), transport::MAX_LINE_LEN - 2);
}
