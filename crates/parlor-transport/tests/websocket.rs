//! Round-trip tests against a real socket.

use futures_util::{SinkExt, StreamExt};
use parlor_transport::{Connection, Transport, WsListener};
use tokio_tungstenite::tungstenite::Message;

async fn listener() -> (WsListener, String) {
    let listener = WsListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    (listener, addr)
}

#[tokio::test]
async fn text_frames_round_trip() {
    let (mut listener, addr) = listener().await;

    let client = tokio::spawn(async move {
        let (mut ws, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}"))
                .await
                .unwrap();
        ws.send(Message::text("ping")).await.unwrap();
        let reply = ws.next().await.unwrap().unwrap();
        assert_eq!(reply.into_text().unwrap().as_str(), "pong");
    });

    let conn = listener.accept().await.unwrap();
    assert_eq!(conn.recv().await.unwrap(), Some("ping".to_string()));
    conn.send("pong").await.unwrap();

    client.await.unwrap();
}

#[tokio::test]
async fn binary_utf8_frames_are_accepted() {
    let (mut listener, addr) = listener().await;

    let client = tokio::spawn(async move {
        let (mut ws, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}"))
                .await
                .unwrap();
        ws.send(Message::Binary(b"{\"ok\":true}".to_vec().into()))
            .await
            .unwrap();
    });

    let conn = listener.accept().await.unwrap();
    assert_eq!(
        conn.recv().await.unwrap(),
        Some("{\"ok\":true}".to_string())
    );
    client.await.unwrap();
}

#[tokio::test]
async fn clean_close_yields_none() {
    let (mut listener, addr) = listener().await;

    let client = tokio::spawn(async move {
        let (mut ws, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}"))
                .await
                .unwrap();
        ws.close(None).await.unwrap();
    });

    let conn = listener.accept().await.unwrap();
    assert_eq!(conn.recv().await.unwrap(), None);
    client.await.unwrap();
}

#[tokio::test]
async fn connection_ids_are_unique() {
    let (mut listener, addr) = listener().await;
    let url = format!("ws://{addr}");

    // The upgrade handshake only completes once the server accepts, so
    // drive both sides together.
    let (client1, accepted1) =
        tokio::join!(tokio_tungstenite::connect_async(url.clone()), listener.accept());
    let _client1 = client1.unwrap();
    let a = accepted1.unwrap();

    let (client2, accepted2) =
        tokio::join!(tokio_tungstenite::connect_async(url), listener.accept());
    let _client2 = client2.unwrap();
    let b = accepted2.unwrap();

    assert_ne!(a.id(), b.id());
}
