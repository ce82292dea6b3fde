// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Certificate handling against a local TLS server with a self-signed certificate

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use synchttp::{ClientConfig, HttpClient};

/// Start a TLS server answering every request with `ok`; returns its port
fn spawn_self_signed_server() -> u16 {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let chain = vec![rustls::Certificate(cert.serialize_der().unwrap())];
    let key = rustls::PrivateKey(cert.serialize_private_key_der());
    let config = Arc::new(
        rustls::ServerConfig::builder()
            .with_safe_defaults()
            .with_no_client_auth()
            .with_single_cert(chain, key)
            .unwrap(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let config = Arc::clone(&config);
            // Reachability checks connect and hang up; those just fail the handshake
            thread::spawn(move || {
                let _ = serve(config, stream);
            });
        }
    });
    port
}

fn serve(config: Arc<rustls::ServerConfig>, stream: TcpStream) -> io::Result<()> {
    let conn = rustls::ServerConnection::new(config)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let mut tls = rustls::StreamOwned::new(conn, stream);

    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = tls.read(&mut buf)?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&buf[..n]);
    }

    tls.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok")?;
    tls.conn.send_close_notify();
    tls.flush()
}

#[test]
fn test_self_signed_accepted_without_verification() {
    let port = spawn_self_signed_server();
    let mut client = HttpClient::with_config(ClientConfig::default());

    let response = client.get(&format!("https://127.0.0.1:{}/", port), "");

    assert!(response.error.is_empty(), "aborted: {}", response.error);
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, b"ok");
}

#[test]
fn test_self_signed_rejected_with_verification() {
    let port = spawn_self_signed_server();
    let mut client = HttpClient::with_config(ClientConfig::default().verify_tls(true));

    let response = client.get(&format!("https://127.0.0.1:{}/", port), "");

    assert!(
        response.error == "receive response failed" || response.error == "send request failed",
        "unexpected outcome: {:?}",
        response.error
    );
    assert_eq!(response.status_code, 0);
    assert!(response.body.is_empty());
}
