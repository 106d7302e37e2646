// Common test utilities

#![allow(dead_code)]

use drp_inventory::Machine;
use serde_json::Value;
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ServerConfig, ServerConnection, StreamOwned};
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A stand-in DRP endpoint that answers exactly one request with a canned
/// response and hands back the raw request text.
pub struct FakeDrp {
    pub url: String,
    handle: JoinHandle<String>,
}

impl FakeDrp {
    pub fn serve_once(status_line: &str, content_type: &str, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = http_response(status_line, content_type, body);
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream).unwrap();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            request
        });
        Self { url: format!("http://{}", addr), handle }
    }

    pub fn json(body: &str) -> Self {
        Self::serve_once("200 OK", "application/json", body)
    }

    /// The request the server received, lowercased for header matching
    pub fn request(self) -> String {
        self.handle.join().unwrap().to_lowercase()
    }
}

fn http_response(status_line: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line, content_type, body.len(), body
    )
}

fn read_request<S: Read>(stream: &mut S) -> io::Result<String> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
        if request.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&request).to_string())
}

/// Like `FakeDrp`, but over TLS with a freshly generated self-signed
/// certificate for 127.0.0.1.
pub struct FakeTlsDrp {
    pub url: String,
    handle: JoinHandle<io::Result<String>>,
}

impl FakeTlsDrp {
    pub fn json(body: &str) -> Self {
        let certified = rcgen::generate_simple_self_signed(vec!["127.0.0.1".to_string(), "localhost".to_string()]).unwrap();
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(certified.key_pair.serialize_der()));
        let config = ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(vec![certified.cert.der().clone()], key)
            .unwrap();
        let config = Arc::new(config);

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = http_response("200 OK", "application/json", body);
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept()?;
            let conn = ServerConnection::new(config).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            let mut tls: StreamOwned<ServerConnection, TcpStream> = StreamOwned::new(conn, stream);
            let request = read_request(&mut tls)?;
            tls.write_all(response.as_bytes())?;
            tls.conn.send_close_notify();
            tls.flush()?;
            Ok(request)
        });
        Self { url: format!("https://{}", addr), handle }
    }

    /// The request the server received, or the handshake failure.
    pub fn request(self) -> io::Result<String> {
        self.handle.join().unwrap().map(|r| r.to_lowercase())
    }
}

pub fn machine(value: Value) -> Machine {
    match value {
        Value::Object(map) => map,
        _ => panic!("test machine must be a JSON object"),
    }
}

pub const MACHINES_JSON: &str = r#"[
  {"Name": "d52-54-00-11-22-33", "Uuid": "0f5c8a4e", "Address": "10.0.0.11", "Stage": "discover", "Runnable": true},
  {"Name": "d52-54-00-44-55-66", "Uuid": "7a9be2c1", "Address": "10.0.0.12", "Stage": "boot", "Runnable": false}
]"#;
