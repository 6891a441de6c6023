//! Canned HTTP server for exercising the route-matrix client.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

/// A request as received by [`CannedServer`].
#[derive(Debug, Clone, Default)]
pub struct CapturedRequest {
    /// Request line, such as `POST /matrix HTTP/1.1`.
    pub request_line: String,
    /// Header lines with lower-cased names.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: String,
}

impl CapturedRequest {
    /// Value of header `name`, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Single-shot HTTP server answering one request with a fixed response.
#[derive(Debug)]
pub struct CannedServer {
    /// Endpoint URL to configure on the client.
    pub endpoint: String,
    handle: JoinHandle<CapturedRequest>,
}

impl CannedServer {
    /// Serve `body` with `status` to the first connection.
    pub fn start(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let port = listener.local_addr().expect("local address").port();
        let response = format!(
            "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept connection");
            serve(stream, &response)
        });
        Self {
            endpoint: format!("http://127.0.0.1:{port}/distanceMatrix/v2:computeRouteMatrix"),
            handle,
        }
    }

    /// Wait for the request to complete and return what was received.
    pub fn captured(self) -> CapturedRequest {
        self.handle.join().expect("server thread")
    }
}

/// Endpoint on a loopback port with nothing listening.
pub fn refused_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let port = listener.local_addr().expect("local address").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/matrix")
}

fn serve(stream: TcpStream, response: &str) -> CapturedRequest {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut captured = CapturedRequest::default();
    reader
        .read_line(&mut captured.request_line)
        .expect("read request line");
    captured.request_line = captured.request_line.trim_end().to_owned();

    let mut content_length = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read header");
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().to_owned();
            if name == "content-length" {
                content_length = value.parse().expect("numeric content-length");
            }
            captured.headers.push((name, value));
        }
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).expect("read body");
    captured.body = String::from_utf8(body).expect("utf-8 body");

    let mut stream = stream;
    stream
        .write_all(response.as_bytes())
        .expect("write response");
    stream.flush().expect("flush response");
    captured
}
