//! Scripted HTTP server for exercising the real clients.
//!
//! Each accepted connection is answered with the next [`Exchange`] and then
//! closed, so reqwest never reuses a connection between exchanges.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;
use std::time::Duration;

/// One canned response.
pub struct Exchange {
    head: String,
    chunks: Vec<Vec<u8>>,
    pause: Duration,
}

impl Exchange {
    pub fn status(status: &str, headers: &[(&str, &str)], body: &[u8]) -> Self {
        let mut head = format!("HTTP/1.1 {status}\r\n");
        for (name, value) in headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        ));
        Self {
            head,
            chunks: vec![body.to_vec()],
            pause: Duration::ZERO,
        }
    }

    pub fn ok(body: &[u8]) -> Self {
        Self::status("200 OK", &[], body)
    }

    pub fn redirect(location: &str) -> Self {
        Self::status("302 Found", &[("Location", location)], b"")
    }

    /// Sends `body` in `parts` chunks with `pause` before each one.
    #[must_use]
    pub fn trickle(mut self, parts: usize, pause: Duration) -> Self {
        let body = self.chunks.concat();
        let size = body.len().div_ceil(parts).max(1);
        self.chunks = body.chunks(size).map(<[u8]>::to_vec).collect();
        self.pause = pause;
        self
    }

    /// Announces `announced` bytes but sends only the body, then hangs up.
    #[must_use]
    pub fn truncated(mut self, announced: usize) -> Self {
        let sent = self.chunks.iter().map(Vec::len).sum::<usize>();
        self.head = self.head.replace(
            &format!("Content-Length: {sent}\r\n"),
            &format!("Content-Length: {announced}\r\n"),
        );
        self
    }
}

/// Local server answering one connection per exchange, in order.
pub struct TestServer {
    listener: TcpListener,
    base: String,
}

impl TestServer {
    pub fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        Self { listener, base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn serve(self, exchanges: Vec<Exchange>) -> JoinHandle<()> {
        std::thread::spawn(move || {
            for exchange in exchanges {
                let (mut stream, _) = self.listener.accept().unwrap();
                let mut request = [0_u8; 4096];
                let _ = stream.read(&mut request);

                stream.write_all(exchange.head.as_bytes()).unwrap();
                stream.flush().unwrap();
                for chunk in &exchange.chunks {
                    std::thread::sleep(exchange.pause);
                    if stream.write_all(chunk).is_err() {
                        break;
                    }
                    let _ = stream.flush();
                }
            }
        })
    }
}
