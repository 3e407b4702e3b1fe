//! Encoding negotiation and the zlib-family encoders.

use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression as Level;
use std::io::{self, Write};

/// Supported response encodings, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// gzip (RFC 1952).
    Gzip,
    /// deflate, served as zlib (RFC 1950) the way browsers expect it.
    Deflate,
}

impl Encoding {
    /// The `Content-Encoding` token.
    pub fn token(&self) -> &'static str {
        match self {
            Encoding::Gzip => "gzip",
            Encoding::Deflate => "deflate",
        }
    }

    /// Picks the preferred encoding the client accepts, if any.
    ///
    /// Tokens with an explicit `q=0` are treated as not accepted.
    pub fn negotiate(accept_encoding: &str) -> Option<Encoding> {
        let mut gzip = false;
        let mut deflate = false;
        for part in accept_encoding.split(',') {
            let mut pieces = part.split(';');
            let token = pieces.next().unwrap_or("").trim().to_ascii_lowercase();
            let refused = pieces
                .any(|param| param.trim().replace(' ', "") == "q=0");
            if refused {
                continue;
            }
            match token.as_str() {
                "gzip" | "*" => gzip = true,
                "deflate" => deflate = true,
                _ => {}
            }
        }
        if gzip {
            Some(Encoding::Gzip)
        } else if deflate {
            Some(Encoding::Deflate)
        } else {
            None
        }
    }

    /// Encodes `body` at default quality.
    pub fn encode(&self, body: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Encoding::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Level::default());
                encoder.write_all(body)?;
                encoder.finish()
            }
            Encoding::Deflate => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Level::default());
                encoder.write_all(body)?;
                encoder.finish()
            }
        }
    }
}
