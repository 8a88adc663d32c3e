use std::io::Cursor;

use bytes::{Buf, Bytes, BytesMut};
use protocol::{FrameError, Response, frame};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;

use crate::ServerError;

/// One end of a client connection: reads and writes whole frames.
///
/// Used by both the server side handler and the [`crate::Client`].
#[derive(Debug)]
pub struct Connection {
    stream: BufWriter<TcpStream>,
    buffer: BytesMut,
}

impl Connection {
    pub fn new(socket: TcpStream) -> Connection {
        Connection {
            stream: BufWriter::new(socket),
            buffer: BytesMut::with_capacity(4 * 1024),
        }
    }

    /// Reads the next frame body.
    ///
    /// Returns `Ok(None)` when the peer closes the stream cleanly between two
    /// frames. A close in the middle of a frame is `ConnectionReset`.
    pub async fn read_frame(&mut self) -> Result<Option<Bytes>, ServerError> {
        loop {
            if let Some(body) = self.parse_frame()? {
                return Ok(Some(body));
            }

            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                if self.buffer.is_empty() {
                    return Ok(None);
                } else {
                    return Err(ServerError::ConnectionReset);
                }
            }
        }
    }

    fn parse_frame(&mut self) -> Result<Option<Bytes>, ServerError> {
        let mut buf = Cursor::new(&self.buffer[..]);

        match frame::check(&mut buf) {
            Ok(()) => {
                let len = buf.position() as usize;

                buf.set_position(0);
                let body = frame::parse(&mut buf)?;

                self.buffer.advance(len);

                Ok(Some(body))
            }
            Err(FrameError::Incomplete) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn write_frame(&mut self, body: &[u8]) -> Result<(), ServerError> {
        let framed = frame::encode(body)?;

        self.stream.write_all(&framed).await?;
        self.stream.flush().await?;

        Ok(())
    }

    /// Encodes a message as JSON and writes it as one frame.
    pub async fn write_message<T: Serialize>(&mut self, message: &T) -> Result<(), ServerError> {
        let body = protocol::encode(message)?;
        self.write_frame(&body).await
    }

    /// Writes a response. Never fails on the response's own content: an
    /// oversized or unencodable one is replaced with an error response.
    pub async fn write_response(&mut self, response: &Response) -> Result<(), ServerError> {
        let body = protocol::encode_response(response);
        self.write_frame(&body).await
    }

    /// Reads one frame and decodes it, or `None` on a clean close.
    pub async fn read_message<T: DeserializeOwned>(&mut self) -> Result<Option<T>, ServerError> {
        match self.read_frame().await? {
            Some(body) => Ok(Some(protocol::decode(&body)?)),
            None => Ok(None),
        }
    }
}
