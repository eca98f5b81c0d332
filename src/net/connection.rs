use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, info};

/// Bytes requested per blocking read.
pub const READ_CHUNK_SIZE: usize = 4096;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that end a chat connection.
#[derive(Debug)]
pub enum TransportError {
    /// Could not reach the server.
    Connect { addr: String, source: io::Error },
    /// Writing to the socket failed (broken pipe, reset).
    Send(io::Error),
    /// Reading from the socket failed (reset, aborted).
    Receive(io::Error),
    /// The send half was already closed.
    Closed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Connect { addr, source } => {
                write!(f, "could not connect to {addr}: {source}")
            }
            TransportError::Send(e) => write!(f, "send failed: {e}"),
            TransportError::Receive(e) => write!(f, "connection lost: {e}"),
            TransportError::Closed => write!(f, "connection already closed"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Connect { source, .. } => Some(source),
            TransportError::Send(e) | TransportError::Receive(e) => Some(e),
            TransportError::Closed => None,
        }
    }
}

/// Outbound half of a connection. Used only from the UI loop.
pub trait LineSender: Send {
    /// Sends one line; the newline terminator is added here.
    fn send(&mut self, text: &str) -> Result<(), TransportError>;

    /// Closes the connection. Closing twice is a no-op.
    fn close(&mut self) -> Result<(), TransportError>;
}

/// Inbound half of a connection. Used only from the receive task.
pub trait ByteReceiver: Send {
    /// Blocks until bytes arrive. An empty vector means the peer closed the
    /// stream gracefully.
    fn receive(&mut self) -> Result<Vec<u8>, TransportError>;
}

/// A TCP chat connection, split into its two halves.
pub struct TcpConnection {
    pub sender: TcpLineSender,
    pub receiver: TcpByteReceiver,
}

impl TcpConnection {
    pub fn connect(host: &str, port: u16) -> Result<Self, TransportError> {
        let addr = format!("{host}:{port}");
        let connect_error = |source| TransportError::Connect {
            addr: addr.clone(),
            source,
        };

        let mut last_error = io::Error::new(io::ErrorKind::NotFound, "no addresses resolved");
        let resolved = (host, port).to_socket_addrs().map_err(connect_error)?;
        for socket_addr in resolved {
            debug!("Trying {}", socket_addr);
            match TcpStream::connect_timeout(&socket_addr, CONNECT_TIMEOUT) {
                Ok(stream) => {
                    info!("Connected to {} ({})", addr, socket_addr);
                    return Self::from_stream(stream).map_err(connect_error);
                }
                Err(e) => last_error = e,
            }
        }
        Err(connect_error(last_error))
    }

    /// Splits an established stream into independent send and receive halves.
    pub fn from_stream(stream: TcpStream) -> io::Result<Self> {
        stream.set_nodelay(true)?;
        let reader = stream.try_clone()?;
        Ok(Self {
            sender: TcpLineSender {
                stream,
                closed: false,
            },
            receiver: TcpByteReceiver { stream: reader },
        })
    }
}

pub struct TcpLineSender {
    stream: TcpStream,
    closed: bool,
}

impl LineSender for TcpLineSender {
    fn send(&mut self, text: &str) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let mut frame = String::with_capacity(text.len() + 1);
        frame.push_str(text);
        frame.push('\n');
        self.stream
            .write_all(frame.as_bytes())
            .and_then(|()| self.stream.flush())
            .map_err(TransportError::Send)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // The peer may already have gone away
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(TransportError::Send(e)),
        }
    }
}

pub struct TcpByteReceiver {
    stream: TcpStream,
}

impl ByteReceiver for TcpByteReceiver {
    fn receive(&mut self) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        loop {
            match self.stream.read(&mut buf) {
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(buf);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransportError::Receive(e)),
            }
        }
    }
}
