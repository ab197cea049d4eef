use std::io;
use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::connection::ConnectionStatus;
use super::transport::{ReceiveCallback, Transport};

pub const MAX_FRAME_SIZE: usize = 1024 * 1024;
const FRAME_HEADER_LEN: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to start network runtime: {0}")]
    Runtime(#[from] io::Error),
}

/// Status of the current attempt. `generation` advances on every connect and
/// disconnect so a task left over from an earlier attempt cannot overwrite it.
#[derive(Debug)]
struct LinkState {
    generation: u64,
    status: ConnectionStatus,
}

type SharedLink = Arc<Mutex<LinkState>>;

fn set_status(link: &SharedLink, generation: u64, status: ConnectionStatus) {
    let mut state = link.lock();
    if state.generation == generation {
        state.status = status;
    }
}

/// Length-prefixed message transport over TCP.
///
/// Socket work runs on a private tokio runtime; the receive callback is
/// invoked from one of its worker threads.
pub struct TcpTransport {
    runtime: Runtime,
    link: SharedLink,
    callback: Option<ReceiveCallback>,
    outbound: Option<mpsc::UnboundedSender<Bytes>>,
    task: Option<JoinHandle<()>>,
}

impl TcpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("cubed-net")
            .enable_all()
            .build()?;

        Ok(Self {
            runtime,
            link: Arc::new(Mutex::new(LinkState {
                generation: 0,
                status: ConnectionStatus::Disconnected,
            })),
            callback: None,
            outbound: None,
            task: None,
        })
    }

    fn close(&mut self) -> u64 {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.outbound = None;

        let mut state = self.link.lock();
        state.generation += 1;
        state.status = ConnectionStatus::Disconnected;
        state.generation
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, address: &str) {
        let generation = self.close();
        self.link.lock().status = ConnectionStatus::Connecting;

        let (tx, rx) = mpsc::unbounded_channel();
        self.outbound = Some(tx);

        let link = Arc::clone(&self.link);
        let callback = self.callback.clone();
        let address = address.to_string();

        self.task = Some(
            self.runtime
                .spawn(run_connection(address, generation, link, callback, rx)),
        );
    }

    fn disconnect(&mut self) {
        self.close();
    }

    fn send(&self, data: Bytes) {
        if let Some(outbound) = &self.outbound {
            // The receiver is gone only once the link has closed.
            let _ = outbound.send(data);
        }
    }

    fn status(&self) -> ConnectionStatus {
        self.link.lock().status
    }

    fn set_receive_callback(&mut self, callback: ReceiveCallback) {
        self.callback = Some(callback);
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_connection(
    address: String,
    generation: u64,
    link: SharedLink,
    callback: Option<ReceiveCallback>,
    mut outbound: mpsc::UnboundedReceiver<Bytes>,
) {
    let stream = match TcpStream::connect(address.as_str()).await {
        Ok(stream) => stream,
        Err(e) => {
            log::warn!("Failed to connect to {}: {}", address, e);
            set_status(&link, generation, ConnectionStatus::FailedToConnect);
            return;
        }
    };

    if let Err(e) = stream.set_nodelay(true) {
        log::debug!("Could not disable Nagle on {}: {}", address, e);
    }

    set_status(&link, generation, ConnectionStatus::Connected);
    log::debug!("TCP link to {} established", address);

    let (mut reader, mut writer) = stream.into_split();

    let read_loop = async {
        while let Some(frame) = read_frame(&mut reader).await? {
            if let Some(callback) = &callback {
                callback(frame.as_slice());
            }
        }
        Ok::<(), io::Error>(())
    };

    let write_loop = async {
        while let Some(data) = outbound.recv().await {
            write_frame(&mut writer, &data).await?;
        }
        Ok::<(), io::Error>(())
    };

    let result = tokio::select! {
        result = read_loop => result,
        result = write_loop => result,
    };

    match result {
        Ok(()) => log::info!("Connection to {} closed by remote", address),
        Err(e) => log::warn!("Connection to {} lost: {}", address, e),
    }

    set_status(&link, generation, ConnectionStatus::Disconnected);
}

/// Reads one length-prefixed frame. Returns `None` on a clean end of stream.
pub async fn read_frame<R>(reader: &mut R) -> io::Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; FRAME_HEADER_LEN];
    match reader.read_exact(&mut header).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }

    let len = u32::from_le_bytes(header) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds limit", len),
        ));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload))
}

pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "frame exceeds limit",
        ));
    }

    let mut buf = BytesMut::with_capacity(FRAME_HEADER_LEN + payload.len());
    buf.put_u32_le(payload.len() as u32);
    buf.extend_from_slice(payload);
    writer.write_all(&buf).await
}
