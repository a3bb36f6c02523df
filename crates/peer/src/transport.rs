use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use tandem::{BusFrame, Message, Session, TOPICS};

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("bus i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("frame encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Blocking TCP adapter to the broker. Publishing goes through a mutexed
/// writer so the tick loop and the receive thread can both emit; receiving
/// happens on one dedicated thread, one frame at a time, dispatched
/// synchronously into the session.
pub struct BusClient {
    stream: TcpStream,
    writer: Mutex<BufWriter<TcpStream>>,
    running: Arc<AtomicBool>,
}

impl BusClient {
    pub fn connect(addr: &str) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let writer = BufWriter::new(stream.try_clone()?);

        Ok(Self {
            stream,
            writer: Mutex::new(writer),
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    pub fn subscribe_all(&self) -> Result<(), BusError> {
        let frame = BusFrame::Subscribe {
            topics: TOPICS.iter().map(|t| t.to_string()).collect(),
        };
        self.send(&frame)
    }

    pub fn publish(&self, message: &Message) -> Result<(), BusError> {
        let frame = BusFrame::publish(message.topic(), message.to_payload());
        self.send(&frame)
    }

    fn send(&self, frame: &BusFrame) -> Result<(), BusError> {
        let line = frame.encode_line()?;
        let mut writer = self.writer_lock();
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Spawn the receive activity. It exits when the broker closes the
    /// connection or [`BusClient::shutdown`] runs.
    pub fn spawn_receiver(
        self: &Arc<Self>,
        session: Arc<Session>,
    ) -> io::Result<thread::JoinHandle<()>> {
        let reader = BufReader::new(self.stream.try_clone()?);
        let bus = Arc::clone(self);
        thread::Builder::new()
            .name("bus-recv".to_string())
            .spawn(move || bus.receive_loop(reader, &session))
    }

    fn receive_loop(&self, reader: BufReader<TcpStream>, session: &Session) {
        for line in reader.lines() {
            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    if self.running.load(Ordering::SeqCst) {
                        log::error!("bus read failed: {err}");
                    }
                    break;
                }
            };
            if line.is_empty() {
                continue;
            }

            let frame = match BusFrame::decode_line(&line) {
                Ok(frame) => frame,
                Err(err) => {
                    log::warn!("dropping malformed frame: {err}");
                    continue;
                }
            };
            let BusFrame::Publish { topic, payload } = frame else {
                continue;
            };
            let message = match Message::decode(&topic, &payload) {
                Ok(message) => message,
                Err(err) => {
                    log::warn!("dropping inbound message: {err}");
                    continue;
                }
            };

            for consequence in session.handle_message(&message) {
                if let Err(err) = self.publish(&consequence) {
                    log::error!("publish of {} failed: {err}", consequence.topic());
                }
            }
        }
        log::debug!("receive loop stopped");
    }

    /// Unblock and stop the receive thread. Must run before the session is
    /// torn down so no dispatch lands after teardown begins.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.stream.shutdown(Shutdown::Both);
    }

    fn writer_lock(&self) -> MutexGuard<'_, BufWriter<TcpStream>> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
