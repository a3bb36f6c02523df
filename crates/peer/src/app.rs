use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use tandem::{PointerButton, Session, SessionConfig};

use crate::transport::{BusClient, BusError};

/// Fixed-timestep accumulator for the tick activity.
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            dt: 1.0 / tick_rate as f32,
            accumulator: 0.0,
        }
    }

    pub fn accumulate(&mut self, delta: f32) {
        // cap catch-up after stalls
        self.accumulator += delta.min(0.25);
    }

    pub fn consume_tick(&mut self) -> bool {
        if self.accumulator >= self.dt {
            self.accumulator -= self.dt;
            true
        } else {
            false
        }
    }
}

/// One running peer: session plus transport plus the tick cadence. The
/// receive thread lives inside [`BusClient`]; this struct drives the tick
/// side and forwards pointer input.
pub struct PeerApp {
    session: Arc<Session>,
    bus: Arc<BusClient>,
    timestep: FixedTimestep,
    last_update: Instant,
    recv_handle: Option<JoinHandle<()>>,
}

impl PeerApp {
    pub fn connect(config: SessionConfig) -> io::Result<Self> {
        let timestep = FixedTimestep::new(config.tick_rate);
        let session = Arc::new(Session::new(config));
        let bus = Arc::new(BusClient::connect(&session.config().broker_addr)?);
        bus.subscribe_all().map_err(io_error)?;
        let recv_handle = bus.spawn_receiver(Arc::clone(&session))?;

        log::info!(
            "{}: joined as {} peer",
            session.config().process_name,
            session.config().role.as_str()
        );

        Ok(Self {
            session,
            bus,
            timestep,
            last_update: Instant::now(),
            recv_handle: Some(recv_handle),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run all ticks the elapsed time owes us, publishing one position
    /// batch per tick while simulation is enabled.
    pub fn update(&mut self) -> Result<(), BusError> {
        let now = Instant::now();
        let delta = now.duration_since(self.last_update).as_secs_f32();
        self.last_update = now;
        self.timestep.accumulate(delta);

        while self.timestep.consume_tick() {
            if let Some(batch) = self.session.handle_tick() {
                self.bus.publish(&batch)?;
            }
        }
        Ok(())
    }

    pub fn pointer_moved(&self, x: f32, y: f32) -> Result<(), BusError> {
        if let Some(message) = self.session.pointer_moved(x, y) {
            self.bus.publish(&message)?;
        }
        Ok(())
    }

    pub fn pointer_pressed(&self, button: PointerButton) {
        self.session.pointer_pressed(button);
    }

    /// Stop the receive activity and join it before the session drops.
    pub fn shutdown(&mut self) {
        self.bus.shutdown();
        if let Some(handle) = self.recv_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PeerApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn io_error(err: BusError) -> io::Error {
    match err {
        BusError::Io(err) => err,
        BusError::Encode(err) => io::Error::new(io::ErrorKind::InvalidData, err),
    }
}
