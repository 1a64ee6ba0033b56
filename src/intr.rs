//! Emulated hardware interrupts.
//!
//! Drivers request numbered IRQ lines during setup and raise them from any
//! thread afterwards. A single dispatch thread receives every raised line and
//! runs the handlers registered on it, so handlers never run in parallel with
//! each other. Raises are queued: each `raise` produces exactly one dispatch,
//! in the order the raises were made.

use std::collections::HashSet;
use std::mem;
use std::sync::mpsc::{
    self,
    Receiver,
    Sender,
};
use std::sync::{
    Arc,
    Barrier,
};
use std::thread::{
    self,
    JoinHandle,
};

use config::Config;
use dev::DeviceId;
use {
    Error,
    Result,
};

/// An interrupt line number.
pub type Irq = u32;

/// First line available to drivers. Lower lines are left to the platform.
pub const IRQ_BASE: Irq = 35;

/// Whether a line may carry more than one handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Share {
    /// Other handlers that are also `Shared` may sit on the same line.
    Shared,
    /// The handler must be alone on its line.
    Exclusive,
}

/// Reacts to an IRQ on the dispatch thread.
///
/// `dev` is the device the handler was registered for, if any. Errors are
/// logged by the dispatcher and never reach whoever raised the line.
pub trait IrqHandler: Send {
    fn handle(&mut self, irq: Irq, dev: Option<DeviceId>) -> Result<()>;
}

impl<F> IrqHandler for F
where
    F: FnMut(Irq, Option<DeviceId>) -> Result<()> + Send,
{
    fn handle(&mut self, irq: Irq, dev: Option<DeviceId>) -> Result<()> {
        self(irq, dev)
    }
}

struct Entry {
    irq: Irq,
    handler: Box<dyn IrqHandler>,
    share: Share,
    name: String,
    dev: Option<DeviceId>,
}

#[derive(Debug)]
enum Message {
    Irq(Irq),
    Terminate,
}

/// A cloneable handle for raising IRQs on the dispatch thread.
#[derive(Clone, Debug)]
pub struct IrqRaiser {
    tx: Sender<Message>,
}

impl IrqRaiser {
    /// Queues `irq` for the dispatch thread.
    ///
    /// Safe to call from any thread, including from inside a handler. Raises
    /// made before `Intr::run` are dispatched once it starts. Fails with
    /// `Error::NoOp` once the dispatch thread has stopped.
    pub fn raise(&self, irq: Irq) -> Result<()> {
        debug!("Raising IRQ {}.", irq);
        self.tx.send(Message::Irq(irq)).map_err(|_| {
            error!("Dropping IRQ {}, interrupt thread is not running.", irq);
            Error::NoOp
        })
    }
}

enum State {
    Setup {
        entries: Vec<Entry>,
        watched: HashSet<Irq>,
        rx: Receiver<Message>,
    },
    Running {
        thread: JoinHandle<()>,
    },
    Stopped,
}

/// The interrupt subsystem: a table of IRQ handlers and the thread that
/// dispatches to them.
pub struct Intr {
    state: State,
    tx: Sender<Message>,
    thread_name: String,
}

impl Intr {
    /// Creates an interrupt subsystem with an empty handler table.
    pub fn new(config: &Config) -> Intr {
        let (tx, rx) = mpsc::channel();

        Intr {
            state: State::Setup {
                entries: Vec::new(),
                watched: HashSet::new(),
                rx: rx,
            },
            tx: tx,
            thread_name: config.intr_thread_name.clone(),
        }
    }

    /// Attaches a handler to an IRQ line.
    ///
    /// A line holds several handlers only if all of them are `Shared`. The
    /// table is handed to the dispatch thread by `run`, so requests after
    /// that fail with `Error::Running`.
    pub fn request_irq<H>(
        &mut self,
        irq: Irq,
        handler: H,
        share: Share,
        name: &str,
        dev: Option<DeviceId>,
    ) -> Result<()>
    where
        H: IrqHandler + 'static,
    {
        debug!("Requesting IRQ {} ({:?}) for {}.", irq, share, name);

        let (entries, watched) = match self.state {
            State::Setup {
                ref mut entries,
                ref mut watched,
                ..
            } => (entries, watched),
            _ => {
                error!("Cannot request IRQ {} for {} after run.", irq, name);
                return Err(Error::Running);
            }
        };

        let conflict = entries
            .iter()
            .any(|entry| entry.irq == irq && (entry.share != Share::Shared || share != Share::Shared));

        if conflict {
            error!(
                "IRQ {} for {} conflicts with an already registered handler.",
                irq, name
            );
            return Err(Error::Conflict);
        }

        entries.push(Entry {
            irq: irq,
            handler: Box::new(handler),
            share: share,
            name: name.to_string(),
            dev: dev,
        });
        watched.insert(irq);

        debug!("Registered IRQ {} for {}.", irq, name);
        Ok(())
    }

    /// Returns a handle for raising IRQs, e.g. to store inside a driver.
    pub fn raiser(&self) -> IrqRaiser {
        IrqRaiser {
            tx: self.tx.clone(),
        }
    }

    /// Queues `irq` for the dispatch thread. See `IrqRaiser::raise`.
    pub fn raise(&self, irq: Irq) -> Result<()> {
        self.raiser().raise(irq)
    }

    /// Returns true while the dispatch thread is running.
    pub fn is_running(&self) -> bool {
        match self.state {
            State::Running { .. } => true,
            _ => false,
        }
    }

    /// Starts the dispatch thread and waits until it is ready to receive.
    pub fn run(&mut self) -> Result<()> {
        let (entries, watched, rx) = match mem::replace(&mut self.state, State::Stopped) {
            State::Setup {
                entries,
                watched,
                rx,
            } => (entries, watched, rx),
            state => {
                self.state = state;
                error!("Interrupt thread was already started.");
                return Err(Error::Running);
            }
        };

        let barrier = Arc::new(Barrier::new(2));
        let ready = barrier.clone();

        let thread = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || dispatch(entries, watched, rx, ready));

        let thread = match thread {
            Ok(thread) => thread,
            Err(err) => {
                error!("Failed to spawn interrupt thread: {}.", err);
                return Err(Error::IO(err));
            }
        };

        barrier.wait();
        self.state = State::Running { thread };
        Ok(())
    }

    /// Stops the dispatch thread and waits for it to exit.
    ///
    /// A handler that is running finishes first; nothing is dispatched once
    /// this returns. Does nothing if the thread was never started.
    pub fn shutdown(&mut self) -> Result<()> {
        let thread = match mem::replace(&mut self.state, State::Stopped) {
            State::Running { thread } => thread,
            state => {
                self.state = state;
                return Ok(());
            }
        };

        debug!("Stopping interrupt thread.");
        let _ = self.tx.send(Message::Terminate);

        thread.join().map_err(|_| {
            error!("Interrupt thread panicked.");
            Error::Driver("interrupt handler panicked")
        })
    }
}

impl Drop for Intr {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn dispatch(
    mut entries: Vec<Entry>,
    watched: HashSet<Irq>,
    rx: Receiver<Message>,
    ready: Arc<Barrier>,
) {
    debug!("Interrupt thread started.");
    ready.wait();

    loop {
        let irq = match rx.recv() {
            Ok(Message::Irq(irq)) => irq,
            Ok(Message::Terminate) => break,
            Err(_) => {
                error!("Interrupt channel closed.");
                break;
            }
        };

        if !watched.contains(&irq) {
            debug!("Ignoring unwatched IRQ {}.", irq);
            continue;
        }

        // Newest registration first.
        for entry in entries.iter_mut().rev().filter(|entry| entry.irq == irq) {
            debug!("Dispatching IRQ {} to {}.", irq, entry.name);
            if let Err(err) = entry.handler.handle(irq, entry.dev) {
                error!("Handler {} for IRQ {} failed: {:?}.", entry.name, irq, err);
            }
        }
    }

    debug!("Interrupt thread terminated.");
}
