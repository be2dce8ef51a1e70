//! In-process message pipe registry
//!
//! Every open handle is an entry in a process-wide table. A message pipe is
//! two entries that name each other as peers; writing to one endpoint
//! queues the message on the other.

use crate::{AsRawHandle, Handle, HandleSignals, RawHandle, Status, HANDLE_INVALID};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

/// A message waiting on an endpoint. Handles are kept raw so that closing
/// them never happens while the registry lock is held.
struct QueuedMessage {
    bytes: Vec<u8>,
    handles: Vec<RawHandle>,
}

#[derive(Default)]
struct Endpoint {
    peer: Option<RawHandle>,
    queue: VecDeque<QueuedMessage>,
}

static NEXT_HANDLE: AtomicU32 = AtomicU32::new(1);

fn registry() -> &'static Mutex<FxHashMap<RawHandle, Endpoint>> {
    static REGISTRY: OnceLock<Mutex<FxHashMap<RawHandle, Endpoint>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(FxHashMap::default()))
}

fn next_raw() -> RawHandle {
    loop {
        let raw = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
        if raw != HANDLE_INVALID {
            return raw;
        }
    }
}

#[cfg(test)]
pub fn is_open(raw: RawHandle) -> bool {
    registry().lock().contains_key(&raw)
}

// Handle operations
pub fn handle_close(raw: RawHandle) {
    let orphaned: Vec<RawHandle> = {
        let mut table = registry().lock();
        let Some(endpoint) = table.remove(&raw) else {
            return;
        };
        if let Some(peer) = endpoint.peer {
            if let Some(peer_endpoint) = table.get_mut(&peer) {
                peer_endpoint.peer = None;
            }
        }
        endpoint
            .queue
            .into_iter()
            .flat_map(|message| message.handles)
            .collect()
    };

    tracing::trace!("closed handle {} ({} queued handles released)", raw, orphaned.len());
    for raw in orphaned {
        handle_close(raw);
    }
}

// Message pipe operations
pub fn message_pipe_create() -> crate::Result<(Handle, Handle)> {
    let h0 = next_raw();
    let h1 = next_raw();
    {
        let mut table = registry().lock();
        table.insert(h0, Endpoint { peer: Some(h1), queue: VecDeque::new() });
        table.insert(h1, Endpoint { peer: Some(h0), queue: VecDeque::new() });
    }
    tracing::trace!("created message pipe ({}, {})", h0, h1);
    // SAFETY: both raw values were just registered and are owned by nobody else.
    Ok(unsafe { (Handle::from_raw(h0), Handle::from_raw(h1)) })
}

pub fn message_pipe_write(
    raw: RawHandle,
    bytes: &[u8],
    handles: Vec<Handle>,
) -> crate::Result<()> {
    let raw_handles: Vec<RawHandle> = handles.iter().map(Handle::raw_handle).collect();
    if raw_handles.iter().any(|&h| h == raw || h == HANDLE_INVALID) {
        return Err(Status::INVALID_ARGUMENT);
    }

    let queued = {
        let mut table = registry().lock();
        enqueue_on_peer(&mut table, raw, bytes, raw_handles)
    };

    // On failure the handles are closed on return, after the lock is released.
    queued?;
    for handle in handles {
        handle.into_raw();
    }
    Ok(())
}

fn enqueue_on_peer(
    table: &mut FxHashMap<RawHandle, Endpoint>,
    raw: RawHandle,
    bytes: &[u8],
    handles: Vec<RawHandle>,
) -> crate::Result<()> {
    let peer = match table.get(&raw) {
        Some(endpoint) => endpoint.peer,
        None => return Err(Status::INVALID_ARGUMENT),
    };
    let Some(peer) = peer else {
        return Err(Status::FAILED_PRECONDITION);
    };
    if handles.contains(&peer) {
        return Err(Status::INVALID_ARGUMENT);
    }
    let Some(peer_endpoint) = table.get_mut(&peer) else {
        return Err(Status::FAILED_PRECONDITION);
    };

    peer_endpoint.queue.push_back(QueuedMessage {
        bytes: bytes.to_vec(),
        handles,
    });
    Ok(())
}

pub fn message_pipe_read(raw: RawHandle) -> crate::Result<(Vec<u8>, Vec<Handle>)> {
    let mut table = registry().lock();
    let Some(endpoint) = table.get_mut(&raw) else {
        return Err(Status::INVALID_ARGUMENT);
    };
    match endpoint.queue.pop_front() {
        Some(message) => {
            // SAFETY: queued raw handles are owned by the queue until handed out here.
            let handles = message
                .handles
                .into_iter()
                .map(|h| unsafe { Handle::from_raw(h) })
                .collect();
            Ok((message.bytes, handles))
        }
        None if endpoint.peer.is_some() => Err(Status::SHOULD_WAIT),
        None => Err(Status::FAILED_PRECONDITION),
    }
}

pub fn query_signals(raw: RawHandle) -> crate::Result<HandleSignals> {
    let table = registry().lock();
    let Some(endpoint) = table.get(&raw) else {
        return Err(Status::INVALID_ARGUMENT);
    };
    let mut signals = HandleSignals::NONE;
    if !endpoint.queue.is_empty() {
        signals |= HandleSignals::READABLE;
    }
    if endpoint.peer.is_some() {
        signals |= HandleSignals::WRITABLE;
    } else {
        signals |= HandleSignals::PEER_CLOSED;
    }
    Ok(signals)
}
