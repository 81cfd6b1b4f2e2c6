//! Task list save/load
//!
//! Features:
//! - Versioned JSON envelope
//! - LocalStorage on web, no-op on native
//! - Unreadable saves are reported and ignored, never fatal
//!
//! Only tasks are stored. Restored tasks are spawned and launched again, so
//! no physics state needs to survive a reload.

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::task::Task;

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

/// LocalStorage key
#[allow(dead_code)]
const STORAGE_KEY: &str = "task_bubbles_tasks";

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    tasks: Vec<Task>,
}

/// Serialize tasks into the save envelope
pub fn encode(tasks: &[Task]) -> Result<String, PersistenceError> {
    let envelope = Envelope {
        version: SAVE_VERSION,
        tasks: tasks.to_vec(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse a save envelope
pub fn decode(json: &str) -> Result<Vec<Task>, PersistenceError> {
    let envelope: Envelope = serde_json::from_str(json)?;
    if envelope.version != SAVE_VERSION {
        return Err(PersistenceError::UnsupportedVersion(envelope.version));
    }
    Ok(envelope.tasks)
}

/// Load saved tasks from LocalStorage
#[cfg(target_arch = "wasm32")]
pub fn load() -> Vec<Task> {
    let Some(storage) = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
    else {
        return Vec::new();
    };

    match storage.get_item(STORAGE_KEY).ok().flatten() {
        Some(json) => match decode(&json) {
            Ok(tasks) => {
                log::info!("Loaded {} saved tasks", tasks.len());
                tasks
            }
            Err(e) => {
                log::warn!("Ignoring saved tasks: {}", e);
                Vec::new()
            }
        },
        None => Vec::new(),
    }
}

/// Save tasks to LocalStorage
#[cfg(target_arch = "wasm32")]
pub fn save(tasks: &[Task]) {
    let json = match encode(tasks) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Failed to encode tasks: {}", e);
            return;
        }
    };
    if let Some(storage) = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
    {
        let _ = storage.set_item(STORAGE_KEY, &json);
        log::info!("Saved {} tasks", tasks.len());
    }
}

/// Remove saved tasks from LocalStorage
#[cfg(target_arch = "wasm32")]
pub fn clear() {
    if let Some(storage) = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
    {
        let _ = storage.remove_item(STORAGE_KEY);
        log::info!("Saved tasks cleared");
    }
}

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
pub fn load() -> Vec<Task> {
    Vec::new()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save(_tasks: &[Task]) {
    // No-op for native
}

#[cfg(not(target_arch = "wasm32"))]
pub fn clear() {
    // No-op for native
}
