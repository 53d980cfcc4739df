use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::io::storage::Storage;

/// The fixed keys this application stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Todos,
    Theme,
    Filters,
}

impl StorageKey {
    pub const ALL: [StorageKey; 3] = [StorageKey::Todos, StorageKey::Theme, StorageKey::Filters];

    /// The key as stored, which is also its logical name in exports
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::Todos => "todos",
            StorageKey::Theme => "theme",
            StorageKey::Filters => "filters",
        }
    }

    /// Look up a logical name, case-insensitively
    pub fn from_name(name: &str) -> Option<StorageKey> {
        StorageKey::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(name))
    }
}

/// Outcome of [`import_data`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Logical names written to storage
    pub imported: Vec<String>,
    /// Names that were unrecognized or failed to write
    pub skipped: Vec<String>,
}

/// Snapshot every stored key as `{ name: parsed value }`.
/// Absent keys are left out; unparsable values are logged and left out.
pub fn export_data<S: Storage + ?Sized>(storage: &S) -> IndexMap<String, serde_json::Value> {
    let mut data = IndexMap::new();
    for key in StorageKey::ALL {
        let raw = match storage.get_item(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "error reading key for export");
                continue;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => {
                data.insert(key.as_str().to_string(), value);
            }
            Err(e) => warn!(key = key.as_str(), error = %e, "error parsing key for export"),
        }
    }
    data
}

/// Write each recognized entry of `data` back to storage verbatim.
///
/// Nothing already loaded in memory changes: callers must reload their
/// state afterwards for the import to take effect.
pub fn import_data<S: Storage + ?Sized>(
    storage: &mut S,
    data: &IndexMap<String, serde_json::Value>,
) -> ImportReport {
    let mut report = ImportReport::default();
    for (name, value) in data {
        let Some(key) = StorageKey::from_name(name) else {
            warn!(name = name.as_str(), "skipping unrecognized key on import");
            report.skipped.push(name.clone());
            continue;
        };
        let written = serde_json::to_string(value)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                storage
                    .set_item(key.as_str(), &json)
                    .map_err(|e| e.to_string())
            });
        match written {
            Ok(()) => report.imported.push(key.as_str().to_string()),
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "error importing key");
                report.skipped.push(name.clone());
            }
        }
    }
    info!(
        imported = report.imported.len(),
        skipped = report.skipped.len(),
        "data imported; reload to apply"
    );
    report
}

/// Remove every application key from storage
pub fn clear_all_data<S: Storage + ?Sized>(storage: &mut S) {
    for key in StorageKey::ALL {
        if let Err(e) = storage.remove_item(key.as_str()) {
            warn!(key = key.as_str(), error = %e, "error clearing key");
        }
    }
    info!("all application data cleared");
}
