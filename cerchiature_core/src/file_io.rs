//! # File I/O Module
//!
//! Handles project file operations with safety features:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **File locking**: Prevent concurrent edits on shared drives
//! - **Version validation**: Ensure schema compatibility
//!
//! ## File Format
//!
//! Projects are saved as `.cerch` files containing JSON.
//! Lock files use the `.cerch.lock` extension with metadata about who holds
//! the lock. The user's custom masonry types live in a separate JSON file
//! written with the same atomic procedure.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cerchiature_core::file_io::{save_project, load_project, FileLock};
//! use cerchiature_core::project::Project;
//! use std::path::Path;
//!
//! let project = Project::new("Engineer", "25-001", "Client");
//! let path = Path::new("wall.cerch");
//!
//! let lock = FileLock::acquire(path, "engineer@studio.it").unwrap();
//! save_project(&project, path).unwrap();
//! drop(lock);
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{CalcError, CalcResult};
use crate::materials::{CatalogEntry, MaterialCatalog};
use crate::project::{Project, SCHEMA_VERSION};

/// Lock file metadata stored in .cerch.lock files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME").ok().or_else(|| std::env::var("HOST").ok())
    }
}

/// File lock guard that releases the lock when dropped.
///
/// Uses both an OS-level lock (fs2) and a .lock file with metadata for
/// user visibility.
pub struct FileLock {
    project_path: PathBuf,
    lock_path: PathBuf,
    /// Keeps the OS lock
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a project file.
    ///
    /// Returns `CalcError::FileLocked` when another live process holds it.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if lock_path.exists() {
            if let Ok(existing) = read_lock_info(&lock_path) {
                if !is_lock_stale(&existing) {
                    return Err(CalcError::file_locked(
                        path.display().to_string(),
                        format!("{} ({})", existing.user_id, existing.machine),
                        existing.locked_at.to_rfc3339(),
                    ));
                }
                warn!(path = %lock_path.display(), holder = %existing.user_id, "taking over stale lock");
            }
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| CalcError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(|e| CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;
        lock_file
            .sync_all()
            .map_err(|e| CalcError::file_error("sync lock", lock_path.display().to_string(), e.to_string()))?;

        debug!(path = %path.display(), user = %info.user_id, "lock acquired");

        Ok(FileLock {
            project_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Lock holder, if the file is locked by a live process.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if lock_path.exists() {
            if let Ok(info) = read_lock_info(&lock_path) {
                if !is_lock_stale(&info) {
                    return Some(info);
                }
            }
        }
        None
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(project_path: &Path) -> PathBuf {
    with_suffix(project_path, "lock")
}

/// `wall.cerch` → `wall.cerch.<suffix>`
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut out = path.to_path_buf();
    let extension = out
        .extension()
        .map(|e| format!("{}.{}", e.to_string_lossy(), suffix))
        .unwrap_or_else(|| suffix.to_string());
    out.set_extension(extension);
    out
}

fn read_to_string(path: &Path, operation: &str) -> CalcResult<String> {
    let mut file =
        File::open(path).map_err(|e| CalcError::file_error(operation, path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error(operation, path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = read_to_string(lock_path, "read lock")?;
    Ok(serde_json::from_str(&contents)?)
}

/// A lock is stale when its process is gone or it is older than 24 hours.
fn is_lock_stale(info: &LockInfo) -> bool {
    if let Some(our_machine) = hostname() {
        if info.machine == our_machine {
            #[cfg(windows)]
            {
                use std::process::Command;
                let output = Command::new("tasklist")
                    .args(["/FI", &format!("PID eq {}", info.pid), "/NH"])
                    .output();
                if let Ok(output) = output {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    if stdout.contains("No tasks") || !stdout.contains(&info.pid.to_string()) {
                        return true;
                    }
                }
            }
            #[cfg(unix)]
            {
                if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                    return true;
                }
            }
        }
    }

    let age = Utc::now() - info.locked_at;
    age.num_hours() > 24
}

/// Write `contents` to `path` through a synced temporary file and a rename.
fn write_atomic(path: &Path, contents: &str) -> CalcResult<()> {
    let tmp_path = with_suffix(path, "tmp");

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .write_all(contents.as_bytes())
        .map_err(|e| CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .sync_all()
        .map_err(|e| CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })
}

/// Save a project with atomic write semantics.
///
/// # Example
///
/// ```rust,no_run
/// use cerchiature_core::file_io::save_project;
/// use cerchiature_core::project::Project;
/// use std::path::Path;
///
/// let project = Project::new("Engineer", "25-001", "Client");
/// save_project(&project, Path::new("wall.cerch"))?;
/// # Ok::<(), cerchiature_core::errors::CalcError>(())
/// ```
pub fn save_project(project: &Project, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(project)?;
    write_atomic(path, &json)?;
    debug!(path = %path.display(), items = project.item_count(), "project saved");
    Ok(())
}

/// Load a project, checking its schema version.
///
/// # Errors
///
/// * `CalcError::VersionMismatch` - file version is incompatible
/// * `CalcError::SerializationError` - invalid JSON
/// * `CalcError::FileError` - I/O error
pub fn load_project(path: &Path) -> CalcResult<Project> {
    let contents = read_to_string(path, "read")?;
    let project: Project = serde_json::from_str(&contents)
        .map_err(|e| CalcError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;
    validate_version(&project.meta.version)?;
    Ok(project)
}

/// Load a project together with the current lock holder, if any.
pub fn load_project_with_lock_check(path: &Path) -> CalcResult<(Project, Option<LockInfo>)> {
    let project = load_project(path)?;
    let lock_info = FileLock::check(path);
    Ok((project, lock_info))
}

fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }
    // In 0.x a newer minor version may carry breaking changes
    if current_parts[0] == 0 && file_parts.len() > 1 && current_parts.len() > 1 && file_parts[1] > current_parts[1] {
        return Err(mismatch());
    }
    Ok(())
}

// ============================================================================
// Custom masonry materials
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CustomMaterialsFile {
    version: String,
    materials: Vec<CatalogEntry>,
}

/// Save the custom entries of `catalog`, sorted by key.
pub fn save_custom_materials(catalog: &MaterialCatalog, path: &Path) -> CalcResult<()> {
    let file = CustomMaterialsFile {
        version: SCHEMA_VERSION.to_string(),
        materials: catalog.custom_entries().into_iter().cloned().collect(),
    };
    write_atomic(path, &serde_json::to_string_pretty(&file)?)
}

/// Add the custom entries stored at `path` to `catalog`.
///
/// A missing file is not an error. Returns the number of entries loaded.
pub fn load_custom_materials(catalog: &mut MaterialCatalog, path: &Path) -> CalcResult<usize> {
    if !path.exists() {
        return Ok(0);
    }
    let contents = read_to_string(path, "read custom materials")?;
    let file: CustomMaterialsFile = serde_json::from_str(&contents)?;
    validate_version(&file.version)?;

    let count = file.materials.len();
    for entry in file.materials {
        catalog.add_custom(entry.key, entry.category, entry.material)?;
    }
    debug!(path = %path.display(), count, "custom materials loaded");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{CalculationItem, InterventionInput, Labeled};
    use crate::materials::{KnowledgeLevel, MasonryCategory, MasonryMaterial};
    use crate::model::{Opening, WallGeometry};
    use std::env::temp_dir;

    fn temp_path(name: &str, extension: &str) -> PathBuf {
        temp_dir().join(format!("cerchiature_test_{}_{}.{}", name, std::process::id(), extension))
    }

    #[test]
    fn test_lock_path_generation() {
        let lock_path = lock_path_for(Path::new("/path/to/wall.cerch"));
        assert_eq!(lock_path, Path::new("/path/to/wall.cerch.lock"));
    }

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("test@example.com");
        assert_eq!(info.user_id, "test@example.com");
        assert!(info.pid > 0);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_path("roundtrip", "cerch");

        let mut project = Project::new("Test Engineer", "TEST-001", "Test Client");
        let masonry = MaterialCatalog::normative().lookup("blocchi_tufo").unwrap().clone();
        let input = InterventionInput::new(WallGeometry::new(500.0, 300.0, 40.0), masonry)
            .with_opening(Opening::rectangular(100.0, 0.0, 90.0, 210.0).existing());
        let id = project.add_item(CalculationItem::Intervention(Labeled::new("Wall 1", input)));
        save_project(&project, &path).unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.engineer, "Test Engineer");
        assert_eq!(loaded.meta.job_id, "TEST-001");
        assert_eq!(loaded.get_item(&id), project.get_item(&id));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_path("atomic", "cerch");
        let tmp_path = with_suffix(&path, "tmp");

        save_project(&Project::new("Test", "TEST", "Client"), &path).unwrap();
        assert!(!tmp_path.exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let path = temp_path("lock", "cerch");
        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "test@example.com").unwrap();
        assert_eq!(lock.info.user_id, "test@example.com");

        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());

        drop(lock);
        assert!(!lock_path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_load_with_lock_check() {
        let path = temp_path("lock_check", "cerch");
        save_project(&Project::new("Test", "TEST", "Client"), &path).unwrap();

        let (loaded, lock_info) = load_project_with_lock_check(&path).unwrap();
        assert_eq!(loaded.meta.job_id, "TEST");
        assert!(lock_info.is_none());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_custom_materials_roundtrip() {
        let path = temp_path("materials", "json");

        let mut catalog = MaterialCatalog::normative();
        catalog
            .add_custom(
                "tufo_locale",
                MasonryCategory::Block,
                MasonryMaterial {
                    name: "Local tuff".to_string(),
                    fcm_mpa: 1.6,
                    tau0_mpa: 0.05,
                    e_mpa: 1100.0,
                    unit_weight_kn_m3: 15.0,
                    knowledge_level: KnowledgeLevel::LC2,
                },
            )
            .unwrap();
        save_custom_materials(&catalog, &path).unwrap();

        let mut fresh = MaterialCatalog::normative();
        assert_eq!(load_custom_materials(&mut fresh, &path).unwrap(), 1);
        assert_eq!(fresh.lookup("tufo_locale").unwrap().fcm_mpa, 1.6);
        assert_eq!(fresh.len(), catalog.len());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_custom_materials_file() {
        let mut catalog = MaterialCatalog::normative();
        let path = temp_path("no_such_materials", "json");
        assert_eq!(load_custom_materials(&mut catalog, &path).unwrap(), 0);
    }
}
