//! Service adapters: OS specific implementations (IO).

pub mod file;
pub mod paths;
pub mod settings;

pub use file::LocalFileProvider;
pub use paths::{default_audit_log_path, default_workspace_root, ensure_log_dir, get_log_dir};
pub use settings::{ensure_settings_file, get_settings_path, load_settings, load_settings_from};
