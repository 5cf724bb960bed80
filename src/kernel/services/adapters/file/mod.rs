//! 文件服务模块

pub mod local;

pub use local::LocalFileProvider;
