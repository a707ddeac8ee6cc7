//! 文件系统适配

mod walk_scanner;

pub use walk_scanner::WalkDirScanner;
