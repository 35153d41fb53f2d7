use std::path::PathBuf;

pub const SOURCE_EXT: &str = "cas";
pub const BINARY_EXT: &str = "cb";

pub fn default_suite_dir() -> PathBuf {
    ["asm", "test"].iter().collect()
}
