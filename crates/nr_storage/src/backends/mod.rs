pub mod filesystem;
pub mod memory;

pub use filesystem::FileStorage;
pub use memory::MemoryStorage;
