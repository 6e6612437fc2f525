mod fs_store;
mod memory_store;

use std::fmt::Write;

use sha2::{Digest, Sha256};

pub use fs_store::FsDocumentStore;
pub use memory_store::MemoryDocumentStore;

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for byte in digest {
        let _ = write!(&mut out, "{:02x}", byte);
    }
    out
}
