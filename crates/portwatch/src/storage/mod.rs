/// Persistence layer
///
/// The resource collection lives as one JSON document under a single key of a
/// get/set blob store. `ResourceStore` owns that document: every mutation is a
/// serialized read-modify-write of the whole collection.
pub mod blob;
pub mod repository;

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use repository::{RESOURCES_KEY, ResourceStore};
