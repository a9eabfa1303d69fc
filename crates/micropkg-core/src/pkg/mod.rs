//! Package retrieval.
//!
//! Provides utilities for:
//! - Resolving a package's latest version from the npm registry
//! - Downloading release tarballs
//! - Decoding tarballs into an entry event stream
//! - Reassembling entry events into in-memory file records

pub mod assemble;
pub mod error;
pub mod registry;
pub mod tarball;

pub use assemble::{
    collect_files, ArchiveDecoder, ArchiveEvent, EntryId, EntryKind, FileAssembler, FileRecord,
};
pub use error::{codes as analyze_codes, AnalyzeError, FailureKind};
pub use registry::{latest_version, PackageIdentifier, RegistryClient, DEFAULT_REGISTRY, REGISTRY_ENV};
pub use tarball::{download_tarball, TarGzDecoder, CHUNK_SIZE, MAX_TARBALL_SIZE};
