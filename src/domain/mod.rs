//! Domain logic - pure business rules independent of git operations

pub mod commit;
pub mod naming;
pub mod tag;
pub mod version;

pub use commit::{Commit, ParsedCommit};
pub use naming::module_name_from_path;
pub use tag::{
    canonicalize_separators, extract_version, is_associated, Release, Tag, VersionedName,
    VALID_TAG_SEPARATORS,
};
pub use version::{compare_versions, next_version, ReleaseType, Version};
