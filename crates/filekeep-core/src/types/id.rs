//! Newtype wrappers around [`uuid::Uuid`] for all domain entity identifiers.
//!
//! Using distinct types prevents accidentally passing a `FolderId` where a
//! `FileId` is expected. All ids serialize transparently as UUID strings,
//! which is how they appear in record store rows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a newtype ID wrapper around `Uuid`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Return the inner UUID value.
            pub fn into_uuid(self) -> Uuid {
                self.0
            }

            /// Return a reference to the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for a workspace (tenant boundary).
    WorkspaceId
);

define_id!(
    /// Unique identifier for a project.
    ProjectId
);

define_id!(
    /// Unique identifier for a folder.
    FolderId
);

define_id!(
    /// Unique identifier for a file record.
    FileId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_id_new_is_unique() {
        assert_ne!(FolderId::new(), FolderId::new());
    }

    #[test]
    fn test_file_id_from_str() {
        let uuid = Uuid::new_v4();
        let id: FileId = uuid.to_string().parse().expect("should parse");
        assert_eq!(id.0, uuid);
        assert!("not-a-uuid".parse::<FileId>().is_err());
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let uuid = Uuid::nil();
        let json = serde_json::to_value(WorkspaceId::from_uuid(uuid)).expect("serialize");
        assert_eq!(json, serde_json::json!("00000000-0000-0000-0000-000000000000"));
    }
}
