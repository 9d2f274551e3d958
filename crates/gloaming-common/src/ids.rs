//! ID types for host-side resources.
//!
//! The host engine numbers its switches, variables, maps and map events from 1;
//! id 0 means "unset" everywhere, which is why each type exposes `is_valid`.

use serde::{Deserialize, Serialize};

macro_rules! host_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw value.
            #[must_use]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Returns the raw ID value.
            #[must_use]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Null/unset ID.
            pub const NULL: Self = Self(0);

            /// Checks if this is a valid (non-null) ID.
            #[must_use]
            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }

            /// Returns `None` for the null ID.
            #[must_use]
            pub const fn non_null(self) -> Option<Self> {
                if self.is_valid() {
                    Some(self)
                } else {
                    None
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

host_id!(
    /// Identifier of a boolean game switch.
    SwitchId
);

host_id!(
    /// Identifier of a numeric game variable slot.
    VariableId
);

host_id!(
    /// Identifier of a map.
    MapId
);

host_id!(
    /// Identifier of an event placed on a map.
    EventId
);

host_id!(
    /// Identifier of a map area. Unique within its map.
    AreaId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_ids() {
        assert!(!SwitchId::NULL.is_valid());
        assert!(SwitchId::new(3).is_valid());
        assert_eq!(VariableId::new(0).non_null(), None);
        assert_eq!(VariableId::new(7).non_null(), Some(VariableId::new(7)));
    }

    #[test]
    fn test_ids_serialize_as_numbers() {
        let json = serde_json::to_string(&MapId::new(12)).expect("serialize");
        assert_eq!(json, "12");
        let id: EventId = serde_json::from_str("4").expect("deserialize");
        assert_eq!(id.raw(), 4);
    }
}
