//! Strongly typed, zero-cost identifier wrappers.
//!
//! Every arena in the simulator (tree nodes, events, agents, appliances, …)
//! is a plain `Vec` and these ids are indices into it.  Ids are handed out in
//! load order and never reused, so iteration by id is iteration in load
//! order.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a node in the address tree arena.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of an event in the world's event arena.
    pub struct EventId(u32);
}

typed_id! {
    /// Index of an agent (household member).
    pub struct AgentId(u32);
}

typed_id! {
    /// Index of an appliance.
    pub struct ApplianceId(u32);
}

typed_id! {
    /// Index of a storage ledger.
    pub struct StorageId(u32);
}

typed_id! {
    /// Index of an elapsed-time ledger.
    pub struct ElapsedId(u32);
}

typed_id! {
    /// Index of a holding (building).
    pub struct HoldingId(u32);
}

typed_id! {
    /// Index of a consumer unit (household).
    pub struct CuId(u32);
}

typed_id! {
    /// Index of a room.
    pub struct RoomId(u32);
}
