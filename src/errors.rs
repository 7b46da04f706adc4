use crate::id::Id;

/// Everything that can abort a frame.
///
/// All variants are programmer errors: the frame that raised one is not
/// committed, so the previous frame's rectangles, animations and focus stay
/// intact. Numeric edge cases (negative sizes and the like) are clamped and
/// never show up here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Two builder calls in one frame resolved to the same key.
    #[error("duplicate identity {id:?}: `{label}` was already declared in this scope this frame")]
    DuplicateIdentity { id: Id, label: String },

    /// Two different keys hashed to the same identity within one frame.
    #[error("identity collision {id:?}: `{label}` hashes to the same id as `{existing}`")]
    IdentityCollision {
        id: Id,
        label: String,
        existing: String,
    },

    /// A unit that only the layout solver can resolve was resolved outside it.
    #[error("{kind} cannot be resolved to pixels without layout context")]
    InvalidUnitKind { kind: &'static str },

    /// An auto-sized axis depends on a child whose size depends back on it.
    #[error("layout cycle: `{label}` is auto-sized on the {axis} axis but child `{child}` is sized relative to it")]
    LayoutCycleDetected {
        label: String,
        child: String,
        axis: &'static str,
    },

    /// A declaration needs a collaborator or reference that was not supplied.
    #[error("`{label}` requires {resource}")]
    MissingRequiredResource {
        label: String,
        resource: &'static str,
    },

    /// More elements were declared than `EngineConfig::max_element_count` allows.
    #[error("element capacity of {max} exceeded")]
    CapacityExceeded { max: usize },
}

pub type Result<T> = core::result::Result<T, Error>;
