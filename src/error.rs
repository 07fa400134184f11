use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by graph construction, mutation and transforms.
///
/// Validation and lookup failures are raised eagerly at construction or
/// add-time and never coerced. Domain non-results (a route queried between
/// disconnected nodes) are *not* errors; those are reported as NaN by the
/// query itself.
#[derive(Debug, Error)]
pub enum Error {
    /// A node failed validation (empty name, malformed position, ...).
    #[error("invalid node: {0}")]
    InvalidNode(String),

    /// An edge failed validation (malformed geometry, bad attribute, ...).
    #[error("invalid edge: {0}")]
    InvalidEdge(String),

    /// A user attribute collides with a reserved name (`key` collides with
    /// the multi-edge index; mandatory fields are typed and set directly).
    #[error("attribute name '{0}' is reserved")]
    ReservedAttribute(String),

    /// A node with this name is already in the graph.
    #[error("node '{0}' is already in the graph")]
    DuplicateNode(String),

    /// Node '{0}' is not in the nodes.
    #[error("node '{0}' is not in the nodes")]
    MissingNode(String),

    /// No edge is stored under this `(start, stop, index)` key.
    #[error("no edge ('{start}', '{stop}', {index}) in the graph")]
    MissingEdge {
        start: String,
        stop: String,
        index: usize,
    },

    /// The node still has incident edges; callers must remove them first.
    #[error("node '{0}' still has incident edges; remove them before removing the node")]
    NodeInUse(String),

    /// The intersection of two curves produced a shape the planarizer was
    /// not written to handle. Fatal, never retried.
    #[error("intersection returned an object of type {0}")]
    UnsupportedIntersection(String),

    /// Merging requires two distinct namespace prefixes.
    #[error("graphs must be merged under distinct prefixes, got '{0}' twice")]
    PrefixClash(String),

    /// A generator was called with inconsistent parameters.
    #[error("invalid generator parameter: {0}")]
    Parameter(String),

    /// A GeoJSON document does not describe a spatial graph.
    #[error("invalid geojson: {0}")]
    InvalidGeoJson(String),

    #[error(transparent)]
    GeoJson(#[from] geojson::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
