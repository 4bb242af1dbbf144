use thiserror::Error;

use crate::ActorId;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("missing field `{field}`")]
    Missing { field: String },
    #[error("field `{field}` is not a {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },
    #[error("unknown {kind} type `{name}`")]
    UnknownType { kind: &'static str, name: String },
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("{0:?} refers to a destroyed actor")]
    StaleHandle(ActorId),
    #[error("{0:?} is not a widget")]
    NotAWidget(ActorId),
    #[error("{0:?} is not focusable")]
    NotFocusable(ActorId),
    #[error("{0:?} cannot be parented to itself")]
    SelfParent(ActorId),
    #[error("parenting {child:?} under {parent:?} would create a cycle")]
    CycleDetected { child: ActorId, parent: ActorId },
    #[error("transform of widget {0:?} is derived from its layout")]
    DerivedTransform(ActorId),
    #[error("{0:?} is not linked to a prototype")]
    NoPrototype(ActorId),
    #[error("no widget layer at `{path}`")]
    MissingLayer { path: String },
    #[error("no state named `{name}`")]
    MissingState { name: String },
    #[error(transparent)]
    Data(#[from] DataError),
}

pub type SceneResult<T> = Result<T, SceneError>;
