use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to art applications over the wire.
///
/// Structural errors describe malformed input; policy errors describe
/// requests the canvas rules forbid. Transport failures are not modeled
/// here -- the client sees them as connection errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtError {
    #[error("bad shape svg string [{0}]")]
    InvalidShapeSvgString(String),

    #[error("shape svg string too long [{0}]")]
    ShapeSvgStringTooLong(String),

    #[error("invalid shape hash [{0}]")]
    InvalidShapeHash(String),

    #[error("invalid block hash [{0}]")]
    InvalidBlockHash(String),

    #[error("invalid miner private/public key")]
    InvalidMinerPk,

    #[error("shape is outside the bounds of the canvas")]
    OutOfBounds,

    #[error("shape overlaps with a previously added shape [{0}]")]
    Overlap(String),

    #[error("shape owned by someone else [{0}]")]
    ShapeOwner(String),

    #[error("not enough ink to add shape [{0}]")]
    InsufficientInk(u32),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for ArtError {
    fn status_code(&self) -> StatusCode {
        match self {
            ArtError::InvalidShapeHash(_) | ArtError::InvalidBlockHash(_) => {
                StatusCode::NOT_FOUND
            }
            ArtError::InvalidMinerPk | ArtError::ShapeOwner(_) => StatusCode::FORBIDDEN,
            ArtError::Overlap(_) | ArtError::InsufficientInk(_) => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ArtError;
    use actix_web::{http::StatusCode, ResponseError};

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            ArtError::InvalidShapeHash("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ArtError::InvalidMinerPk.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ArtError::Overlap("0,3".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ArtError::OutOfBounds.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn messages_carry_context() {
        let e = ArtError::InsufficientInk(25);
        assert!(e.to_string().contains("25"));
        let e = ArtError::Overlap("0,3".into());
        assert!(e.to_string().contains("0,3"));
    }
}
