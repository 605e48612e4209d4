pub mod block;
pub mod model;
pub mod state;
pub mod validate;

pub use block::{has_trailing_zeros, md5_hex, shape_hash, Block, OpKind, Operation};
pub use model::Chain;
pub use state::{InkAccount, LedgerState, LiveShape, ShapeLogEntry};
pub use validate::{apply_block, validate_chain, ChainError};
