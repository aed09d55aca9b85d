mod error;
mod store;

pub use error::{FileDaoError, FileResult};
pub use store::FileSnapshotStore;
