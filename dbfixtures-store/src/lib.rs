//! Fixture storage.
//!
//! Fixtures live at `<root>/<flavour>/<version>/<command>.<ext>`. The store never
//! looks inside a payload; the extension only records which serialization the
//! collector used. An absent flavour or version directory is a normal state and
//! lists as empty.

mod error;
mod store;

pub use error::StoreError;
pub use store::{DEFAULT_EXTENSION, FixtureStore};
