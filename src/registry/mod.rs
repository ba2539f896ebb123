//! App registry - the persisted list of buildable apps

mod descriptor;
mod store;

pub use descriptor::{AppDescriptor, RemoteKind};
pub use store::Registry;
