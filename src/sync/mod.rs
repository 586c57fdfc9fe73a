pub mod rwlock;
pub mod workqueue;

pub use rwlock::{Guarded, RwLock};
pub use workqueue::WorkQueue;
