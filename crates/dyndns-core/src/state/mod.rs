// # Updater State
//
// Last-applied addresses, one slot per address family. The state lives in
// memory only and starts empty on every process start, so the first cycle
// after a restart always writes.

pub mod memory;

pub use memory::UpdaterState;
