//! Entry metadata shared by entry sources and the transcoder.

pub mod descriptor;
pub mod entry_kind;

pub use descriptor::EntryDescriptor;
pub use entry_kind::EntryKind;
