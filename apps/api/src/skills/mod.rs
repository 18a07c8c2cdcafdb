// Job definition: weighted skill allocation and the info/skills draft flow.

pub mod allocator;
pub mod draft;
pub mod handlers;
