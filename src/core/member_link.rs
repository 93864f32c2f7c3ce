// Member-side linking: a member's own cached references to its containers.
//
// Structure
// - member_row.rs: the member row as stored by the member service
// - apply.rs: the same union/difference rule as container associations, on one row

pub mod apply;
pub mod member_row;
