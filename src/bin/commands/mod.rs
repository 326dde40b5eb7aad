pub mod fields_cmd;
pub mod inspect_cmd;
pub mod query_cmd;

pub use fields_cmd::cmd_fields;
pub use inspect_cmd::cmd_inspect;
pub use query_cmd::cmd_query;
