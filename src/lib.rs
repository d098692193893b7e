pub mod debugger;
pub mod machine;
