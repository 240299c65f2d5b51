#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod error;
mod policy;
mod reader;

pub use self::{
    error::CompileError,
    policy::{Action, Party, Policy, ResourceGroupId, Rule},
    reader::{ClusterStateReader, PodSnapshot},
};
pub use ipnet::IpNet;
