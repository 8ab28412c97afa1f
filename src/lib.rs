#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use bravo_data as data;
pub use bravo_reflect as reflect;
pub use bravo_schema as schema;
