//
//  bitbucket-provider
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Formatting
//!
//! State documents go to stdout as pretty-printed JSON so that they can be
//! piped back into the next command; schemas are rendered as tables for
//! people. Logs go to stderr and never mix with either.
//!
//! - [`json`]: JSON writers
//! - [`table`]: table rendering using `comfy_table`

pub mod json;
pub mod table;

pub use json::{write_json, write_json_to};
pub use table::{create_table, TableBuilder};
