extern crate config;
extern crate hostname;
extern crate reqwest;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
#[macro_use]
extern crate slog;
extern crate slog_async;
extern crate slog_scope;
extern crate slog_stdlog;
extern crate slog_term;

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate lazy_static;

pub mod errors;
pub mod metadata;
pub mod settings;
pub mod util;

pub use metadata::{get_ec2_instance_metadata, LabelScheme, MetadataFetcher};
