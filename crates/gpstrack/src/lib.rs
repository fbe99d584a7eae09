//! `gpstrack` - GPS route logging with project taxonomies
//!
//! This library provides project documents with a sampling interval and a
//! taxonomy of contextual tags, a route logger that appends one location
//! sample per tick to a line-delimited JSON session file, and a viewer for
//! reading those sessions back.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod location;
pub mod logging;
pub mod project;
pub mod route;
pub mod taxonomy;
pub mod viewer;

pub use config::Config;
pub use error::{Error, Result};
pub use location::{Coordinate, LocationProvider, SimulatedLocation};
pub use logging::init_logging;
pub use project::{Project, ProjectStore, TaxonomyClass};
pub use route::{LogRecord, LoggerState, MetaSelection, RouteLogger};
pub use viewer::RouteViewer;
