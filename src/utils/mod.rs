//! Filesystem, HTTP and image plumbing shared by the fetcher and the degrader.

pub mod files;
pub mod http;
pub mod images;
