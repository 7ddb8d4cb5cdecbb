//! Integration tests: services over the in-memory stores, and HTTP round
//! trips through the router.

mod helpers;

mod access_test;
mod api_test;
mod file_test;
mod folder_test;
mod share_test;
