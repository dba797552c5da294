// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::op_ref
)]

//! Selection of geographically spread polling booths to serve as field
//! sampling points within an assembly constituency.
//!
//! Booths are partitioned into spatial clusters with a seeded k-means, then up
//! to two booths per cluster are picked whose geodesic distance from the
//! cluster center falls in an acceptable band.

pub mod booth;
pub mod cluster_count;
pub mod config;
pub mod distance;
pub mod kmeans;
pub mod loader;
pub mod map;
pub mod orchestrator;
pub mod selection;

pub use booth::{Booth, Centroid};
pub use cluster_count::calculate_cluster_count;
pub use config::SamplingConfig;
pub use orchestrator::{SelectionResult, process_constituency, process_constituency_with};
