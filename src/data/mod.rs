pub mod cache;
pub mod coalesce;
pub mod feeds;
pub mod football_data;
pub mod normalize;
pub mod types;
